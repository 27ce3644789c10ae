//! IANA Definitions for DNS.
//!
//! This module contains types for parameters defined in IANA registries
//! that are relevant for this crate.
//!
//! [`Opcode`], [`Rcode`], and [`Rtype`] follow the same basic structure.
//! They are newtypes around the raw integer with an associated constant
//! for every well-defined value. Since we cannot restrict the integer to
//! only the undefined values, we generally allow the full set of possible
//! values. There are two methods `from_int()` and `to_int()` to convert
//! from and to raw integer values as well as implementations of the `From`
//! trait for these. `FromStr` and `Display` are implemented to convert from
//! the string codes to the values and back.
//!
//! [`RecordClass`] is different: it carries a name next to its value and
//! the well-known classes exist as statics so that lookups can hand out
//! references to the one canonical instance.

pub use self::class::RecordClass;
pub use self::opcode::Opcode;
pub use self::rcode::Rcode;
pub use self::rtype::Rtype;

#[macro_use]
mod macros;

pub mod class;
pub mod opcode;
pub mod rcode;
pub mod rtype;
