//! Basics.
//!
//! This module provides types and traits for working with DNS messages.
//!
//! # Messages
//!
//! A DNS message is represented by either a [`DnsQuery`] or a
//! [`DnsResponse`]. Both dereference to a [`Message`] holding the header
//! fields they share and the four sections. Messages are mutable: they can
//! be created empty and filled step by step, which is what the decoders in
//! the [`dgram`][crate::dgram] module do.
//!
//! What questions and records look like is not defined here. Messages are
//! generic over them and a [`RecordDecoder`] creates them while decoding.
//! The [`RawRecordDecoder`] keeps them in wire format.
//!
//! # Reference Counting
//!
//! Messages and, optionally, their entries carry an explicit reference
//! count. Whoever holds a reference must give it back exactly once through
//! [`ReferenceCounted::release`]. Releasing the last reference to a message
//! releases all of its entries. The [refcnt] module explains the details,
//! the [leak] module how forgotten releases are reported.
//!
//! # Wire Format
//!
//! Data is read from the wire through an [`octseq::parse::Parser`]. The
//! [header] module provides typed access to the message header, the
//! [iana] module types for the registered parameter values found in it.

pub use self::header::{Header, HeaderCounts};
pub use self::iana::{Opcode, Rcode, RecordClass, Rtype};
pub use self::message::{DnsQuery, DnsResponse, Message};
pub use self::record::{RawQuestion, RawRecord, RawRecordDecoder, RecordDecoder};
pub use self::refcnt::{RefCnt, ReferenceCounted, Resource};
pub use self::section::{OneOrMany, Section};
pub use self::wire::ParseError;

pub mod header;
pub mod iana;
pub mod leak;
pub mod message;
mod printer;
pub mod record;
pub mod refcnt;
pub mod section;
pub mod wire;
