//! DNS CLASSes.

use crate::base::wire::{Parse, ParseError};
use crate::error::InvalidArgument;
use core::{cmp, fmt, hash, str};
use octseq::parse::Parser;
use std::borrow::Cow;

//------------ Well-known Classes --------------------------------------------

/// Internet (IN).
///
/// This class is defined in RFC 1035 and really the only one relevant
/// at all.
pub static IN: RecordClass = RecordClass::well_known(0x0001, "IN", "IN(1)");

/// CSNET (CS).
///
/// Obsolete, used only for examples in some obsolete RFCs.
pub static CSNET: RecordClass =
    RecordClass::well_known(0x0002, "CSNET", "CSNET(2)");

/// Chaosnet (CH).
///
/// A network protocol developed at MIT in the 1970s. Reused by BIND for
/// built-in server information zones.
pub static CHAOS: RecordClass =
    RecordClass::well_known(0x0003, "CHAOS", "CHAOS(3)");

/// Hesiod (HS).
///
/// A system information protocol part of MIT's Project Athena.
pub static HESIOD: RecordClass =
    RecordClass::well_known(0x0004, "HESIOD", "HESIOD(4)");

/// Query class None.
///
/// Defined in RFC 2136, this class is used in UPDATE queries to
/// require that an RRset does not exist prior to the update.
pub static NONE: RecordClass =
    RecordClass::well_known(0x00fe, "NONE", "NONE(254)");

/// Query class * (ANY).
///
/// This class can be used in a query to indicate that records for the
/// given name from any class are requested.
pub static ANY: RecordClass =
    RecordClass::well_known(0x00ff, "ANY", "ANY(255)");

/// The well-known classes in the order names are matched in.
static BY_NAME: [&RecordClass; 6] = [&IN, &NONE, &ANY, &CSNET, &CHAOS, &HESIOD];

const EXPECTED: &str =
    "expected: IN(1), CSNET(2), CHAOS(3), HESIOD(4), NONE(254), ANY(255)";

const UNKNOWN: &str = "UNKNOWN";

//------------ RecordClass ---------------------------------------------------

/// DNS CLASSes.
///
/// The domain name space is partitioned into separate classes for different
/// network types. That is, each class has its own separate record tree
/// starting at the root. However, in practice, only the IN class is really
/// relevant.
///
/// A class is a 16 bit value together with a name. The six well-known
/// classes exist exactly once as the statics of this module. Looking up a
/// well-known value via [`from_int`][Self::from_int],
/// [`lookup_int`][Self::lookup_int], or [`from_name`][Self::from_name]
/// returns a reference to that static. Any other value results in a new
/// class named `UNKNOWN`.
///
/// Classes compare, order, and hash by their value only.
#[derive(Clone)]
pub struct RecordClass {
    value: u16,
    name: Cow<'static, str>,

    /// The display form `NAME(value)`.
    text: Cow<'static, str>,
}

/// # Creation
///
impl RecordClass {
    const fn well_known(
        value: u16,
        name: &'static str,
        text: &'static str,
    ) -> Self {
        RecordClass {
            value,
            name: Cow::Borrowed(name),
            text: Cow::Borrowed(text),
        }
    }

    fn with_name(value: u16, name: Cow<'static, str>) -> Self {
        let text = format!("{}({})", name, value);
        RecordClass {
            value,
            name,
            text: Cow::Owned(text),
        }
    }

    /// Creates a new class from a value and a name.
    ///
    /// The value must fit into 16 bits and the name must not be empty.
    /// The function never returns one of the well-known statics, even if
    /// the value matches one.
    pub fn new(
        value: u32,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Self, InvalidArgument> {
        let value = u16::try_from(value).map_err(|_| {
            InvalidArgument::new(
                "value",
                format!("{} (expected: 0 ~ 65535)", value),
            )
        })?;
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidArgument::new("name", "must not be empty"));
        }
        Ok(Self::with_name(value, name))
    }

    /// Creates a class named `UNKNOWN` for the given value.
    pub fn unknown(value: u16) -> Self {
        Self::with_name(value, Cow::Borrowed(UNKNOWN))
    }

    /// Creates a class for a custom value and name.
    ///
    /// Unlike [`from_int`][Self::from_int], this always creates a new
    /// value.
    pub fn custom(value: u16, name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_name(value, name.into())
    }

    /// Returns the well-known class for `value` if there is one.
    pub fn lookup_int(value: u16) -> Option<&'static RecordClass> {
        match value {
            0x0001 => Some(&IN),
            0x0002 => Some(&CSNET),
            0x0003 => Some(&CHAOS),
            0x0004 => Some(&HESIOD),
            0x00fe => Some(&NONE),
            0x00ff => Some(&ANY),
            _ => None,
        }
    }

    /// Returns the class for the given value.
    ///
    /// For well-known values, the returned value borrows the static.
    /// Otherwise a new `UNKNOWN` class is created.
    pub fn from_int(value: u16) -> Cow<'static, RecordClass> {
        match Self::lookup_int(value) {
            Some(class) => Cow::Borrowed(class),
            None => Cow::Owned(Self::unknown(value)),
        }
    }

    /// Returns the well-known class with exactly the given name.
    ///
    /// Names are compared case-sensitively.
    pub fn from_name(name: &str) -> Result<&'static RecordClass, InvalidArgument> {
        BY_NAME
            .iter()
            .copied()
            .find(|class| class.name == name)
            .ok_or_else(|| {
                InvalidArgument::new(
                    "name",
                    format!("{} ({})", name, EXPECTED),
                )
            })
    }

    /// Parses a class value from the wire.
    pub fn parse<'a, Octs: AsRef<[u8]> + ?Sized>(
        parser: &mut Parser<'a, Octs>,
    ) -> Result<Self, ParseError> {
        u16::parse(parser).map(|value| Self::from_int(value).into_owned())
    }
}

/// # Field Access
///
impl RecordClass {
    /// Returns the protocol value of the class.
    pub fn to_int(&self) -> u16 {
        self.value
    }

    /// Returns the name of the class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the class has the value of a well-known class.
    pub fn is_well_known(&self) -> bool {
        Self::lookup_int(self.value).is_some()
    }
}

//--- From and TryFrom

impl From<u16> for RecordClass {
    fn from(value: u16) -> Self {
        RecordClass::from_int(value).into_owned()
    }
}

impl TryFrom<u32> for RecordClass {
    type Error = InvalidArgument;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match u16::try_from(value) {
            Ok(value) => Ok(value.into()),
            Err(_) => RecordClass::new(value, UNKNOWN),
        }
    }
}

impl From<&RecordClass> for u16 {
    fn from(class: &RecordClass) -> Self {
        class.value
    }
}

//--- FromStr

impl str::FromStr for RecordClass {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordClass::from_name(s).cloned()
    }
}

//--- PartialEq, Eq, PartialOrd, Ord, and Hash

impl PartialEq for RecordClass {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for RecordClass {}

impl PartialOrd for RecordClass {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordClass {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl hash::Hash for RecordClass {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

//--- Display and Debug

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RecordClass({})", self.text)
    }
}

//============ Tests =========================================================
