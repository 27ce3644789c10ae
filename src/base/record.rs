//! Decoding questions and resource records.
//!
//! A DNS message decoder only deals with the header and the section
//! counts. Everything in between is handed to a [`RecordDecoder`] which
//! decides what questions and records look like. This module defines the
//! trait and [`RawRecordDecoder`], a decoder that keeps names and record
//! data in wire format without interpreting them.

use super::iana::{RecordClass, Rtype};
use super::refcnt::Resource;
use super::wire::{Parse, ParseError};
use bytes::Bytes;
use core::fmt;
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ RecordDecoder -------------------------------------------------

/// A type that can decode questions and records from a message.
///
/// Both methods are called with a parser positioned at the start of the
/// entry. They must leave it positioned at the start of the next one.
/// `Octs` is the octets sequence holding the message.
pub trait RecordDecoder<Octs: ?Sized> {
    /// The type of a decoded question.
    type Question;

    /// The type of a decoded resource record.
    type Record;

    /// Decodes a single question.
    fn decode_question(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Self::Question, ParseError>;

    /// Decodes a single resource record.
    fn decode_record(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Self::Record, ParseError>;
}

impl<'d, Octs: ?Sized, D: RecordDecoder<Octs> + ?Sized> RecordDecoder<Octs>
    for &'d D
{
    type Question = D::Question;
    type Record = D::Record;

    fn decode_question(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Self::Question, ParseError> {
        (**self).decode_question(parser)
    }

    fn decode_record(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Self::Record, ParseError> {
        (**self).decode_record(parser)
    }
}

//------------ RawRecordDecoder ----------------------------------------------

/// A record decoder that does not interpret names and record data.
///
/// Questions become [`RawQuestion`]s and records [`RawRecord`]s. Both
/// share the message's [`Bytes`] rather than copying.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawRecordDecoder;

impl RawRecordDecoder {
    pub fn new() -> Self {
        RawRecordDecoder
    }
}

impl RecordDecoder<Bytes> for RawRecordDecoder {
    type Question = RawQuestion<Bytes>;
    type Record = RawRecord<Bytes>;

    fn decode_question(
        &self,
        parser: &mut Parser<'_, Bytes>,
    ) -> Result<Self::Question, ParseError> {
        RawQuestion::parse(parser)
    }

    fn decode_record(
        &self,
        parser: &mut Parser<'_, Bytes>,
    ) -> Result<Self::Record, ParseError> {
        RawRecord::parse(parser)
    }
}

//------------ RawName -------------------------------------------------------

/// A domain name in wire format exactly as it appears in the message.
///
/// The name consists of a sequence of labels ending either in the root
/// label or in a compression pointer. Compression pointers are not
/// followed, so a compressed name only contains the labels up to and
/// including the pointer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RawName<Octs>(Octs);

impl<Octs> RawName<Octs> {
    /// The maximum length of an uncompressed name.
    pub const MAX_LEN: usize = 255;

    pub fn as_octets(&self) -> &Octs {
        &self.0
    }

    pub fn into_octets(self) -> Octs {
        self.0
    }

    pub fn as_slice(&self) -> &[u8]
    where
        Octs: AsRef<[u8]>,
    {
        self.0.as_ref()
    }

    /// Returns the compression pointer ending the name if there is one.
    pub fn pointer(&self) -> Option<u16>
    where
        Octs: AsRef<[u8]>,
    {
        match Labels(self.as_slice()).last() {
            Some(Label::Pointer(ptr)) => Some(ptr),
            _ => None,
        }
    }

    /// Returns whether the name ends in a compression pointer.
    pub fn is_compressed(&self) -> bool
    where
        Octs: AsRef<[u8]>,
    {
        self.pointer().is_some()
    }

    /// Takes a name from the beginning of the parser.
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        let len = name_len(parser.peek_all())?;
        parser.parse_octets(len).map(RawName).map_err(Into::into)
    }
}

/// Returns the length of the name at the start of `data`.
fn name_len(data: &[u8]) -> Result<usize, ParseError> {
    let mut pos = 0;
    loop {
        let ltype = *data.get(pos).ok_or(ParseError::ShortInput)?;
        match ltype {
            0 => return Ok(pos + 1),
            1..=0x3F => {
                pos += 1 + usize::from(ltype);
                if pos >= RawName::<()>::MAX_LEN {
                    return Err(ParseError::form_error("long domain name"));
                }
            }
            0xC0..=0xFF => {
                if data.len() < pos + 2 {
                    return Err(ParseError::ShortInput);
                }
                return Ok(pos + 2);
            }
            _ => return Err(ParseError::form_error("invalid label type")),
        }
    }
}

//--- Display

impl<Octs: AsRef<[u8]>> fmt::Display for RawName<Octs> {
    /// Formats the name in presentation format.
    ///
    /// A compression pointer is shown as `@` followed by the offset it
    /// points to.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for label in Labels(self.as_slice()) {
            match label {
                Label::Normal(label) => {
                    for &ch in label {
                        if ch == b'.' || ch == b'\\' {
                            write!(f, "\\{}", ch as char)?;
                        } else if ch.is_ascii_graphic() {
                            write!(f, "{}", ch as char)?;
                        } else {
                            write!(f, "\\{:03}", ch)?;
                        }
                    }
                    f.write_str(".")?;
                }
                Label::Root => {
                    if first {
                        f.write_str(".")?;
                    }
                }
                Label::Pointer(ptr) => write!(f, "@{}", ptr)?,
            }
            first = false;
        }
        Ok(())
    }
}

//------------ Labels --------------------------------------------------------

enum Label<'a> {
    Normal(&'a [u8]),
    Root,
    Pointer(u16),
}

/// Iterates over the labels of a name already checked by `name_len`.
struct Labels<'a>(&'a [u8]);

impl<'a> Iterator for Labels<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&ltype, rest) = self.0.split_first()?;
        match ltype {
            0 => {
                self.0 = &[];
                Some(Label::Root)
            }
            1..=0x3F => {
                let len = usize::from(ltype).min(rest.len());
                let (label, rest) = rest.split_at(len);
                self.0 = rest;
                Some(Label::Normal(label))
            }
            _ => {
                let lo = rest.first().copied().unwrap_or(0);
                self.0 = &[];
                Some(Label::Pointer(u16::from_be_bytes([ltype & 0x3F, lo])))
            }
        }
    }
}

//------------ RawQuestion ---------------------------------------------------

/// A question with an undecoded name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawQuestion<Octs> {
    qname: RawName<Octs>,
    qtype: Rtype,
    qclass: RecordClass,
}

impl<Octs> RawQuestion<Octs> {
    pub fn new(qname: RawName<Octs>, qtype: Rtype, qclass: RecordClass) -> Self {
        RawQuestion {
            qname,
            qtype,
            qclass,
        }
    }

    pub fn qname(&self) -> &RawName<Octs> {
        &self.qname
    }

    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    pub fn qclass(&self) -> &RecordClass {
        &self.qclass
    }

    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        Ok(RawQuestion::new(
            RawName::parse(parser)?,
            Rtype::parse(parser)?,
            RecordClass::parse(parser)?,
        ))
    }
}

impl<Octs> Resource for RawQuestion<Octs> {}

impl<Octs: AsRef<[u8]>> fmt::Display for RawQuestion<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ", self.qname)?;
        display_class(&self.qclass, f)?;
        write!(f, " {}", self.qtype)
    }
}

/// Writes a class the way it appears in zone files.
fn display_class(class: &RecordClass, f: &mut fmt::Formatter) -> fmt::Result {
    if class.is_well_known() {
        f.write_str(class.name())
    } else {
        write!(f, "CLASS{}", class.to_int())
    }
}

//------------ RawRecord -----------------------------------------------------

/// A resource record with undecoded owner name and record data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawRecord<Octs> {
    owner: RawName<Octs>,
    rtype: Rtype,
    class: RecordClass,
    ttl: u32,
    data: Octs,
}

impl<Octs> RawRecord<Octs> {
    pub fn new(
        owner: RawName<Octs>,
        rtype: Rtype,
        class: RecordClass,
        ttl: u32,
        data: Octs,
    ) -> Self {
        RawRecord {
            owner,
            rtype,
            class,
            ttl,
            data,
        }
    }

    pub fn owner(&self) -> &RawName<Octs> {
        &self.owner
    }

    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    pub fn class(&self) -> &RecordClass {
        &self.class
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data in wire format.
    pub fn data(&self) -> &Octs {
        &self.data
    }

    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        let owner = RawName::parse(parser)?;
        let rtype = Rtype::parse(parser)?;
        let class = RecordClass::parse(parser)?;
        let ttl = u32::parse(parser)?;
        let rdlen = u16::parse(parser)?;
        let data = parser.parse_octets(usize::from(rdlen))?;
        Ok(RawRecord::new(owner, rtype, class, ttl, data))
    }
}

impl<Octs> Resource for RawRecord<Octs> {}

impl<Octs: AsRef<[u8]>> fmt::Display for RawRecord<Octs> {
    /// Formats the record using the generic record data format.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ", self.owner, self.ttl)?;
        display_class(&self.class, f)?;
        write!(f, " {} \\# {}", self.rtype, self.data.as_ref().len())?;
        if !self.data.as_ref().is_empty() {
            f.write_str(" ")?;
            for ch in self.data.as_ref() {
                write!(f, "{:02x}", ch)?;
            }
        }
        Ok(())
    }
}

//============ Tests =========================================================
