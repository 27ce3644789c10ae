//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

use domain_codec::base::wire::ParseError;
use domain_codec::base::{RecordDecoder, RefCnt, ReferenceCounted, Resource};
use octseq::parse::Parser;
use tracing_subscriber::EnvFilter;

/// The tag of an entry the [`TrackingDecoder`] refuses to decode.
pub const POISON: u16 = 0xFFFF;

/// Setup logging of events reported by the crate and the test suite.
///
/// Use the RUST_LOG environment variable to override the defaults.
///
/// E.g. To see the section counts of every decoded datagram:
///   RUST_LOG=domain_codec=TRACE
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();
}

/// Assembles a message with the given header and tagged entries.
///
/// The section counts are taken from the length of the sections.
pub fn message(id: u16, flags: u16, sections: [&[u16]; 4]) -> Vec<u8> {
    let counts = sections.map(|section| section.len() as u16);
    message_with_counts(id, flags, counts, sections)
}

/// Assembles a message with explicit section counts.
pub fn message_with_counts(
    id: u16,
    flags: u16,
    counts: [u16; 4],
    sections: [&[u16]; 4],
) -> Vec<u8> {
    let mut res = Vec::new();
    res.extend_from_slice(&id.to_be_bytes());
    res.extend_from_slice(&flags.to_be_bytes());
    for count in counts {
        res.extend_from_slice(&count.to_be_bytes());
    }
    for tag in sections.iter().flat_map(|section| section.iter()) {
        res.extend_from_slice(&tag.to_be_bytes());
    }
    res
}

//------------ Ledger --------------------------------------------------------

/// Records which entries have been decoded and released.
#[derive(Default)]
pub struct Ledger {
    decoded: RefCell<Vec<u16>>,
    released: RefCell<Vec<u16>>,
}

impl Ledger {
    pub fn new() -> Rc<Self> {
        Rc::default()
    }

    pub fn decoded(&self) -> Vec<u16> {
        self.decoded.borrow().clone()
    }

    /// Returns the released tags in ascending order.
    pub fn released(&self) -> Vec<u16> {
        let mut res = self.released.borrow().clone();
        res.sort_unstable();
        res
    }

    /// Asserts that every decoded entry has been released exactly once.
    pub fn assert_all_released(&self) {
        let mut decoded = self.decoded();
        decoded.sort_unstable();
        assert_eq!(self.released(), decoded);
    }
}

//------------ Tracked -------------------------------------------------------

/// A reference counted entry that reports its deallocation to a ledger.
pub struct Tracked {
    tag: u16,
    refcnt: RefCnt,
    ledger: Rc<Ledger>,
}

impl Tracked {
    /// Creates an entry and records it as decoded in `ledger`.
    pub fn new(tag: u16, ledger: &Rc<Ledger>) -> Self {
        ledger.decoded.borrow_mut().push(tag);
        Tracked {
            tag,
            refcnt: RefCnt::new(),
            ledger: ledger.clone(),
        }
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }
}

impl ReferenceCounted for Tracked {
    fn ref_cnt(&self) -> usize {
        self.refcnt.get()
    }

    fn retain_by(&self, increment: NonZeroUsize) {
        self.refcnt.retain(increment);
    }

    fn release_by(&mut self, decrement: NonZeroUsize) -> bool {
        if self.refcnt.release(decrement) {
            self.ledger.released.borrow_mut().push(self.tag);
            true
        } else {
            false
        }
    }
}

impl Resource for Tracked {
    fn as_ref_counted(&mut self) -> Option<&mut dyn ReferenceCounted> {
        Some(self)
    }
}

impl fmt::Display for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tracked-{}", self.tag)
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("tag", &self.tag)
            .field("refcnt", &self.refcnt)
            .finish()
    }
}

//------------ TrackingDecoder -----------------------------------------------

/// A record decoder producing [`Tracked`] entries.
///
/// Every entry is a 16 bit tag. The tag [`POISON`] is rejected as a
/// malformed entry.
pub struct TrackingDecoder {
    ledger: Rc<Ledger>,
}

impl TrackingDecoder {
    pub fn new(ledger: &Rc<Ledger>) -> Self {
        TrackingDecoder {
            ledger: ledger.clone(),
        }
    }

    fn decode<Octs: AsRef<[u8]> + ?Sized>(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Tracked, ParseError> {
        let tag = parser.parse_u16_be()?;
        if tag == POISON {
            return Err(ParseError::form_error("poisoned entry"));
        }
        Ok(Tracked::new(tag, &self.ledger))
    }
}

impl<Octs: AsRef<[u8]> + ?Sized> RecordDecoder<Octs> for TrackingDecoder {
    type Question = Tracked;
    type Record = Tracked;

    fn decode_question(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Self::Question, ParseError> {
        self.decode(parser)
    }

    fn decode_record(
        &self,
        parser: &mut Parser<'_, Octs>,
    ) -> Result<Self::Record, ParseError> {
        self.decode(parser)
    }
}
