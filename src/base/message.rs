//! Mutable DNS messages.
//!
//! This module defines the two kinds of messages, [`DnsQuery`] and
//! [`DnsResponse`]. Both wrap a [`Message`] that holds everything they
//! have in common: the header fields present in queries and the four
//! sections. The variants dereference to their `Message`, so all its
//! methods are available on them directly.
//!
//! A message is generic over the type of its questions, `Q`, and over the
//! type of the records in the other three sections, `R`. What these types
//! look like is up to the [record decoder] that produced them. Entries may
//! be reference counted themselves. A message owns its entries for the
//! purpose of deallocation: when its own reference count drops to zero, it
//! releases every attached entry exactly once. This is also true for
//! entries replaced through [`Message::set_question`] and
//! [`Message::set_additional_record`] or removed via
//! [`Message::clear_section`].
//!
//! [record decoder]: super::record::RecordDecoder

use super::iana::{Opcode, Rcode};
use super::leak::ResourceLeak;
use super::refcnt::{
    check_attach, release_all, RefCnt, ReferenceCounted, Resource,
};
use super::section::{OneOrMany, Section};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::num::NonZeroUsize;
use core::ops::{Deref, DerefMut};
use std::net::SocketAddr;
use tracing::trace;

//------------ Message -------------------------------------------------------

/// The part common to all DNS messages.
///
/// Questions and additional records are kept without an allocated list as
/// long as there is at most one of them and no list has been asked for.
/// The answer and authority lists are created on first access.
pub struct Message<Q, R> {
    id: u16,
    opcode: Opcode,
    recursion_desired: bool,
    z: u8,

    questions: OneOrMany<Q>,
    answers: Option<Vec<R>>,
    authority: Option<Vec<R>>,
    additional: OneOrMany<R>,

    refcnt: RefCnt,
    leak: ResourceLeak,
}

/// # Creation and Header Fields
///
impl<Q, R> Message<Q, R> {
    /// Creates a new, empty message.
    ///
    /// The `kind` is used when reporting the message as leaked.
    fn new(kind: &'static str, id: u16, opcode: Opcode) -> Self {
        Message {
            id,
            opcode,
            recursion_desired: false,
            z: 0,
            questions: OneOrMany::Empty,
            answers: None,
            authority: None,
            additional: OneOrMany::Empty,
            refcnt: RefCnt::new(),
            leak: ResourceLeak::new(kind),
        }
    }

    /// Returns the message ID.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Sets the message ID.
    ///
    /// Only the lower 16 bits of `id` are used.
    pub fn set_id(&mut self, id: u32) -> &mut Self {
        self.id = id as u16;
        self
    }

    /// Sets a random message ID.
    #[cfg(feature = "rand")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
    pub fn set_random_id(&mut self) -> &mut Self {
        self.id = ::rand::random();
        self
    }

    /// Returns the opcode.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn set_opcode(&mut self, opcode: Opcode) -> &mut Self {
        self.opcode = opcode;
        self
    }

    /// Returns whether the RD bit is set.
    pub fn recursion_desired(&self) -> bool {
        self.recursion_desired
    }

    pub fn set_recursion_desired(&mut self, set: bool) -> &mut Self {
        self.recursion_desired = set;
        self
    }

    /// Returns the value of the three bit Z field.
    pub fn z(&self) -> u8 {
        self.z
    }

    /// Sets the Z field.
    ///
    /// Only the lower three bits of `z` are used.
    pub fn set_z(&mut self, z: u8) -> &mut Self {
        self.z = z & 0x07;
        self
    }
}

/// # Section Access
///
impl<Q, R> Message<Q, R> {
    /// Returns the number of entries in the given section.
    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Question => self.question_count(),
            Section::Answer => self.answer_count(),
            Section::Authority => self.authority_record_count(),
            Section::Additional => self.additional_record_count(),
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn answer_count(&self) -> usize {
        self.answers.as_ref().map_or(0, Vec::len)
    }

    pub fn authority_record_count(&self) -> usize {
        self.authority.as_ref().map_or(0, Vec::len)
    }

    pub fn additional_record_count(&self) -> usize {
        self.additional.len()
    }

    /// Returns the first question if there is one.
    pub fn question(&self) -> Option<&Q> {
        self.questions.first()
    }

    /// Returns the list of questions.
    ///
    /// If the message holds its questions without a list, it switches to
    /// a list now and keeps using it from here on. Changes made to the
    /// list are changes to the message.
    pub fn questions(&mut self) -> &mut Vec<Q> {
        self.questions.to_mut_vec()
    }

    /// Returns the questions without converting them into a list.
    pub fn question_slice(&self) -> &[Q] {
        self.questions.as_slice()
    }

    /// Returns the list of answer records, creating it if necessary.
    pub fn answers(&mut self) -> &mut Vec<R> {
        self.answers.get_or_insert_with(Vec::new)
    }

    pub fn answer_slice(&self) -> &[R] {
        self.answers.as_deref().unwrap_or_default()
    }

    /// Returns the list of authority records, creating it if necessary.
    pub fn authority_records(&mut self) -> &mut Vec<R> {
        self.authority.get_or_insert_with(Vec::new)
    }

    pub fn authority_slice(&self) -> &[R] {
        self.authority.as_deref().unwrap_or_default()
    }

    /// Returns the first additional record if there is one.
    pub fn additional_record(&self) -> Option<&R> {
        self.additional.first()
    }

    /// Returns the list of additional records.
    ///
    /// Like [`questions`][Self::questions], this switches the section to a
    /// list permanently.
    pub fn additional_records(&mut self) -> &mut Vec<R> {
        self.additional.to_mut_vec()
    }

    pub fn additional_slice(&self) -> &[R] {
        self.additional.as_slice()
    }
}

/// # Modifying Sections
///
/// Attaching an entry that has already been released, or attaching
/// anything to a released message, is a programming error treated like
/// other [reference count misuse][super::refcnt]. The entry is not
/// attached.
impl<Q: Resource, R: Resource> Message<Q, R> {
    /// Appends a question.
    pub fn add_question(&mut self, mut question: Q) -> &mut Self {
        if check_attach(&self.refcnt, &mut question) {
            self.questions.push(question);
        }
        self
    }

    pub fn add_answer(&mut self, mut record: R) -> &mut Self {
        if check_attach(&self.refcnt, &mut record) {
            self.answers().push(record);
        }
        self
    }

    pub fn add_authority_record(&mut self, mut record: R) -> &mut Self {
        if check_attach(&self.refcnt, &mut record) {
            self.authority_records().push(record);
        }
        self
    }

    pub fn add_additional_record(&mut self, mut record: R) -> &mut Self {
        if check_attach(&self.refcnt, &mut record) {
            self.additional.push(record);
        }
        self
    }

    /// Makes `question` the only question of the message.
    ///
    /// All questions attached before are released.
    pub fn set_question(&mut self, mut question: Q) -> &mut Self {
        if check_attach(&self.refcnt, &mut question) {
            let mut old = self.questions.replace(question);
            release_all(old.as_mut_slice());
        }
        self
    }

    /// Makes `record` the only additional record of the message.
    ///
    /// All additional records attached before are released.
    pub fn set_additional_record(&mut self, mut record: R) -> &mut Self {
        if check_attach(&self.refcnt, &mut record) {
            let mut old = self.additional.replace(record);
            release_all(old.as_mut_slice());
        }
        self
    }

    /// Releases and removes all entries of the given section.
    pub fn clear_section(&mut self, section: Section) -> &mut Self {
        match section {
            Section::Question => {
                release_all(self.questions.take().as_mut_slice())
            }
            Section::Answer => {
                if let Some(mut answers) = self.answers.take() {
                    release_all(&mut answers)
                }
            }
            Section::Authority => {
                if let Some(mut authority) = self.authority.take() {
                    release_all(&mut authority)
                }
            }
            Section::Additional => {
                release_all(self.additional.take().as_mut_slice())
            }
        }
        self
    }

    /// Releases and removes the entries of all sections.
    pub fn clear(&mut self) -> &mut Self {
        for section in Section::ALL {
            self.clear_section(section);
        }
        self
    }

    fn deallocate(&mut self) {
        trace!(
            id = self.id,
            questions = self.question_count(),
            answers = self.answer_count(),
            authority = self.authority_record_count(),
            additional = self.additional_record_count(),
            "deallocating message"
        );
        self.clear();
        self.leak.close();
    }
}

/// # Leak Detection
///
impl<Q, R> Message<Q, R> {
    /// Records an access to the message for leak reports.
    pub fn touch(&self) -> &Self {
        self.leak.touch("touched");
        self
    }

    /// Records an access with a hint for leak reports.
    pub fn touch_with(&self, hint: impl fmt::Display) -> &Self {
        self.leak.touch(hint);
        self
    }
}

//--- ReferenceCounted

impl<Q: Resource, R: Resource> ReferenceCounted for Message<Q, R> {
    fn ref_cnt(&self) -> usize {
        self.refcnt.get()
    }

    fn retain_by(&self, increment: NonZeroUsize) {
        self.refcnt.retain(increment);
    }

    fn release_by(&mut self, decrement: NonZeroUsize) -> bool {
        if self.refcnt.release(decrement) {
            self.deallocate();
            true
        } else {
            false
        }
    }
}

//--- Debug

impl<Q: fmt::Debug, R: fmt::Debug> fmt::Debug for Message<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("opcode", &self.opcode)
            .field("recursion_desired", &self.recursion_desired)
            .field("z", &self.z)
            .field("questions", &self.question_slice())
            .field("answers", &self.answer_slice())
            .field("authority", &self.authority_slice())
            .field("additional", &self.additional_slice())
            .field("refcnt", &self.refcnt)
            .finish()
    }
}

//------------ DnsQuery ------------------------------------------------------

/// A DNS query.
///
/// A query may carry the addresses of its sender and recipient if it has
/// been received from or is destined for the network.
pub struct DnsQuery<Q, R> {
    message: Message<Q, R>,
    sender: Option<SocketAddr>,
    recipient: Option<SocketAddr>,
}

impl<Q, R> DnsQuery<Q, R> {
    /// Creates a new query without addresses.
    pub fn new(id: u16, opcode: Opcode) -> Self {
        Self::with_addresses(None, None, id, opcode)
    }

    /// Creates a new query with the given addresses.
    pub fn with_addresses(
        sender: Option<SocketAddr>,
        recipient: Option<SocketAddr>,
        id: u16,
        opcode: Opcode,
    ) -> Self {
        DnsQuery {
            message: Message::new("DnsQuery", id, opcode),
            sender,
            recipient,
        }
    }

    pub fn sender(&self) -> Option<SocketAddr> {
        self.sender
    }

    pub fn set_sender(&mut self, addr: Option<SocketAddr>) -> &mut Self {
        self.sender = addr;
        self
    }

    pub fn recipient(&self) -> Option<SocketAddr> {
        self.recipient
    }

    pub fn set_recipient(&mut self, addr: Option<SocketAddr>) -> &mut Self {
        self.recipient = addr;
        self
    }

    /// Returns the value used for hashing the query.
    pub fn hash_code(&self) -> u32 {
        u32::from(self.id()) * 31
    }
}

impl<Q, R> Deref for DnsQuery<Q, R> {
    type Target = Message<Q, R>;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl<Q, R> DerefMut for DnsQuery<Q, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}

impl<Q: Resource, R: Resource> ReferenceCounted for DnsQuery<Q, R> {
    fn ref_cnt(&self) -> usize {
        self.message.ref_cnt()
    }

    fn retain_by(&self, increment: NonZeroUsize) {
        self.message.retain_by(increment)
    }

    fn release_by(&mut self, decrement: NonZeroUsize) -> bool {
        self.message.release_by(decrement)
    }
}

//--- PartialEq, Eq, and Hash

impl<Q, R> PartialEq for DnsQuery<Q, R> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<Q, R> Eq for DnsQuery<Q, R> {}

impl<Q, R> PartialEq<DnsResponse<Q, R>> for DnsQuery<Q, R> {
    fn eq(&self, _other: &DnsResponse<Q, R>) -> bool {
        false
    }
}

impl<Q, R> Hash for DnsQuery<Q, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code())
    }
}

//--- Debug

impl<Q: fmt::Debug, R: fmt::Debug> fmt::Debug for DnsQuery<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DnsQuery")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("message", &self.message)
            .finish()
    }
}

//------------ DnsResponse ---------------------------------------------------

/// A DNS response.
///
/// In addition to what a query has, a response carries a response code
/// and the AA, TC, and RA flags.
pub struct DnsResponse<Q, R> {
    message: Message<Q, R>,
    sender: Option<SocketAddr>,
    recipient: Option<SocketAddr>,
    rcode: Rcode,
    authoritative_answer: bool,
    truncated: bool,
    recursion_available: bool,
}

impl<Q, R> DnsResponse<Q, R> {
    /// Creates a new response without addresses.
    pub fn new(id: u16, opcode: Opcode, rcode: Rcode) -> Self {
        Self::with_addresses(None, None, id, opcode, rcode)
    }

    /// Creates a new response with the given addresses.
    pub fn with_addresses(
        sender: Option<SocketAddr>,
        recipient: Option<SocketAddr>,
        id: u16,
        opcode: Opcode,
        rcode: Rcode,
    ) -> Self {
        DnsResponse {
            message: Message::new("DnsResponse", id, opcode),
            sender,
            recipient,
            rcode,
            authoritative_answer: false,
            truncated: false,
            recursion_available: false,
        }
    }

    pub fn sender(&self) -> Option<SocketAddr> {
        self.sender
    }

    pub fn set_sender(&mut self, addr: Option<SocketAddr>) -> &mut Self {
        self.sender = addr;
        self
    }

    pub fn recipient(&self) -> Option<SocketAddr> {
        self.recipient
    }

    pub fn set_recipient(&mut self, addr: Option<SocketAddr>) -> &mut Self {
        self.recipient = addr;
        self
    }

    /// Returns the response code.
    pub fn rcode(&self) -> Rcode {
        self.rcode
    }

    pub fn set_rcode(&mut self, rcode: Rcode) -> &mut Self {
        self.rcode = rcode;
        self
    }

    /// Returns whether the AA bit is set.
    pub fn authoritative_answer(&self) -> bool {
        self.authoritative_answer
    }

    pub fn set_authoritative_answer(&mut self, set: bool) -> &mut Self {
        self.authoritative_answer = set;
        self
    }

    /// Returns whether the TC bit is set.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn set_truncated(&mut self, set: bool) -> &mut Self {
        self.truncated = set;
        self
    }

    /// Returns whether the RA bit is set.
    pub fn recursion_available(&self) -> bool {
        self.recursion_available
    }

    pub fn set_recursion_available(&mut self, set: bool) -> &mut Self {
        self.recursion_available = set;
        self
    }

    /// Returns the value used for hashing the response.
    pub fn hash_code(&self) -> u32 {
        u32::from(self.id()) * 31 + 1
    }
}

impl<Q, R> Deref for DnsResponse<Q, R> {
    type Target = Message<Q, R>;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl<Q, R> DerefMut for DnsResponse<Q, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}

impl<Q: Resource, R: Resource> ReferenceCounted for DnsResponse<Q, R> {
    fn ref_cnt(&self) -> usize {
        self.message.ref_cnt()
    }

    fn retain_by(&self, increment: NonZeroUsize) {
        self.message.retain_by(increment)
    }

    fn release_by(&mut self, decrement: NonZeroUsize) -> bool {
        self.message.release_by(decrement)
    }
}

//--- PartialEq, Eq, and Hash

impl<Q, R> PartialEq for DnsResponse<Q, R> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<Q, R> Eq for DnsResponse<Q, R> {}

impl<Q, R> PartialEq<DnsQuery<Q, R>> for DnsResponse<Q, R> {
    fn eq(&self, _other: &DnsQuery<Q, R>) -> bool {
        false
    }
}

impl<Q, R> Hash for DnsResponse<Q, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code())
    }
}

//--- Debug

impl<Q: fmt::Debug, R: fmt::Debug> fmt::Debug for DnsResponse<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DnsResponse")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("rcode", &self.rcode)
            .field("authoritative_answer", &self.authoritative_answer)
            .field("truncated", &self.truncated)
            .field("recursion_available", &self.recursion_available)
            .field("message", &self.message)
            .finish()
    }
}

//============ Tests =========================================================
