//! Decoding DNS messages received as datagrams.
//!
//! A datagram carries exactly one DNS message without any framing. The
//! decoders in this module turn the content of a received
//! [`DatagramPacket`] into a [`DnsResponse`] or a [`DnsQuery`]. They only
//! deal with the twelve octet header and the section counts. Questions and
//! records are decoded by the [`RecordDecoder`] the decoder was created
//! with.
//!
//! Decoding either produces a complete message or fails. If it fails
//! after the message has been created, the partial message is released
//! before the error is returned, which in turn releases every question and
//! record decoded so far.
//!
//! The section counts of the header are taken at face value. A message
//! claiming more entries than it contains fails with
//! [`ParseError::ShortInput`] once the data runs out.

use crate::base::header::{Header, HeaderCounts};
use crate::base::message::{DnsQuery, DnsResponse, Message};
use crate::base::record::{RawRecordDecoder, RecordDecoder};
use crate::base::refcnt::{ReferenceCounted, Resource};
use crate::base::wire::ParseError;
use crate::error::Error;
use octseq::parse::Parser;
use std::net::SocketAddr;
use tracing::{debug, trace};

//------------ DatagramPacket ------------------------------------------------

/// A received datagram.
#[derive(Clone, Debug)]
pub struct DatagramPacket<Octs> {
    content: Octs,
    sender: SocketAddr,
    recipient: Option<SocketAddr>,
}

impl<Octs> DatagramPacket<Octs> {
    /// Creates a packet received from `sender`.
    pub fn new(content: Octs, sender: SocketAddr) -> Self {
        DatagramPacket {
            content,
            sender,
            recipient: None,
        }
    }

    /// Sets the local address the packet was received on.
    pub fn with_recipient(mut self, recipient: SocketAddr) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn content(&self) -> &Octs {
        &self.content
    }

    pub fn into_content(self) -> Octs {
        self.content
    }

    pub fn sender(&self) -> SocketAddr {
        self.sender
    }

    pub fn recipient(&self) -> Option<SocketAddr> {
        self.recipient
    }
}

//------------ DatagramResponseDecoder ---------------------------------------

/// Decodes datagrams into responses.
///
/// The decoder holds no state besides its record decoder, so a single
/// value can be used for any number of datagrams.
#[derive(Clone, Debug, Default)]
pub struct DatagramResponseDecoder<D = RawRecordDecoder> {
    decoder: D,
}

impl DatagramResponseDecoder {
    /// Creates a decoder using the [`RawRecordDecoder`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D> DatagramResponseDecoder<D> {
    /// Creates a decoder using the given record decoder.
    pub fn with_record_decoder(decoder: D) -> Self {
        DatagramResponseDecoder { decoder }
    }

    pub fn record_decoder(&self) -> &D {
        &self.decoder
    }

    /// Decodes the content of a received packet.
    pub fn decode<Octs>(
        &self,
        packet: &DatagramPacket<Octs>,
    ) -> Result<DnsResponse<D::Question, D::Record>, Error>
    where
        Octs: AsRef<[u8]>,
        D: RecordDecoder<Octs>,
        D::Question: Resource,
        D::Record: Resource,
    {
        self.decode_from(packet.sender(), packet.content())
    }

    /// Decodes a message received from `sender`.
    ///
    /// The returned response has `sender` as its sender and no recipient.
    pub fn decode_from<Octs>(
        &self,
        sender: SocketAddr,
        data: &Octs,
    ) -> Result<DnsResponse<D::Question, D::Record>, Error>
    where
        Octs: AsRef<[u8]> + ?Sized,
        D: RecordDecoder<Octs>,
        D::Question: Resource,
        D::Record: Resource,
    {
        let mut parser = Parser::from_ref(data);
        let header = Header::parse(&mut parser)?;
        trace!(
            %sender,
            id = header.id(),
            flags = format_args!("{:#06x}", header.flags_word()),
            "decoding response"
        );
        if !header.qr() {
            debug!(%sender, id = header.id(), "dropping datagram: not a response");
            return Err(ParseError::form_error("not a response").into());
        }

        let mut response = DnsResponse::with_addresses(
            Some(sender),
            None,
            header.id(),
            header.opcode(),
            header.rcode(),
        );
        response
            .set_recursion_desired(header.rd())
            .set_z(header.z());
        response
            .set_authoritative_answer(header.aa())
            .set_truncated(header.tc())
            .set_recursion_available(header.ra());

        if let Err(err) =
            decode_sections(&self.decoder, &mut parser, &mut *response)
        {
            debug!(
                %sender,
                id = header.id(),
                "failed to decode response: {}",
                err
            );
            response.release();
            return Err(err.into());
        }
        Ok(response)
    }
}

//------------ DatagramQueryDecoder ------------------------------------------

/// Decodes datagrams into queries.
///
/// This is the counterpart to [`DatagramResponseDecoder`] for the
/// receiving end of a query. The decoded query carries both the sender
/// and the recipient of the packet.
#[derive(Clone, Debug, Default)]
pub struct DatagramQueryDecoder<D = RawRecordDecoder> {
    decoder: D,
}

impl DatagramQueryDecoder {
    /// Creates a decoder using the [`RawRecordDecoder`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D> DatagramQueryDecoder<D> {
    /// Creates a decoder using the given record decoder.
    pub fn with_record_decoder(decoder: D) -> Self {
        DatagramQueryDecoder { decoder }
    }

    pub fn record_decoder(&self) -> &D {
        &self.decoder
    }

    /// Decodes the content of a received packet.
    pub fn decode<Octs>(
        &self,
        packet: &DatagramPacket<Octs>,
    ) -> Result<DnsQuery<D::Question, D::Record>, Error>
    where
        Octs: AsRef<[u8]>,
        D: RecordDecoder<Octs>,
        D::Question: Resource,
        D::Record: Resource,
    {
        let sender = packet.sender();
        let mut parser = Parser::from_ref(packet.content());
        let header = Header::parse(&mut parser)?;
        trace!(
            %sender,
            id = header.id(),
            flags = format_args!("{:#06x}", header.flags_word()),
            "decoding query"
        );
        if header.qr() {
            debug!(%sender, id = header.id(), "dropping datagram: not a query");
            return Err(ParseError::form_error("not a query").into());
        }

        let mut query = DnsQuery::with_addresses(
            Some(sender),
            packet.recipient(),
            header.id(),
            header.opcode(),
        );
        query.set_recursion_desired(header.rd()).set_z(header.z());

        if let Err(err) =
            decode_sections(&self.decoder, &mut parser, &mut *query)
        {
            debug!(
                %sender,
                id = header.id(),
                "failed to decode query: {}",
                err
            );
            query.release();
            return Err(err.into());
        }
        Ok(query)
    }
}

//------------ Helpers -------------------------------------------------------

/// Reads the section counts and decodes all four sections into `msg`.
///
/// A section with exactly one entry is set directly, larger ones are
/// collected in the section's list.
fn decode_sections<Octs, D>(
    decoder: &D,
    parser: &mut Parser<'_, Octs>,
    msg: &mut Message<D::Question, D::Record>,
) -> Result<(), ParseError>
where
    Octs: AsRef<[u8]> + ?Sized,
    D: RecordDecoder<Octs>,
    D::Question: Resource,
    D::Record: Resource,
{
    let counts = HeaderCounts::parse(parser)?;
    trace!(
        qdcount = counts.qdcount(),
        ancount = counts.ancount(),
        nscount = counts.nscount(),
        arcount = counts.arcount(),
        "section counts"
    );

    match counts.qdcount() {
        0 => {}
        1 => {
            msg.set_question(decoder.decode_question(parser)?);
        }
        count => {
            let questions = msg.questions();
            for _ in 0..count {
                questions.push(decoder.decode_question(parser)?);
            }
        }
    }
    for _ in 0..counts.ancount() {
        let record = decoder.decode_record(parser)?;
        msg.answers().push(record);
    }
    for _ in 0..counts.nscount() {
        let record = decoder.decode_record(parser)?;
        msg.authority_records().push(record);
    }
    match counts.arcount() {
        0 => {}
        1 => {
            msg.set_additional_record(decoder.decode_record(parser)?);
        }
        count => {
            let additional = msg.additional_records();
            for _ in 0..count {
                additional.push(decoder.decode_record(parser)?);
            }
        }
    }
    Ok(())
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::{class, Opcode, Rcode, Rtype};
    use bytes::Bytes;

    fn sender() -> SocketAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    /// A response for `example.com. IN A` with a single answer.
    const RESPONSE: &[u8] = b"\x12\x34\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
        \x07example\x03com\x00\x00\x01\x00\x01\
        \xc0\x0c\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\xc0\x00\x02\x01";

    #[test]
    fn decode_raw_response() {
        let packet = DatagramPacket::new(Bytes::from_static(RESPONSE), sender());
        let mut response = DatagramResponseDecoder::new().decode(&packet).unwrap();
        assert_eq!(response.id(), 0x1234);
        assert_eq!(response.opcode(), Opcode::QUERY);
        assert_eq!(response.rcode(), Rcode::NOERROR);
        assert!(response.recursion_desired());
        assert!(response.recursion_available());
        assert!(!response.authoritative_answer());
        assert!(!response.truncated());
        assert_eq!(response.sender(), Some(sender()));
        assert_eq!(response.recipient(), None);

        let question = response.question().unwrap();
        assert_eq!(question.qtype(), Rtype::A);
        assert_eq!(question.qclass(), &class::IN);
        assert_eq!(response.answer_count(), 1);
        assert_eq!(response.answer_slice()[0].ttl(), 3600);
        assert_eq!(
            response.to_string(),
            "DnsResponse(from: 192.0.2.53:53, 4660, QUERY(0), NOERROR(0), RD RA)\
             \n\texample.com. IN A\
             \n\t@12 3600 IN A \\# 4 c0000201"
        );
        assert!(response.release());
    }

    #[test]
    fn reject_query() {
        let packet = DatagramPacket::new(
            Bytes::from_static(b"\x00\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00"),
            sender(),
        );
        let err = DatagramResponseDecoder::new().decode(&packet).unwrap_err();
        assert_eq!(
            err,
            Error::Malformed(ParseError::form_error("not a response"))
        );
    }

    #[test]
    fn short_header() {
        let err = DatagramResponseDecoder::new()
            .decode_from(sender(), &Bytes::from_static(b"\x12\x34\x81"))
            .unwrap_err();
        assert_eq!(err, Error::Malformed(ParseError::ShortInput));

        let err = DatagramResponseDecoder::new()
            .decode_from(sender(), &Bytes::from_static(b"\x12\x34\x81\x80\x00"))
            .unwrap_err();
        assert_eq!(err, Error::Malformed(ParseError::ShortInput));
    }

    #[test]
    fn decode_raw_query() {
        let recipient: SocketAddr = "198.51.100.1:53".parse().unwrap();
        let packet = DatagramPacket::new(
            Bytes::from_static(
                b"\xab\xcd\x01\x20\x00\x01\x00\x00\x00\x00\x00\x00\
                  \x07example\x03com\x00\x00\x1c\x00\x01",
            ),
            sender(),
        )
        .with_recipient(recipient);
        let mut query = DatagramQueryDecoder::new().decode(&packet).unwrap();
        assert_eq!(query.id(), 0xabcd);
        assert!(query.recursion_desired());
        assert_eq!(query.z(), 2);
        assert_eq!(query.recipient(), Some(recipient));
        assert_eq!(query.question().unwrap().qtype(), Rtype::AAAA);
        assert!(query.release());

        let response = DatagramPacket::new(Bytes::from_static(RESPONSE), sender());
        assert_eq!(
            DatagramQueryDecoder::new().decode(&response).unwrap_err(),
            Error::Malformed(ParseError::form_error("not a query"))
        );
    }
}
