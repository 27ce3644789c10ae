mod common;

use std::net::SocketAddr;

use rstest::rstest;

use domain_codec::base::iana::{class, Opcode, Rcode, RecordClass};
use domain_codec::base::wire::ParseError;
use domain_codec::base::{DnsQuery, DnsResponse, ReferenceCounted, Section};
use domain_codec::dgram::{
    DatagramPacket, DatagramQueryDecoder, DatagramResponseDecoder,
};
use domain_codec::error::Error;

use common::{
    init_logging, message, message_with_counts, Ledger, Tracked,
    TrackingDecoder, POISON,
};

fn sender() -> SocketAddr {
    "192.0.2.1:53".parse().unwrap()
}

fn tags(entries: &[Tracked]) -> Vec<u16> {
    entries.iter().map(Tracked::tag).collect()
}

//------------ Section Cardinality -------------------------------------------

#[rstest]
#[case::empty(&[], &[], &[], &[])]
#[case::single_question(&[1], &[], &[], &[])]
#[case::typical(&[1], &[2, 3], &[], &[4])]
#[case::all_many(&[1, 2, 3], &[4, 5], &[6, 7], &[8, 9, 10])]
#[case::records_only(&[], &[1], &[2], &[3])]
fn section_cardinality(
    #[case] qd: &[u16],
    #[case] an: &[u16],
    #[case] ns: &[u16],
    #[case] ar: &[u16],
) {
    init_logging();
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(0x1234, 0x8180, [qd, an, ns, ar]), sender());

    let mut response = decoder.decode(&packet).unwrap();
    assert_eq!(response.question_count(), qd.len());
    assert_eq!(response.answer_count(), an.len());
    assert_eq!(response.authority_record_count(), ns.len());
    assert_eq!(response.additional_record_count(), ar.len());
    assert_eq!(tags(response.question_slice()), qd);
    assert_eq!(tags(response.answer_slice()), an);
    assert_eq!(tags(response.authority_slice()), ns);
    assert_eq!(tags(response.additional_slice()), ar);
    assert_eq!(
        response.question().map(Tracked::tag),
        qd.first().copied()
    );
    assert_eq!(
        response.additional_record().map(Tracked::tag),
        ar.first().copied()
    );

    assert!(ledger.released().is_empty());
    assert!(response.release());
    ledger.assert_all_released();
    for section in Section::ALL {
        assert_eq!(response.count(section), 0);
    }
}

#[test]
fn single_question_and_list_agree() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet = DatagramPacket::new(
        message(1, 0x8000, [&[7], &[], &[], &[9]]),
        sender(),
    );
    let mut response = decoder.decode(&packet).unwrap();

    assert_eq!(response.question().unwrap().tag(), 7);
    assert_eq!(tags(response.questions()), [7]);
    assert_eq!(response.question_count(), 1);
    assert_eq!(response.question().unwrap().tag(), 7);

    assert_eq!(response.additional_record().unwrap().tag(), 9);
    assert_eq!(tags(response.additional_records()), [9]);
    assert_eq!(response.additional_record_count(), 1);

    response.release();
    ledger.assert_all_released();
}

//------------ Header Flags --------------------------------------------------

#[test]
fn standard_response_flags() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(0xBEEF, 0x8180, [&[], &[], &[], &[]]), sender());
    let mut response = decoder.decode(&packet).unwrap();

    assert_eq!(response.id(), 0xBEEF);
    assert_eq!(response.opcode(), Opcode::QUERY);
    assert_eq!(response.rcode(), Rcode::NOERROR);
    assert!(response.recursion_desired());
    assert!(response.recursion_available());
    assert!(!response.authoritative_answer());
    assert!(!response.truncated());
    assert_eq!(response.z(), 0);
    assert_eq!(response.sender(), Some(sender()));
    assert_eq!(response.recipient(), None);
    response.release();
}

#[rstest]
#[case(0x8400, Opcode::QUERY, Rcode::NOERROR, [true, false, false, false], 0)]
#[case(0x8200, Opcode::QUERY, Rcode::NOERROR, [false, true, false, false], 0)]
#[case(0x8100, Opcode::QUERY, Rcode::NOERROR, [false, false, true, false], 0)]
#[case(0x8080, Opcode::QUERY, Rcode::NOERROR, [false, false, false, true], 0)]
#[case(0x8070, Opcode::QUERY, Rcode::NOERROR, [false, false, false, false], 7)]
#[case(0xA003, Opcode::NOTIFY, Rcode::NXDOMAIN, [false, false, false, false], 0)]
#[case(0xAE53, Opcode::UPDATE, Rcode::NXDOMAIN, [true, true, false, false], 5)]
#[case(0x87B5, Opcode::QUERY, Rcode::REFUSED, [true, true, true, true], 3)]
fn header_flags(
    #[case] flags: u16,
    #[case] opcode: Opcode,
    #[case] rcode: Rcode,
    #[case] bits: [bool; 4],
    #[case] z: u8,
) {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(1, flags, [&[], &[], &[], &[]]), sender());
    let mut response = decoder.decode(&packet).unwrap();

    assert_eq!(response.opcode(), opcode);
    assert_eq!(response.rcode(), rcode);
    assert_eq!(
        [
            response.authoritative_answer(),
            response.truncated(),
            response.recursion_desired(),
            response.recursion_available(),
        ],
        bits
    );
    assert_eq!(response.z(), z);
    response.release();
}

#[test]
fn query_is_not_a_response() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(1, 0x0100, [&[1], &[2], &[], &[]]), sender());

    let err = decoder.decode(&packet).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(
        err,
        Error::Malformed(ParseError::form_error("not a response"))
    );
    assert!(ledger.decoded().is_empty());
    assert!(ledger.released().is_empty());
}

//------------ Failure Cleanup -----------------------------------------------

#[rstest]
#[case::in_questions([&[1, 2, POISON][..], &[4], &[], &[]])]
#[case::in_answers([&[1][..], &[2, 3, POISON], &[], &[5]])]
#[case::in_authority([&[1, 2][..], &[3], &[4, POISON], &[6]])]
#[case::single_additional([&[1][..], &[2], &[3], &[POISON]])]
#[case::in_additional([&[1][..], &[2], &[3], &[4, 5, POISON]])]
#[case::first_entry([&[POISON][..], &[], &[], &[]])]
fn cleanup_on_failure(#[case] sections: [&[u16]; 4]) {
    init_logging();
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet = DatagramPacket::new(message(1, 0x8180, sections), sender());

    let err = decoder.decode(&packet).unwrap_err();
    assert_eq!(
        err,
        Error::Malformed(ParseError::form_error("poisoned entry"))
    );
    ledger.assert_all_released();
}

#[rstest]
#[case::question_missing([2, 0, 0, 0], [&[1][..], &[], &[], &[]])]
#[case::answer_missing([1, 3, 0, 0], [&[1][..], &[2, 3], &[], &[]])]
#[case::additional_missing([1, 1, 1, 2], [&[1][..], &[2], &[3], &[4]])]
fn counts_exceed_data(#[case] counts: [u16; 4], #[case] sections: [&[u16]; 4]) {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet = DatagramPacket::new(
        message_with_counts(1, 0x8180, counts, sections),
        sender(),
    );

    let err = decoder.decode(&packet).unwrap_err();
    assert_eq!(err, Error::Malformed(ParseError::ShortInput));
    assert_eq!(ledger.decoded().len(), sections.iter().map(|s| s.len()).sum::<usize>());
    ledger.assert_all_released();
}

#[test]
fn truncated_counts() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let mut data = message(1, 0x8180, [&[], &[], &[], &[]]);
    data.truncate(7);

    let err = decoder.decode_from(sender(), &data).unwrap_err();
    assert_eq!(err, Error::Malformed(ParseError::ShortInput));
    assert!(ledger.decoded().is_empty());
}

//------------ Query Decoding ------------------------------------------------

#[test]
fn decode_query() {
    let ledger = Ledger::new();
    let decoder =
        DatagramQueryDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let recipient: SocketAddr = "[2001:db8::53]:53".parse().unwrap();
    let packet = DatagramPacket::new(
        message(42, 0x0110, [&[1, 2], &[], &[], &[3]]),
        sender(),
    )
    .with_recipient(recipient);

    let mut query = decoder.decode(&packet).unwrap();
    assert_eq!(query.id(), 42);
    assert_eq!(query.opcode(), Opcode::QUERY);
    assert!(query.recursion_desired());
    assert_eq!(query.z(), 1);
    assert_eq!(query.sender(), Some(sender()));
    assert_eq!(query.recipient(), Some(recipient));
    assert_eq!(tags(query.question_slice()), [1, 2]);
    assert_eq!(query.additional_record().map(Tracked::tag), Some(3));
    assert_eq!(
        query.to_string(),
        "DnsQuery(from: 192.0.2.1:53, to: [2001:db8::53]:53, 42, QUERY(0), RD, Z: 1)\
         \n\ttracked-1\n\ttracked-2\n\ttracked-3"
    );
    assert!(query.release());
    ledger.assert_all_released();
}

#[test]
fn response_is_not_a_query() {
    let ledger = Ledger::new();
    let decoder =
        DatagramQueryDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(1, 0x8180, [&[1], &[], &[], &[]]), sender());
    assert_eq!(
        decoder.decode(&packet).unwrap_err(),
        Error::Malformed(ParseError::form_error("not a query"))
    );
    assert!(ledger.decoded().is_empty());
}

#[test]
fn query_cleanup_on_failure() {
    let ledger = Ledger::new();
    let decoder =
        DatagramQueryDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet = DatagramPacket::new(
        message(1, 0x0100, [&[1, 2], &[3], &[POISON], &[]]),
        sender(),
    );
    assert!(decoder.decode(&packet).is_err());
    assert_eq!(ledger.released(), [1, 2, 3]);
}

//------------ Message Model -------------------------------------------------

#[test]
fn equality_across_variants() {
    let mut query = DnsQuery::<Tracked, Tracked>::new(5, Opcode::QUERY);
    let mut other = DnsQuery::<Tracked, Tracked>::new(5, Opcode::STATUS);
    let mut response =
        DnsResponse::<Tracked, Tracked>::new(5, Opcode::QUERY, Rcode::NOERROR);

    assert!(query == other);
    assert!(query != response);
    assert!(response != query);
    assert_eq!(query.hash_code(), 5 * 31);
    assert_eq!(response.hash_code(), 5 * 31 + 1);

    other.set_id(6);
    assert!(query != other);

    query.release();
    other.release();
    response.release();
}

#[test]
fn materialisation_is_idempotent() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(1, 0x8180, [&[1], &[], &[], &[2]]), sender());
    let mut response = decoder.decode(&packet).unwrap();

    let first = response.answers() as *const Vec<Tracked>;
    let second = response.answers() as *const Vec<Tracked>;
    assert_eq!(first, second);
    let first = response.questions() as *const Vec<Tracked>;
    let second = response.questions() as *const Vec<Tracked>;
    assert_eq!(first, second);
    assert_eq!(response.question_count(), 1);
    let first = response.additional_records() as *const Vec<Tracked>;
    let second = response.additional_records() as *const Vec<Tracked>;
    assert_eq!(first, second);
    assert_eq!(response.additional_records().len(), 1);
    assert_eq!(response.additional_record().map(Tracked::tag), Some(2));

    response.release();
    ledger.assert_all_released();
}

#[test]
fn retained_response_keeps_entries() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(1, 0x8180, [&[1], &[2], &[], &[]]), sender());
    let mut response = decoder.decode(&packet).unwrap();

    response.retain();
    assert_eq!(response.ref_cnt(), 2);
    assert!(!response.release());
    assert!(ledger.released().is_empty());
    assert_eq!(response.answer_count(), 1);
    assert!(response.release());
    assert_eq!(ledger.released(), [1, 2]);
}

#[test]
#[cfg_attr(
    debug_assertions,
    should_panic(expected = "attach of deallocated entry")
)]
fn attaching_released_record() {
    let ledger = Ledger::new();
    let decoder =
        DatagramResponseDecoder::with_record_decoder(TrackingDecoder::new(&ledger));
    let packet =
        DatagramPacket::new(message(1, 0x8180, [&[1], &[2], &[], &[]]), sender());
    let mut response = decoder.decode(&packet).unwrap();

    let mut record = Tracked::new(3, &ledger);
    assert!(record.release());
    response.add_answer(record);
    assert_eq!(response.answer_count(), 1);
    assert!(response.release());
    ledger.assert_all_released();
}

//------------ RecordClass ---------------------------------------------------

#[test]
fn record_class_canonicalisation() {
    assert!(std::ptr::eq(&*RecordClass::from_int(1), &class::IN));
    assert!(std::ptr::eq(RecordClass::from_name("IN").unwrap(), &class::IN));
    assert!(std::ptr::eq(
        RecordClass::from_name("HESIOD").unwrap(),
        &class::HESIOD
    ));

    let unknown = RecordClass::from_int(0xABCD);
    assert_eq!(unknown.name(), "UNKNOWN");
    assert_eq!(unknown.to_string(), "UNKNOWN(43981)");

    let err = RecordClass::new(0x10000, "TOO-BIG").unwrap_err();
    assert_eq!(err.name(), "value");
    assert_eq!(
        Error::from(err).to_string(),
        "value: 65536 (expected: 0 ~ 65535)"
    );
}
