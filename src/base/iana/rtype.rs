//! Resource Record (RR) TYPEs

//------------ Rtype ---------------------------------------------------------

int_enum! {
    /// Resource Record Types.
    ///
    /// Each resource records has a 16 bit type value indicating what kind of
    /// information is represented by the record. A query includes the type
    /// of record information is requested for. This type represents both
    /// record types and query types.
    ///
    /// Only the mnemonics of the more common types are known. All other
    /// values are still accepted and displayed with a `TYPE` prefix as
    /// described in [RFC 3597].
    ///
    /// [RFC 3597]: https://tools.ietf.org/html/rfc3597
    =>
    Rtype, u16;

    /// A host address.
    (A => 1, "A")

    /// An authoritative name server.
    (NS => 2, "NS")

    /// The canonical name for an alias
    (CNAME => 5, "CNAME")

    /// Marks the start of a zone of authority.
    (SOA => 6, "SOA")

    /// A domain name pointer.
    (PTR => 12, "PTR")

    /// Mail exchange.
    (MX => 15, "MX")

    /// Text strings.
    (TXT => 16, "TXT")

    /// IPv6 address.
    (AAAA => 28, "AAAA")

    /// Server selection.
    (SRV => 33, "SRV")

    /// Delegation name.
    (DNAME => 39, "DNAME")

    /// The EDNS pseudo record.
    ///
    /// The content of the record is not interpreted here.
    (OPT => 41, "OPT")

    /// Delegation signer.
    (DS => 43, "DS")

    /// RRSet signature.
    (RRSIG => 46, "RRSIG")

    /// Next secure record.
    (NSEC => 47, "NSEC")

    /// DNS key.
    (DNSKEY => 48, "DNSKEY")

    /// Service binding for HTTPS.
    (HTTPS => 65, "HTTPS")

    /// A request for a zone transfer.
    (AXFR => 252, "AXFR")

    /// A request for all records the server has available.
    (ANY => 255, "ANY")

    /// Certification Authority Restriction.
    (CAA => 257, "CAA")
}

int_enum_str_with_prefix!(Rtype, "TYPE", u16, "unknown record type");

//============ Tests =========================================================
