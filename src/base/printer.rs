//! Text representation of messages.
//!
//! Messages are displayed as a header line followed by one line per
//! entry, each indented by a tab. With the default record decoder a
//! compressed owner name shows up as the offset it points to:
//!
//! ```text
//! DnsResponse(from: 192.0.2.53:53, 4660, QUERY(0), NOERROR(0), RD RA)
//! 	example.com. IN A
//! 	@12 3600 IN A \# 4 c0000201
//! ```

use super::message::{DnsQuery, DnsResponse, Message};
use core::fmt;
use std::net::SocketAddr;

impl<Q: fmt::Display, R: fmt::Display> fmt::Display for DnsQuery<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("DnsQuery(")?;
        write_addresses(f, self.sender(), self.recipient())?;
        write!(f, "{}, {}", self.id(), self.opcode())?;
        if self.recursion_desired() {
            f.write_str(", RD")?;
        }
        if self.z() != 0 {
            write!(f, ", Z: {}", self.z())?;
        }
        f.write_str(")")?;
        write_entries(f, &**self)
    }
}

impl<Q: fmt::Display, R: fmt::Display> fmt::Display for DnsResponse<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("DnsResponse(")?;
        write_addresses(f, self.sender(), self.recipient())?;
        write!(f, "{}, {}, {}", self.id(), self.opcode(), self.rcode())?;

        // Flags are separated from the rcode by a comma and from each
        // other by a space. With no flags at all, there is no comma.
        let mut sep = ", ";
        for (set, token) in [
            (self.recursion_desired(), "RD"),
            (self.authoritative_answer(), "AA"),
            (self.truncated(), "TC"),
            (self.recursion_available(), "RA"),
        ] {
            if set {
                write!(f, "{}{}", sep, token)?;
                sep = " ";
            }
        }
        if self.z() != 0 {
            write!(f, ", Z: {}", self.z())?;
        }
        f.write_str(")")?;
        write_entries(f, &**self)
    }
}

fn write_addresses(
    f: &mut fmt::Formatter,
    sender: Option<SocketAddr>,
    recipient: Option<SocketAddr>,
) -> fmt::Result {
    if let Some(addr) = sender {
        write!(f, "from: {}, ", addr)?;
    }
    if let Some(addr) = recipient {
        write!(f, "to: {}, ", addr)?;
    }
    Ok(())
}

fn write_entries<Q: fmt::Display, R: fmt::Display>(
    f: &mut fmt::Formatter,
    msg: &Message<Q, R>,
) -> fmt::Result {
    for question in msg.question_slice() {
        write!(f, "\n\t{}", question)?;
    }
    for record in msg
        .answer_slice()
        .iter()
        .chain(msg.authority_slice())
        .chain(msg.additional_slice())
    {
        write!(f, "\n\t{}", record)?;
    }
    Ok(())
}

//============ Tests =========================================================
