//! A DNS message model and datagram decoder.
//!
//! This crate provides mutable, reference counted representations of DNS
//! queries and responses and decoders that create them from the content of
//! received datagrams.
//!
//! # Modules
//!
//! * [base] contains the message types, the header, the IANA types for
//!   values found in the header, and the reference counting machinery, and
//! * [dgram] contains the decoders for messages received as datagrams.
//!
//! Errors returned by the decoders are defined in [error].
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use domain_codec::base::ReferenceCounted;
//! use domain_codec::dgram::{DatagramPacket, DatagramResponseDecoder};
//!
//! let data = Bytes::from_static(
//!     b"\x12\x34\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00\
//!       \x07example\x03com\x00\x00\x01\x00\x01",
//! );
//! let packet = DatagramPacket::new(data, "192.0.2.1:53".parse().unwrap());
//! let mut response = DatagramResponseDecoder::new().decode(&packet).unwrap();
//! assert_eq!(response.id(), 0x1234);
//! assert_eq!(response.question_count(), 1);
//! println!("{}", response);
//! response.release();
//! ```
//!
//! # Reference of Feature Flags
//!
//! * `rand`: Enables [`Message::set_random_id`][base::Message::set_random_id]
//!   via the [rand](https://github.com/rust-random/rand) crate. This
//!   feature is enabled by default.

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod dgram;
pub mod error;
