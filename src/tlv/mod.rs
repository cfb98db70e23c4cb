//! # TLV Wire Encoding
//!
//! Records are `[type: 4 bytes][length: 4 bytes][value: length bytes]` in
//! host byte order. The length covers the value only, never the 8-byte
//! header, and the stream is self-delimiting: a reader walks it by hopping
//! `8 + length` per record.
//!
//! [`writer`] owns the append-only byte buffer; [`encode`] builds the record
//! payloads that the conversion driver emits for TLV-output rules.

pub mod encode;
pub mod writer;

pub use writer::{TlvWriter, RECORD_HEADER_LEN};
