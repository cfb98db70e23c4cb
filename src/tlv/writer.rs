//! Append-only TLV record writer.
//!
//! One writer owns one growable buffer and appends complete records to its
//! tail. Growth doubles the capacity or jumps straight to the required size,
//! whichever is larger, so a long run of appends stays amortized-cheap.
//! A failed allocation leaves the writer in a well-defined failed state:
//! the buffer is dropped, every later append is a no-op, and [`clear`]
//! returns the writer to a usable empty state.
//!
//! [`clear`]: TlvWriter::clear

use tracing::{debug, trace, warn};

/// Bytes occupied by the `[type][length]` header of every record.
pub const RECORD_HEADER_LEN: usize = 8;

/// Initial buffer capacity for [`TlvWriter::new`].
const DEFAULT_CAPACITY: usize = 1024;

/// Growable buffer of TLV records.
#[derive(Debug)]
pub struct TlvWriter {
    buf: Vec<u8>,
    failed: bool,
}

impl TlvWriter {
    /// Writer with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Writer with a caller-chosen initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            failed: false,
        }
    }

    /// Append one record whose value is the concatenation of `segments`.
    ///
    /// Type and length are written in host byte order. No-op when the writer
    /// is in the failed state. On allocation failure the buffer is dropped
    /// and the writer enters the failed state.
    pub fn append(&mut self, tag: u32, segments: &[&[u8]]) {
        if self.failed {
            return;
        }
        let value_len: usize = segments.iter().map(|s| s.len()).sum();
        let required = self.buf.len() + RECORD_HEADER_LEN + value_len;
        if required > self.buf.capacity() && !self.grow(required) {
            return;
        }
        self.buf.extend_from_slice(&tag.to_ne_bytes());
        self.buf.extend_from_slice(&(value_len as u32).to_ne_bytes());
        for segment in segments {
            self.buf.extend_from_slice(segment);
        }
        trace!(tag, value_len, total = self.buf.len(), "record");
    }

    /// Append one record with a single-segment value.
    pub fn append_buf(&mut self, tag: u32, value: &[u8]) {
        self.append(tag, &[value]);
    }

    /// Append one keyed record: value = `key` bytes, one NUL, then `value`.
    pub fn append_pair(&mut self, tag: u32, key: &[u8], value: &[u8]) {
        self.append(tag, &[key, b"\0", value]);
    }

    /// Grow to at least `required`, doubling when that is larger.
    ///
    /// Returns false and enters the failed state when the allocation cannot
    /// be satisfied.
    fn grow(&mut self, required: usize) -> bool {
        let target = required.max(self.buf.capacity() * 2);
        if self.buf.try_reserve_exact(target - self.buf.len()).is_err() {
            warn!(required, "buffer growth failed, discarding content");
            self.buf = Vec::new();
            self.failed = true;
            return false;
        }
        debug!(from = self.buf.len(), to = target, "buffer grown");
        true
    }

    /// Discard all content and leave the writer empty and usable, clearing
    /// any prior failed state.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.failed = false;
    }

    /// Total bytes written so far (headers included).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// False after an allocation failure, until [`clear`](Self::clear).
    pub fn is_valid(&self) -> bool {
        !self.failed
    }

    /// The encoded records, oldest first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for TlvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_header(bytes: &[u8], offset: usize) -> (u32, u32) {
        let tag = u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
        let len = u32::from_ne_bytes(bytes[offset + 4..offset + 8].try_into().unwrap());
        (tag, len)
    }

    #[test]
    fn fresh_writer_is_empty_and_valid() {
        let w = TlvWriter::new();
        assert!(w.is_empty());
        assert_eq!(w.len(), 0);
        assert!(w.is_valid());
    }

    #[test]
    fn append_buf_writes_header_and_value() {
        let mut w = TlvWriter::new();
        w.append_buf(0x1001, b"Hello");
        assert_eq!(w.len(), 13);
        let (tag, len) = read_header(w.as_bytes(), 0);
        assert_eq!(tag, 0x1001);
        assert_eq!(len, 5);
        assert_eq!(&w.as_bytes()[8..], b"Hello");
    }

    #[test]
    fn empty_value_is_a_bare_header() {
        let mut w = TlvWriter::new();
        w.append_buf(0x2002, b"");
        assert_eq!(w.len(), RECORD_HEADER_LEN);
        let (tag, len) = read_header(w.as_bytes(), 0);
        assert_eq!(tag, 0x2002);
        assert_eq!(len, 0);
    }

    #[test]
    fn records_concatenate_in_order() {
        let mut w = TlvWriter::new();
        w.append_buf(1, b"aa");
        w.append_buf(2, b"bbbb");
        w.append_buf(3, b"");
        assert_eq!(w.len(), 8 + 2 + 8 + 4 + 8);

        let bytes = w.as_bytes();
        let (tag, len) = read_header(bytes, 0);
        assert_eq!((tag, len), (1, 2));
        let (tag, len) = read_header(bytes, 10);
        assert_eq!((tag, len), (2, 4));
        let (tag, len) = read_header(bytes, 22);
        assert_eq!((tag, len), (3, 0));
    }

    #[test]
    fn multi_segment_values_are_contiguous() {
        let mut w = TlvWriter::new();
        w.append(0x42, &[b"ab", b"", b"cdef"]);
        let (tag, len) = read_header(w.as_bytes(), 0);
        assert_eq!(tag, 0x42);
        assert_eq!(len, 6);
        assert_eq!(&w.as_bytes()[8..], b"abcdef");
    }

    #[test]
    fn append_pair_inserts_key_and_nul() {
        let mut w = TlvWriter::new();
        w.append_pair(0x9, b"name", b"ok");
        let (_, len) = read_header(w.as_bytes(), 0);
        assert_eq!(len, 7);
        assert_eq!(&w.as_bytes()[8..], b"name\0ok");
    }

    #[test]
    fn grows_past_a_tiny_initial_capacity() {
        let mut w = TlvWriter::with_capacity(4);
        let payload = vec![0xAB; 300];
        w.append_buf(0x7, &payload);
        w.append_buf(0x8, &payload);
        assert!(w.is_valid());
        assert_eq!(w.len(), 2 * (8 + 300));
        assert_eq!(&w.as_bytes()[8..308], payload.as_slice());
    }

    #[test]
    fn clear_resets_to_reusable_empty() {
        let mut w = TlvWriter::new();
        w.append_buf(1, b"data");
        assert!(!w.is_empty());
        w.clear();
        assert!(w.is_empty());
        assert!(w.is_valid());
        w.append_buf(2, b"x");
        assert_eq!(w.len(), 9);
        let (tag, _) = read_header(w.as_bytes(), 0);
        assert_eq!(tag, 2);
    }
}
