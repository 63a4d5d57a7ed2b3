//! Binary codec for the decrypted vault payload
//!
//! Layout: a marker string, a `u32` record count, then each record's source,
//! login, and password in order. Text is length-prefixed UTF-16: a `u32`
//! code-unit count followed by that many 16-bit units. All integers are
//! big-endian. The layout is byte-compatible with vault files written by
//! earlier versions of the store.

use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};
use crate::models::Record;

/// Literal written at the start of every payload. A mismatch after
/// decryption means the payload is not a vault record set.
const MARKER: &str = "CHECK";

/// Serialize a record set into the payload layout.
pub fn encode(records: &[Record]) -> Vec<u8> {
    let mut buf = Vec::new();
    put_text(&mut buf, MARKER);
    buf.extend_from_slice(&(records.len() as u32).to_be_bytes());
    for record in records {
        put_text(&mut buf, &record.source);
        put_text(&mut buf, &record.login);
        put_text(&mut buf, &record.password);
    }
    buf
}

/// Deserialize a payload back into a record set.
///
/// Fails with [`VaultError::InvalidFormat`] when the marker does not match,
/// the buffer ends mid-field, or a text field is not valid UTF-16. Bytes
/// after the last record are ignored.
pub fn decode(bytes: &[u8]) -> VaultResult<Vec<Record>> {
    let mut reader = Reader::new(bytes);

    let marker = reader.read_text()?;
    if marker != MARKER {
        return Err(VaultError::InvalidFormat("payload marker mismatch"));
    }

    let count = reader.read_u32()?;
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let source = reader.read_text()?;
        let login = reader.read_text()?;
        let password = reader.read_text()?;
        records.push(Record {
            source,
            login,
            password,
        });
    }
    Ok(records)
}

fn put_text(buf: &mut Vec<u8>, text: &str) {
    let units = text.encode_utf16().count() as u32;
    buf.extend_from_slice(&units.to_be_bytes());
    for unit in text.encode_utf16() {
        buf.extend_from_slice(&unit.to_be_bytes());
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> VaultResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(VaultError::InvalidFormat("unexpected end of payload"))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> VaultResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_text(&mut self) -> VaultResult<String> {
        let units = self.read_u32()? as usize;
        let byte_len = units
            .checked_mul(2)
            .ok_or(VaultError::InvalidFormat("unexpected end of payload"))?;
        let raw = self.take(byte_len)?;

        let mut decoded = Zeroizing::new(Vec::with_capacity(units));
        for pair in raw.chunks_exact(2) {
            decoded.push(u16::from_be_bytes([pair[0], pair[1]]));
        }
        String::from_utf16(&decoded)
            .map_err(|_| VaultError::InvalidFormat("text field is not valid UTF-16"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_empty() {
        let records: Vec<Record> = Vec::new();
        assert_eq!(decode(&encode(&records)).unwrap(), records);
    }

    #[test]
    fn test_roundtrip_records() {
        let records = vec![
            Record::new("example.com", "alice", "p@ss"),
            Record::new("mail.example.org", "bob", ""),
            Record::new("", "", "only-a-password"),
        ];
        assert_eq!(decode(&encode(&records)).unwrap(), records);
    }

    #[test]
    fn test_roundtrip_non_bmp_text() {
        // Surrogate pairs occupy two code units each.
        let records = vec![Record::new("пример.рф", "алиса", "п@роль🔑")];
        assert_eq!(decode(&encode(&records)).unwrap(), records);
    }

    #[test]
    fn test_marker_mismatch_rejected() {
        let mut buf = Vec::new();
        put_text(&mut buf, "WRONG");
        buf.extend_from_slice(&0u32.to_be_bytes());

        assert!(matches!(
            decode(&buf),
            Err(VaultError::InvalidFormat("payload marker mismatch"))
        ));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let records = vec![Record::new("example.com", "alice", "p@ss")];
        let buf = encode(&records);

        for len in 0..buf.len() {
            assert!(
                matches!(decode(&buf[..len]), Err(VaultError::InvalidFormat(_))),
                "truncation at {len} bytes must be rejected"
            );
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let records = vec![Record::new("example.com", "alice", "p@ss")];
        let mut buf = encode(&records);
        buf.extend_from_slice(b"junk");

        assert_eq!(decode(&buf).unwrap(), records);
    }

    #[test]
    fn test_unpaired_surrogate_rejected() {
        let mut buf = Vec::new();
        put_text(&mut buf, MARKER);
        buf.extend_from_slice(&1u32.to_be_bytes());
        // source = one lone high surrogate, then empty login and password
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&0xD800u16.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());

        assert!(matches!(
            decode(&buf),
            Err(VaultError::InvalidFormat("text field is not valid UTF-16"))
        ));
    }

    #[test]
    fn test_count_beyond_buffer_rejected() {
        let mut buf = Vec::new();
        put_text(&mut buf, MARKER);
        buf.extend_from_slice(&5u32.to_be_bytes());

        assert!(matches!(decode(&buf), Err(VaultError::InvalidFormat(_))));
    }
}
