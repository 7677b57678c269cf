//! Versioned byte encoding for persisted device state.
//!
//! Every payload starts with a fixed header: the 4-byte device id followed by the device's
//! `major.minor` version (little-endian `u16`s). Loading rejects a foreign device id or a
//! different major version; minor bumps are expected to only append fields.

use thiserror::Error;

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub major: u16,
    pub minor: u16,
}

impl SnapshotVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("unexpected end of snapshot data")]
    UnexpectedEof,

    #[error("snapshot belongs to device {found:?}, expected {expected:?}")]
    DeviceIdMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported snapshot version {found} (expected major {expected_major})")]
    UnsupportedVersion {
        expected_major: u16,
        found: SnapshotVersion,
    },

    #[error("{0} trailing bytes after snapshot payload")]
    TrailingBytes(usize),

    #[error("corrupt snapshot: {0}")]
    Corrupt(&'static str),
}

/// Snapshotting contract for emulated devices.
///
/// `DEVICE_ID` must stay stable forever.
pub trait IoSnapshot {
    const DEVICE_ID: [u8; 4];
    const DEVICE_VERSION: SnapshotVersion;

    fn save_state(&self) -> Vec<u8>;
    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()>;
}

#[derive(Debug, Default)]
pub struct SnapshotWriter {
    out: Vec<u8>,
}

impl SnapshotWriter {
    pub fn new(device_id: [u8; 4], version: SnapshotVersion) -> Self {
        let mut w = Self { out: Vec::new() };
        w.out.extend_from_slice(&device_id);
        w.u16(version.major);
        w.u16(version.minor);
        w
    }

    /// A writer with no header, for nested payloads.
    pub fn headerless() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.out.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(u8::from(v))
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.out.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.out.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Raw bytes with no length prefix (for fixed-size arrays).
    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.out.extend_from_slice(v);
        self
    }

    /// Length-prefixed (`u32`) byte blob.
    pub fn blob(&mut self, v: &[u8]) -> &mut Self {
        let len = u32::try_from(v.len()).unwrap_or(u32::MAX);
        self.u32(len);
        self.bytes(&v[..len as usize])
    }

    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

#[derive(Debug)]
pub struct SnapshotReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SnapshotReader<'a> {
    /// Validates the header and positions the reader at the payload.
    pub fn new(
        bytes: &'a [u8],
        device_id: [u8; 4],
        version: SnapshotVersion,
    ) -> SnapshotResult<Self> {
        let mut r = Self::headerless(bytes);
        let found: [u8; 4] = r.array()?;
        if found != device_id {
            return Err(SnapshotError::DeviceIdMismatch {
                expected: device_id,
                found,
            });
        }
        let found = SnapshotVersion::new(r.u16()?, r.u16()?);
        if found.major != version.major {
            return Err(SnapshotError::UnsupportedVersion {
                expected_major: version.major,
                found,
            });
        }
        Ok(r)
    }

    pub fn headerless(bytes: &'a [u8]) -> Self {
        Self {
            buf: bytes,
            pos: 0,
        }
    }

    fn take(&mut self, len: usize) -> SnapshotResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(SnapshotError::UnexpectedEof)?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> SnapshotResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn bool(&mut self) -> SnapshotResult<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SnapshotError::Corrupt("invalid bool")),
        }
    }

    pub fn u16(&mut self) -> SnapshotResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> SnapshotResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn array<const N: usize>(&mut self) -> SnapshotResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads a length-prefixed blob, refusing lengths above `max_len`.
    pub fn blob(&mut self, max_len: usize) -> SnapshotResult<&'a [u8]> {
        let len = self.u32()? as usize;
        if len > max_len {
            return Err(SnapshotError::Corrupt("blob too large"));
        }
        self.take(len)
    }

    /// Fails if any payload bytes were left unread.
    pub fn finish(self) -> SnapshotResult<()> {
        match self.buf.len() - self.pos {
            0 => Ok(()),
            n => Err(SnapshotError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ID: [u8; 4] = *b"TEST";
    const V1: SnapshotVersion = SnapshotVersion::new(1, 2);

    #[test]
    fn header_is_checked_before_payload() {
        let mut w = SnapshotWriter::new(ID, V1);
        w.u8(7).bool(true).u16(0xBEEF).u32(0x1234_5678).blob(&[1, 2, 3]);
        let bytes = w.finish();
        assert_eq!(&bytes[..8], &[b'T', b'E', b'S', b'T', 1, 0, 2, 0]);

        // Minor versions may differ.
        let mut r = SnapshotReader::new(&bytes, ID, SnapshotVersion::new(1, 0)).unwrap();
        assert_eq!(r.u8().unwrap(), 7);
        assert!(r.bool().unwrap());
        assert_eq!(r.u16().unwrap(), 0xBEEF);
        assert_eq!(r.u32().unwrap(), 0x1234_5678);
        assert_eq!(r.blob(16).unwrap(), &[1, 2, 3]);
        r.finish().unwrap();

        assert_eq!(
            SnapshotReader::new(&bytes, *b"NOPE", V1).unwrap_err(),
            SnapshotError::DeviceIdMismatch {
                expected: *b"NOPE",
                found: ID
            }
        );
        assert_eq!(
            SnapshotReader::new(&bytes, ID, SnapshotVersion::new(2, 0)).unwrap_err(),
            SnapshotError::UnsupportedVersion {
                expected_major: 2,
                found: V1
            }
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let mut r = SnapshotReader::headerless(&[2]);
        assert_eq!(r.bool(), Err(SnapshotError::Corrupt("invalid bool")));

        let mut r = SnapshotReader::headerless(&[0x01]);
        assert_eq!(r.u16(), Err(SnapshotError::UnexpectedEof));

        let mut r = SnapshotReader::headerless(&[0xFF, 0, 0, 0]);
        assert_eq!(r.blob(8), Err(SnapshotError::Corrupt("blob too large")));

        let mut r = SnapshotReader::headerless(&[1, 2, 3]);
        r.u8().unwrap();
        assert_eq!(r.finish(), Err(SnapshotError::TrailingBytes(2)));
    }
}
