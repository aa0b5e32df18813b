#[cfg(test)]
use crate::core::FixtureGen;
use crate::{
    core::Bytes,
    error::{DukaError, DukaResult},
};
use bincode::{Decode, Encode};
use snap::raw::{Decoder, Encoder};

/// A key-value bytes pair persisted as one record in the log.
#[derive(Debug, Clone, Encode, Decode, PartialEq)]
pub(crate) struct Record {
    pub key: Bytes,
    pub val: Bytes,
}
impl Record {
    pub fn new(key: Bytes, val: Bytes) -> Record {
        Self { key, val }
    }
}
#[cfg(test)]
impl FixtureGen<Record> for Record {
    fn gen() -> Record {
        Record {
            key: Bytes::gen(),
            val: Bytes::gen(),
        }
    }
}

/// Fixed-size header preceding every record body in the log.
///
/// Byte-counts the body so a record's span is recoverable without
/// parsing past it, and flags per record whether the body is
/// snappy-compressed.
#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq)]
pub(crate) struct RecordHeader {
    /// Body length in bytes.
    pub len: u32,
    /// Body compression flag.
    pub compressed: bool,
}
impl RecordHeader {
    pub fn new(len: u32, compressed: bool) -> Self {
        Self { len, compressed }
    }

    pub fn serde_sz() -> usize {
        // u32 + bool
        5
    }
}

/// Record encoder and decoder.
///
/// Frames each record as a fixed-size header followed by a
/// bincode-encoded body, optionally compressed with snappy. Keys and
/// values are arbitrary byte sequences; there is no delimiter to
/// collide with.
#[derive(Debug)]
pub(crate) struct Codec {
    compress: bool,
    encoder: Option<Encoder>,
    decoder: Decoder,
}

impl Codec {
    pub fn new(compress: bool) -> Codec {
        let encoder = if compress { Some(Encoder::new()) } else { None };
        Self {
            compress,
            encoder,
            decoder: Decoder::new(),
        }
    }

    /// Encodes a record into a self-delimited frame: header then body.
    pub fn encode(&mut self, rec: &Record) -> DukaResult<Bytes> {
        let body = self.ser_body(rec)?;
        let header = RecordHeader::new(body.len() as u32, self.compress);
        let mut frame = Self::ser_raw(&header)?;
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decodes one full frame back into a record.
    ///
    /// Exact inverse of [`Codec::encode`]. Fails with
    /// [`DukaError::MalformedRecord`] when the bytes are not
    /// length-consistent with their header.
    pub fn decode(&mut self, bytes: &[u8]) -> DukaResult<Record> {
        let hdr_sz = RecordHeader::serde_sz();
        if bytes.len() < hdr_sz {
            return Err(DukaError::MalformedRecord(format!(
                "frame shorter than header: {} bytes",
                bytes.len()
            )));
        }
        let header: RecordHeader = Self::deser_raw(&bytes[..hdr_sz])?;
        let body = &bytes[hdr_sz..];
        if body.len() != header.len as usize {
            return Err(DukaError::MalformedRecord(format!(
                "body length mismatch: header says {}, got {}",
                header.len,
                body.len()
            )));
        }
        self.de_body(body, header.compressed)
    }

    /// Serializes a record body, compressing when configured.
    pub fn ser_body(&mut self, rec: &Record) -> DukaResult<Bytes> {
        let bytes = Self::ser_raw(rec)?;
        let ret = if let Some(ref mut enc) = self.encoder {
            enc.compress_vec(&bytes)?
        } else {
            bytes
        };
        Ok(ret)
    }

    /// Deserializes a record body, decompressing when flagged.
    pub fn de_body(&mut self, bytes: &[u8], compressed: bool) -> DukaResult<Record> {
        if compressed {
            Self::deser_raw(&self.decoder.decompress_vec(bytes)?)
        } else {
            Self::deser_raw(bytes)
        }
    }

    /// Serializes a value into bytes without compression.
    pub fn ser_raw<T: Encode>(value: &T) -> DukaResult<Bytes> {
        Ok(bincode::encode_to_vec(value, Self::serde_config())?)
    }

    /// Deserializes a slice of bytes into an instance of `T`.
    ///
    /// The slice must hold exactly one encoded `T`.
    pub fn deser_raw<T: Decode>(bytes: &[u8]) -> DukaResult<T> {
        let (val, read) = bincode::decode_from_slice(bytes, Self::serde_config())?;
        if read != bytes.len() {
            return Err(DukaError::MalformedRecord(format!(
                "trailing bytes after decode: used {read} of {}",
                bytes.len()
            )));
        }
        Ok(val)
    }

    #[inline]
    fn serde_config() -> impl bincode::config::Config {
        bincode::config::standard()
            .with_little_endian()
            .with_fixed_int_encoding()
            .with_no_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_serde_sz() -> DukaResult<()> {
        let header = RecordHeader::new(0, true);
        let bytes = Codec::ser_raw(&header)?;
        assert_eq!(
            bytes.len(),
            RecordHeader::serde_sz(),
            "header bytes do not match expected len. Got: {} Expected: {}",
            bytes.len(),
            RecordHeader::serde_sz()
        );
        Ok(())
    }

    #[test]
    fn round_trip() -> DukaResult<()> {
        let mut codec = Codec::new(false);
        let rec = Record::gen();
        let frame = codec.encode(&rec)?;
        assert_eq!(codec.decode(&frame)?, rec);
        Ok(())
    }

    #[test]
    fn round_trip_compressed() -> DukaResult<()> {
        let mut codec = Codec::new(true);
        let rec = Record::gen();
        let frame = codec.encode(&rec)?;
        assert_eq!(codec.decode(&frame)?, rec);
        Ok(())
    }

    #[test]
    fn round_trip_delimiter_bytes() -> DukaResult<()> {
        // keys and values carrying commas, newlines and NULs must
        // survive unchanged
        let mut codec = Codec::new(false);
        let cases = [
            (b"key1".to_vec(), b"my value, has, commas,".to_vec()),
            (b"k,ey\n".to_vec(), b"line one\nline two\n".to_vec()),
            (b"\x00\n,".to_vec(), b"\x00\x00\n,,\n".to_vec()),
            (b"".to_vec(), b"".to_vec()),
        ];
        for (key, val) in cases {
            let rec = Record::new(key, val);
            let frame = codec.encode(&rec)?;
            assert_eq!(codec.decode(&frame)?, rec);
        }
        Ok(())
    }

    #[test]
    fn compressed_record_read_by_plain_codec() -> DukaResult<()> {
        let mut wtr = Codec::new(true);
        let mut rdr = Codec::new(false);
        let rec = Record::gen();
        let frame = wtr.encode(&rec)?;
        assert_eq!(rdr.decode(&frame)?, rec);
        Ok(())
    }

    #[test]
    fn decode_short_frame() {
        let mut codec = Codec::new(false);
        let res = codec.decode(&[1u8, 2, 3]);
        assert!(matches!(res, Err(DukaError::MalformedRecord(_))));
    }

    #[test]
    fn decode_length_mismatch() -> DukaResult<()> {
        let mut codec = Codec::new(false);
        let mut frame = codec.encode(&Record::new(b"k".to_vec(), b"v".to_vec()))?;
        frame.pop();
        let res = codec.decode(&frame);
        assert!(matches!(res, Err(DukaError::MalformedRecord(_))));
        Ok(())
    }

    #[test]
    fn decode_garbage_body() -> DukaResult<()> {
        let mut codec = Codec::new(false);
        let header = RecordHeader::new(4, false);
        let mut frame = Codec::ser_raw(&header)?;
        frame.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        let res = codec.decode(&frame);
        assert!(matches!(res, Err(DukaError::MalformedRecord(_))));
        Ok(())
    }
}
