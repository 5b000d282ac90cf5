use crate::{
    protocol::msgp::{prefix, MsgpType},
    RsqlError, RsqlResult,
};
use byteorder::{BigEndian, ByteOrder};
use debug_ignore::DebugIgnore;

const INTERNAL_BUFFER_SIZE: usize = 8 * 1024;
const VALUE_BUFFER_INITIAL_SIZE: usize = 1024;

/// Decodes MessagePack-encoded primitives from an underlying byte stream.
///
/// Bytes are pulled from the stream into a fixed-size internal buffer to
/// amortize stream reads; the bytes making up one value are collected in a
/// growable value buffer before being decoded.
///
/// The internal cursor is not safe for concurrent use; only one thread may
/// drive read operations on a connection.
#[derive(Debug)]
pub(crate) struct BufferIn<R> {
    rdr: R,
    internal: DebugIgnore<Vec<u8>>,
    // position of the next byte to read in the internal buffer
    currpos: usize,
    // number of bytes available in the internal buffer
    available: usize,
    // holds the raw bytes of the value being decoded; grows, never shrinks
    value: DebugIgnore<Vec<u8>>,
}

impl<R: std::io::Read> BufferIn<R> {
    pub(crate) fn new(rdr: R) -> Self {
        Self {
            rdr,
            internal: DebugIgnore(vec![0; INTERNAL_BUFFER_SIZE]),
            currpos: 0,
            available: 0,
            value: DebugIgnore(vec![0; VALUE_BUFFER_INITIAL_SIZE]),
        }
    }

    // Refills the internal buffer with at least one byte from the stream.
    // A zero-length read means the peer closed the connection.
    fn refill(&mut self) -> RsqlResult<()> {
        let count = self.rdr.read(&mut self.internal)?;
        if count == 0 {
            return Err(RsqlError::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                ),
            });
        }
        trace!("BufferIn::refill(): got {count} bytes");
        self.currpos = 0;
        self.available = count;
        Ok(())
    }

    fn fetch_byte(&mut self) -> RsqlResult<u8> {
        if self.available == 0 {
            self.refill()?;
        }
        let b = self.internal[self.currpos];
        self.currpos += 1;
        self.available -= 1;
        Ok(b)
    }

    fn peek_byte(&mut self) -> RsqlResult<u8> {
        if self.available == 0 {
            self.refill()?;
        }
        Ok(self.internal[self.currpos])
    }

    // Copies n bytes into the value buffer, growing it if necessary.
    fn read_n(&mut self, n: usize) -> RsqlResult<()> {
        if self.value.len() < n {
            // allocate a little more than needed
            self.value.resize(n + n / 4, 0);
        }
        let mut done = 0;
        while done < n {
            if self.available == 0 {
                self.refill()?;
            }
            let take = (n - done).min(self.available);
            self.value[done..done + take]
                .copy_from_slice(&self.internal[self.currpos..self.currpos + take]);
            self.currpos += take;
            self.available -= take;
            done += take;
        }
        Ok(())
    }

    fn read_prefix(&mut self) -> RsqlResult<u8> {
        self.fetch_byte()
    }

    fn read_raw_u16(&mut self) -> RsqlResult<u16> {
        self.read_n(2)?;
        Ok(BigEndian::read_u16(&self.value[..2]))
    }

    fn read_raw_u32(&mut self) -> RsqlResult<u32> {
        self.read_n(4)?;
        Ok(BigEndian::read_u32(&self.value[..4]))
    }

    fn read_raw_u64(&mut self) -> RsqlResult<u64> {
        self.read_n(8)?;
        Ok(BigEndian::read_u64(&self.value[..8]))
    }

    /// Classifies the next value by peeking its prefix byte.
    /// No byte is consumed from the data stream.
    pub(crate) fn peek_type(&mut self) -> RsqlResult<MsgpType> {
        let prefix = self.peek_byte()?;

        if prefix <= prefix::POSITIVE_FIXINT_MAX {
            return Ok(MsgpType::SignedInt);
        }
        if prefix >= prefix::NEGATIVE_FIXINT_BASE {
            return Ok(MsgpType::SignedInt);
        }
        if (prefix & prefix::FIXSTR_MASK) == prefix::FIXSTR_BASE {
            return Ok(MsgpType::String);
        }
        if (prefix & prefix::FIXARRAY_MASK) == prefix::FIXARRAY_BASE {
            return Ok(MsgpType::Array);
        }
        if (prefix & prefix::FIXMAP_MASK) == prefix::FIXMAP_BASE {
            return Ok(MsgpType::Map);
        }

        match prefix {
            prefix::NIL => Ok(MsgpType::Nil),
            prefix::FALSE | prefix::TRUE => Ok(MsgpType::Bool),
            prefix::UINT8 | prefix::UINT16 | prefix::UINT32 | prefix::UINT64 => {
                Ok(MsgpType::UnsignedInt)
            }
            prefix::INT8 | prefix::INT16 | prefix::INT32 | prefix::INT64 => Ok(MsgpType::SignedInt),
            prefix::FLOAT64 => Ok(MsgpType::Float64),
            prefix::BIN8 | prefix::BIN16 | prefix::BIN32 => Ok(MsgpType::Binary),
            prefix::STR8 | prefix::STR16 | prefix::STR32 => Ok(MsgpType::String),
            prefix::ARRAY16 | prefix::ARRAY32 => Ok(MsgpType::Array),
            prefix::MAP16 | prefix::MAP32 => Ok(MsgpType::Map),
            _ => Err(bad_prefix("peek_type", prefix)),
        }
    }

    /// Consumes a nil value from the data stream.
    pub(crate) fn read_nil(&mut self) -> RsqlResult<()> {
        let prefix = self.read_prefix()?;
        if prefix == prefix::NIL {
            Ok(())
        } else {
            Err(bad_prefix("read_nil", prefix))
        }
    }

    /// Consumes a bool value from the data stream.
    pub(crate) fn read_bool(&mut self) -> RsqlResult<bool> {
        let prefix = self.read_prefix()?;
        match prefix {
            prefix::FALSE => Ok(false),
            prefix::TRUE => Ok(true),
            _ => Err(bad_prefix("read_bool", prefix)),
        }
    }

    /// Consumes an unsigned integer and verifies that it fits in 8 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn read_u8(&mut self) -> RsqlResult<u8> {
        let val = self.read_u64()?;
        if val > u64::from(u8::MAX) {
            return Err(RsqlError::ValueRange(format!(
                "received number {val} is not a uint8 value"
            )));
        }
        Ok(val as u8)
    }

    /// Consumes an unsigned integer and verifies that it fits in 16 bits.
    #[allow(dead_code)]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn read_u16(&mut self) -> RsqlResult<u16> {
        let val = self.read_u64()?;
        if val > u64::from(u16::MAX) {
            return Err(RsqlError::ValueRange(format!(
                "received number {val} is not a uint16 value"
            )));
        }
        Ok(val as u16)
    }

    /// Consumes an unsigned integer and verifies that it fits in 32 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn read_u32(&mut self) -> RsqlResult<u32> {
        let val = self.read_u64()?;
        if val > u64::from(u32::MAX) {
            return Err(RsqlError::ValueRange(format!(
                "received number {val} is not a uint32 value"
            )));
        }
        Ok(val as u32)
    }

    /// Consumes an unsigned integer of any width from the data stream.
    pub(crate) fn read_u64(&mut self) -> RsqlResult<u64> {
        let prefix = self.read_prefix()?;

        if prefix <= prefix::POSITIVE_FIXINT_MAX {
            return Ok(u64::from(prefix));
        }

        match prefix {
            prefix::UINT8 => {
                self.read_n(1)?;
                Ok(u64::from(self.value[0]))
            }
            prefix::UINT16 => Ok(u64::from(self.read_raw_u16()?)),
            prefix::UINT32 => Ok(u64::from(self.read_raw_u32()?)),
            prefix::UINT64 => self.read_raw_u64(),
            _ => Err(bad_prefix("read_u64", prefix)),
        }
    }

    /// Consumes a signed integer and verifies that it fits in 8 bits.
    #[allow(dead_code)]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn read_i8(&mut self) -> RsqlResult<i8> {
        let val = self.read_i64()?;
        if val > i64::from(i8::MAX) || val < i64::from(i8::MIN) {
            return Err(RsqlError::ValueRange(format!(
                "received number {val} is not an int8 value"
            )));
        }
        Ok(val as i8)
    }

    /// Consumes a signed integer and verifies that it fits in 16 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn read_i16(&mut self) -> RsqlResult<i16> {
        let val = self.read_i64()?;
        if val > i64::from(i16::MAX) || val < i64::from(i16::MIN) {
            return Err(RsqlError::ValueRange(format!(
                "received number {val} is not an int16 value"
            )));
        }
        Ok(val as i16)
    }

    /// Consumes a signed integer and verifies that it fits in 32 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn read_i32(&mut self) -> RsqlResult<i32> {
        let val = self.read_i64()?;
        if val > i64::from(i32::MAX) || val < i64::from(i32::MIN) {
            return Err(RsqlError::ValueRange(format!(
                "received number {val} is not an int32 value"
            )));
        }
        Ok(val as i32)
    }

    /// Consumes a signed integer of any width from the data stream.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn read_i64(&mut self) -> RsqlResult<i64> {
        let prefix = self.read_prefix()?;

        if prefix <= prefix::POSITIVE_FIXINT_MAX {
            return Ok(i64::from(prefix));
        }
        if prefix >= prefix::NEGATIVE_FIXINT_BASE {
            return Ok(i64::from(prefix as i8));
        }

        match prefix {
            prefix::INT8 => {
                self.read_n(1)?;
                Ok(i64::from(self.value[0] as i8))
            }
            prefix::INT16 => {
                self.read_n(2)?;
                Ok(i64::from(BigEndian::read_i16(&self.value[..2])))
            }
            prefix::INT32 => {
                self.read_n(4)?;
                Ok(i64::from(BigEndian::read_i32(&self.value[..4])))
            }
            prefix::INT64 => {
                self.read_n(8)?;
                Ok(BigEndian::read_i64(&self.value[..8]))
            }
            _ => Err(bad_prefix("read_i64", prefix)),
        }
    }

    /// Consumes a float64 value from the data stream.
    pub(crate) fn read_f64(&mut self) -> RsqlResult<f64> {
        let prefix = self.read_prefix()?;
        if prefix != prefix::FLOAT64 {
            return Err(bad_prefix("read_f64", prefix));
        }
        Ok(f64::from_bits(self.read_raw_u64()?))
    }

    /// Consumes a string value from the data stream.
    pub(crate) fn read_string(&mut self) -> RsqlResult<String> {
        let size = self.read_string_header()?;
        self.read_n(size)?;
        String::from_utf8(self.value[..size].to_vec())
            .map_err(|e| RsqlError::Protocol(format!("received string is not valid utf-8: {e}")))
    }

    /// Consumes a binary string value from the data stream.
    pub(crate) fn read_bytes(&mut self) -> RsqlResult<Vec<u8>> {
        let size = self.read_bytes_header()?;
        self.read_n(size)?;
        Ok(self.value[..size].to_vec())
    }

    /// Consumes the size header of an array.
    pub(crate) fn read_array_header(&mut self) -> RsqlResult<usize> {
        let prefix = self.read_prefix()?;

        if (prefix & prefix::FIXARRAY_MASK) == prefix::FIXARRAY_BASE {
            return Ok(usize::from(prefix & 0x0f));
        }

        match prefix {
            prefix::ARRAY16 => Ok(usize::from(self.read_raw_u16()?)),
            prefix::ARRAY32 => Ok(self.read_raw_u32()? as usize),
            _ => Err(bad_prefix("read_array_header", prefix)),
        }
    }

    /// Consumes the size header of a map.
    pub(crate) fn read_map_header(&mut self) -> RsqlResult<usize> {
        let prefix = self.read_prefix()?;

        if (prefix & prefix::FIXMAP_MASK) == prefix::FIXMAP_BASE {
            return Ok(usize::from(prefix & 0x0f));
        }

        match prefix {
            prefix::MAP16 => Ok(usize::from(self.read_raw_u16()?)),
            prefix::MAP32 => Ok(self.read_raw_u32()? as usize),
            _ => Err(bad_prefix("read_map_header", prefix)),
        }
    }

    fn read_string_header(&mut self) -> RsqlResult<usize> {
        let prefix = self.read_prefix()?;

        if (prefix & prefix::FIXSTR_MASK) == prefix::FIXSTR_BASE {
            return Ok(usize::from(prefix & 0x1f));
        }

        match prefix {
            prefix::STR8 => {
                self.read_n(1)?;
                Ok(usize::from(self.value[0]))
            }
            prefix::STR16 => Ok(usize::from(self.read_raw_u16()?)),
            prefix::STR32 => Ok(self.read_raw_u32()? as usize),
            _ => Err(bad_prefix("read_string_header", prefix)),
        }
    }

    fn read_bytes_header(&mut self) -> RsqlResult<usize> {
        let prefix = self.read_prefix()?;

        match prefix {
            prefix::BIN8 => {
                self.read_n(1)?;
                Ok(usize::from(self.value[0]))
            }
            prefix::BIN16 => Ok(usize::from(self.read_raw_u16()?)),
            prefix::BIN32 => Ok(self.read_raw_u32()? as usize),
            _ => Err(bad_prefix("read_bytes_header", prefix)),
        }
    }
}

fn bad_prefix(funcname: &str, prefix: u8) -> RsqlError {
    RsqlError::Protocol(format!("msgp {funcname}: bad prefix byte 0x{prefix:02x}"))
}
