use crate::protocol::msgp::prefix;

const INITIAL_CAPACITY: usize = 256;

/// Encodes request values into MessagePack and accumulates the wire bytes
/// until the request is sent.
///
/// Integers and size headers are always written with the smallest prefix
/// that can represent the value.
#[derive(Debug)]
pub(crate) struct BufferOut {
    buf: Vec<u8>,
}

impl BufferOut {
    pub(crate) fn new() -> Self {
        Self {
            buf: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Discards all accumulated bytes; capacity is retained.
    pub(crate) fn reset(&mut self) {
        self.buf.clear();
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn append_nil(&mut self) {
        self.buf.push(prefix::NIL);
    }

    pub(crate) fn append_bool(&mut self, val: bool) {
        self.buf.push(if val { prefix::TRUE } else { prefix::FALSE });
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn append_u64(&mut self, val: u64) {
        if val <= u64::from(prefix::POSITIVE_FIXINT_MAX) {
            self.buf.push(val as u8);
        } else if val <= u64::from(u8::MAX) {
            self.buf.push(prefix::UINT8);
            self.buf.push(val as u8);
        } else if val <= u64::from(u16::MAX) {
            self.buf.push(prefix::UINT16);
            self.buf.extend_from_slice(&(val as u16).to_be_bytes());
        } else if val <= u64::from(u32::MAX) {
            self.buf.push(prefix::UINT32);
            self.buf.extend_from_slice(&(val as u32).to_be_bytes());
        } else {
            self.buf.push(prefix::UINT64);
            self.buf.extend_from_slice(&val.to_be_bytes());
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn append_i64(&mut self, val: i64) {
        if val >= 0 {
            if val <= i64::from(prefix::POSITIVE_FIXINT_MAX) {
                self.buf.push(val as u8);
            } else if val <= i64::from(i16::MAX) {
                self.buf.push(prefix::INT16);
                self.buf.extend_from_slice(&(val as i16).to_be_bytes());
            } else if val <= i64::from(i32::MAX) {
                self.buf.push(prefix::INT32);
                self.buf.extend_from_slice(&(val as i32).to_be_bytes());
            } else {
                self.buf.push(prefix::INT64);
                self.buf.extend_from_slice(&val.to_be_bytes());
            }
        } else if val >= -32 {
            self.buf.push(val as u8);
        } else if val >= i64::from(i8::MIN) {
            self.buf.push(prefix::INT8);
            self.buf.push(val as u8);
        } else if val >= i64::from(i16::MIN) {
            self.buf.push(prefix::INT16);
            self.buf.extend_from_slice(&(val as i16).to_be_bytes());
        } else if val >= i64::from(i32::MIN) {
            self.buf.push(prefix::INT32);
            self.buf.extend_from_slice(&(val as i32).to_be_bytes());
        } else {
            self.buf.push(prefix::INT64);
            self.buf.extend_from_slice(&val.to_be_bytes());
        }
    }

    #[allow(dead_code)] // completes the writer surface; requests carry no floats
    pub(crate) fn append_f64(&mut self, val: f64) {
        self.buf.push(prefix::FLOAT64);
        self.buf.extend_from_slice(&val.to_bits().to_be_bytes());
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn append_string(&mut self, val: &str) {
        let len = val.len();
        if len <= 31 {
            self.buf.push(prefix::FIXSTR_BASE | (len as u8));
        } else if len <= usize::from(u8::MAX) {
            self.buf.push(prefix::STR8);
            self.buf.push(len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.buf.push(prefix::STR16);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(prefix::STR32);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
        self.buf.extend_from_slice(val.as_bytes());
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn append_bytes(&mut self, val: &[u8]) {
        let len = val.len();
        if len <= usize::from(u8::MAX) {
            self.buf.push(prefix::BIN8);
            self.buf.push(len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.buf.push(prefix::BIN16);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(prefix::BIN32);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
        self.buf.extend_from_slice(val);
    }

    #[allow(dead_code)] // completes the writer surface; requests carry no arrays
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn append_array_header(&mut self, count: usize) {
        if count <= 15 {
            self.buf.push(prefix::FIXARRAY_BASE | (count as u8));
        } else if count <= usize::from(u16::MAX) {
            self.buf.push(prefix::ARRAY16);
            self.buf.extend_from_slice(&(count as u16).to_be_bytes());
        } else {
            self.buf.push(prefix::ARRAY32);
            self.buf.extend_from_slice(&(count as u32).to_be_bytes());
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn append_map_header(&mut self, count: usize) {
        if count <= 15 {
            self.buf.push(prefix::FIXMAP_BASE | (count as u8));
        } else if count <= usize::from(u16::MAX) {
            self.buf.push(prefix::MAP16);
            self.buf.extend_from_slice(&(count as u16).to_be_bytes());
        } else {
            self.buf.push(prefix::MAP32);
            self.buf.extend_from_slice(&(count as u32).to_be_bytes());
        }
    }

    pub(crate) fn append_simple(&mut self, val: &SimpleValue) {
        match val {
            SimpleValue::Nil => self.append_nil(),
            SimpleValue::Bool(b) => self.append_bool(*b),
            SimpleValue::Uint(u) => self.append_u64(*u),
            SimpleValue::Int(i) => self.append_i64(*i),
            SimpleValue::Str(s) => self.append_string(s),
            SimpleValue::Bytes(b) => self.append_bytes(b),
        }
    }

    /// Appends a map with string keys and simple values.
    pub(crate) fn append_map_str_simple(&mut self, entries: &[(&str, SimpleValue)]) {
        self.append_map_header(entries.len());
        for (key, val) in entries {
            self.append_string(key);
            self.append_simple(val);
        }
    }
}

/// A value that can be encoded as a map entry of a request.
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub(crate) enum SimpleValue {
    Nil,
    Bool(bool),
    Uint(u64),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}
