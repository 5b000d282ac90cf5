// The first byte of every encoded value identifies its MessagePack category;
// for small values it encodes the value itself (fixint, fixstr, fixarray,
// fixmap).

pub(crate) const NIL: u8 = 0xc0;
pub(crate) const FALSE: u8 = 0xc2;
pub(crate) const TRUE: u8 = 0xc3;

pub(crate) const BIN8: u8 = 0xc4;
pub(crate) const BIN16: u8 = 0xc5;
pub(crate) const BIN32: u8 = 0xc6;

pub(crate) const FLOAT64: u8 = 0xcb;

pub(crate) const UINT8: u8 = 0xcc;
pub(crate) const UINT16: u8 = 0xcd;
pub(crate) const UINT32: u8 = 0xce;
pub(crate) const UINT64: u8 = 0xcf;

pub(crate) const INT8: u8 = 0xd0;
pub(crate) const INT16: u8 = 0xd1;
pub(crate) const INT32: u8 = 0xd2;
pub(crate) const INT64: u8 = 0xd3;

pub(crate) const STR8: u8 = 0xd9;
pub(crate) const STR16: u8 = 0xda;
pub(crate) const STR32: u8 = 0xdb;

pub(crate) const ARRAY16: u8 = 0xdc;
pub(crate) const ARRAY32: u8 = 0xdd;

pub(crate) const MAP16: u8 = 0xde;
pub(crate) const MAP32: u8 = 0xdf;

// 0x00 ..= 0x7f are positive fixint values.
pub(crate) const POSITIVE_FIXINT_MAX: u8 = 0x7f;

// 0xe0 ..= 0xff are negative fixint values (-32 ..= -1).
pub(crate) const NEGATIVE_FIXINT_BASE: u8 = 0xe0;

// 3 MSB bits are significant, the remaining 5 bits hold the length.
pub(crate) const FIXSTR_BASE: u8 = 0xa0;
pub(crate) const FIXSTR_MASK: u8 = 0xe0;

// 4 MSB bits are significant, the remaining 4 bits hold the count.
pub(crate) const FIXARRAY_BASE: u8 = 0x90;
pub(crate) const FIXARRAY_MASK: u8 = 0xf0;

// 4 MSB bits are significant, the remaining 4 bits hold the pair count.
pub(crate) const FIXMAP_BASE: u8 = 0x80;
pub(crate) const FIXMAP_MASK: u8 = 0xf0;
