// The coarse categories a MessagePack prefix byte can announce.
// The prefix byte is more precise than the category: a `UnsignedInt` value
// can be a positive fixint or carry a uint8/16/32/64 header, depending on its
// magnitude.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MsgpType {
    // Used for the SQL NULL value.
    Nil,
    Bool,
    // Any unsigned integer, 8, 16, 32 or 64 bits.
    UnsignedInt,
    // Any signed integer, 8, 16, 32 or 64 bits.
    SignedInt,
    Float64,
    // Binary string (sequence of raw bytes).
    Binary,
    // String, encoded in utf-8.
    String,
    // Sequence of n values, which can be of different types.
    Array,
    // Map of n <key, value> pairs.
    Map,
}
