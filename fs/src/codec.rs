//! The 3-byte metadata word: the only on-media structure that is hand-packed
//! rather than a `zerocopy` struct, since its fields are sub-byte bitfields.
//!
//! `b0` bit 7 is the record kind, `b0` bits 6..0 are the index field (logical
//! index + [`INDEX_OFFSET`](crate::config::INDEX_OFFSET), `0` reserved for
//! free space). `b1` bit 7 is the payload kind, `b1` bits 6..0 are the high
//! 7 bits of the 15-bit payload, `b2` is the low 8 bits.

use crate::config::INDEX_OFFSET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Normal,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Pointer,
    Size,
}

/// A decoded metadata word. `index` is `None` when the stored index field is
/// the reserved value `0`, which marks this window as something other than
/// a valid header (free space, or corruption).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataWord {
    pub kind: Kind,
    pub data_kind: DataKind,
    pub index: Option<u8>,
    pub payload: u16,
}

/// A metadata word never has a zero index field; that is what makes an
/// all-zero window in the data area unambiguously free space.
pub fn decode(bytes: [u8; 3]) -> MetadataWord {
    let kind = if bytes[0] & 0x80 != 0 { Kind::Fragment } else { Kind::Normal };
    let index = (bytes[0] & 0x7F).checked_sub(INDEX_OFFSET);
    let data_kind = if bytes[1] & 0x80 != 0 { DataKind::Size } else { DataKind::Pointer };
    let payload = (((bytes[1] & 0x7F) as u16) << 8) | bytes[2] as u16;
    MetadataWord { kind, data_kind, index, payload }
}

/// Encodes a metadata word. `index` is a logical record index (`< N`) and
/// `payload` must fit in 15 bits; both are caller-guaranteed invariants, not
/// re-validated here.
pub fn encode(kind: Kind, data_kind: DataKind, index: u8, payload: u16) -> [u8; 3] {
    debug_assert!(payload <= 0x7FFF, "payload does not fit in 15 bits");
    let index_field = index + INDEX_OFFSET;
    let b0 = ((kind == Kind::Fragment) as u8) << 7 | index_field;
    let b1 = ((data_kind == DataKind::Size) as u8) << 7 | ((payload >> 8) as u8 & 0x7F);
    let b2 = (payload & 0xFF) as u8;
    [b0, b1, b2]
}

/// Whether `bytes` could be the start of a valid header, i.e. its index
/// field is not the reserved free-space marker.
pub fn is_header_start(bytes: [u8; 3]) -> bool {
    bytes[0] & 0x7F != 0
}
