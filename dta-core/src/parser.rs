//! Low-level parsing of DTA tag bytes.
//!
//! Each tagged field record starts with one byte whose low nibble selects the
//! field type and whose remaining bits are independent flags. What a flag
//! means depends on the field type.

use crate::types::FieldType;

// ============================================================================
// Tag byte
// Bits: [7] flag_80 | [6] flag_40 | [5] flag_20 | [4] unused | [3:0] type
// Bit 2 overlaps the type nibble: only type 0x4 carries flag_04, and always
// does, so that code means "digital group with explicit direction mask".
// ============================================================================

/// Analogue: an explicit int16 factor follows the color.
/// Digital: all items are outputs unless an explicit direction mask is present.
pub const FLAG_80: u8 = 0x80;
/// Digital: an explicit uint16 visibility mask follows the count.
pub const FLAG_VISIBILITY: u8 = 0x40;
/// Digital: an explicit uint16 support-only mask follows the visibility mask.
pub const FLAG_SUPPORT_ONLY: u8 = 0x20;
/// Digital: an explicit uint16 direction mask follows the optional masks.
pub const FLAG_DIRECTION: u8 = 0x04;

/// Extracts the 4-bit field type from a tag byte.
#[inline]
pub fn get_field_type(tag: u8) -> u8 {
    tag & 0x0F
}

/// Parses the field type from a tag byte.
#[inline]
pub fn parse_field_type(tag: u8) -> Option<FieldType> {
    FieldType::from_u8(get_field_type(tag))
}

#[inline]
pub fn has_flag(tag: u8, flag: u8) -> bool {
    tag & flag != 0
}

/// Whether an analogue tag carries an explicit factor.
#[inline]
pub fn analogue_has_factor(tag: u8) -> bool {
    has_flag(tag, FLAG_80)
}

/// Whether a digital tag marks all of its items as outputs.
#[inline]
pub fn digital_all_outputs(tag: u8) -> bool {
    has_flag(tag, FLAG_80)
}

#[inline]
pub fn digital_has_visibility(tag: u8) -> bool {
    has_flag(tag, FLAG_VISIBILITY)
}

#[inline]
pub fn digital_has_support_only(tag: u8) -> bool {
    has_flag(tag, FLAG_SUPPORT_ONLY)
}

#[inline]
pub fn digital_has_direction(tag: u8) -> bool {
    has_flag(tag, FLAG_DIRECTION)
}
