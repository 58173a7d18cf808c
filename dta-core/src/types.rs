//! Core types for decoded DTA header records.
//!
//! This module defines the header descriptor produced by the decoder and the
//! field type codes carried in the low nibble of each tag byte.

/// The only header protocol version this crate understands.
pub const SUPPORTED_VERSION: u32 = 9003;

/// Scaling factor applied to analogue fields that carry no explicit factor.
pub const DEFAULT_FACTOR: i16 = 10;

/// An opaque ARGB display color.
///
/// The alpha channel is always `0xFF`; the stream only carries red, green and
/// blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Composes an opaque color from its red, green and blue components.
    #[inline]
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(0xFF00_0000 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    /// Returns the raw ARGB value.
    #[inline]
    pub fn argb(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Formats the color as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red(), self.green(), self.blue())
    }
}

/// Signal direction of a digital channel as seen from the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The logger reads the channel (bit clear in the direction mask)
    Input,
    /// The logger drives the channel (bit set in the direction mask)
    Output,
}

impl Direction {
    /// Picks the direction of item `index` from a group's direction mask.
    #[inline]
    pub fn from_mask_bit(mask: u16, index: u8) -> Self {
        if mask_bit(mask, index) {
            Self::Output
        } else {
            Self::Input
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Tests bit `index` of a 16-bit per-item mask. Indices past bit 15 read as
/// clear.
#[inline]
pub(crate) fn mask_bit(mask: u16, index: u8) -> bool {
    index < 16 && (mask >> index) & 1 != 0
}

/// An analogue sensor channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalogueField {
    /// Category in effect when the field was decoded (empty if none yet)
    pub category: String,
    /// Channel name
    pub name: String,
    /// Display color
    pub color: Color,
    /// Fixed-point divisor: a raw value of 123 with factor 10 reads as 12.3
    pub factor: i16,
}

impl AnalogueField {
    /// Converts a raw record value into engineering units.
    ///
    /// A zero factor leaves the raw value unscaled.
    pub fn scale(&self, raw: i16) -> f64 {
        if self.factor == 0 {
            raw as f64
        } else {
            raw as f64 / self.factor as f64
        }
    }
}

/// Per-item attributes of a digital channel, taken from bit `i` of the
/// group's masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalAttributes {
    pub direction: Direction,
    pub visible: bool,
    pub support_only: bool,
}

/// One boolean/discrete channel inside a digital field group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalFieldItem {
    pub category: String,
    pub name: String,
    pub color: Color,
    /// Only populated when the decoder is asked to retain digital attributes
    pub attributes: Option<DigitalAttributes>,
}

/// A batch of digital channels declared by a single tag record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitalFieldGroup {
    pub items: Vec<DigitalFieldItem>,
}

/// Field type codes carried in bits 0-3 of a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldType {
    /// Sets the running category (0x0)
    Category = 0x0,
    /// Analogue channel with color and optional factor (0x1)
    Analogue = 0x1,
    /// Digital channel group (0x2)
    Digital = 0x2,
    /// Enumerated-value channel with label list (0x3)
    Enum = 0x3,
    /// Digital channel group, alternate code (0x4)
    DigitalAlt = 0x4,
}

impl FieldType {
    /// Attempts to parse a field type from a 4-bit value.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::Category),
            0x1 => Some(Self::Analogue),
            0x2 => Some(Self::Digital),
            0x3 => Some(Self::Enum),
            0x4 => Some(Self::DigitalAlt),
            _ => None,
        }
    }
}

/// Decoded description of the channels a logger exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDescriptor {
    /// Protocol version, always [`SUPPORTED_VERSION`]
    pub version: u32,
    /// Declared length of the field-definition block in bytes
    pub field_block_size: u32,
    /// Number of data records that follow the header
    pub dataset_count: i16,
    /// Byte length of one data record
    pub dataset_length: i16,
    /// Analogue channels in stream order
    pub analogue_fields: Vec<AnalogueField>,
    /// Digital channel groups in stream order
    pub digital_fields: Vec<DigitalFieldGroup>,
}

impl HeaderDescriptor {
    /// Total number of digital channels across all groups.
    pub fn digital_item_count(&self) -> usize {
        self.digital_fields.iter().map(|g| g.items.len()).sum()
    }

    /// Total number of channels (analogue plus digital items).
    pub fn channel_count(&self) -> usize {
        self.analogue_fields.len() + self.digital_item_count()
    }
}
