//! DTA header decoder.
//!
//! Decoding runs in two phases. The preamble (version and field block size)
//! is validated first, then exactly `field_block_size` bytes are loaded and
//! walked as a stream of tagged field records. Nothing past the declared
//! block is ever read.

use crate::cursor::ByteCursor;
use crate::parser;
use crate::types::{
    AnalogueField, DigitalAttributes, DigitalFieldGroup, DigitalFieldItem, Direction, FieldType,
    HeaderDescriptor, DEFAULT_FACTOR, SUPPORTED_VERSION,
};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while decoding a header record.
///
/// Every error is terminal: no partial descriptor is ever returned.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported header version {0} (expected {expected})", expected = SUPPORTED_VERSION)]
    UnsupportedVersion(u32),

    #[error("Truncated header at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unknown field type {field_type:#x} in tag at offset {offset}")]
    UnknownFieldType { field_type: u8, offset: usize },
}

/// Size of the version + field block size preamble.
pub const PREAMBLE_LEN: usize = 8;

/// Mask value meaning "every item" for visibility, support-only and direction.
const ALL_ITEMS: u16 = 0xFFFF;

/// Options that shape the decoded descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep per-item direction/visibility/support-only bits on digital items
    pub retain_digital_attributes: bool,
}

/// One decoded tagged field record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRecord {
    Category(String),
    Analogue(AnalogueField),
    Digital(DigitalFieldGroup),
    /// Enumerated-value channel. Its labels are consumed but not kept.
    Enum { name: String, label_count: u8 },
}

/// DTA header decoder.
///
/// Holds no state between calls; each decode is independent.
#[derive(Debug, Default, Clone)]
pub struct HeaderDecoder {
    options: DecodeOptions,
}

impl HeaderDecoder {
    /// Creates a decoder with the canonical options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decodes a header record held in memory.
    ///
    /// Bytes after the declared field block are ignored.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<HeaderDescriptor, DecodeError> {
        let mut cursor = ByteCursor::new(data);

        let version = cursor.read_u32_le()?;
        check_version(version)?;

        let field_block_size = cursor.read_u32_le()?;
        let block_len = usize::try_from(field_block_size).unwrap_or(usize::MAX);
        let block = cursor.read_exact(block_len)?;

        self.decode_field_block(version, field_block_size, block)
    }

    /// Decodes a header record from a sequential byte source.
    ///
    /// Reads the preamble and then exactly `field_block_size` bytes, leaving
    /// the reader positioned at the first data record. End-of-data before
    /// that point is [`DecodeError::Truncated`]; other reader failures are
    /// passed through as [`DecodeError::Io`].
    pub fn decode_reader<R: Read>(&self, reader: &mut R) -> Result<HeaderDescriptor, DecodeError> {
        let version = LittleEndian::read_u32(&take(reader, 0, 4)?);
        check_version(version)?;

        let field_block_size = LittleEndian::read_u32(&take(reader, 4, 4)?);
        let block = take(reader, PREAMBLE_LEN, field_block_size as u64)?;

        self.decode_field_block(version, field_block_size, &block)
    }

    /// Decodes the header record at the start of a file.
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<HeaderDescriptor, DecodeError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        self.decode_reader(&mut reader)
    }

    /// Walks the tagged records of a loaded field-definition block.
    fn decode_field_block(
        &self,
        version: u32,
        field_block_size: u32,
        block: &[u8],
    ) -> Result<HeaderDescriptor, DecodeError> {
        let mut cursor = ByteCursor::with_base(block, PREAMBLE_LEN);

        let dataset_count = cursor.read_i16_le()?;
        let dataset_length = cursor.read_i16_le()?;
        debug!(
            "header v{}: field block {} bytes, {} datasets of {} bytes",
            version, field_block_size, dataset_count, dataset_length
        );

        // Running category, replaced by each Category tag
        let mut category = String::new();
        let mut analogue_fields = Vec::new();
        let mut digital_fields = Vec::new();

        while cursor.has_remaining() {
            let offset = cursor.offset();
            let tag = cursor.read_u8()?;
            trace!("tag {:#04x} at offset {}", tag, offset);

            match decode_record(tag, offset, &mut cursor, &category, &self.options)? {
                FieldRecord::Category(name) => category = name,
                FieldRecord::Analogue(field) => analogue_fields.push(field),
                FieldRecord::Digital(group) => digital_fields.push(group),
                FieldRecord::Enum { .. } => {}
            }
        }

        debug!(
            "decoded {} analogue fields, {} digital groups",
            analogue_fields.len(),
            digital_fields.len()
        );

        Ok(HeaderDescriptor {
            version,
            field_block_size,
            dataset_count,
            dataset_length,
            analogue_fields,
            digital_fields,
        })
    }
}

/// Decodes a header record held in memory with the canonical options.
pub fn decode(data: &[u8]) -> Result<HeaderDescriptor, DecodeError> {
    HeaderDecoder::new().decode_bytes(data)
}

fn check_version(version: u32) -> Result<(), DecodeError> {
    if version != SUPPORTED_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Reads exactly `len` bytes from `reader` without trusting `len` for the
/// allocation size.
fn take<R: Read>(reader: &mut R, offset: usize, len: u64) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(DecodeError::Truncated {
            offset: offset + buf.len(),
            needed: usize::try_from(len).unwrap_or(usize::MAX) - buf.len(),
            available: 0,
        });
    }
    Ok(buf)
}

/// Decodes the payload of one tagged record whose tag byte has already been
/// consumed from `cursor`.
///
/// `offset` is the position of the tag byte, used for error reporting.
/// `category` is the running category applied to any fields produced.
pub fn decode_record(
    tag: u8,
    offset: usize,
    cursor: &mut ByteCursor<'_>,
    category: &str,
    options: &DecodeOptions,
) -> Result<FieldRecord, DecodeError> {
    let Some(field_type) = parser::parse_field_type(tag) else {
        return Err(DecodeError::UnknownFieldType {
            field_type: parser::get_field_type(tag),
            offset,
        });
    };

    match field_type {
        FieldType::Category => Ok(FieldRecord::Category(cursor.read_nul_terminated_string()?)),
        FieldType::Analogue => decode_analogue(tag, cursor, category).map(FieldRecord::Analogue),
        FieldType::Digital | FieldType::DigitalAlt => {
            decode_digital(tag, cursor, category, options).map(FieldRecord::Digital)
        }
        FieldType::Enum => decode_enum(cursor),
    }
}

/// Analogue payload: name, color, then an int16 factor if flagged.
pub fn decode_analogue(
    tag: u8,
    cursor: &mut ByteCursor<'_>,
    category: &str,
) -> Result<AnalogueField, DecodeError> {
    let name = cursor.read_nul_terminated_string()?;
    let color = cursor.read_color()?;
    let factor = if parser::analogue_has_factor(tag) {
        cursor.read_i16_le()?
    } else {
        DEFAULT_FACTOR
    };

    Ok(AnalogueField {
        category: category.to_string(),
        name,
        color,
        factor,
    })
}

/// Digital payload: item count, optional visibility / support-only /
/// direction masks, then a name and color per item.
pub fn decode_digital(
    tag: u8,
    cursor: &mut ByteCursor<'_>,
    category: &str,
    options: &DecodeOptions,
) -> Result<DigitalFieldGroup, DecodeError> {
    let count = cursor.read_u8()?;

    let visibility = if parser::digital_has_visibility(tag) {
        cursor.read_u16_le()?
    } else {
        ALL_ITEMS
    };
    let support_only = if parser::digital_has_support_only(tag) {
        cursor.read_u16_le()?
    } else {
        ALL_ITEMS
    };
    let direction = if parser::digital_has_direction(tag) {
        cursor.read_u16_le()?
    } else if parser::digital_all_outputs(tag) {
        ALL_ITEMS
    } else {
        0
    };

    let mut items = Vec::with_capacity(count as usize);
    for i in 0..count {
        let name = cursor.read_nul_terminated_string()?;
        let color = cursor.read_color()?;
        let attributes = options
            .retain_digital_attributes
            .then(|| DigitalAttributes {
                direction: Direction::from_mask_bit(direction, i),
                visible: crate::types::mask_bit(visibility, i),
                support_only: crate::types::mask_bit(support_only, i),
            });

        items.push(DigitalFieldItem {
            category: category.to_string(),
            name,
            color,
            attributes,
        });
    }

    Ok(DigitalFieldGroup { items })
}

/// Enum payload: name, label count, then the labels. Labels only advance the
/// cursor.
fn decode_enum(cursor: &mut ByteCursor<'_>) -> Result<FieldRecord, DecodeError> {
    let name = cursor.read_nul_terminated_string()?;
    let label_count = cursor.read_u8()?;
    for _ in 0..label_count {
        let label = cursor.read_nul_terminated_string()?;
        trace!("enum {}: skipping label {:?}", name, label);
    }
    Ok(FieldRecord::Enum { name, label_count })
}
