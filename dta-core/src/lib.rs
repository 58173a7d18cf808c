//! Decoder library for DTA datalogger header records.
//!
//! A DTA logger prefixes its data records with a tagged binary header that
//! describes every channel it will send: analogue sensor channels, digital
//! channel groups and enumerated-value channels. This crate turns that header
//! into a [`HeaderDescriptor`].
//!
//! # Example
//!
//! ```no_run
//! use dta_core::decoder::HeaderDecoder;
//!
//! let decoder = HeaderDecoder::new();
//! let header = decoder.decode_file("logger.dta").unwrap();
//!
//! println!("{} analogue channels", header.analogue_fields.len());
//! for field in &header.analogue_fields {
//!     println!("{}/{} x1/{}", field.category, field.name, field.factor);
//! }
//! ```
//!
//! # Features
//!
//! - Decoding from memory, any `std::io::Read` source, or a file
//! - Strict bounds: nothing past the declared field block is read
//! - Optional per-item direction and visibility attributes for digital channels
//! - CSV channel listing output

pub mod cursor;
pub mod decoder;
pub mod output;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use cursor::ByteCursor;
pub use decoder::{decode, DecodeError, DecodeOptions, FieldRecord, HeaderDecoder};
pub use output::{Columns, OutputError};
pub use types::{
    AnalogueField, Color, DigitalAttributes, DigitalFieldGroup, DigitalFieldItem, Direction,
    FieldType, HeaderDescriptor, DEFAULT_FACTOR, SUPPORTED_VERSION,
};
