//! Output writers for decoded DTA headers.
//!
//! Supports a CSV channel listing with selectable columns and a short
//! human-readable summary.

use crate::types::{AnalogueField, DigitalFieldItem, HeaderDescriptor};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output writing.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// A column of the channel listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// `analogue` or `digital`
    Kind,
    Category,
    Name,
    /// `#RRGGBB`
    Color,
    /// Analogue scaling factor, empty for digital channels
    Factor,
    /// `input`/`output` for digital channels decoded with attributes
    Direction,
    /// Index of the digital group, empty for analogue channels
    Group,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::Category => "category",
            Self::Name => "name",
            Self::Color => "color",
            Self::Factor => "factor",
            Self::Direction => "direction",
            Self::Group => "group",
        }
    }
}

/// Ordered column selection for the channel listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns(Vec<Column>);

impl Default for Columns {
    fn default() -> Self {
        Self(vec![
            Column::Kind,
            Column::Category,
            Column::Name,
            Column::Color,
            Column::Factor,
        ])
    }
}

impl std::str::FromStr for Columns {
    type Err = OutputError;

    /// Parses a column list like "kind,name,color".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut columns = Vec::new();

        for part in s.split(',').map(|p| p.trim().to_lowercase()) {
            let column = match part.as_str() {
                "kind" | "type" => Column::Kind,
                "category" | "cat" => Column::Category,
                "name" => Column::Name,
                "color" | "colour" => Column::Color,
                "factor" => Column::Factor,
                "direction" | "dir" => Column::Direction,
                "group" => Column::Group,
                "" => {
                    return Err(OutputError::InvalidFormat(
                        "Empty column name in list".to_string(),
                    ))
                }
                _ => {
                    return Err(OutputError::InvalidFormat(format!(
                        "Unknown column: {}. Use kind, category, name, color, factor, direction, group",
                        part
                    )))
                }
            };

            if columns.contains(&column) {
                return Err(OutputError::InvalidFormat(format!(
                    "Duplicate column: {}",
                    part
                )));
            }
            columns.push(column);
        }

        Ok(Self(columns))
    }
}

impl Columns {
    pub fn as_slice(&self) -> &[Column] {
        &self.0
    }

    /// Returns the CSV header line for this selection.
    pub fn header(&self) -> String {
        self.0
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One row of the channel listing.
enum Channel<'a> {
    Analogue(&'a AnalogueField),
    Digital { group: usize, item: &'a DigitalFieldItem },
}

impl Channel<'_> {
    fn value(&self, column: Column) -> String {
        match (self, column) {
            (Self::Analogue(_), Column::Kind) => "analogue".to_string(),
            (Self::Digital { .. }, Column::Kind) => "digital".to_string(),
            (Self::Analogue(f), Column::Category) => escape(&f.category),
            (Self::Digital { item, .. }, Column::Category) => escape(&item.category),
            (Self::Analogue(f), Column::Name) => escape(&f.name),
            (Self::Digital { item, .. }, Column::Name) => escape(&item.name),
            (Self::Analogue(f), Column::Color) => f.color.to_hex(),
            (Self::Digital { item, .. }, Column::Color) => item.color.to_hex(),
            (Self::Analogue(f), Column::Factor) => f.factor.to_string(),
            (Self::Digital { item, .. }, Column::Direction) => item
                .attributes
                .map(|a| a.direction.as_str().to_string())
                .unwrap_or_default(),
            (Self::Digital { group, .. }, Column::Group) => group.to_string(),
            (Self::Analogue(_), Column::Direction | Column::Group)
            | (Self::Digital { .. }, Column::Factor) => String::new(),
        }
    }
}

/// Quotes a CSV value when it contains a separator, quote or line break.
fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV writer for the channel listing.
///
/// Analogue channels are written first, then digital items group by group,
/// each in stream order.
pub struct CsvWriter<W: Write> {
    writer: BufWriter<W>,
    columns: Columns,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W, columns: Columns) -> Self {
        Self {
            writer: BufWriter::new(writer),
            columns,
        }
    }

    /// Writes the dataset metadata comment and the column header line.
    pub fn write_header(&mut self, header: Option<&HeaderDescriptor>) -> Result<(), OutputError> {
        if let Some(h) = header {
            writeln!(
                self.writer,
                "%datasets:{},{}",
                h.dataset_count, h.dataset_length
            )?;
        }
        writeln!(self.writer, "{}", self.columns.header())?;
        Ok(())
    }

    /// Writes every channel of a decoded header.
    pub fn write_channels(&mut self, header: &HeaderDescriptor) -> Result<(), OutputError> {
        for field in &header.analogue_fields {
            self.write_channel(&Channel::Analogue(field))?;
        }
        for (group, digital) in header.digital_fields.iter().enumerate() {
            for item in &digital.items {
                self.write_channel(&Channel::Digital { group, item })?;
            }
        }
        Ok(())
    }

    fn write_channel(&mut self, channel: &Channel<'_>) -> Result<(), OutputError> {
        let row: Vec<String> = self
            .columns
            .as_slice()
            .iter()
            .map(|&c| channel.value(c))
            .collect();
        writeln!(self.writer, "{}", row.join(","))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the channel listing of a header to a CSV file.
pub fn write_csv<P: AsRef<Path>>(
    path: P,
    header: &HeaderDescriptor,
    columns: Columns,
) -> Result<(), OutputError> {
    let file = File::create(path)?;
    let mut writer = CsvWriter::new(file, columns);
    writer.write_header(Some(header))?;
    writer.write_channels(header)?;
    writer.flush()?;
    Ok(())
}

/// Writes a human-readable summary of a decoded header.
pub fn write_summary<W: Write>(out: &mut W, header: &HeaderDescriptor) -> Result<(), OutputError> {
    writeln!(out, "  Version:      {}", header.version)?;
    writeln!(out, "  Field block:  {} bytes", header.field_block_size)?;
    writeln!(
        out,
        "  Datasets:     {} x {} bytes",
        header.dataset_count, header.dataset_length
    )?;
    writeln!(out, "  Analogue:     {}", header.analogue_fields.len())?;
    writeln!(
        out,
        "  Digital:      {} in {} groups",
        header.digital_item_count(),
        header.digital_fields.len()
    )?;
    writeln!(out, "  Channels:     {}", header.channel_count())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, DigitalAttributes, DigitalFieldGroup, Direction};
    use std::str::FromStr;

    fn sample_header() -> HeaderDescriptor {
        HeaderDescriptor {
            version: 9003,
            field_block_size: 64,
            dataset_count: 3,
            dataset_length: 12,
            analogue_fields: vec![AnalogueField {
                category: "Engine".to_string(),
                name: "Oil, hot".to_string(),
                color: Color::from_rgb(0xFF, 0x80, 0x00),
                factor: 10,
            }],
            digital_fields: vec![DigitalFieldGroup {
                items: vec![DigitalFieldItem {
                    category: "Outputs".to_string(),
                    name: "Fan".to_string(),
                    color: Color::from_rgb(0, 0, 0xFF),
                    attributes: Some(DigitalAttributes {
                        direction: Direction::Output,
                        visible: true,
                        support_only: false,
                    }),
                }],
            }],
        }
    }

    #[test]
    fn test_columns_parsing() {
        assert_eq!(Columns::from_str("kind,category,name,color,factor").unwrap(), Columns::default());
        assert_eq!(
            Columns::from_str(" Name , DIR ").unwrap().as_slice(),
            &[Column::Name, Column::Direction]
        );
    }

    #[test]
    fn test_columns_invalid() {
        assert!(Columns::from_str("name,unit").is_err());
        assert!(Columns::from_str("name,,color").is_err());
        assert!(Columns::from_str("name,name").is_err());
    }

    #[test]
    fn test_csv_writer() {
        let header = sample_header();
        let mut output = Vec::new();
        {
            let mut writer = CsvWriter::new(&mut output, Columns::default());
            writer.write_header(Some(&header)).unwrap();
            writer.write_channels(&header).unwrap();
            writer.flush().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output_str.lines().collect();
        assert_eq!(lines[0], "%datasets:3,12");
        assert_eq!(lines[1], "kind,category,name,color,factor");
        assert_eq!(lines[2], "analogue,Engine,\"Oil, hot\",#FF8000,10");
        assert_eq!(lines[3], "digital,Outputs,Fan,#0000FF,");
    }

    #[test]
    fn test_csv_writer_digital_columns() {
        let header = sample_header();
        let columns = Columns::from_str("name,direction,group").unwrap();
        let mut output = Vec::new();
        {
            let mut writer = CsvWriter::new(&mut output, columns);
            writer.write_channels(&header).unwrap();
            writer.flush().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("\"Oil, hot\",,\n"));
        assert!(output_str.contains("Fan,output,0\n"));
    }

    #[test]
    fn test_summary() {
        let mut output = Vec::new();
        write_summary(&mut output, &sample_header()).unwrap();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("Digital:      1 in 1 groups"));
        assert!(output_str.contains("Channels:     2"));
    }
}
