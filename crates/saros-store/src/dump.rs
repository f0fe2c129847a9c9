//! Attribute-list transport for a single document record.
//!
//! A dump is an ordered list of `(column, value)` attributes, one element per
//! line:
//!
//! ```text
//! <id>JE00-4</id>
//! <name>JE00</name>
//! <rev>4</rev>
//! <prev>0</prev>
//! <last>6</last>
//! <content>i am JE00-4</content>
//! ```
//!
//! Parsing only splits elements; schema and data rules are applied when the
//! dump is loaded (see [`crate::schema`]). That keeps the raw fields available
//! for error context.

use std::fmt;
use std::fs;
use std::path::Path;

use saros_error::{RawFields, Result, SarosError};
use saros_types::{Column, DocRecord};

/// Exported form of one document revision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocDump {
    fields: RawFields,
}

impl DocDump {
    /// Dump a record in schema order.
    #[must_use]
    pub fn from_record(record: &DocRecord) -> Self {
        let fields = Column::ALL
            .into_iter()
            .map(|col| {
                let value = match col {
                    Column::Id => record.id(),
                    Column::Name => record.name.clone(),
                    Column::Rev => record.rev.to_string(),
                    Column::Prev => record.prev.to_string(),
                    Column::Last => record.last.to_string(),
                    Column::Content => record.content.clone(),
                };
                (col.name().to_owned(), value)
            })
            .collect();
        Self { fields }
    }

    /// Wrap arbitrary attributes, e.g. a hand-edited export.
    #[must_use]
    pub const fn from_fields(fields: RawFields) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> RawFields {
        self.fields
    }

    /// Value of the first attribute named after `col`.
    #[must_use]
    pub fn get(&self, col: Column) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == col.name())
            .map(|(_, value)| value.as_str())
    }

    /// Overwrite every attribute named after `col`.
    ///
    /// Returns `false` if the dump has no such attribute.
    pub fn set(&mut self, col: Column, value: impl Into<String>) -> bool {
        let value = value.into();
        let mut found = false;
        for (name, slot) in &mut self.fields {
            if name == col.name() {
                slot.clone_from(&value);
                found = true;
            }
        }
        found
    }

    /// Overwrite an integer column.
    pub fn set_int(&mut self, col: Column, value: i64) -> bool {
        self.set(col, value.to_string())
    }

    /// Encode as newline-separated `<column>value</column>` elements.
    #[must_use]
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| encode_element(name, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Split encoded text back into attributes.
    ///
    /// Blank lines are ignored.
    ///
    /// # Errors
    /// Returns `SarosError::MalformedElement` for a line that is not a
    /// `<tag>value</tag>` element with matching tags.
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (name, value) = parse_element(line).ok_or_else(|| SarosError::MalformedElement {
                line: idx + 1,
                element: line.to_owned(),
            })?;
            fields.push((name.to_owned(), value.to_owned()));
        }
        Ok(Self { fields })
    }

    /// Write the encoded dump to `path`, newline terminated.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut text = self.encode();
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }

    /// Read and parse a dump file.
    pub fn read_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

impl fmt::Display for DocDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn encode_element(name: &str, value: &str) -> String {
    format!("<{name}>{value}</{name}>")
}

/// Returns `(tag, value)` for `<tag>value</tag>`.
fn parse_element(element: &str) -> Option<(&str, &str)> {
    let inner = element.strip_prefix('<')?;
    let (tag, rest) = inner.split_once('>')?;
    if tag.is_empty() || tag.starts_with('/') {
        return None;
    }
    let value = rest.strip_suffix('>')?.strip_suffix(tag)?.strip_suffix("</")?;
    Some((tag, value))
}
