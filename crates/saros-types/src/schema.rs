//! Saros db schema: column names, order, and data types.
//!
//! Every document dump must list exactly these columns, in this order:
//! `id name rev prev last content`.

use std::fmt;

/// Data type of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Integer,
}

/// A column of the Saros db schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// Document id, `name-rev`.
    Id,
    /// Document name.
    Name,
    /// Revision number.
    Rev,
    /// Immediate preceding revision (0 for revision 1).
    Prev,
    /// Last revision in the chain the revision belongs to.
    Last,
    /// Document content, opaque to the repairer.
    Content,
}

impl Column {
    /// All columns in schema order.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::Rev,
        Self::Prev,
        Self::Last,
        Self::Content,
    ];

    /// Number of columns in the schema.
    pub const COUNT: usize = Self::ALL.len();

    /// Column name as it appears in element tags.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Rev => "rev",
            Self::Prev => "prev",
            Self::Last => "last",
            Self::Content => "content",
        }
    }

    /// 0-based position of the column in a dump.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn column_type(self) -> ColumnType {
        match self {
            Self::Id | Self::Name | Self::Content => ColumnType::Text,
            Self::Rev | Self::Prev | Self::Last => ColumnType::Integer,
        }
    }

    /// Whether this is the final column of the schema.
    #[must_use]
    pub const fn is_last_column(self) -> bool {
        self.index() == Self::COUNT - 1
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {:?}, {})", self.name(), self.column_type(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_order_matches_indexes() {
        for (position, col) in Column::ALL.iter().enumerate() {
            assert_eq!(col.index(), position);
        }
        assert!(Column::Content.is_last_column());
        assert!(!Column::Last.is_last_column());
    }

    #[test]
    fn integer_columns() {
        let ints: Vec<&str> = Column::ALL
            .iter()
            .filter(|col| col.column_type() == ColumnType::Integer)
            .map(|col| col.name())
            .collect();
        assert_eq!(ints, vec!["rev", "prev", "last"]);
    }

    #[test]
    fn display_shows_name_type_position() {
        assert_eq!(Column::Rev.to_string(), "(rev, Integer, 2)");
    }
}
