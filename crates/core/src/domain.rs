use std::fmt;

use crate::error::SchemaError;

/// Worksheet loaded when no name is given
pub const DEFAULT_WORKSHEET: &str = "message_de_suivis_devis";
/// Column holding the message type of each row
pub const DEFAULT_CATEGORY_COLUMN: &str = "type_mail";
/// Column holding the broker each row belongs to
pub const DEFAULT_GROUP_COLUMN: &str = "courtier";

/// The `type_mail` values broken down by the analysis
pub const MAIL_TYPE_CATEGORIES: [&str; 5] = [
    "Envoi de carte verte",
    "Envoi de devis",
    "Message de demande de documents",
    "Message de rappel d'injoignabilité",
    "Message de suivi de devis",
];

/// A category a record can be classified under (e.g. a `type_mail` value)
pub type CategoryLabel = String;

/// Returns the production category list as owned labels
pub fn mail_type_categories() -> Vec<CategoryLabel> {
    MAIL_TYPE_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// One spreadsheet cell.
///
/// `Missing` is the only way absent data is represented. An empty string or the
/// text "None" are ordinary `Present` values and never compare equal to `Missing`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    Present(String),
    Missing,
}

impl CellValue {
    pub fn present(value: impl Into<String>) -> Self {
        CellValue::Present(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Present(value) => Some(value),
            CellValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Present(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Present(value)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Missing, CellValue::Present)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Present(value) => f.write_str(value),
            CellValue::Missing => f.write_str("<missing>"),
        }
    }
}

/// One worksheet row, holding exactly one value per table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<CellValue>,
}

impl Record {
    /// Value at a column position obtained from [`Table::column_index`]
    /// on the table this record belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the table's column count.
    pub fn get(&self, index: usize) -> &CellValue {
        &self.values[index]
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }
}

/// Rows of one worksheet under a shared header. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Builds a table, padding short rows with `Missing` and dropping cells past
    /// the last column so every record matches the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(position, mut values)| {
                if values.len() > width {
                    tracing::warn!(
                        row = position + 2,
                        extra = values.len() - width,
                        "dropping cells beyond the header"
                    );
                    values.truncate(width);
                }
                values.resize(width, CellValue::Missing);
                Record { values }
            })
            .collect();

        Self { columns, records }
    }

    /// Builds a table from raw worksheet rows whose first row is the header.
    /// Returns `None` when there is no header row at all.
    pub fn from_sheet_rows(rows: Vec<Vec<String>>) -> Option<Self> {
        let mut rows = rows.into_iter();
        let header = rows.next()?;
        let body = rows
            .map(|row| row.into_iter().map(CellValue::Present).collect())
            .collect();
        Some(Self::new(header, body))
    }

    pub(crate) fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of `name` among the declared columns
    pub fn column_index(&self, name: &str) -> Result<usize, SchemaError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }
}

/// Number of records sharing one group key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: CellValue,
    pub count: usize,
}

/// Group counts ordered by count descending, ties in first-seen order
pub type AggregationResult = Vec<GroupCount>;

/// Outcome of counting one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryBreakdown {
    /// No record carries this category
    NoData,
    Counts(AggregationResult),
}

/// Count of records for one (group, category) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTabEntry {
    pub group: CellValue,
    pub category: CellValue,
    pub count: usize,
}

/// Sparse cross-tabulation; pairs with no records are absent
pub type CrossTabResult = Vec<CrossTabEntry>;
