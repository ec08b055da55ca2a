//! Stored table values
//!
//! The grid editor submits its state as a JSON document of the form
//! `{"data": [[...]], "first_row_is_table_header": bool, "first_col_is_header": bool}`.
//! That shape is persisted as-is and must stay stable across releases.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// A single grid cell. Empty cells are stored as JSON `null`.
pub type Cell = Option<String>;

/// A row of cells. Rows are not required to share a length.
pub type Row = Vec<Cell>;

/// Tabular data authored in the grid editor
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::value::TableValue;
///
/// let value = TableValue::from_rows(vec![vec!["H1", "H2"], vec!["a", "b"]])
///     .with_header_row(true);
///
/// assert_eq!(value.header_row().unwrap()[0].as_deref(), Some("H1"));
/// assert_eq!(value.body_rows().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableValue {
	/// Grid rows in display order
	#[serde(default, deserialize_with = "deserialize_rows")]
	pub data: Vec<Row>,

	/// Whether the first row is rendered as the table header
	#[serde(default, deserialize_with = "null_as_default")]
	pub first_row_is_table_header: bool,

	/// Whether the first cell of every row is rendered as a row header
	#[serde(default, deserialize_with = "null_as_default")]
	pub first_col_is_header: bool,
}

impl TableValue {
	/// Create a table with no rows and both header flags off
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a table from plain string rows
	pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
	where
		R: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			data: rows
				.into_iter()
				.map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
				.collect(),
			..Self::default()
		}
	}

	/// Set the header-row flag
	pub fn with_header_row(mut self, first_row_is_table_header: bool) -> Self {
		self.first_row_is_table_header = first_row_is_table_header;
		self
	}

	/// Set the header-column flag
	pub fn with_header_col(mut self, first_col_is_header: bool) -> Self {
		self.first_col_is_header = first_col_is_header;
		self
	}

	/// True when the grid holds no rows
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// The header row, present only when the header flag is set and data is non-empty
	pub fn header_row(&self) -> Option<&Row> {
		if self.first_row_is_table_header {
			self.data.first()
		} else {
			None
		}
	}

	/// Rows rendered in the table body
	pub fn body_rows(&self) -> &[Row] {
		match self.header_row() {
			Some(_) => &self.data[1..],
			None => &self.data,
		}
	}

	/// Every non-empty cell in row-major order, ignoring the header distinction
	pub fn searchable_content(&self) -> Vec<String> {
		self.data
			.iter()
			.flatten()
			.filter_map(|cell| cell.as_deref())
			.filter(|cell| !cell.is_empty())
			.map(str::to_string)
			.collect()
	}
}

/// Value of the composite table block: display toggles plus the grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlockValue {
	/// Allow readers to search the table's contents
	#[serde(default, deserialize_with = "null_as_default")]
	pub enable_search: bool,

	/// Paginate long tables in place
	#[serde(default, deserialize_with = "null_as_default")]
	pub enable_pagination: bool,

	/// Allow readers to sort by column
	#[serde(default, deserialize_with = "null_as_default")]
	pub enable_sorting: bool,

	/// The authored grid, absent until the editor saves one
	#[serde(default, rename = "table_json", alias = "table")]
	pub table: Option<TableValue>,
}

impl TableBlockValue {
	/// Wrap a table with all toggles off
	pub fn new(table: TableValue) -> Self {
		Self {
			table: Some(table),
			..Self::default()
		}
	}

	/// The grid, if one has been authored
	pub fn table(&self) -> Option<&TableValue> {
		self.table.as_ref()
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The grid emits numbers and booleans for some editors; they are kept as text.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Row>, D::Error>
where
	D: Deserializer<'de>,
{
	let rows: Option<Vec<Option<Vec<JsonValue>>>> = Option::deserialize(deserializer)?;
	rows.unwrap_or_default()
		.into_iter()
		.map(|row| {
			row.unwrap_or_default()
				.into_iter()
				.map(cell_from_json)
				.collect::<Result<Row, _>>()
		})
		.collect::<Result<Vec<Row>, String>>()
		.map_err(serde::de::Error::custom)
}

fn cell_from_json(value: JsonValue) -> Result<Cell, String> {
	match value {
		JsonValue::Null => Ok(None),
		JsonValue::String(s) => Ok(Some(s)),
		JsonValue::Number(n) => Ok(Some(n.to_string())),
		JsonValue::Bool(b) => Ok(Some(b.to_string())),
		other => Err(format!("table cell must be a scalar, got {}", other)),
	}
}
