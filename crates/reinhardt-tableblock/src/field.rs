//! Table input field
//!
//! [`TableInputBlock`] bridges the hidden string input carried by the editor
//! and the structured [`TableValue`] stored in page content.

use crate::blocks::{Block, BlockMeta, BlockType};
use crate::error::{FieldError, FieldResult, TableBlockError, TableBlockResult};
use crate::options::{OptionsResolver, TableOptions};
use crate::render::{RenderContext, TableRenderer, render_basic};
use crate::value::TableValue;
use crate::widget::{Media, TableInput};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const REQUIRED_MESSAGE: &str = "This field is required.";
const INVALID_MESSAGE: &str = "Enter valid table data.";

/// Conversion between the editor's string payload and stored table values
pub trait TableFieldAdapter {
	/// Decode submitted JSON. `null` decodes to an absent value.
	fn parse(&self, raw: &str) -> TableBlockResult<Option<TableValue>>;

	/// Encode a value for the editor. An absent value encodes to `null`.
	fn serialize(&self, value: Option<&TableValue>) -> TableBlockResult<String>;

	/// The resolved options handed to the grid editor
	fn describe_options(&self) -> &TableOptions;
}

/// Decode a stored or submitted table document
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::field::parse_table;
///
/// let table = parse_table(r#"{"data": [["a", "b"]]}"#).unwrap().unwrap();
/// assert_eq!(table.data[0].len(), 2);
///
/// assert!(parse_table("null").unwrap().is_none());
/// assert!(parse_table("not json").is_err());
/// ```
pub fn parse_table(raw: &str) -> TableBlockResult<Option<TableValue>> {
	serde_json::from_str(raw).map_err(|e| {
		warn!(error = %e, "rejecting malformed table data");
		TableBlockError::MalformedTableData(e)
	})
}

/// Encode a table document in its persisted form
pub fn serialize_table(value: Option<&TableValue>) -> TableBlockResult<String> {
	serde_json::to_string(&value).map_err(TableBlockError::Serialization)
}

fn is_empty_document(document: &JsonValue) -> bool {
	match document {
		JsonValue::Null => true,
		JsonValue::Object(map) => map.is_empty(),
		_ => false,
	}
}

/// Form field block holding a single table
///
/// Options are resolved once at construction: the caller's overrides are
/// merged over the defaults and the grid language is taken from `locale`.
#[derive(Debug, Clone)]
pub struct TableInputBlock {
	meta: BlockMeta,
	table_options: TableOptions,
	required: bool,
	widget: TableInput,
}

impl TableInputBlock {
	/// Create a required table field with the default language fallback
	pub fn new(table_options: Option<&TableOptions>, locale: Option<&str>) -> Self {
		Self::with_resolver(&OptionsResolver::default(), table_options, locale)
	}

	/// Create a required table field using `resolver` for option defaults
	pub fn with_resolver(
		resolver: &OptionsResolver,
		table_options: Option<&TableOptions>,
		locale: Option<&str>,
	) -> Self {
		let table_options = resolver.resolve(table_options, locale);
		Self {
			meta: BlockMeta::new("Table"),
			widget: TableInput::new(table_options.clone()),
			table_options,
			required: true,
		}
	}

	/// Set whether an empty submission is rejected
	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	/// Help text shown below the editor
	pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
		self.meta.help_text = Some(help_text.into());
		self
	}

	/// Label shown next to the editor
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.meta.label = label.into();
		self
	}

	/// Render through `template` instead of the basic table markup
	pub fn template(mut self, template: impl Into<String>) -> Self {
		self.meta.template = Some(template.into());
		self
	}

	/// Render the editor through `template` instead of the bundled widget template
	pub fn widget_template(mut self, template: impl Into<String>) -> Self {
		self.widget = self.widget.with_template(template);
		self
	}

	/// Whether an empty submission is rejected
	pub fn is_required(&self) -> bool {
		self.required
	}

	/// Resolved grid editor options
	pub fn table_options(&self) -> &TableOptions {
		&self.table_options
	}

	/// The editor widget
	pub fn widget(&self) -> &TableInput {
		&self.widget
	}

	/// Editor assets
	pub fn media(&self) -> Media {
		Media::table_input()
	}

	pub fn is_html_renderer(&self) -> bool {
		self.table_options.is_html_renderer()
	}

	/// Validate a submitted string
	///
	/// Blank input is rejected when the field is required and yields `None`
	/// otherwise. Malformed JSON is a validation error, never a panic.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tableblock::field::TableInputBlock;
	///
	/// let field = TableInputBlock::new(None, None);
	/// assert!(field.clean(Some(r#"{"data": [["a"]]}"#)).unwrap().is_some());
	/// assert!(field.clean(Some("{oops")).is_err());
	/// assert!(field.clean(Some("{}")).is_err());
	/// assert!(field.clean(None).is_err());
	/// ```
	pub fn clean(&self, raw: Option<&str>) -> FieldResult<Option<TableValue>> {
		match raw {
			Some(raw) => self.clean_value(Some(&JsonValue::String(raw.to_string()))),
			None => self.clean_value(None),
		}
	}

	/// Validate table data given as the editor's JSON string or as a decoded document
	///
	/// `null`, a blank string, and `{}` all count as empty.
	pub fn clean_value(&self, value: Option<&JsonValue>) -> FieldResult<Option<TableValue>> {
		let document = match value {
			None | Some(JsonValue::Null) => None,
			Some(JsonValue::String(raw)) if raw.trim().is_empty() => None,
			Some(JsonValue::String(raw)) => {
				Some(serde_json::from_str::<JsonValue>(raw).map_err(|e| {
					warn!(error = %e, "rejecting malformed table data");
					FieldError::Validation(INVALID_MESSAGE.to_string())
				})?)
			}
			Some(other) => Some(other.clone()),
		};

		let Some(document) = document.filter(|document| !is_empty_document(document)) else {
			if self.required {
				return Err(FieldError::Required(REQUIRED_MESSAGE.to_string()));
			}
			return Ok(None);
		};

		serde_json::from_value::<TableValue>(document)
			.map(Some)
			.map_err(|_| FieldError::Validation(INVALID_MESSAGE.to_string()))
	}

	/// Whether the submitted table differs from the initial one
	pub fn has_changed(&self, initial: Option<&TableValue>, data: Option<&TableValue>) -> bool {
		initial != data
	}

	/// Render the hidden input and grid editor container
	pub fn render_form(
		&self,
		renderer: &TableRenderer,
		name: &str,
		value: Option<&TableValue>,
		attrs: Option<&BTreeMap<String, String>>,
	) -> TableBlockResult<String> {
		let raw = self.serialize(value)?;
		self.widget.render(renderer, name, Some(&raw), attrs)
	}
}

impl TableFieldAdapter for TableInputBlock {
	fn parse(&self, raw: &str) -> TableBlockResult<Option<TableValue>> {
		parse_table(raw)
	}

	fn serialize(&self, value: Option<&TableValue>) -> TableBlockResult<String> {
		serialize_table(value)
	}

	fn describe_options(&self) -> &TableOptions {
		&self.table_options
	}
}

impl Block for TableInputBlock {
	type Value = TableValue;

	fn block_type(&self) -> BlockType {
		"table_input".to_string()
	}

	fn meta(&self) -> &BlockMeta {
		&self.meta
	}

	fn render(
		&self,
		renderer: &TableRenderer,
		value: Option<&TableValue>,
		context: Option<&Map<String, JsonValue>>,
	) -> TableBlockResult<String> {
		match (self.meta.template.as_deref(), value) {
			(Some(template), Some(table)) => {
				debug!(template, "rendering table input through template");
				let ctx = RenderContext::new(table, table, &self.table_options);
				renderer.render(template, &ctx, context)
			}
			_ => Ok(self.render_basic(value)),
		}
	}

	fn render_basic(&self, value: Option<&TableValue>) -> String {
		render_basic(value)
	}

	fn searchable_content(&self, value: Option<&TableValue>) -> Vec<String> {
		value.map(TableValue::searchable_content).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::render::TABLE_BLOCK_TEMPLATE;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn field() -> TableInputBlock {
		TableInputBlock::new(None, Some("en-us"))
	}

	#[rstest]
	fn test_parse_malformed(field: TableInputBlock) {
		let result = field.parse("{\"data\": [");

		assert!(matches!(result, Err(TableBlockError::MalformedTableData(_))));
	}

	#[rstest]
	fn test_parse_wrong_shape(field: TableInputBlock) {
		let result = field.parse("[1, 2, 3]");

		assert!(matches!(result, Err(TableBlockError::MalformedTableData(_))));
	}

	#[rstest]
	fn test_serialize_absent_value(field: TableInputBlock) {
		assert_eq!(field.serialize(None).unwrap(), "null");
		assert_eq!(field.parse("null").unwrap(), None);
	}

	#[rstest]
	fn test_round_trip_ragged_rows(field: TableInputBlock) {
		// Arrange
		let value = TableValue {
			data: vec![
				vec![Some("a".to_string())],
				vec![None, Some("b".to_string()), Some(String::new())],
				vec![],
			],
			first_row_is_table_header: true,
			first_col_is_header: false,
		};

		// Act
		let raw = field.serialize(Some(&value)).unwrap();
		let parsed = field.parse(&raw).unwrap();

		// Assert
		assert_eq!(parsed, Some(value));
	}

	#[rstest]
	#[case(None)]
	#[case(Some(""))]
	#[case(Some("   "))]
	#[case(Some("null"))]
	#[case(Some("{}"))]
	fn test_clean_required(field: TableInputBlock, #[case] raw: Option<&str>) {
		let result = field.clean(raw);

		assert_eq!(
			result,
			Err(FieldError::Required("This field is required.".to_string()))
		);
	}

	#[rstest]
	fn test_clean_optional_blank() {
		let field = TableInputBlock::new(None, None).required(false);

		assert_eq!(field.clean(Some("")), Ok(None));
		assert_eq!(field.clean(Some("null")), Ok(None));
		assert_eq!(field.clean(Some(" {} ")), Ok(None));
	}

	#[rstest]
	fn test_clean_malformed_is_validation_error(field: TableInputBlock) {
		let result = field.clean(Some("not json"));

		assert_eq!(
			result,
			Err(FieldError::Validation("Enter valid table data.".to_string()))
		);
	}

	#[rstest]
	#[case(json!({}))]
	#[case(json!(null))]
	#[case(json!("{}"))]
	fn test_clean_value_empty_documents_are_required(
		field: TableInputBlock,
		#[case] document: JsonValue,
	) {
		let result = field.clean_value(Some(&document));

		assert!(matches!(result, Err(FieldError::Required(_))));
	}

	#[rstest]
	#[case(json!({"data": [["a"]]}))]
	#[case(json!(r#"{"data": [["a"]]}"#))]
	fn test_clean_value_accepts_string_or_object(
		field: TableInputBlock,
		#[case] document: JsonValue,
	) {
		let value = field.clean_value(Some(&document)).unwrap();

		assert_eq!(value, Some(TableValue::from_rows(vec![vec!["a"]])));
	}

	#[rstest]
	#[case(json!([["a"]]))]
	#[case(json!("\"text\""))]
	fn test_clean_value_rejects_other_shapes(field: TableInputBlock, #[case] document: JsonValue) {
		let result = field.clean_value(Some(&document));

		assert_eq!(
			result,
			Err(FieldError::Validation("Enter valid table data.".to_string()))
		);
	}

	#[rstest]
	fn test_has_changed(field: TableInputBlock) {
		let a = TableValue::from_rows(vec![vec!["a"]]);
		let b = TableValue::from_rows(vec![vec!["b"]]);

		assert!(!field.has_changed(Some(&a), Some(&a.clone())));
		assert!(field.has_changed(Some(&a), Some(&b)));
		assert!(field.has_changed(None, Some(&a)));
	}

	#[rstest]
	fn test_describe_options_is_resolved(field: TableInputBlock) {
		let options = field.describe_options();

		assert_eq!(options.language(), Some("en"));
		assert_eq!(options, field.widget().table_options());
	}

	#[rstest]
	fn test_render_without_template_is_basic(field: TableInputBlock) {
		let renderer = TableRenderer::new().unwrap();
		let value = TableValue::from_rows(vec![vec!["a"]]).with_header_row(true);

		let html = field.render(&renderer, Some(&value), None).unwrap();

		assert_eq!(html, "<table><tr><td>a</td></tr></table>");
	}

	#[rstest]
	fn test_render_with_template_splits_header() {
		// Arrange
		let renderer = TableRenderer::new().unwrap();
		let field = TableInputBlock::new(None, None).template(TABLE_BLOCK_TEMPLATE);
		let value = TableValue::from_rows(vec![vec!["H1"], vec!["a"]]).with_header_row(true);

		// Act
		let html = field.render(&renderer, Some(&value), None).unwrap();

		// Assert
		assert!(html.contains(r#"<th scope="col">H1</th>"#));
		assert!(html.contains("<td>a</td>"));
		assert!(!html.contains("data-searching"));
	}

	#[rstest]
	fn test_render_empty_table_with_template() {
		let renderer = TableRenderer::new().unwrap();
		let field = TableInputBlock::new(None, None).template(TABLE_BLOCK_TEMPLATE);

		let html = field.render(&renderer, Some(&TableValue::new()), None).unwrap();

		assert!(html.contains(r#"<table class="tableblock">"#));
		assert!(!html.contains("<tr>"));
	}

	#[rstest]
	fn test_render_absent_value_with_template() {
		let renderer = TableRenderer::new().unwrap();
		let field = TableInputBlock::new(None, None).template(TABLE_BLOCK_TEMPLATE);

		assert_eq!(field.render(&renderer, None, None).unwrap(), "");
	}

	#[rstest]
	fn test_searchable_content_of_absent_value(field: TableInputBlock) {
		assert!(field.searchable_content(None).is_empty());
	}

	#[rstest]
	fn test_render_form_embeds_value(field: TableInputBlock) {
		let renderer = TableRenderer::new().unwrap();
		let value = TableValue::from_rows(vec![vec!["a"]]);

		let html = field.render_form(&renderer, "table_json", Some(&value), None).unwrap();

		assert!(html.contains(r#"name="table_json""#));
		assert!(html.contains("&quot;data&quot;"));
	}

	#[rstest]
	fn test_render_form_with_widget_template() {
		// Arrange
		let mut renderer = TableRenderer::new().unwrap();
		renderer
			.add_raw_template("site/editor.html", "editor:{{ widget.name }}")
			.unwrap();
		let field = TableInputBlock::new(None, None).widget_template("site/editor.html");

		// Act
		let html = field.render_form(&renderer, "table_json", None, None).unwrap();

		// Assert
		assert_eq!(field.widget().template(), "site/editor.html");
		assert_eq!(html, "editor:table_json");
	}
}
