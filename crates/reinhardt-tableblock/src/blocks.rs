//! StreamField blocks for tables
//!
//! [`TableBlock`] is the composite block placed in page content: three display
//! toggles plus a [`TableInputBlock`]. On render it splits the header row from
//! the body and hands the result to the block template.

use crate::error::{FieldError, FieldResult, TableBlockError, TableBlockResult};
use crate::field::TableInputBlock;
use crate::options::TableOptions;
use crate::registry::FeatureRegistrar;
use crate::render::{
	DisplayToggles, RenderContext, TABLE_BLOCK_TEMPLATE, TableRenderer, render_basic,
};
use crate::value::{TableBlockValue, TableValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// Block type identifier
pub type BlockType = String;

/// Block trait for table content blocks
pub trait Block {
	/// Stored value of the block
	type Value: Serialize + DeserializeOwned;

	/// Get the block type identifier
	fn block_type(&self) -> BlockType;

	/// Label, icon, and template configuration
	fn meta(&self) -> &BlockMeta;

	/// Render a value to HTML, layering the block's variables over `context`
	fn render(
		&self,
		renderer: &TableRenderer,
		value: Option<&Self::Value>,
		context: Option<&Map<String, JsonValue>>,
	) -> TableBlockResult<String>;

	/// Render a value without a template
	fn render_basic(&self, value: Option<&Self::Value>) -> String;

	/// Text handed to the search indexer
	fn searchable_content(&self, value: Option<&Self::Value>) -> Vec<String>;

	/// Serialize block data to JSON
	fn to_json(&self, value: &Self::Value) -> TableBlockResult<JsonValue> {
		serde_json::to_value(value).map_err(TableBlockError::Serialization)
	}

	/// Deserialize block data from JSON
	fn from_json(&self, value: JsonValue) -> TableBlockResult<Self::Value> {
		serde_json::from_value(value).map_err(TableBlockError::MalformedTableData)
	}
}

/// Editor-facing block configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMeta {
	/// Human-readable name shown in the editor
	pub label: String,
	/// Editor icon name
	pub icon: String,
	/// Template used by `render`; `None` renders basic markup
	pub template: Option<String>,
	/// Guidance shown below the editor
	pub help_text: Option<String>,
}

impl BlockMeta {
	/// Metadata with the given label, a placeholder icon, and no template
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			icon: "placeholder".to_string(),
			template: None,
			help_text: None,
		}
	}
}

/// A boolean child of [`TableBlock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleBlock {
	/// Key in the stored value
	pub name: &'static str,
	/// Value used when the key is absent
	pub default: bool,
	/// Guidance shown next to the checkbox
	pub help_text: &'static str,
}

/// The display toggles, in form order
pub const TOGGLE_BLOCKS: [ToggleBlock; 3] = [
	ToggleBlock {
		name: "enable_search",
		default: false,
		help_text: "Allow users to search the table's contents.",
	},
	ToggleBlock {
		name: "enable_pagination",
		default: false,
		help_text: "If the table is very long, you may wish to paginate it, which users can navigate without leaving the page that the table is on.",
	},
	ToggleBlock {
		name: "enable_sorting",
		default: false,
		help_text: "Allow users to sort the table by individual columns.",
	},
];

/// Form key of the table child
pub const TABLE_FIELD_NAME: &str = "table_json";

const TABLE_HELP_TEXT: &str =
	"This widget behaves very similarly to Excel. Try right-clicking to access the context menu.";

/// Searchable, sortable, paginated table block
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::blocks::{Block, TableBlock};
/// use reinhardt_tableblock::render::TableRenderer;
/// use reinhardt_tableblock::value::{TableBlockValue, TableValue};
///
/// let block = TableBlock::new(None, Some("en-us"));
/// let renderer = TableRenderer::new().unwrap();
/// let value = TableBlockValue::new(
///     TableValue::from_rows(vec![vec!["Name"], vec!["Ada"]]).with_header_row(true),
/// );
///
/// let html = block.render(&renderer, Some(&value), None).unwrap();
/// assert!(html.contains("<th scope=\"col\">Name</th>"));
/// ```
#[derive(Debug, Clone)]
pub struct TableBlock {
	meta: BlockMeta,
	table: TableInputBlock,
}

impl TableBlock {
	/// Name under which the block is registered
	pub const NAME: &'static str = "TableBlock";

	/// Registry category the block belongs to
	pub const FEATURE_TYPE: &'static str = "default";

	/// Create a table block with options resolved for `locale`
	pub fn new(table_options: Option<&TableOptions>, locale: Option<&str>) -> Self {
		Self::with_table(TableInputBlock::new(table_options, locale))
	}

	/// Wrap an existing table field
	pub fn with_table(table: TableInputBlock) -> Self {
		Self {
			meta: BlockMeta {
				label: "Table Block".to_string(),
				icon: "table".to_string(),
				template: Some(TABLE_BLOCK_TEMPLATE.to_string()),
				help_text: None,
			},
			table: table.label("Table").help_text(TABLE_HELP_TEXT),
		}
	}

	/// Replace the block template; `None` always renders basic markup
	pub fn template(mut self, template: Option<String>) -> Self {
		self.meta.template = template;
		self
	}

	/// The table child
	pub fn table(&self) -> &TableInputBlock {
		&self.table
	}

	/// The boolean children
	pub fn toggles(&self) -> &'static [ToggleBlock] {
		&TOGGLE_BLOCKS
	}

	/// Register the block under its category; a missing registry is a no-op
	///
	/// Returns whether a registration took place.
	pub fn register(registrar: Option<&mut dyn FeatureRegistrar>) -> bool {
		match registrar {
			Some(registrar) => {
				debug!(
					feature_type = Self::FEATURE_TYPE,
					name = Self::NAME,
					"registering table block"
				);
				registrar.register_feature(Self::FEATURE_TYPE, Self::NAME);
				true
			}
			None => false,
		}
	}

	/// Build a block value from submitted form data
	///
	/// Toggles accept booleans or checkbox strings (`"on"`, `"true"`); missing
	/// toggles take their defaults. The table is accepted either as the
	/// editor's JSON string or as an already-decoded object.
	pub fn clean(&self, form: &Map<String, JsonValue>) -> FieldResult<TableBlockValue> {
		let toggle = |name: &str| -> FieldResult<bool> {
			let default = TOGGLE_BLOCKS
				.iter()
				.find(|t| t.name == name)
				.map(|t| t.default)
				.unwrap_or(false);
			match form.get(name) {
				None | Some(JsonValue::Null) => Ok(default),
				Some(JsonValue::Bool(b)) => Ok(*b),
				Some(JsonValue::String(s)) => Ok(matches!(s.as_str(), "on" | "true" | "1")),
				Some(_) => Err(FieldError::Validation(format!(
					"Enter a valid boolean for {}.",
					name
				))),
			}
		};

		let table = self.table.clean_value(form.get(TABLE_FIELD_NAME))?;

		Ok(TableBlockValue {
			enable_search: toggle("enable_search")?,
			enable_pagination: toggle("enable_pagination")?,
			enable_sorting: toggle("enable_sorting")?,
			table,
		})
	}

	/// Template variables for `value`, or `None` when no table has been authored
	///
	/// A table without rows still yields a context with empty `data`.
	pub fn render_context<'a>(
		&self,
		value: &'a TableBlockValue,
	) -> Option<RenderContext<'a, TableBlockValue>> {
		let table = value.table()?;
		Some(
			RenderContext::new(value, table, self.table.table_options())
				.with_toggles(DisplayToggles::from(value)),
		)
	}
}

impl Block for TableBlock {
	type Value = TableBlockValue;

	fn block_type(&self) -> BlockType {
		"table".to_string()
	}

	fn meta(&self) -> &BlockMeta {
		&self.meta
	}

	fn render(
		&self,
		renderer: &TableRenderer,
		value: Option<&TableBlockValue>,
		context: Option<&Map<String, JsonValue>>,
	) -> TableBlockResult<String> {
		let template = self.meta.template.as_deref();
		let block_context = value.and_then(|value| self.render_context(value));

		match (template, block_context) {
			(Some(template), Some(block_context)) => {
				debug!(template, "rendering table block through template");
				renderer.render(template, &block_context, context)
			}
			_ => {
				debug!("rendering table block without template");
				Ok(self.render_basic(value))
			}
		}
	}

	fn render_basic(&self, value: Option<&TableBlockValue>) -> String {
		render_basic(value.and_then(|value| value.table.as_ref()))
	}

	fn searchable_content(&self, value: Option<&TableBlockValue>) -> Vec<String> {
		value
			.and_then(|value| value.table.as_ref())
			.map(TableValue::searchable_content)
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::FeatureRegistry;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn block() -> TableBlock {
		TableBlock::new(None, Some("en-us"))
	}

	#[fixture]
	fn renderer() -> TableRenderer {
		TableRenderer::new().unwrap()
	}

	fn form(value: JsonValue) -> Map<String, JsonValue> {
		match value {
			JsonValue::Object(map) => map,
			_ => panic!("form data must be an object"),
		}
	}

	#[rstest]
	fn test_meta(block: TableBlock) {
		assert_eq!(block.meta().label, "Table Block");
		assert_eq!(block.meta().icon, "table");
		assert_eq!(block.meta().template.as_deref(), Some(TABLE_BLOCK_TEMPLATE));
		assert_eq!(block.table().meta().label, "Table");
		assert_eq!(block.table().meta().help_text.as_deref(), Some(TABLE_HELP_TEXT));
		assert_eq!(block.toggles().len(), 3);
		assert!(block.toggles().iter().all(|t| !t.default));
	}

	#[rstest]
	fn test_render_context_header_split(block: TableBlock) {
		// Arrange
		let value = TableBlockValue::new(
			TableValue::from_rows(vec![vec!["H1", "H2"], vec!["a", "b"]]).with_header_row(true),
		);

		// Act
		let context = serde_json::to_value(block.render_context(&value).unwrap()).unwrap();

		// Assert
		assert_eq!(context["table_header"], json!(["H1", "H2"]));
		assert_eq!(context["data"], json!([["a", "b"]]));
		assert_eq!(context["self"]["table_json"]["data"][0], json!(["H1", "H2"]));
	}

	#[rstest]
	fn test_render_context_without_header(block: TableBlock) {
		let value = TableBlockValue::new(TableValue::from_rows(vec![vec!["H1"], vec!["a"]]));

		let context = serde_json::to_value(block.render_context(&value).unwrap()).unwrap();

		assert_eq!(context["table_header"], JsonValue::Null);
		assert_eq!(context["data"], json!([["H1"], ["a"]]));
	}

	#[rstest]
	fn test_render_absent_value_is_empty(block: TableBlock, renderer: TableRenderer) {
		assert_eq!(block.render(&renderer, None, None).unwrap(), "");
	}

	#[rstest]
	fn test_render_empty_data_keeps_template(block: TableBlock, renderer: TableRenderer) {
		// Arrange
		let value: TableBlockValue = serde_json::from_value(json!({
			"enable_search": true,
			"table_json": {"data": [], "first_row_is_table_header": true},
		}))
		.unwrap();

		// Act
		let html = block.render(&renderer, Some(&value), None).unwrap();

		// Assert
		assert!(html.contains(r#"<table class="tableblock" data-searching="true">"#));
		assert!(html.contains("<tbody>"));
		assert!(!html.contains("<thead>"));
		assert!(!html.contains("<tr>"));
	}

	#[rstest]
	fn test_render_missing_data_keeps_template(block: TableBlock, renderer: TableRenderer) {
		let value: TableBlockValue =
			serde_json::from_value(json!({"enable_sorting": true, "table_json": {}})).unwrap();

		let html = block.render(&renderer, Some(&value), None).unwrap();

		assert!(html.contains(r#"<table class="tableblock" data-ordering="true">"#));
	}

	#[rstest]
	fn test_render_absent_table_falls_back(block: TableBlock, renderer: TableRenderer) {
		let value = TableBlockValue {
			enable_search: true,
			..TableBlockValue::default()
		};

		assert_eq!(block.render(&renderer, Some(&value), None).unwrap(), "");
	}

	#[rstest]
	fn test_render_without_template_falls_back(renderer: TableRenderer) {
		// Arrange
		let block = TableBlock::new(None, None).template(None);
		let value = TableBlockValue::new(
			TableValue::from_rows(vec![vec!["H"], vec!["a"]]).with_header_row(true),
		);

		// Act
		let html = block.render(&renderer, Some(&value), None).unwrap();

		// Assert
		assert_eq!(html, "<table><tr><td>H</td></tr><tr><td>a</td></tr></table>");
	}

	#[rstest]
	fn test_render_toggles_become_attributes(block: TableBlock, renderer: TableRenderer) {
		// Arrange
		let value = TableBlockValue {
			enable_search: true,
			enable_pagination: false,
			enable_sorting: true,
			table: Some(TableValue::from_rows(vec![vec!["a"]])),
		};

		// Act
		let html = block.render(&renderer, Some(&value), None).unwrap();

		// Assert
		assert!(html.contains(r#"data-searching="true""#));
		assert!(!html.contains("data-paging"));
		assert!(html.contains(r#"data-ordering="true""#));
	}

	#[rstest]
	fn test_render_escapes_text_cells(block: TableBlock, renderer: TableRenderer) {
		let value = TableBlockValue::new(TableValue::from_rows(vec![vec!["<b>x</b>"]]));

		let html = block.render(&renderer, Some(&value), None).unwrap();

		assert!(html.contains("<td>&lt;b&gt;x&lt;&#x2F;b&gt;</td>"));
	}

	#[rstest]
	fn test_render_html_cells_with_html_renderer(renderer: TableRenderer) {
		// Arrange
		let options = TableOptions::new().with("renderer", json!("html"));
		let block = TableBlock::new(Some(&options), None);
		let value = TableBlockValue::new(TableValue::from_rows(vec![vec!["<b>x</b>"]]));

		// Act
		let html = block.render(&renderer, Some(&value), None).unwrap();

		// Assert
		assert!(html.contains("<td><b>x</b></td>"));
	}

	#[rstest]
	fn test_render_first_col_header(block: TableBlock, renderer: TableRenderer) {
		let value = TableBlockValue::new(
			TableValue::from_rows(vec![vec!["row", "1"], vec!["row", "2"]]).with_header_col(true),
		);

		let html = block.render(&renderer, Some(&value), None).unwrap();

		assert_eq!(html.matches(r#"<th scope="row">row</th>"#).count(), 2);
		assert!(html.contains("<td>1</td>"));
	}

	#[rstest]
	fn test_searchable_content(block: TableBlock) {
		let value: TableBlockValue =
			serde_json::from_value(json!({"table_json": {"data": [["a", "", null], ["b", "c"]]}}))
				.unwrap();

		assert_eq!(block.searchable_content(Some(&value)), vec!["a", "b", "c"]);
		assert!(block.searchable_content(None).is_empty());
	}

	#[rstest]
	fn test_clean_form_data(block: TableBlock) {
		// Arrange
		let data = form(json!({
			"enable_search": "on",
			"enable_sorting": true,
			"table_json": r#"{"data": [["a"]], "first_row_is_table_header": false}"#,
		}));

		// Act
		let value = block.clean(&data).unwrap();

		// Assert
		assert!(value.enable_search);
		assert!(!value.enable_pagination);
		assert!(value.enable_sorting);
		assert_eq!(value.table, Some(TableValue::from_rows(vec![vec!["a"]])));
	}

	#[rstest]
	fn test_clean_rejects_malformed_table(block: TableBlock) {
		let data = form(json!({"table_json": "{broken"}));

		let result = block.clean(&data);

		assert_eq!(
			result,
			Err(FieldError::Validation("Enter valid table data.".to_string()))
		);
	}

	#[rstest]
	fn test_clean_empty_object_table_is_required(block: TableBlock) {
		let data = form(json!({"enable_search": true, "table_json": {}}));

		let result = block.clean(&data);

		assert!(matches!(result, Err(FieldError::Required(_))));
	}

	#[rstest]
	fn test_clean_accepts_decoded_table(block: TableBlock) {
		let data = form(json!({"table_json": {"data": [["a"]], "first_col_is_header": true}}));

		let value = block.clean(&data).unwrap();

		assert_eq!(
			value.table,
			Some(TableValue::from_rows(vec![vec!["a"]]).with_header_col(true))
		);
	}

	#[rstest]
	fn test_clean_requires_table(block: TableBlock) {
		let result = block.clean(&Map::new());

		assert!(matches!(result, Err(FieldError::Required(_))));
	}

	#[rstest]
	fn test_json_round_trip(block: TableBlock) {
		let value = TableBlockValue::new(TableValue::from_rows(vec![vec!["a"], vec![]]));

		let encoded = block.to_json(&value).unwrap();

		assert_eq!(block.from_json(encoded).unwrap(), value);
	}

	#[rstest]
	fn test_register_with_registry() {
		let mut registry = FeatureRegistry::new();

		assert!(TableBlock::register(Some(&mut registry)));
		assert!(registry.contains("default", "TableBlock"));
	}

	#[rstest]
	fn test_register_without_registry_is_noop() {
		assert!(!TableBlock::register(None));
	}
}
