//! Template rendering for table blocks
//!
//! Block and widget markup is produced by Tera. The bundled templates are
//! compiled into the crate; hosts may load a directory of their own templates,
//! which take precedence over the bundled ones of the same name.

use crate::error::{TableBlockError, TableBlockResult};
use crate::options::TableOptions;
use crate::value::{Row, TableBlockValue, TableValue};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use tera::{Context, Tera};
use tracing::{debug, warn};

/// Template used by [`TableBlock`](crate::blocks::TableBlock) on the public site
pub const TABLE_BLOCK_TEMPLATE: &str = "tableblock/blocks/TableBlock.html";

/// Template used by [`TableInput`](crate::widget::TableInput) in the editor
pub const TABLE_WIDGET_TEMPLATE: &str = "tableblock/widgets/TableWidget.html";

const BUNDLED_TEMPLATES: [(&str, &str); 2] = [
	(
		TABLE_BLOCK_TEMPLATE,
		include_str!("../templates/tableblock/blocks/TableBlock.html"),
	),
	(
		TABLE_WIDGET_TEMPLATE,
		include_str!("../templates/tableblock/widgets/TableWidget.html"),
	),
];

/// Search, pagination, and sorting switches exposed to templates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DisplayToggles {
	/// Emit `data-searching`
	pub enable_search: bool,
	/// Emit `data-paging`
	pub enable_pagination: bool,
	/// Emit `data-ordering`
	pub enable_sorting: bool,
}

impl From<&TableBlockValue> for DisplayToggles {
	fn from(value: &TableBlockValue) -> Self {
		Self {
			enable_search: value.enable_search,
			enable_pagination: value.enable_pagination,
			enable_sorting: value.enable_sorting,
		}
	}
}

/// Variables handed to a table template
///
/// `self` and `value` both refer to the block value being rendered. The header
/// row, when extracted, is excluded from `data`.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a, V: Serialize> {
	/// The whole stored value, exposed as `self`
	#[serde(rename = "self")]
	pub self_value: &'a V,
	/// Same as `self`
	pub value: &'a V,
	/// First row when it is the table header
	pub table_header: Option<&'a Row>,
	/// Whether the first cell of each body row is a row header
	pub first_col_is_header: bool,
	/// Whether cells hold trusted HTML
	pub html_renderer: bool,
	/// Body rows
	pub data: &'a [Row],
	/// Display switches, flattened into the context
	#[serde(flatten)]
	pub toggles: DisplayToggles,
}

impl<'a, V: Serialize> RenderContext<'a, V> {
	/// Derive the context for `table`, which is stored inside `value`
	pub fn new(value: &'a V, table: &'a TableValue, options: &TableOptions) -> Self {
		Self {
			self_value: value,
			value,
			table_header: table.header_row(),
			first_col_is_header: table.first_col_is_header,
			html_renderer: options.is_html_renderer(),
			data: table.body_rows(),
			toggles: DisplayToggles::default(),
		}
	}

	/// Attach the display toggles
	pub fn with_toggles(mut self, toggles: DisplayToggles) -> Self {
		self.toggles = toggles;
		self
	}
}

/// Tera-backed renderer holding the table templates
pub struct TableRenderer {
	tera: Tera,
}

impl TableRenderer {
	/// Create a renderer with only the bundled templates
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tableblock::render::{TableRenderer, TABLE_BLOCK_TEMPLATE};
	///
	/// let renderer = TableRenderer::new().unwrap();
	/// assert!(renderer.has_template(TABLE_BLOCK_TEMPLATE));
	/// ```
	pub fn new() -> TableBlockResult<Self> {
		let mut tera = Tera::default();
		tera.add_raw_templates(BUNDLED_TEMPLATES.to_vec())?;
		Ok(Self { tera })
	}

	/// Create a renderer that loads `**/*.html` from `dir` in addition to the bundled templates
	pub fn with_templates_dir(dir: impl AsRef<Path>) -> TableBlockResult<Self> {
		let dir = dir.as_ref();
		if !dir.is_dir() {
			return Err(TableBlockError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("templates directory not found: {}", dir.display()),
			)));
		}

		// Chains are built only once bundled templates are present, so host
		// templates may extend them.
		let mut tera = Tera::parse(&format!("{}/**/*.html", dir.display()))?;
		for (name, _) in BUNDLED_TEMPLATES {
			if tera.get_template_names().any(|existing| existing == name) {
				debug!(template = name, "host template overrides bundled template");
			}
		}
		// `extend` keeps existing entries, so host templates win.
		tera.extend(&Self::new()?.tera)?;
		tera.build_inheritance_chains()?;
		Ok(Self { tera })
	}

	/// Whether a template with this name is registered
	pub fn has_template(&self, name: &str) -> bool {
		self.tera.get_template_names().any(|existing| existing == name)
	}

	/// Register or replace a template from a string
	pub fn add_raw_template(&mut self, name: &str, content: &str) -> TableBlockResult<()> {
		self.tera.add_raw_template(name, content)?;
		Ok(())
	}

	/// Render `template` with `context` layered over the caller's `parent` context
	///
	/// Keys in `context` win over keys in `parent`.
	pub fn render<T: Serialize>(
		&self,
		template: &str,
		context: &T,
		parent: Option<&Map<String, JsonValue>>,
	) -> TableBlockResult<String> {
		if !self.has_template(template) {
			warn!(template, "table template is not registered");
			return Err(TableBlockError::TemplateNotFound(template.to_string()));
		}

		let mut ctx = Context::new();
		if let Some(parent) = parent {
			for (key, value) in parent {
				ctx.insert(key.as_str(), value);
			}
		}
		ctx.extend(Context::from_serialize(context)?);

		Ok(self.tera.render(template, &ctx)?)
	}
}

/// Plain markup for a table, used when no template applies
///
/// Every row is emitted as a body row with escaped cell text. An absent or
/// empty table renders as an empty string.
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::render::render_basic;
/// use reinhardt_tableblock::value::TableValue;
///
/// let table = TableValue::from_rows(vec![vec!["<b>"]]);
/// assert_eq!(render_basic(Some(&table)), "<table><tr><td>&lt;b&gt;</td></tr></table>");
/// assert_eq!(render_basic(None), "");
/// ```
pub fn render_basic(table: Option<&TableValue>) -> String {
	let Some(table) = table.filter(|table| !table.is_empty()) else {
		return String::new();
	};

	let mut html = String::from("<table>");
	for row in &table.data {
		html.push_str("<tr>");
		for cell in row {
			html.push_str("<td>");
			if let Some(text) = cell {
				html.push_str(&tera::escape_html(text));
			}
			html.push_str("</td>");
		}
		html.push_str("</tr>");
	}
	html.push_str("</table>");
	html
}
