//! Editor widget for table input
//!
//! The widget is a hidden input carrying the table JSON, plus the resolved
//! grid options serialized for the client-side grid editor.

use crate::error::TableBlockResult;
use crate::options::TableOptions;
use crate::render::{TABLE_WIDGET_TEMPLATE, TableRenderer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Hidden input that hosts the grid editor
#[derive(Debug, Clone)]
pub struct TableInput {
	table_options: TableOptions,
	attrs: BTreeMap<String, String>,
	template: String,
}

/// Data exposed to the widget template under the `widget` key
#[derive(Debug, Clone, Serialize)]
pub struct WidgetContext {
	/// Form field name of the hidden input
	pub name: String,
	/// Table JSON currently held by the input
	pub value: Option<String>,
	/// Always `hidden`
	pub input_type: &'static str,
	/// Template the widget is rendered with
	pub template_name: String,
	/// HTML attributes of the hidden input, including `id`
	pub attrs: BTreeMap<String, String>,
	/// Grid editor options, safe to embed in an inline script
	pub table_options_json: String,
}

#[derive(Serialize)]
struct WidgetTemplateContext<'a> {
	widget: &'a WidgetContext,
}

impl TableInput {
	/// Create a widget for already-resolved options
	pub fn new(table_options: TableOptions) -> Self {
		Self {
			table_options,
			attrs: BTreeMap::new(),
			template: TABLE_WIDGET_TEMPLATE.to_string(),
		}
	}

	/// Render with `template` instead of the bundled widget template
	pub fn with_template(mut self, template: impl Into<String>) -> Self {
		self.template = template.into();
		self
	}

	/// Name of the template the widget is rendered with
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Add an HTML attribute to the hidden input
	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	/// The options passed to the grid editor
	pub fn table_options(&self) -> &TableOptions {
		&self.table_options
	}

	/// Build the template context for a field named `name`
	///
	/// Attributes passed here override the widget's own. The input id
	/// defaults to `id_<name>`.
	pub fn get_context(
		&self,
		name: &str,
		value: Option<&str>,
		attrs: Option<&BTreeMap<String, String>>,
	) -> TableBlockResult<WidgetContext> {
		let mut merged = self.attrs.clone();
		if let Some(attrs) = attrs {
			merged.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
		}
		merged
			.entry("id".to_string())
			.or_insert_with(|| format!("id_{}", name));

		Ok(WidgetContext {
			name: name.to_string(),
			value: value.map(str::to_string),
			input_type: "hidden",
			template_name: self.template.clone(),
			attrs: merged,
			table_options_json: payload_for_script(&self.table_options)?,
		})
	}

	/// Render the widget markup
	pub fn render(
		&self,
		renderer: &TableRenderer,
		name: &str,
		value: Option<&str>,
		attrs: Option<&BTreeMap<String, String>>,
	) -> TableBlockResult<String> {
		let widget = self.get_context(name, value, attrs)?;
		renderer.render(
			&widget.template_name,
			&WidgetTemplateContext { widget: &widget },
			None,
		)
	}
}

// Embedded in an inline <script>, so a closing tag must not appear verbatim.
fn payload_for_script(options: &TableOptions) -> TableBlockResult<String> {
	Ok(options.to_json()?.replace("</", "<\\/"))
}

/// Stylesheets and scripts the editor needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
	css: Vec<String>,
	js: Vec<String>,
}

impl Media {
	/// Assets for the grid editor and its glue script
	pub fn table_input() -> Self {
		Self {
			css: vec![
				"tableblock/css/handsontable-7.0.3/handsontable.full.min.css".to_string(),
				"tableblock/css/TableWidget.css".to_string(),
			],
			js: vec![
				"tableblock/js/handsontable-7.0.3/handsontable.full.min.js".to_string(),
				"tableblock/js/TableWidget.js".to_string(),
			],
		}
	}

	/// Stylesheet paths relative to the static root
	pub fn css(&self) -> &[String] {
		&self.css
	}

	/// Script paths relative to the static root, in load order
	pub fn js(&self) -> &[String] {
		&self.js
	}

	/// `<link>` and `<script>` tags with paths joined to `static_url`
	pub fn render(&self, static_url: &str) -> String {
		let css = self.css.iter().map(|path| {
			format!(
				r#"<link href="{}" media="all" rel="stylesheet">"#,
				static_path(static_url, path)
			)
		});
		let js = self
			.js
			.iter()
			.map(|path| format!(r#"<script src="{}"></script>"#, static_path(static_url, path)));
		css.chain(js).collect::<Vec<_>>().join("\n")
	}
}

fn static_path(static_url: &str, path: &str) -> String {
	format!(
		"{}/{}",
		static_url.trim_end_matches('/'),
		path.trim_start_matches('/')
	)
}
