//! Table block settings
//!
//! Settings are layered in increasing priority: built-in defaults, a TOML
//! file, then environment variables.
//!
//! ```toml
//! template = "tableblock/blocks/TableBlock.html"
//! widget_template = "tableblock/widgets/TableWidget.html"
//! language_fallback = "en"
//! static_url = "/static/"
//!
//! [table_options]
//! renderer = "html"
//! height = 240
//! ```

use crate::blocks::TableBlock;
use crate::error::{TableBlockError, TableBlockResult};
use crate::field::TableInputBlock;
use crate::options::{DEFAULT_LANGUAGE_FALLBACK, OptionsResolver, TableOptions};
use crate::render::{TABLE_BLOCK_TEMPLATE, TABLE_WIDGET_TEMPLATE, TableRenderer};
use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "TABLEBLOCK_";

/// Site-wide configuration for table blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableBlockSettings {
	/// Grid editor option overrides applied to every table block
	pub table_options: TableOptions,

	/// Block template; `None` renders basic markup
	pub template: Option<String>,

	/// Template for the editor widget
	pub widget_template: String,

	/// Directory of host templates loaded in addition to the bundled ones
	pub templates_dir: Option<PathBuf>,

	/// Grid editor language when no locale is active
	pub language_fallback: String,

	/// Prefix for editor asset URLs
	pub static_url: String,
}

impl Default for TableBlockSettings {
	fn default() -> Self {
		Self {
			table_options: TableOptions::new(),
			template: Some(TABLE_BLOCK_TEMPLATE.to_string()),
			widget_template: TABLE_WIDGET_TEMPLATE.to_string(),
			templates_dir: None,
			language_fallback: DEFAULT_LANGUAGE_FALLBACK.to_string(),
			static_url: "/static/".to_string(),
		}
	}
}

impl TableBlockSettings {
	/// Parse settings from TOML; omitted keys keep their defaults
	pub fn from_toml_str(content: &str) -> TableBlockResult<Self> {
		let settings: Self = toml::from_str(content)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> TableBlockResult<Self> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading table block settings");
		Self::from_toml_str(&fs::read_to_string(path)?)
	}

	/// Defaults, then `path` if given, then `TABLEBLOCK_*` environment variables
	pub fn load(path: Option<&Path>) -> TableBlockResult<Self> {
		let settings = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		settings.apply_env(ENV_PREFIX)
	}

	/// Override settings from `<prefix>TEMPLATE`, `<prefix>WIDGET_TEMPLATE`,
	/// `<prefix>TEMPLATES_DIR`, `<prefix>LANGUAGE_FALLBACK` and `<prefix>STATIC_URL`
	///
	/// An empty `TEMPLATE` or `TEMPLATES_DIR` clears the setting.
	pub fn apply_env(mut self, prefix: &str) -> TableBlockResult<Self> {
		if let Some(template) = read_env(prefix, "TEMPLATE")? {
			self.template = Some(template).filter(|t| !t.is_empty());
		}
		if let Some(widget_template) = read_env(prefix, "WIDGET_TEMPLATE")? {
			self.widget_template = widget_template;
		}
		if let Some(dir) = read_env(prefix, "TEMPLATES_DIR")? {
			self.templates_dir = Some(PathBuf::from(dir)).filter(|d| !d.as_os_str().is_empty());
		}
		if let Some(language) = read_env(prefix, "LANGUAGE_FALLBACK")? {
			self.language_fallback = language;
		}
		if let Some(static_url) = read_env(prefix, "STATIC_URL")? {
			self.static_url = static_url;
		}
		self.validate()?;
		Ok(self)
	}

	/// Check invariants that deserialization cannot express
	pub fn validate(&self) -> TableBlockResult<()> {
		if self.language_fallback.chars().count() > 2 {
			return Err(TableBlockError::Settings(format!(
				"language_fallback must be at most 2 characters, got {:?}",
				self.language_fallback
			)));
		}
		if self.widget_template.is_empty() {
			return Err(TableBlockError::Settings(
				"widget_template must not be empty".to_string(),
			));
		}
		if self.static_url.is_empty() {
			return Err(TableBlockError::Settings(
				"static_url must not be empty".to_string(),
			));
		}
		Ok(())
	}

	/// Options resolver honouring the configured fallback language
	pub fn resolver(&self) -> OptionsResolver {
		OptionsResolver::new(self.language_fallback.clone())
	}

	/// Renderer with the bundled templates and any host templates
	pub fn renderer(&self) -> TableBlockResult<TableRenderer> {
		match &self.templates_dir {
			Some(dir) => TableRenderer::with_templates_dir(dir),
			None => TableRenderer::new(),
		}
	}

	/// Table block configured from these settings for the active `locale`
	pub fn table_block(&self, locale: Option<&str>) -> TableBlock {
		let table =
			TableInputBlock::with_resolver(&self.resolver(), Some(&self.table_options), locale)
				.widget_template(self.widget_template.clone());
		TableBlock::with_table(table).template(self.template.clone())
	}
}

fn read_env(prefix: &str, key: &str) -> TableBlockResult<Option<String>> {
	let name = format!("{}{}", prefix, key);
	match env::var(&name) {
		Ok(value) => {
			debug!(variable = %name, "table block setting overridden from environment");
			Ok(Some(value))
		}
		Err(VarError::NotPresent) => Ok(None),
		Err(VarError::NotUnicode(_)) => Err(TableBlockError::Settings(format!(
			"{} is not valid unicode",
			name
		))),
	}
}
