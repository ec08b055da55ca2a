//! Grid editor options
//!
//! Options are passed through to the client-side grid editor untouched, except
//! for two normalizations applied by [`OptionsResolver::resolve`]:
//!
//! - `contextMenu: true` is discarded so the default menu list is kept
//! - `language` is derived from the active locale when the caller omits it

use crate::error::{TableBlockError, TableBlockResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use tracing::debug;

/// Option key holding the right-click menu definition
pub const CONTEXT_MENU: &str = "contextMenu";

/// Option key holding the grid editor's UI language
pub const LANGUAGE: &str = "language";

/// Option key selecting how cell contents are rendered on the public site
pub const RENDERER: &str = "renderer";

/// Language used when no active locale is supplied.
///
/// Matches the language part of the framework's default `en-us` locale.
pub const DEFAULT_LANGUAGE_FALLBACK: &str = "en";

/// Right-click actions offered by the grid editor, in display order
pub const DEFAULT_CONTEXT_MENU: [&str; 11] = [
	"row_above",
	"row_below",
	"---------",
	"col_left",
	"col_right",
	"---------",
	"remove_row",
	"remove_col",
	"---------",
	"undo",
	"redo",
];

static DEFAULT_TABLE_OPTIONS: Lazy<TableOptions> = Lazy::new(|| {
	TableOptions::from_iter([
		("minSpareRows", json!(0)),
		("startRows", json!(3)),
		("startCols", json!(3)),
		("colHeaders", json!(false)),
		("rowHeaders", json!(false)),
		(CONTEXT_MENU, json!(DEFAULT_CONTEXT_MENU)),
		("editor", json!("text")),
		("stretchH", json!("all")),
		("height", json!(108)),
		(RENDERER, json!("text")),
		("autoColumnSize", json!(false)),
	])
});

/// Ordered mapping of grid editor option names to values
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::options::TableOptions;
/// use serde_json::json;
///
/// let options = TableOptions::new().with("renderer", json!("html"));
/// assert!(options.is_html_renderer());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableOptions(Map<String, JsonValue>);

impl TableOptions {
	/// Create an empty option set
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// The fixed default option set
	pub fn defaults() -> Self {
		DEFAULT_TABLE_OPTIONS.clone()
	}

	/// Builder-style insert
	pub fn with(mut self, key: impl Into<String>, value: JsonValue) -> Self {
		self.0.insert(key.into(), value);
		self
	}

	/// Insert or replace an option, returning the previous value
	pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
		self.0.insert(key.into(), value)
	}

	/// Look up an option
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.get(key)
	}

	/// Whether an option is present, even if its value is `null`
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of options
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// True when no options are set
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterate options in insertion order
	pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
		self.0.iter()
	}

	/// Borrow the underlying JSON map
	pub fn as_map(&self) -> &Map<String, JsonValue> {
		&self.0
	}

	/// The `renderer` option as a string
	pub fn renderer(&self) -> Option<&str> {
		self.get(RENDERER).and_then(JsonValue::as_str)
	}

	/// Whether cells are rendered as raw HTML rather than escaped text
	pub fn is_html_renderer(&self) -> bool {
		self.renderer() == Some("html")
	}

	/// The `language` option as a string
	pub fn language(&self) -> Option<&str> {
		self.get(LANGUAGE).and_then(JsonValue::as_str)
	}

	/// The `contextMenu` option
	pub fn context_menu(&self) -> Option<&JsonValue> {
		self.get(CONTEXT_MENU)
	}

	/// Encode the options as the JSON payload consumed by the grid editor
	pub fn to_json(&self) -> TableBlockResult<String> {
		serde_json::to_string(&self.0).map_err(TableBlockError::Serialization)
	}
}

impl From<Map<String, JsonValue>> for TableOptions {
	fn from(map: Map<String, JsonValue>) -> Self {
		Self(map)
	}
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for TableOptions {
	fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

/// Merges caller-supplied options over the defaults
#[derive(Debug, Clone)]
pub struct OptionsResolver {
	language_fallback: String,
}

impl OptionsResolver {
	/// Create a resolver that falls back to `language_fallback` when no locale is active
	pub fn new(language_fallback: impl Into<String>) -> Self {
		Self {
			language_fallback: language_fallback.into(),
		}
	}

	/// The language used when no locale is supplied
	pub fn language_fallback(&self) -> &str {
		&self.language_fallback
	}

	/// Produce a complete option set
	///
	/// Overrides replace defaults key by key; nested values are not merged.
	/// A `contextMenu` override of `true` is ignored. When no `language` is
	/// given, it is derived from `locale`, or set to the fallback when no
	/// locale is active.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tableblock::options::{OptionsResolver, TableOptions};
	/// use serde_json::json;
	///
	/// let resolver = OptionsResolver::default();
	/// let overrides = TableOptions::new().with("contextMenu", json!(true));
	/// let options = resolver.resolve(Some(&overrides), Some("fr-ca"));
	///
	/// assert!(options.context_menu().unwrap().is_array());
	/// assert_eq!(options.language(), Some("fr"));
	/// ```
	pub fn resolve(&self, overrides: Option<&TableOptions>, locale: Option<&str>) -> TableOptions {
		let mut options = TableOptions::defaults();

		if let Some(overrides) = overrides {
			for (key, value) in overrides.iter() {
				if key == CONTEXT_MENU && value == &JsonValue::Bool(true) {
					continue;
				}
				options.insert(key.clone(), value.clone());
			}
		}

		if !options.contains_key(LANGUAGE) {
			let language = match locale.map(str::trim).filter(|l| !l.is_empty()) {
				Some(locale) => {
					debug!(locale, "deriving grid editor language from active locale");
					derive_language(locale)
				}
				None => {
					debug!(
						fallback = %self.language_fallback,
						"no active locale, using fallback grid editor language"
					);
					self.language_fallback.clone()
				}
			};
			options.insert(LANGUAGE, JsonValue::String(language));
		}

		options
	}
}

impl Default for OptionsResolver {
	fn default() -> Self {
		Self::new(DEFAULT_LANGUAGE_FALLBACK)
	}
}

/// Resolve options with the default language fallback
pub fn resolve(overrides: Option<&TableOptions>, locale: Option<&str>) -> TableOptions {
	OptionsResolver::default().resolve(overrides, locale)
}

/// Truncate a locale identifier to its first two characters
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::options::derive_language;
///
/// assert_eq!(derive_language("en-us"), "en");
/// assert_eq!(derive_language("de"), "de");
/// ```
pub fn derive_language(locale: &str) -> String {
	locale.chars().take(2).collect()
}
