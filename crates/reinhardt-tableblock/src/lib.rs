//! # Reinhardt TableBlock
//!
//! A spreadsheet-style content block for Reinhardt CMS StreamFields.
//! Editors author tables in a client-side grid editor; the block stores the
//! result as JSON and renders it as a searchable, sortable, paginated HTML
//! table on the public site.
//!
//! ## Architecture
//!
//! ```text
//! reinhardt-tableblock
//! ├── value     - Persisted table data (TableValue, TableBlockValue)
//! ├── options   - Grid editor options and their resolution
//! ├── field     - Table input field: parse / serialize / clean
//! ├── widget    - Hidden input widget and editor media
//! ├── blocks    - Block trait and the composite TableBlock
//! ├── render    - Tera templates and render context
//! ├── registry  - Feature registry integration
//! └── settings  - Layered TOML / environment configuration
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use reinhardt_tableblock::prelude::*;
//!
//! let block = TableBlock::new(None, Some("en-us"));
//! let renderer = TableRenderer::new().unwrap();
//!
//! let value = block
//!     .table()
//!     .clean(Some(r#"{"data": [["Name", "Age"], ["Ada", "36"]], "first_row_is_table_header": true}"#))
//!     .unwrap();
//! let html = block
//!     .render(&renderer, Some(&TableBlockValue { table: value, ..Default::default() }), None)
//!     .unwrap();
//!
//! assert!(html.contains("<th scope=\"col\">Age</th>"));
//! ```

#![warn(missing_docs)]

pub use serde_json;

pub mod blocks;
pub mod error;
pub mod field;
pub mod options;
pub mod registry;
pub mod render;
pub mod settings;
pub mod value;
pub mod widget;

pub use error::{FieldError, FieldResult, TableBlockError, TableBlockResult};

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::blocks::{Block, BlockMeta, TableBlock};
	pub use crate::error::{FieldError, TableBlockError, TableBlockResult};
	pub use crate::field::{TableFieldAdapter, TableInputBlock};
	pub use crate::options::{OptionsResolver, TableOptions};
	pub use crate::registry::{FeatureRegistrar, FeatureRegistry};
	pub use crate::render::{RenderContext, TableRenderer};
	pub use crate::settings::TableBlockSettings;
	pub use crate::value::{TableBlockValue, TableValue};
	pub use crate::widget::{Media, TableInput};
}
