//! Error types for table blocks

use thiserror::Error;

/// Errors raised while parsing, configuring, or rendering a table block
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TableBlockError {
	/// Submitted table data is not valid JSON or does not have the table shape
	#[error("Malformed table data: {0}")]
	MalformedTableData(#[source] serde_json::Error),

	/// A value could not be encoded as JSON
	#[error("Serialization error: {0}")]
	Serialization(#[source] serde_json::Error),

	/// Template engine failure
	#[error("Template error: {0}")]
	Template(#[from] tera::Error),

	/// The configured template is not registered with the renderer
	#[error("Template not found: {0}")]
	TemplateNotFound(String),

	/// Invalid settings value
	#[error("Invalid settings: {0}")]
	Settings(String),

	/// IO error while reading settings or templates
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// TOML settings could not be parsed
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Result type for table block operations
pub type TableBlockResult<T> = Result<T, TableBlockError>;

/// Form-level validation errors reported back to the editor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
	/// A required field was left empty
	#[error("{0}")]
	Required(String),

	/// The submitted value failed validation
	#[error("{0}")]
	Validation(String),
}

impl FieldError {
	/// The user-facing message carried by this error
	pub fn message(&self) -> &str {
		match self {
			FieldError::Required(msg) | FieldError::Validation(msg) => msg,
		}
	}
}

/// Result type for form field cleaning
pub type FieldResult<T> = Result<T, FieldError>;
