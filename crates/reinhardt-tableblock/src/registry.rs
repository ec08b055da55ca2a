//! Feature registry integration
//!
//! Hosts that maintain a catalogue of available content blocks pass a
//! [`FeatureRegistrar`] to [`TableBlock::register`](crate::blocks::TableBlock::register).

use std::collections::{BTreeMap, BTreeSet};

/// Receives block registrations grouped by feature type
pub trait FeatureRegistrar {
	/// Record `name` under `feature_type`
	fn register_feature(&mut self, feature_type: &str, name: &str);
}

/// In-memory registry with the `default` and `special` categories
///
/// # Examples
///
/// ```
/// use reinhardt_tableblock::registry::{FeatureRegistrar, FeatureRegistry};
///
/// let mut registry = FeatureRegistry::new();
/// registry.register_feature("default", "TableBlock");
///
/// assert!(registry.contains("default", "TableBlock"));
/// assert!(registry.get("special").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRegistry {
	features: BTreeMap<String, BTreeSet<String>>,
}

impl FeatureRegistry {
	/// Registry with the `default` and `special` feature types present and empty
	pub fn new() -> Self {
		let features = ["default", "special"]
			.into_iter()
			.map(|feature_type| (feature_type.to_string(), BTreeSet::new()))
			.collect();
		Self { features }
	}

	/// Names registered under `feature_type`
	pub fn get(&self, feature_type: &str) -> Option<&BTreeSet<String>> {
		self.features.get(feature_type)
	}

	/// Whether `name` is registered under `feature_type`
	pub fn contains(&self, feature_type: &str, name: &str) -> bool {
		self.get(feature_type)
			.is_some_and(|names| names.contains(name))
	}

	/// All feature types, including empty ones
	pub fn feature_types(&self) -> impl Iterator<Item = &str> {
		self.features.keys().map(String::as_str)
	}
}

impl Default for FeatureRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl FeatureRegistrar for FeatureRegistry {
	fn register_feature(&mut self, feature_type: &str, name: &str) {
		self.features
			.entry(feature_type.to_string())
			.or_default()
			.insert(name.to_string());
	}
}
