//! Per-route page metadata.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The filename of the optional per-route metadata descriptor.
pub const METADATA_FILE: &str = "meta.json";

/// Free-form page metadata loaded from a descriptor file next to the
/// page file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMetadata {
	/// Page title.
	#[serde(default)]
	pub title: Option<String>,
	/// Page description.
	#[serde(default)]
	pub description: Option<String>,
	/// Page keywords.
	#[serde(default)]
	pub keywords: Vec<String>,
}

/// Loads the metadata descriptor from a route's directory. A missing
/// file is not an error; a malformed one is logged and ignored.
pub(crate) fn load_route_metadata(route_dir: &Path) -> Option<RouteMetadata> {
	let descriptor = route_dir.join(METADATA_FILE);
	let contents = std::fs::read_to_string(&descriptor).ok()?;
	match serde_json::from_str(&contents) {
		Ok(metadata) => Some(metadata),
		Err(err) => {
			tracing::warn!(path = %descriptor.display(), error = %err, "ignoring malformed route metadata");
			None
		}
	}
}
