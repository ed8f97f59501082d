//! The route table and path matching.

use crate::metadata::RouteMetadata;
use crate::pattern::RoutePattern;
use nimbus_core::Params;

/// One discovered page.
#[derive(Debug, Clone)]
pub struct RouteEntry {
	/// The route's URL pattern.
	pub pattern: RoutePattern,
	/// Loader identifier of the page module. Loading is deferred; the
	/// router caches loaded modules so each identifier resolves at
	/// most once per session.
	pub page_id: String,
	/// Loader identifier of the nearest enclosing layout, if any.
	pub layout_id: Option<String>,
	/// Page metadata from the sibling descriptor file, if present.
	pub metadata: Option<RouteMetadata>,
}

impl RouteEntry {
	/// Creates an entry with no layout or metadata.
	pub fn new(pattern: impl AsRef<str>, page_id: impl Into<String>) -> Self {
		Self {
			pattern: RoutePattern::parse(pattern.as_ref()),
			page_id: page_id.into(),
			layout_id: None,
			metadata: None,
		}
	}

	/// Sets the layout identifier.
	pub fn with_layout(mut self, layout_id: impl Into<String>) -> Self {
		self.layout_id = Some(layout_id.into());
		self
	}

	/// Sets the metadata.
	pub fn with_metadata(mut self, metadata: RouteMetadata) -> Self {
		self.metadata = Some(metadata);
		self
	}
}

/// A successful match: the entry plus its captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
	/// The matched entry.
	pub entry: &'a RouteEntry,
	/// Captured path parameters.
	pub params: Params,
}

/// An ordered set of route entries.
///
/// Construction sorts entries so that fully static patterns precede
/// any pattern with a capture segment — on ambiguous overlap the
/// static route wins — and is otherwise stable, preserving discovery
/// order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	entries: Vec<RouteEntry>,
}

impl RouteTable {
	/// Builds a table from entries, applying the match-priority sort.
	pub fn new(mut entries: Vec<RouteEntry>) -> Self {
		entries.sort_by_key(|entry| entry.pattern.is_dynamic());
		Self { entries }
	}

	/// The entries in match order.
	pub fn entries(&self) -> &[RouteEntry] {
		&self.entries
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true when the table holds no routes.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Finds the entry matching a request path.
	///
	/// A first exact pattern-string match wins; otherwise entries are
	/// tried in table order with segment-wise comparison. `None` is
	/// the not-found result, distinct from any error.
	pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
		for entry in &self.entries {
			if entry.pattern.raw() == path {
				return Some(RouteMatch {
					entry,
					params: Params::new(),
				});
			}
		}

		for entry in &self.entries {
			if let Some(params) = entry.pattern.matches(path) {
				return Some(RouteMatch { entry, params });
			}
		}
		None
	}
}
