//! Layout resolution and caching.

use nimbus_core::LayoutFn;
use nimbus_routes::ModuleLoader;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Cache of resolved layout components, keyed by layout identifier.
///
/// Populated on first use and never evicted — component identity is
/// stable for the process lifetime — though [`LayoutCache::clear`]
/// exists for hosts that reload modules. Shared across all route
/// renders within one session.
#[derive(Default)]
pub struct LayoutCache {
	layouts: RwLock<HashMap<String, LayoutFn>>,
}

impl LayoutCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached layout for an identifier, if any.
	pub fn get(&self, id: &str) -> Option<LayoutFn> {
		self.layouts.read().get(id).cloned()
	}

	/// Returns the layout for an identifier, loading and caching it on
	/// a miss. A load failure is logged and yields `None`: the route
	/// renders without a layout wrapper rather than failing the page.
	pub async fn get_or_load(&self, id: &str, loader: &dyn ModuleLoader) -> Option<LayoutFn> {
		if let Some(layout) = self.get(id) {
			return Some(layout);
		}

		match loader.load_layout(id).await {
			Ok(layout) => {
				self.layouts.write().insert(id.to_string(), layout.clone());
				tracing::debug!(layout = id, "layout loaded and cached");
				Some(layout)
			}
			Err(err) => {
				tracing::warn!(layout = id, error = %err, "layout not found; rendering without it");
				None
			}
		}
	}

	/// Number of cached layouts.
	pub fn len(&self) -> usize {
		self.layouts.read().len()
	}

	/// Returns true when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.layouts.read().is_empty()
	}

	/// Drops every cached layout.
	pub fn clear(&self) {
		self.layouts.write().clear();
	}
}
