//! Route discovery from the file-system convention.
//!
//! Pages are files named `page.<ext>` under the configured routes
//! directory. Discovery converts each file path into a URL pattern,
//! resolves the nearest enclosing layout by walking toward the routes
//! root, picks up the optional sibling metadata descriptor, and
//! memoizes the sorted result until the cache is explicitly cleared.
//!
//! Discovery never watches the filesystem itself; a development
//! server invalidates the cache when files change.

use crate::convert::file_path_to_route_path;
use crate::metadata::load_route_metadata;
use crate::table::{RouteEntry, RouteTable};
use nimbus_conf::{PagesConfig, get_config};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use walkdir::WalkDir;

/// An internal discovery fault. Recovered at the boundary: table
/// consumers see an empty table, the client router surfaces the error
/// with a retry.
#[derive(Debug, thiserror::Error)]
pub enum RouteDiscoveryError {
	/// Walking the routes directory failed.
	#[error("failed to walk routes directory {dir}: {source}")]
	Walk {
		/// The directory being walked.
		dir: PathBuf,
		/// The underlying walk failure.
		#[source]
		source: walkdir::Error,
	},
}

/// Builds and memoizes the route table.
///
/// The cache is owned by the builder — there is no module-global
/// mutable state — and is only ever replaced wholesale, so concurrent
/// discovery at worst recomputes an equivalent table.
#[derive(Default)]
pub struct RouteTableBuilder {
	config: Option<PagesConfig>,
	cache: RwLock<Option<Arc<RouteTable>>>,
}

impl RouteTableBuilder {
	/// Creates a builder reading the process-wide configuration at
	/// discovery time.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder pinned to an explicit configuration.
	pub fn with_config(config: PagesConfig) -> Self {
		Self {
			config: Some(config),
			cache: RwLock::new(None),
		}
	}

	fn active_config(&self) -> PagesConfig {
		self.config.clone().unwrap_or_else(get_config)
	}

	/// Discovers routes, reporting discovery faults to the caller.
	/// Successful results are memoized; failures are not, so a retry
	/// after the underlying problem is fixed can succeed.
	pub fn try_discover(&self, use_cache: bool) -> Result<Arc<RouteTable>, RouteDiscoveryError> {
		if use_cache && let Some(table) = self.cache.read().clone() {
			return Ok(table);
		}

		let config = self.active_config();
		let entries = discover_entries(&config)?;
		tracing::debug!(routes = entries.len(), "route discovery complete");

		let table = Arc::new(RouteTable::new(entries));
		*self.cache.write() = Some(table.clone());
		Ok(table)
	}

	/// Discovers routes, recovering faults into an empty table.
	/// Callers see "no routes found" rather than a hard failure.
	pub fn discover(&self, use_cache: bool) -> Arc<RouteTable> {
		match self.try_discover(use_cache) {
			Ok(table) => table,
			Err(err) => {
				tracing::error!(error = %err, "route discovery failed; serving an empty route table");
				Arc::new(RouteTable::default())
			}
		}
	}

	/// Discards the memoized table.
	pub fn clear_cache(&self) {
		*self.cache.write() = None;
	}
}

fn discover_entries(config: &PagesConfig) -> Result<Vec<RouteEntry>, RouteDiscoveryError> {
	let routes_dir = &config.routes_dir;
	if !routes_dir.is_dir() {
		tracing::debug!(dir = %routes_dir.display(), "routes directory missing; no routes discovered");
		return Ok(Vec::new());
	}

	let mut entries = Vec::new();
	let mut seen = HashSet::new();

	// Extensions are checked in configuration order: when the same
	// directory holds page files in several recognized extensions,
	// the earlier extension wins.
	for ext in &config.page_extensions {
		let page_name = format!("page.{}", ext);
		for entry in WalkDir::new(routes_dir).sort_by_file_name() {
			let entry = entry.map_err(|source| RouteDiscoveryError::Walk {
				dir: routes_dir.clone(),
				source,
			})?;
			if !entry.file_type().is_file() || entry.file_name().to_string_lossy() != page_name.as_str()
			{
				continue;
			}

			let route_path = file_path_to_route_path(entry.path(), config);
			if !seen.insert(route_path.clone()) {
				continue;
			}

			let route_dir = entry.path().parent().unwrap_or(routes_dir.as_path());
			let mut route = RouteEntry::new(&route_path, module_id(entry.path(), routes_dir));
			if let Some(layout_id) = resolve_layout(route_dir, config) {
				route = route.with_layout(layout_id);
			}
			if let Some(metadata) = load_route_metadata(route_dir) {
				route = route.with_metadata(metadata);
			}
			entries.push(route);
		}
	}

	Ok(entries)
}

/// Resolves the nearest enclosing layout: each directory from the
/// route's own up to and including the routes root is checked for a
/// `layout.<ext>` file in extension order; the first hit wins, then
/// the configured default layout, then none.
fn resolve_layout(route_dir: &Path, config: &PagesConfig) -> Option<String> {
	let routes_dir = config.routes_dir.as_path();
	let mut dir = route_dir;
	loop {
		for ext in &config.page_extensions {
			let candidate = dir.join(format!("layout.{}", ext));
			if candidate.is_file() {
				return Some(module_id(&candidate, routes_dir));
			}
		}
		if dir == routes_dir || !dir.starts_with(routes_dir) {
			break;
		}
		match dir.parent() {
			Some(parent) => dir = parent,
			None => break,
		}
	}
	config.default_layout.clone()
}

/// The loader identifier of a file: its path relative to the routes
/// root, with forward slashes.
fn module_id(path: &Path, routes_dir: &Path) -> String {
	path.strip_prefix(routes_dir)
		.unwrap_or(path)
		.to_string_lossy()
		.replace('\\', "/")
}

static DEFAULT_BUILDER: LazyLock<RouteTableBuilder> = LazyLock::new(RouteTableBuilder::new);

/// Discovers routes using the process-wide builder and configuration.
pub fn discover_routes(use_cache: bool) -> Arc<RouteTable> {
	DEFAULT_BUILDER.discover(use_cache)
}

/// Clears the process-wide route cache.
pub fn clear_routes_cache() {
	DEFAULT_BUILDER.clear_cache()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn touch(path: &Path) {
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, "").unwrap();
	}

	fn site(root: &Path) -> PagesConfig {
		PagesConfig {
			routes_dir: root.to_path_buf(),
			..PagesConfig::default()
		}
	}

	#[test]
	fn test_discovers_and_sorts_routes() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("page.rs"));
		touch(&dir.path().join("posts/new/page.rs"));
		touch(&dir.path().join("posts/[id]/page.rs"));

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		let table = builder.discover(false);

		let patterns: Vec<&str> = table
			.entries()
			.iter()
			.map(|entry| entry.pattern.raw())
			.collect();
		assert_eq!(patterns, vec!["/", "/posts/new", "/posts/:id"]);
	}

	#[test]
	fn test_nearest_layout_wins() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("layout.rs"));
		touch(&dir.path().join("page.rs"));
		touch(&dir.path().join("blog/layout.rs"));
		touch(&dir.path().join("blog/[slug]/page.rs"));
		touch(&dir.path().join("about/page.rs"));

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		let table = builder.discover(false);

		let layout_of = |pattern: &str| {
			table
				.entries()
				.iter()
				.find(|entry| entry.pattern.raw() == pattern)
				.unwrap()
				.layout_id
				.clone()
		};

		assert_eq!(layout_of("/blog/:slug"), Some("blog/layout.rs".to_string()));
		// No layout in about/, so the walk reaches the routes root.
		assert_eq!(layout_of("/about"), Some("layout.rs".to_string()));
		assert_eq!(layout_of("/"), Some("layout.rs".to_string()));
	}

	#[test]
	fn test_default_layout_fallback() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("about/page.rs"));

		let mut config = site(dir.path());
		config.default_layout = Some("main".to_string());
		let builder = RouteTableBuilder::with_config(config);
		let table = builder.discover(false);

		assert_eq!(
			table.entries()[0].layout_id.as_deref(),
			Some("main")
		);
	}

	#[test]
	fn test_no_layout_anywhere() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("about/page.rs"));

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		let table = builder.discover(false);
		assert_eq!(table.entries()[0].layout_id, None);
	}

	#[test]
	fn test_metadata_descriptor_attached() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("blog/page.rs"));
		fs::write(
			dir.path().join("blog/meta.json"),
			r#"{"title": "Blog"}"#,
		)
		.unwrap();

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		let table = builder.discover(false);
		let metadata = table.entries()[0].metadata.as_ref().unwrap();
		assert_eq!(metadata.title.as_deref(), Some("Blog"));
	}

	#[test]
	fn test_missing_routes_dir_yields_empty_table() {
		let builder = RouteTableBuilder::with_config(PagesConfig {
			routes_dir: PathBuf::from("/nonexistent/nimbus-routes-test"),
			..PagesConfig::default()
		});
		assert!(builder.discover(false).is_empty());
	}

	#[test]
	fn test_cache_and_invalidation() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("page.rs"));

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		let first = builder.discover(true);
		assert_eq!(first.len(), 1);

		// A new page is invisible while the cache holds.
		touch(&dir.path().join("about/page.rs"));
		let cached = builder.discover(true);
		assert!(Arc::ptr_eq(&first, &cached));

		builder.clear_cache();
		assert_eq!(builder.discover(true).len(), 2);
	}

	#[test]
	fn test_use_cache_false_rediscovers() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("page.rs"));

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		builder.discover(true);
		touch(&dir.path().join("about/page.rs"));

		assert_eq!(builder.discover(false).len(), 2);
	}

	#[test]
	fn test_extension_priority_deduplicates_routes() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("about/page.rs"));
		touch(&dir.path().join("about/page.html"));

		let mut config = site(dir.path());
		config.page_extensions = vec!["rs".to_string(), "html".to_string()];
		let builder = RouteTableBuilder::with_config(config);
		let table = builder.discover(false);

		assert_eq!(table.len(), 1);
		assert_eq!(table.entries()[0].page_id, "about/page.rs");
	}

	#[test]
	fn test_page_id_is_relative_to_routes_root() {
		let dir = TempDir::new().unwrap();
		touch(&dir.path().join("shop/items/page.rs"));

		let builder = RouteTableBuilder::with_config(site(dir.path()));
		let table = builder.discover(false);
		assert_eq!(table.entries()[0].page_id, "shop/items/page.rs");
	}
}
