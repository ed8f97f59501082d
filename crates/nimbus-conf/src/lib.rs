//! # Nimbus Configuration
//!
//! Process-wide framework settings read by route discovery, the
//! client router and the server renderer: where pages and layouts
//! live, which file extensions count as pages, and how URLs are
//! normalized.
//!
//! The active configuration is a process singleton. [`set_config`]
//! shallow-merges a partial override onto the *defaults* — not onto
//! the current value — and swaps the result in as the new active
//! configuration, matching the semantics of a config file that is
//! re-applied as a whole.
//!
//! No validation happens here beyond type shape: a routes directory
//! that does not exist simply yields an empty route table later.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Framework configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagesConfig {
	/// Directory scanned for page files.
	pub routes_dir: PathBuf,
	/// Directory holding named layouts (the default layout and any
	/// layout referenced by name rather than by directory proximity).
	pub layouts_dir: PathBuf,
	/// Directory of static assets, served as-is.
	pub static_dir: PathBuf,
	/// Prefix prepended to every route path.
	pub base_path: String,
	/// Whether route paths carry a trailing slash. The root path is
	/// exempt either way.
	pub trailing_slash: bool,
	/// Recognized page file extensions, checked in order during
	/// discovery.
	pub page_extensions: Vec<String>,
	/// Layout used when no layout file is found near a route.
	pub default_layout: Option<String>,
	/// Identifier of the not-found page.
	pub not_found_page: Option<String>,
	/// Identifier of the error page.
	pub error_page: Option<String>,
}

impl Default for PagesConfig {
	fn default() -> Self {
		Self {
			routes_dir: PathBuf::from("src/app"),
			layouts_dir: PathBuf::from("src/layouts"),
			static_dir: PathBuf::from("public"),
			base_path: String::new(),
			trailing_slash: false,
			page_extensions: vec!["rs".to_string()],
			default_layout: None,
			not_found_page: Some("404".to_string()),
			error_page: Some("_error".to_string()),
		}
	}
}

/// A partial configuration: every field optional, unset fields keep
/// their defaults when applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagesConfigOverrides {
	/// Overrides [`PagesConfig::routes_dir`].
	#[serde(default)]
	pub routes_dir: Option<PathBuf>,
	/// Overrides [`PagesConfig::layouts_dir`].
	#[serde(default)]
	pub layouts_dir: Option<PathBuf>,
	/// Overrides [`PagesConfig::static_dir`].
	#[serde(default)]
	pub static_dir: Option<PathBuf>,
	/// Overrides [`PagesConfig::base_path`].
	#[serde(default)]
	pub base_path: Option<String>,
	/// Overrides [`PagesConfig::trailing_slash`].
	#[serde(default)]
	pub trailing_slash: Option<bool>,
	/// Overrides [`PagesConfig::page_extensions`].
	#[serde(default)]
	pub page_extensions: Option<Vec<String>>,
	/// Overrides [`PagesConfig::default_layout`].
	#[serde(default)]
	pub default_layout: Option<String>,
	/// Overrides [`PagesConfig::not_found_page`].
	#[serde(default)]
	pub not_found_page: Option<String>,
	/// Overrides [`PagesConfig::error_page`].
	#[serde(default)]
	pub error_page: Option<String>,
}

impl PagesConfig {
	/// Applies a partial override on top of this configuration.
	pub fn apply(mut self, overrides: PagesConfigOverrides) -> Self {
		if let Some(routes_dir) = overrides.routes_dir {
			self.routes_dir = routes_dir;
		}
		if let Some(layouts_dir) = overrides.layouts_dir {
			self.layouts_dir = layouts_dir;
		}
		if let Some(static_dir) = overrides.static_dir {
			self.static_dir = static_dir;
		}
		if let Some(base_path) = overrides.base_path {
			self.base_path = base_path;
		}
		if let Some(trailing_slash) = overrides.trailing_slash {
			self.trailing_slash = trailing_slash;
		}
		if let Some(page_extensions) = overrides.page_extensions {
			self.page_extensions = page_extensions;
		}
		if let Some(default_layout) = overrides.default_layout {
			self.default_layout = Some(default_layout);
		}
		if let Some(not_found_page) = overrides.not_found_page {
			self.not_found_page = Some(not_found_page);
		}
		if let Some(error_page) = overrides.error_page {
			self.error_page = Some(error_page);
		}
		self
	}
}

static ACTIVE: LazyLock<RwLock<PagesConfig>> =
	LazyLock::new(|| RwLock::new(PagesConfig::default()));

/// Returns a copy of the active configuration.
pub fn get_config() -> PagesConfig {
	ACTIVE.read().clone()
}

/// Replaces the active configuration with the defaults plus the given
/// overrides.
pub fn set_config(overrides: PagesConfigOverrides) {
	*ACTIVE.write() = PagesConfig::default().apply(overrides);
}

/// Restores the default configuration.
pub fn reset_config() {
	*ACTIVE.write() = PagesConfig::default();
}
