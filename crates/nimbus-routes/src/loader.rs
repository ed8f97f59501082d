//! Pluggable module loading.
//!
//! The route table stores loader identifiers, not components: how a
//! page module is physically resolved — a registry populated by the
//! generated project, a WASM chunk fetch, a test fixture — is behind
//! the [`ModuleLoader`] trait, so the routing core stays agnostic to
//! the host's module system.

use async_trait::async_trait;
use nimbus_core::{LayoutFn, PageFn, ServerPropsFn, StaticPathsFn, StaticPropsFn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Module resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum ModuleLoadError {
	/// The loader has nothing registered under the identifier.
	#[error("module \"{0}\" is not registered with the loader")]
	NotFound(String),
	/// The module exists but failed to load.
	#[error("module \"{id}\" failed to load: {message}")]
	Failed {
		/// The identifier that was requested.
		id: String,
		/// The underlying failure, stringified.
		message: String,
	},
}

/// Everything a page module exports: the component itself plus the
/// optional data hooks consumed by SSR and static generation.
#[derive(Clone)]
pub struct PageModule {
	/// The page component.
	pub component: PageFn,
	/// Per-request data hook.
	pub server_props: Option<ServerPropsFn>,
	/// Build-time data hook.
	pub static_props: Option<StaticPropsFn>,
	/// Build-time parameter enumeration hook.
	pub static_paths: Option<StaticPathsFn>,
}

impl PageModule {
	/// Creates a module exporting only a component.
	pub fn new(component: PageFn) -> Self {
		Self {
			component,
			server_props: None,
			static_props: None,
			static_paths: None,
		}
	}

	/// Attaches a per-request data hook.
	pub fn with_server_props(mut self, hook: ServerPropsFn) -> Self {
		self.server_props = Some(hook);
		self
	}

	/// Attaches a build-time data hook.
	pub fn with_static_props(mut self, hook: StaticPropsFn) -> Self {
		self.static_props = Some(hook);
		self
	}

	/// Attaches a build-time parameter enumeration hook.
	pub fn with_static_paths(mut self, hook: StaticPathsFn) -> Self {
		self.static_paths = Some(hook);
		self
	}
}

impl std::fmt::Debug for PageModule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PageModule")
			.field("has_server_props", &self.server_props.is_some())
			.field("has_static_props", &self.static_props.is_some())
			.field("has_static_paths", &self.static_paths.is_some())
			.finish()
	}
}

/// Deferred, identifier-based module resolution.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
	/// Resolves a page module by identifier.
	async fn load_page(&self, id: &str) -> Result<Arc<PageModule>, ModuleLoadError>;

	/// Resolves a layout component by identifier.
	async fn load_layout(&self, id: &str) -> Result<LayoutFn, ModuleLoadError>;
}

/// A registry-backed loader: modules are registered up front under
/// their identifiers. This is the loader generated projects use — the
/// build step registers every discovered page — and the natural
/// fixture for tests.
#[derive(Default)]
pub struct StaticModuleLoader {
	pages: RwLock<HashMap<String, Arc<PageModule>>>,
	layouts: RwLock<HashMap<String, LayoutFn>>,
}

impl StaticModuleLoader {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a page module under an identifier.
	pub fn register_page(&self, id: impl Into<String>, module: PageModule) {
		self.pages.write().insert(id.into(), Arc::new(module));
	}

	/// Registers a layout under an identifier.
	pub fn register_layout(&self, id: impl Into<String>, layout: LayoutFn) {
		self.layouts.write().insert(id.into(), layout);
	}
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
	async fn load_page(&self, id: &str) -> Result<Arc<PageModule>, ModuleLoadError> {
		self.pages
			.read()
			.get(id)
			.cloned()
			.ok_or_else(|| ModuleLoadError::NotFound(id.to_string()))
	}

	async fn load_layout(&self, id: &str) -> Result<LayoutFn, ModuleLoadError> {
		self.layouts
			.read()
			.get(id)
			.cloned()
			.ok_or_else(|| ModuleLoadError::NotFound(id.to_string()))
	}
}
