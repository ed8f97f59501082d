//! The client-side router.
//!
//! Routing state is an explicit machine — `Loading` → `Ready` →
//! `Resolving` → `Rendered`, with `Errored` reachable from discovery
//! or component-load failures and `retry` resetting to `Loading` —
//! rather than being implied by rerenders. The host runtime drives
//! the router (mount, navigate, render) and shows
//! [`ClientRouter::fallback_view`] while a phase is in flight.

use crate::history::{History, MemoryHistory};
use crate::hydration::HydrationPayload;
use crate::layout::LayoutCache;
use nimbus_conf::{PagesConfig, get_config};
use nimbus_core::{IntoPage, Page, PageContext, PageElement, PageFn, Params, Props, Query, page_fn};
use nimbus_di::ServiceContainer;
use nimbus_routes::{
	ModuleLoadError, ModuleLoader, PageModule, RouteDiscoveryError, RouteTable, RouteTableBuilder,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Failures surfaced through the router's `Errored` state.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
	/// Route discovery failed.
	#[error(transparent)]
	Discovery(#[from] RouteDiscoveryError),
	/// A route component failed to load.
	#[error(transparent)]
	ModuleLoad(#[from] ModuleLoadError),
}

/// The router's lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
	/// Routes are not loaded yet.
	Loading,
	/// Routes are loaded; nothing rendered yet.
	Ready,
	/// A route's component or layout fetch is in flight.
	Resolving,
	/// The current route is rendered.
	Rendered,
	/// Discovery or loading failed; `retry` resets to `Loading`.
	Errored,
}

/// The router's full state, including per-phase data.
#[derive(Debug, Clone)]
pub enum RouterState {
	/// Routes are not loaded yet.
	Loading,
	/// Routes are loaded.
	Ready,
	/// Resolving the given path.
	Resolving {
		/// The path being resolved.
		path: String,
	},
	/// The given path is rendered.
	Rendered {
		/// The rendered path.
		path: String,
	},
	/// A failure occurred.
	Errored {
		/// The failure.
		error: Arc<RouterError>,
	},
}

impl RouterState {
	/// The phase this state belongs to.
	pub fn phase(&self) -> RouterPhase {
		match self {
			Self::Loading => RouterPhase::Loading,
			Self::Ready => RouterPhase::Ready,
			Self::Resolving { .. } => RouterPhase::Resolving,
			Self::Rendered { .. } => RouterPhase::Rendered,
			Self::Errored { .. } => RouterPhase::Errored,
		}
	}

	fn accepts(&self, next: &RouterState) -> bool {
		use RouterPhase::*;
		matches!(
			(self.phase(), next.phase()),
			(Loading, Ready)
				| (Loading, Errored)
				| (Ready, Resolving)
				| (Ready, Errored)
				| (Resolving, Resolving)
				| (Resolving, Rendered)
				| (Resolving, Errored)
				| (Rendered, Resolving)
				| (Errored, Loading)
		)
	}
}

/// The navigation context made available to descendant components:
/// the current location plus its captured and parsed parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterContext {
	/// The current pathname.
	pub pathname: String,
	/// Parameters captured by the matched route.
	pub params: Params,
	/// Parsed query parameters.
	pub query: Query,
}

/// Options for [`ClientRouter::navigate`].
#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
	/// Replace the current history entry instead of pushing.
	pub replace: bool,
	/// Opaque state stored with the history entry.
	pub state: Option<serde_json::Value>,
}

type ErrorViewFn = Arc<dyn Fn(&RouterError) -> Page + Send + Sync>;

fn default_fallback() -> PageFn {
	page_fn(|_| PageElement::new("div").child("Loading...").into_page())
}

fn default_not_found() -> PageFn {
	page_fn(|_| {
		PageElement::new("div")
			.child(PageElement::new("h1").child("404 - Page Not Found"))
			.into_page()
	})
}

fn default_error_view() -> ErrorViewFn {
	Arc::new(|error| {
		PageElement::new("div")
			.child(PageElement::new("h2").child("An error occurred"))
			.child(PageElement::new("p").child(error.to_string()))
			.into_page()
	})
}

fn split_query(path: &str) -> (String, Query) {
	match path.split_once('?') {
		Some((pathname, query)) => {
			let query = serde_urlencoded::from_str::<Vec<(String, String)>>(query)
				.map(|pairs| pairs.into_iter().collect())
				.unwrap_or_default();
			(pathname.to_string(), query)
		}
		None => (path.to_string(), Query::new()),
	}
}

/// Routes, renders and navigates within one browser session.
///
/// One router is constructed per session with one service container
/// threaded into every page render. Route components load lazily and
/// are cached per router; layouts are cached in a [`LayoutCache`]
/// keyed by layout identifier.
pub struct ClientRouter {
	config: PagesConfig,
	builder: RouteTableBuilder,
	loader: Arc<dyn ModuleLoader>,
	container: Arc<ServiceContainer>,
	history: Arc<dyn History>,
	predefined: Option<Arc<RouteTable>>,
	routes: RwLock<Option<Arc<RouteTable>>>,
	state: RwLock<RouterState>,
	module_cache: RwLock<HashMap<String, Arc<PageModule>>>,
	layouts: LayoutCache,
	fallback: PageFn,
	not_found: PageFn,
	error_view: ErrorViewFn,
	current: RwLock<RouterContext>,
	initial_props: Mutex<Option<Props>>,
}

impl ClientRouter {
	/// Creates a router using the process-wide configuration.
	pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
		Self::with_config(loader, get_config())
	}

	/// Creates a router pinned to an explicit configuration.
	pub fn with_config(loader: Arc<dyn ModuleLoader>, config: PagesConfig) -> Self {
		Self {
			builder: RouteTableBuilder::with_config(config.clone()),
			config,
			loader,
			container: Arc::new(ServiceContainer::new()),
			history: Arc::new(MemoryHistory::new()),
			predefined: None,
			routes: RwLock::new(None),
			state: RwLock::new(RouterState::Loading),
			module_cache: RwLock::new(HashMap::new()),
			layouts: LayoutCache::new(),
			fallback: default_fallback(),
			not_found: default_not_found(),
			error_view: default_error_view(),
			current: RwLock::new(RouterContext::default()),
			initial_props: Mutex::new(None),
		}
	}

	/// Supplies a predefined route table, skipping discovery.
	pub fn with_routes(mut self, table: RouteTable) -> Self {
		self.predefined = Some(Arc::new(table));
		self
	}

	/// Shares an existing service container instead of constructing a
	/// fresh one.
	pub fn with_container(mut self, container: Arc<ServiceContainer>) -> Self {
		self.container = container;
		self
	}

	/// Replaces the history backend.
	pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
		self.history = history;
		self
	}

	/// Replaces the fallback shown while loading or resolving.
	pub fn with_fallback(mut self, fallback: PageFn) -> Self {
		self.fallback = fallback;
		self
	}

	/// Replaces the not-found view.
	pub fn with_not_found(mut self, not_found: PageFn) -> Self {
		self.not_found = not_found;
		self
	}

	/// Replaces the error view.
	pub fn with_error_view<F>(mut self, error_view: F) -> Self
	where
		F: Fn(&RouterError) -> Page + Send + Sync + 'static,
	{
		self.error_view = Arc::new(error_view);
		self
	}

	/// The service container shared by this session's renders.
	pub fn container(&self) -> &Arc<ServiceContainer> {
		&self.container
	}

	/// The current phase.
	pub fn phase(&self) -> RouterPhase {
		self.state.read().phase()
	}

	/// The error held by the `Errored` state, if any.
	pub fn error(&self) -> Option<Arc<RouterError>> {
		match &*self.state.read() {
			RouterState::Errored { error } => Some(error.clone()),
			_ => None,
		}
	}

	/// A snapshot of the navigation context.
	pub fn context(&self) -> RouterContext {
		self.current.read().clone()
	}

	/// The view shown while a phase is in flight.
	pub fn fallback_view(&self) -> Page {
		(self.fallback)(&PageContext::new())
	}

	fn set_state(&self, next: RouterState) {
		let mut state = self.state.write();
		if state.accepts(&next) {
			tracing::debug!(from = ?state.phase(), to = ?next.phase(), "router transition");
			*state = next;
		} else {
			tracing::debug!(
				from = ?state.phase(),
				to = ?next.phase(),
				"ignoring illegal router transition"
			);
		}
	}

	fn load_routes(&self) -> Result<Arc<RouteTable>, RouteDiscoveryError> {
		if let Some(predefined) = &self.predefined {
			return Ok(predefined.clone());
		}
		self.builder.try_discover(true)
	}

	/// Mounts the router: loads routes (unless a predefined table was
	/// supplied), consumes at most one hydration payload, and renders
	/// the initial path.
	///
	/// The payload is passed in explicitly by the bootstrap; its props
	/// become the matched component's initial props on this first
	/// render, bypassing a redundant client-side data fetch.
	pub async fn mount(&self, initial_path: &str, hydration: Option<HydrationPayload>) -> Page {
		if let Some(payload) = hydration {
			tracing::debug!(pathname = %payload.pathname, "consuming hydration payload");
			*self.initial_props.lock() = Some(payload.props);
		}

		match self.load_routes() {
			Ok(table) => {
				*self.routes.write() = Some(table);
				self.set_state(RouterState::Ready);
			}
			Err(err) => {
				let error = Arc::new(RouterError::from(err));
				self.set_state(RouterState::Errored {
					error: error.clone(),
				});
				return (self.error_view)(&error);
			}
		}

		if self.history.current().is_none() {
			self.history.replace(&self.href(initial_path), None);
		}
		self.render_path(initial_path).await
	}

	/// Renders the given path: match, lazily load the component,
	/// resolve the layout through the cache, and wrap.
	pub async fn render_path(&self, path: &str) -> Page {
		let snapshot = self.state.read().clone();
		match snapshot {
			RouterState::Loading => return self.fallback_view(),
			RouterState::Errored { error } => return (self.error_view)(&error),
			_ => {}
		}

		let (pathname, query) = split_query(path);
		let Some(routes) = self.routes.read().clone() else {
			return self.fallback_view();
		};

		self.set_state(RouterState::Resolving {
			path: pathname.clone(),
		});

		let Some(matched) = routes.match_path(&pathname) else {
			*self.current.write() = RouterContext {
				pathname: pathname.clone(),
				params: Params::new(),
				query: query.clone(),
			};
			self.set_state(RouterState::Rendered {
				path: pathname.clone(),
			});
			let ctx = PageContext::new()
				.with_query(query)
				.with_services(self.container.clone());
			return (self.not_found)(&ctx);
		};

		let params = matched.params.clone();
		let page_id = matched.entry.page_id.clone();
		let layout_id = matched.entry.layout_id.clone();

		let module = match self.load_module(&page_id).await {
			Ok(module) => module,
			Err(err) => {
				let error = Arc::new(RouterError::from(err));
				tracing::error!(error = %error, "route component failed to load");
				self.set_state(RouterState::Errored {
					error: error.clone(),
				});
				return (self.error_view)(&error);
			}
		};

		// Hydration props apply to the first render only.
		let props = self.initial_props.lock().take().unwrap_or_default();
		let page_ctx = PageContext {
			props,
			params: params.clone(),
			query: query.clone(),
			services: Some(self.container.clone()),
		};
		let mut content = (module.component)(&page_ctx);

		if let Some(layout_id) = layout_id
			&& let Some(layout) = self.layouts.get_or_load(&layout_id, self.loader.as_ref()).await
		{
			content = layout(content);
		}

		*self.current.write() = RouterContext {
			pathname: pathname.clone(),
			params,
			query,
		};
		self.set_state(RouterState::Rendered { path: pathname });
		content
	}

	/// Renders whatever path the navigation context currently points
	/// at.
	pub async fn render_current(&self) -> Page {
		let pathname = self.current.read().pathname.clone();
		let path = if pathname.is_empty() { "/" } else { &pathname };
		self.render_path(path).await
	}

	async fn load_module(&self, page_id: &str) -> Result<Arc<PageModule>, ModuleLoadError> {
		if let Some(module) = self.module_cache.read().get(page_id).cloned() {
			return Ok(module);
		}
		let module = self.loader.load_page(page_id).await?;
		self.module_cache
			.write()
			.insert(page_id.to_string(), module.clone());
		Ok(module)
	}

	/// Navigates to a path, mutating history directly (push, or
	/// replace with [`NavigateOptions::replace`]) and updating the
	/// navigation context. Rendering is the caller's next step via
	/// [`Self::render_current`].
	pub fn navigate(&self, path: &str, options: NavigateOptions) {
		let target = self.href(path);
		if options.replace {
			self.history.replace(&target, options.state);
		} else {
			self.history.push(&target, options.state);
		}
		self.update_context(path);
	}

	/// Moves back one history entry.
	pub fn back(&self) {
		if let Some(href) = self.history.back() {
			let logical = self.logical(&href);
			self.update_context(&logical);
		}
	}

	/// Moves forward one history entry.
	pub fn forward(&self) {
		if let Some(href) = self.history.forward() {
			let logical = self.logical(&href);
			self.update_context(&logical);
		}
	}

	/// Resets an errored router back to `Loading` and discards the
	/// cached table so the next mount rediscovers routes.
	pub fn retry(&self) {
		self.builder.clear_cache();
		*self.routes.write() = None;
		self.set_state(RouterState::Loading);
	}

	fn update_context(&self, path: &str) {
		let (pathname, query) = split_query(path);
		let params = self
			.routes
			.read()
			.clone()
			.and_then(|routes| routes.match_path(&pathname).map(|matched| matched.params))
			.unwrap_or_default();
		*self.current.write() = RouterContext {
			pathname,
			params,
			query,
		};
	}

	fn href(&self, path: &str) -> String {
		if self.config.base_path.is_empty() {
			path.to_string()
		} else {
			format!("{}{}", self.config.base_path, path)
		}
	}

	fn logical(&self, href: &str) -> String {
		if self.config.base_path.is_empty() {
			return href.to_string();
		}
		href.strip_prefix(&self.config.base_path)
			.map(|rest| {
				if rest.is_empty() {
					"/".to_string()
				} else {
					rest.to_string()
				}
			})
			.unwrap_or_else(|| href.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nimbus_routes::{RouteEntry, StaticModuleLoader};

	fn loader_with(pages: &[(&str, &str)]) -> Arc<StaticModuleLoader> {
		let loader = StaticModuleLoader::new();
		for (id, text) in pages {
			let text = text.to_string();
			loader.register_page(
				*id,
				PageModule::new(page_fn(move |_| Page::text(text.clone()))),
			);
		}
		Arc::new(loader)
	}

	fn table(entries: Vec<RouteEntry>) -> RouteTable {
		RouteTable::new(entries)
	}

	#[tokio::test]
	async fn test_predefined_routes_skip_discovery() {
		let loader = loader_with(&[("home", "welcome")]);
		let router = ClientRouter::with_config(loader, PagesConfig::default())
			.with_routes(table(vec![RouteEntry::new("/", "home")]));

		assert_eq!(router.phase(), RouterPhase::Loading);
		let page = router.mount("/", None).await;
		assert_eq!(page.render_to_string(), "welcome");
		assert_eq!(router.phase(), RouterPhase::Rendered);
	}

	#[tokio::test]
	async fn test_unmatched_path_renders_not_found() {
		let loader = loader_with(&[("home", "welcome")]);
		let router = ClientRouter::with_config(loader, PagesConfig::default())
			.with_routes(table(vec![RouteEntry::new("/", "home")]));

		let page = router.mount("/missing", None).await;
		assert!(page.render_to_string().contains("404"));
		// NotFound is a rendered result, not an error state.
		assert_eq!(router.phase(), RouterPhase::Rendered);
	}

	#[tokio::test]
	async fn test_component_load_failure_is_errored_with_retry() {
		let loader = Arc::new(StaticModuleLoader::new());
		let router = ClientRouter::with_config(loader, PagesConfig::default())
			.with_routes(table(vec![RouteEntry::new("/", "unregistered")]));

		let page = router.mount("/", None).await;
		assert!(page.render_to_string().contains("An error occurred"));
		assert_eq!(router.phase(), RouterPhase::Errored);
		assert!(router.error().is_some());

		router.retry();
		assert_eq!(router.phase(), RouterPhase::Loading);
		assert!(router.error().is_none());
	}

	#[tokio::test]
	async fn test_layout_wraps_route_content() {
		let loader = StaticModuleLoader::new();
		loader.register_page("home", PageModule::new(page_fn(|_| Page::text("inner"))));
		loader.register_layout(
			"layout.rs",
			nimbus_core::layout_fn(|content| {
				PageElement::new("main").child(content).into_page()
			}),
		);
		let router = ClientRouter::with_config(Arc::new(loader), PagesConfig::default())
			.with_routes(table(vec![
				RouteEntry::new("/", "home").with_layout("layout.rs"),
			]));

		let page = router.mount("/", None).await;
		assert_eq!(page.render_to_string(), "<main>inner</main>");
	}

	#[tokio::test]
	async fn test_layout_load_failure_renders_unwrapped() {
		let loader = loader_with(&[("home", "inner")]);
		let router = ClientRouter::with_config(loader, PagesConfig::default())
			.with_routes(table(vec![
				RouteEntry::new("/", "home").with_layout("missing-layout.rs"),
			]));

		let page = router.mount("/", None).await;
		// Content is identical to the unwrapped route; no error
		// reaches the caller.
		assert_eq!(page.render_to_string(), "inner");
		assert_eq!(router.phase(), RouterPhase::Rendered);
	}

	#[tokio::test]
	async fn test_hydration_props_consumed_once() {
		let loader = StaticModuleLoader::new();
		loader.register_page(
			"home",
			PageModule::new(page_fn(|ctx| {
				match ctx.prop("count") {
					Some(value) => Page::text(format!("count={}", value)),
					None => Page::text("no props"),
				}
			})),
		);
		let router = ClientRouter::with_config(Arc::new(loader), PagesConfig::default())
			.with_routes(table(vec![RouteEntry::new("/", "home")]));

		let mut props = Props::new();
		props.insert("count".to_string(), serde_json::json!(3));
		let payload = HydrationPayload::new("/").with_props(props);

		let page = router.mount("/", Some(payload)).await;
		assert_eq!(page.render_to_string(), "count=3");

		// A later render of the same route fetches fresh: the payload
		// was cleared after its single use.
		let page = router.render_path("/").await;
		assert_eq!(page.render_to_string(), "no props");
	}

	#[tokio::test]
	async fn test_mount_without_hydration_has_no_props() {
		let loader = StaticModuleLoader::new();
		loader.register_page(
			"home",
			PageModule::new(page_fn(|ctx| {
				Page::text(format!("props={}", ctx.props.len()))
			})),
		);
		let router = ClientRouter::with_config(Arc::new(loader), PagesConfig::default())
			.with_routes(table(vec![RouteEntry::new("/", "home")]));

		let page = router.mount("/", None).await;
		assert_eq!(page.render_to_string(), "props=0");
	}

	#[tokio::test]
	async fn test_navigation_context_tracks_params_and_query() {
		let loader = loader_with(&[("home", "home"), ("user", "user")]);
		let router = ClientRouter::with_config(loader, PagesConfig::default()).with_routes(table(
			vec![
				RouteEntry::new("/", "home"),
				RouteEntry::new("/users/:id", "user"),
			],
		));
		router.mount("/", None).await;

		router.navigate("/users/42?tab=posts", NavigateOptions::default());
		let ctx = router.context();
		assert_eq!(ctx.pathname, "/users/42");
		assert_eq!(ctx.params.get("id").map(String::as_str), Some("42"));
		assert_eq!(ctx.query.get("tab").map(String::as_str), Some("posts"));

		router.back();
		assert_eq!(router.context().pathname, "/");
		router.forward();
		assert_eq!(router.context().pathname, "/users/42");
	}

	#[tokio::test]
	async fn test_navigate_replace_keeps_history_depth() {
		let loader = loader_with(&[("home", "home"), ("about", "about")]);
		let router = ClientRouter::with_config(loader, PagesConfig::default()).with_routes(table(
			vec![
				RouteEntry::new("/", "home"),
				RouteEntry::new("/about", "about"),
			],
		));
		router.mount("/", None).await;

		router.navigate(
			"/about",
			NavigateOptions {
				replace: true,
				state: None,
			},
		);
		assert_eq!(router.context().pathname, "/about");
		// The initial entry was replaced, so there is nothing to go
		// back to.
		router.back();
		assert_eq!(router.context().pathname, "/about");
	}

	#[tokio::test]
	async fn test_module_loaded_once_per_entry() {
		use std::sync::atomic::{AtomicUsize, Ordering};

		static CALLS: AtomicUsize = AtomicUsize::new(0);

		let loader = StaticModuleLoader::new();
		loader.register_page(
			"home",
			PageModule::new(page_fn(|_| {
				CALLS.fetch_add(1, Ordering::SeqCst);
				Page::text("home")
			})),
		);
		let router = ClientRouter::with_config(Arc::new(loader), PagesConfig::default())
			.with_routes(table(vec![RouteEntry::new("/", "home")]));

		router.mount("/", None).await;
		router.render_path("/").await;
		// The component function runs per render, but through the
		// same cached module.
		assert_eq!(CALLS.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_state_machine_rejects_illegal_transitions() {
		assert!(RouterState::Loading.accepts(&RouterState::Ready));
		assert!(RouterState::Ready.accepts(&RouterState::Resolving {
			path: "/".to_string()
		}));
		assert!(!RouterState::Loading.accepts(&RouterState::Rendered {
			path: "/".to_string()
		}));
		assert!(
			!RouterState::Rendered {
				path: "/".to_string()
			}
			.accepts(&RouterState::Ready)
		);
	}

	#[test]
	fn test_split_query() {
		let (pathname, query) = split_query("/search?q=nimbus&page=2");
		assert_eq!(pathname, "/search");
		assert_eq!(query.get("q").map(String::as_str), Some("nimbus"));
		assert_eq!(query.get("page").map(String::as_str), Some("2"));

		let (pathname, query) = split_query("/plain");
		assert_eq!(pathname, "/plain");
		assert!(query.is_empty());
	}
}
