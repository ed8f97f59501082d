//! Render contexts shared by the client and server pipelines.
//!
//! A route component is a plain function from a [`PageContext`] to a
//! [`Page`]. The context carries whatever the active pipeline computed
//! for this render: initial props (server-computed or empty), matched
//! path parameters, parsed query parameters, and the service container
//! scoped to the render, so a component resolves services the same way
//! whether it runs during SSR or in the browser session.

use crate::page::Page;
use nimbus_di::ServiceContainer;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Free-form page props, as computed by a data hook.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Path parameters captured by a route pattern.
pub type Params = HashMap<String, String>;

/// Parsed query-string parameters.
pub type Query = HashMap<String, String>;

/// Everything a page function receives for one render.
#[derive(Clone, Default)]
pub struct PageContext {
	/// Initial props. Server-computed during SSR/SSG and on hydrated
	/// first mount; empty otherwise.
	pub props: Props,
	/// Captured path parameters.
	pub params: Params,
	/// Parsed query parameters.
	pub query: Query,
	/// The container scoped to this render, when one is attached.
	pub services: Option<Arc<ServiceContainer>>,
}

impl PageContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the initial props.
	pub fn with_props(mut self, props: Props) -> Self {
		self.props = props;
		self
	}

	/// Sets the path parameters.
	pub fn with_params(mut self, params: Params) -> Self {
		self.params = params;
		self
	}

	/// Sets the query parameters.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;
		self
	}

	/// Attaches a service container.
	pub fn with_services(mut self, services: Arc<ServiceContainer>) -> Self {
		self.services = Some(services);
		self
	}

	/// Looks up a prop by name.
	pub fn prop(&self, name: &str) -> Option<&serde_json::Value> {
		self.props.get(name)
	}

	/// Looks up a path parameter by name.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}
}

impl std::fmt::Debug for PageContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PageContext")
			.field("props", &self.props)
			.field("params", &self.params)
			.field("query", &self.query)
			.field("has_services", &self.services.is_some())
			.finish()
	}
}

/// A dynamically loaded route component.
pub type PageFn = Arc<dyn Fn(&PageContext) -> Page + Send + Sync>;

/// A layout component: wraps already-rendered route content.
pub type LayoutFn = Arc<dyn Fn(Page) -> Page + Send + Sync>;

/// Wraps a closure as a [`PageFn`].
pub fn page_fn<F>(f: F) -> PageFn
where
	F: Fn(&PageContext) -> Page + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Wraps a closure as a [`LayoutFn`].
pub fn layout_fn<F>(f: F) -> LayoutFn
where
	F: Fn(Page) -> Page + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Request metadata for one server render. Opaque to the core: the
/// host's networking stack fills it in.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
	/// The full request URL or path.
	pub url: String,
	/// The HTTP method.
	pub method: String,
	/// Request headers.
	pub headers: HashMap<String, String>,
	/// Parsed request cookies.
	pub cookies: HashMap<String, String>,
}

impl RenderRequest {
	/// Creates a GET request for the given URL.
	pub fn get(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			method: "GET".to_string(),
			headers: HashMap::new(),
			cookies: HashMap::new(),
		}
	}
}

/// Response metadata accumulated during a server render.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
	/// The response status code.
	pub status: u16,
	/// Response headers to emit.
	pub headers: HashMap<String, String>,
}

impl Default for ResponseMeta {
	fn default() -> Self {
		Self {
			status: 200,
			headers: HashMap::new(),
		}
	}
}

/// The per-request unit of a server render: request metadata, matched
/// route information, a container scoped to exactly this render, and a
/// scratch data bag for hooks.
///
/// One context is constructed per request (or per static-generation
/// unit) and never shared across concurrent renders; request-scoped
/// state lives in `services` and `data`, which is what keeps renders
/// isolated from each other.
pub struct RenderContext {
	/// Incoming request metadata.
	pub request: RenderRequest,
	/// Outgoing response metadata. Interior-mutable so data hooks can
	/// set headers through a shared context.
	pub response: RwLock<ResponseMeta>,
	/// The path being rendered.
	pub pathname: String,
	/// Path parameters captured by the matched route.
	pub params: Params,
	/// Parsed query parameters.
	pub query: Query,
	/// The container scoped to this render.
	pub services: Arc<ServiceContainer>,
	/// Scratch storage shared between hooks within one render.
	pub data: RwLock<HashMap<String, serde_json::Value>>,
}

impl RenderContext {
	/// Creates a context for the given path with a fresh data bag.
	pub fn new(
		request: RenderRequest,
		pathname: impl Into<String>,
		services: Arc<ServiceContainer>,
	) -> Self {
		Self {
			request,
			response: RwLock::new(ResponseMeta::default()),
			pathname: pathname.into(),
			params: Params::new(),
			query: Query::new(),
			services,
			data: RwLock::new(HashMap::new()),
		}
	}

	/// Sets the query parameters.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;
		self
	}

	/// Stores a value in the scratch data bag.
	pub fn set_data(&self, key: impl Into<String>, value: serde_json::Value) {
		self.data.write().insert(key.into(), value);
	}

	/// Reads a value from the scratch data bag.
	pub fn get_data(&self, key: &str) -> Option<serde_json::Value> {
		self.data.read().get(key).cloned()
	}
}

impl std::fmt::Debug for RenderContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RenderContext")
			.field("pathname", &self.pathname)
			.field("params", &self.params)
			.field("query", &self.query)
			.finish()
	}
}
