//! # Nimbus
//!
//! A file-system-routed web framework for Rust with hybrid rendering:
//! client-side rendering, server-side rendering and static generation
//! over one shared route table.
//!
//! ## Core Principles
//!
//! - **Convention-based routing**: pages are `page.<ext>` files under
//!   a routes directory; `[name]` directories become dynamic segments
//!   and `[...name]` directories become catch-alls.
//! - **One matcher everywhere**: the client router and the server
//!   renderer consume the same discovered, priority-sorted route
//!   table and match paths identically.
//! - **Per-render service scope**: a fresh dependency-injection
//!   container is constructed per server request (and per browser
//!   session) and threaded through every page render, so request
//!   state never leaks between renders.
//! - **Explicit state**: routing lifecycle, caches and the
//!   server-to-client hydration handoff are explicit values with
//!   defined invalidation, not ambient globals.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use nimbus::prelude::*;
//!
//! // Register the modules the build step discovered.
//! let loader = Arc::new(StaticModuleLoader::new());
//! loader.register_page("page.rs", PageModule::new(page_fn(|_ctx| {
//!     PageElement::new("h1").child("Hello").into_page()
//! })));
//!
//! // Server side: render a request.
//! let routes = discover_routes(true);
//! let renderer = SsrRenderer::new(routes, loader.clone());
//! let result = renderer.render_page(ctx).await;
//!
//! // Client side: mount with the hydration payload the server
//! // embedded into the document.
//! let router = ClientRouter::new(loader);
//! let page = router.mount("/", nimbus::take_payload()).await;
//! ```

// Module re-exports, one per member crate
pub mod conf;
pub mod core;
pub mod di;
pub mod pages;
pub mod routes;

// Re-export configuration
pub use nimbus_conf::{PagesConfig, PagesConfigOverrides, get_config, reset_config, set_config};

// Re-export component primitives
pub use nimbus_core::{
	Component, IntoPage, Page, PageContext, PageElement, PageFn, Params, Props, PropsOutcome,
	Query, RenderContext, RenderRequest, layout_fn, page_fn, server_props, static_paths,
	static_props,
};

// Re-export the service container
pub use nimbus_di::{Service, ServiceContainer, ServiceError, ServiceToken};

// Re-export routing
pub use nimbus_routes::{
	ModuleLoader, PageModule, RouteEntry, RouteTable, RouteTableBuilder, StaticModuleLoader,
	clear_routes_cache, discover_routes, file_path_to_route_path,
};

// Re-export rendering
pub use nimbus_pages::{
	ClientRouter, HydrationPayload, NavigateOptions, RenderResult, RouterContext, RouterPhase,
	SsrOptions, SsrRenderer, set_payload, take_payload,
};

/// Commonly used types, importable as a block.
pub mod prelude {
	pub use nimbus_conf::{PagesConfig, PagesConfigOverrides, get_config, set_config};
	pub use nimbus_core::{
		Component, IntoPage, Page, PageContext, PageElement, PageFn, Params, Props, PropsOutcome,
		Query, RenderContext, RenderRequest, layout_fn, page_fn, server_props, static_paths,
		static_props,
	};
	pub use nimbus_di::{Service, ServiceContainer, ServiceError, ServiceToken};
	pub use nimbus_pages::{
		ClientRouter, HydrationPayload, NavigateOptions, RenderResult, RouterContext, RouterPhase,
		SsrOptions, SsrRenderer,
	};
	pub use nimbus_routes::{
		ModuleLoader, PageModule, RouteEntry, RouteTable, RouteTableBuilder, StaticModuleLoader,
		discover_routes, file_path_to_route_path,
	};
	pub use std::sync::Arc;
}
