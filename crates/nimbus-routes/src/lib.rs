//! # Nimbus Routes
//!
//! File-system routing: discovery of `page.<ext>` files under a
//! directory convention, conversion of file paths to URL patterns
//! (including `[name]` dynamic and `[...name]` catch-all segments),
//! nearest-layout resolution, match-priority sorting, and the
//! segment-wise matcher shared by the client router and the server
//! renderer.
//!
//! The physical module system is abstracted behind [`ModuleLoader`]:
//! the table stores loader identifiers, and the router or renderer
//! resolves them lazily when a route first renders.

pub mod convert;
pub mod discovery;
pub mod loader;
pub mod metadata;
pub mod pattern;
pub mod table;

pub use convert::file_path_to_route_path;
pub use discovery::{
	RouteDiscoveryError, RouteTableBuilder, clear_routes_cache, discover_routes,
};
pub use loader::{ModuleLoadError, ModuleLoader, PageModule, StaticModuleLoader};
pub use metadata::RouteMetadata;
pub use pattern::{RoutePattern, RouteSegment};
pub use table::{RouteEntry, RouteMatch, RouteTable};
