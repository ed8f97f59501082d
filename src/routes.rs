//! Routing module.
//!
//! Route discovery from the file-system convention, pattern matching,
//! and the pluggable module loader.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nimbus::routes::{discover_routes, file_path_to_route_path};
//! use nimbus::conf::get_config;
//!
//! let table = discover_routes(true);
//! let path = file_path_to_route_path("src/app/blog/[slug]/page.rs", &get_config());
//! assert_eq!(path, "/blog/:slug");
//! ```

pub use nimbus_routes::*;
