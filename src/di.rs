//! Dependency injection module.
//!
//! The per-render service container.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nimbus::di::{Service, ServiceContainer};
//!
//! struct Greeter;
//! impl Service for Greeter {}
//!
//! let container = ServiceContainer::new();
//! container.register("greeter", Greeter);
//! assert!(container.has("greeter"));
//! ```

pub use nimbus_di::*;
