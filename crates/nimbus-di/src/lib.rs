//! # Nimbus Dependency Injection
//!
//! A token-keyed service container scoped to one render context.
//!
//! ## Design
//!
//! - **Per-render isolation**: a fresh container is constructed for
//!   every server request (and once per browser session) and threaded
//!   through the render pipeline. Singletons are therefore scoped to
//!   one render, never shared across concurrent requests.
//! - **Lazy resolution**: factories run on first `get`/`get_async`;
//!   singleton results are cached, transient registrations re-run the
//!   factory every time.
//! - **Async-aware**: async factories are first-class, but only
//!   through `get_async` — calling `get` on an async registration is
//!   a contract violation and fails loudly rather than handing back a
//!   pending value.
//! - **Circular detection**: re-entering a token that is mid-
//!   resolution fails immediately with a circular-dependency error
//!   instead of deadlocking.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nimbus_di::{Service, ServiceContainer};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! impl Service for Database {}
//!
//! let container = ServiceContainer::new();
//! container.register_async_factory("db", || async {
//!     Ok(Database { url: connect().await? })
//! });
//!
//! let db = container.get_async::<Database>("db").await?;
//! ```

mod container;
mod error;
mod service;
mod token;

pub use container::{RegisterOptions, ServiceContainer};
pub use error::ServiceError;
pub use service::{ConstructibleService, Service};
pub use token::ServiceToken;
