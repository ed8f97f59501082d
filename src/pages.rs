//! Hybrid rendering module.
//!
//! The client router, server renderer, static generation and the
//! hydration handoff between them.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nimbus::pages::{ClientRouter, SsrRenderer};
//!
//! let renderer = SsrRenderer::new(routes, loader);
//! let result = renderer.render_page(ctx).await;
//! ```

pub use nimbus_pages::*;
