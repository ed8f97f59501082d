//! Core component and rendering primitives.
//!
//! The `Page` tree, the `Component`/`IntoPage` traits, render
//! contexts and the data-hook signatures shared by the client and
//! server pipelines.

pub use nimbus_core::*;
