//! Configuration module.
//!
//! Process-wide framework settings: routes/layouts directories, page
//! extensions, trailing-slash policy.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nimbus::conf::{PagesConfigOverrides, set_config};
//!
//! set_config(PagesConfigOverrides {
//!     routes_dir: Some("pages".into()),
//!     trailing_slash: Some(true),
//!     ..Default::default()
//! });
//! ```

pub use nimbus_conf::*;
