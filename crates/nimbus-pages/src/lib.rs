//! # Nimbus Pages
//!
//! The hybrid rendering layer: a client router driving an explicit
//! routing state machine with cached layouts and lazy component
//! loading, a server renderer producing full documents with embedded
//! hydration payloads, and static generation over the same route
//! table.
//!
//! Both environments consume one [`RouteTable`](nimbus_routes::RouteTable)
//! and match paths identically; what differs is only where props come
//! from (a server data hook vs. a consumed hydration payload vs. a
//! client-side fetch through services) and what happens to the
//! rendered [`Page`](nimbus_core::Page).

pub mod history;
pub mod hydration;
pub mod layout;
pub mod router;
pub mod ssr;

pub use history::{History, MemoryHistory};
pub use hydration::{HYDRATION_GLOBAL, HydrationPayload, set_payload, take_payload};
pub use layout::LayoutCache;
pub use router::{
	ClientRouter, NavigateOptions, RouterContext, RouterError, RouterPhase, RouterState,
};
pub use ssr::{
	DocumentFn, OnErrorFn, RenderError, RenderResult, SetupServicesFn, SsrOptions, SsrRenderer,
	StaticPage,
};
