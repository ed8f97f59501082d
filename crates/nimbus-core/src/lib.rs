//! # Nimbus Core
//!
//! Shared primitives for the Nimbus rendering pipeline: the [`Page`]
//! tree produced by components, the [`PageContext`] / [`RenderContext`]
//! types that thread render-scoped state (props, params, query, the
//! service container) through both execution environments, and the
//! data-hook signatures page modules export for SSR and static
//! generation.
//!
//! Everything here is deliberately engine-agnostic: a `Page` can be
//! rendered to a string on the server or handed to a browser runtime
//! for mounting, and route components are plain functions over a
//! context, so the same component behaves identically under
//! client-side rendering, server-side rendering and static generation.

pub mod context;
pub mod hooks;
pub mod page;

pub use context::{
	LayoutFn, PageContext, PageFn, Params, Props, Query, RenderContext, RenderRequest,
	ResponseMeta, layout_fn, page_fn,
};
pub use hooks::{
	HookError, PropsOutcome, ServerPropsFn, StaticPathsFn, StaticPropsContext, StaticPropsFn,
	server_props, static_paths, static_props,
};
pub use page::{Component, IntoPage, Page, PageElement, escape_html, escape_json_for_script};
