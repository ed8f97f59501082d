//! Data-loading hooks exported by page modules.
//!
//! A page module may export a server-side hook (run per request), a
//! static hook (run at generation time), and a static-paths hook
//! (enumerates parameter sets for generation). All three are stored
//! boxed so the route table can carry them without knowing the
//! concrete closure types.

use crate::context::{Params, Props, RenderContext};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Errors produced inside a data hook. The renderer does not inspect
/// these beyond logging; any hook failure becomes a 500 result.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// The outcome of a data hook.
#[derive(Debug, Clone, PartialEq)]
pub enum PropsOutcome {
	/// Render with the given props.
	Props(Props),
	/// Skip rendering and redirect.
	Redirect {
		/// Where to send the client.
		destination: String,
		/// Whether to respond with 301 instead of 302.
		permanent: bool,
	},
	/// Render the not-found result, regardless of anything else the
	/// hook computed.
	NotFound,
}

impl PropsOutcome {
	/// A props outcome with no props.
	pub fn empty() -> Self {
		Self::Props(Props::new())
	}

	/// A props outcome from key/value pairs.
	pub fn props(props: Props) -> Self {
		Self::Props(props)
	}

	/// A temporary (302) or permanent (301) redirect outcome.
	pub fn redirect(destination: impl Into<String>, permanent: bool) -> Self {
		Self::Redirect {
			destination: destination.into(),
			permanent,
		}
	}

	/// The not-found outcome.
	pub fn not_found() -> Self {
		Self::NotFound
	}
}

/// A per-request data hook. Receives the full render context; runs
/// after `setup_services` and before component rendering.
pub type ServerPropsFn =
	Arc<dyn Fn(Arc<RenderContext>) -> BoxFuture<'static, Result<PropsOutcome, HookError>> + Send + Sync>;

/// The context handed to a static data hook: parameters only, no
/// request, since static generation has no request.
#[derive(Debug, Clone, Default)]
pub struct StaticPropsContext {
	/// The parameter set being generated.
	pub params: Params,
}

/// A build-time data hook, invoked once per enumerated parameter set.
pub type StaticPropsFn =
	Arc<dyn Fn(StaticPropsContext) -> BoxFuture<'static, Result<PropsOutcome, HookError>> + Send + Sync>;

/// Enumerates the parameter sets a dynamic route should be generated
/// for.
pub type StaticPathsFn =
	Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<Params>, HookError>> + Send + Sync>;

/// Wraps an async closure as a [`ServerPropsFn`].
pub fn server_props<F, Fut>(f: F) -> ServerPropsFn
where
	F: Fn(Arc<RenderContext>) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<PropsOutcome, HookError>> + Send + 'static,
{
	Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Wraps an async closure as a [`StaticPropsFn`].
pub fn static_props<F, Fut>(f: F) -> StaticPropsFn
where
	F: Fn(StaticPropsContext) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<PropsOutcome, HookError>> + Send + 'static,
{
	Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Wraps an async closure as a [`StaticPathsFn`].
pub fn static_paths<F, Fut>(f: F) -> StaticPathsFn
where
	F: Fn() -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Params>, HookError>> + Send + 'static,
{
	Arc::new(move || Box::pin(f()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::RenderRequest;
	use nimbus_di::ServiceContainer;

	#[tokio::test]
	async fn test_server_props_hook_invocation() {
		let hook = server_props(|ctx: Arc<RenderContext>| async move {
			let mut props = Props::new();
			props.insert("path".to_string(), serde_json::json!(ctx.pathname));
			Ok(PropsOutcome::Props(props))
		});

		let ctx = Arc::new(RenderContext::new(
			RenderRequest::get("/about"),
			"/about",
			Arc::new(ServiceContainer::new()),
		));
		let outcome = hook(ctx).await.unwrap();
		assert_eq!(
			outcome,
			PropsOutcome::Props(Props::from_iter([(
				"path".to_string(),
				serde_json::json!("/about")
			)]))
		);
	}

	#[tokio::test]
	async fn test_static_paths_hook_enumeration() {
		let hook = static_paths(|| async {
			Ok(vec![
				Params::from([("slug".to_string(), "first".to_string())]),
				Params::from([("slug".to_string(), "second".to_string())]),
			])
		});
		let paths = hook().await.unwrap();
		assert_eq!(paths.len(), 2);
	}

	#[test]
	fn test_redirect_outcome_constructor() {
		let outcome = PropsOutcome::redirect("/login", false);
		assert_eq!(
			outcome,
			PropsOutcome::Redirect {
				destination: "/login".to_string(),
				permanent: false
			}
		);
	}
}
