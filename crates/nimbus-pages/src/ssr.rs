//! Server-side rendering and static generation.
//!
//! One [`RenderContext`] arrives per request with a fresh service
//! container; the renderer matches the route table, runs the route's
//! data hook inside that container's scope, renders the component to
//! markup, and embeds the hydration payload into the final document.
//! Redirect and not-found hook outcomes short-circuit rendering
//! entirely; any uncaught failure degrades to a 500 result rather
//! than crashing the host's request handler.

use crate::hydration::HydrationPayload;
use futures::future::BoxFuture;
use nimbus_core::{
	HookError, Page, PageContext, Params, PropsOutcome, Props, Query, RenderContext,
	StaticPropsContext, escape_html,
};
use nimbus_di::ServiceContainer;
use nimbus_routes::{ModuleLoadError, ModuleLoader, RouteSegment, RouteTable};
use std::collections::HashMap;
use std::sync::Arc;

/// The outcome of one server render.
#[derive(Debug, Clone)]
pub struct RenderResult {
	/// The full document markup. Empty for redirects.
	pub html: String,
	/// The hydration payload embedded in the document, when one was
	/// produced.
	pub initial_data: Option<HydrationPayload>,
	/// The response status code.
	pub status_code: u16,
	/// Redirect destination, when the data hook requested one.
	pub redirect: Option<String>,
	/// Response headers accumulated during the render.
	pub headers: HashMap<String, String>,
}

/// One statically generated page.
#[derive(Debug, Clone)]
pub struct StaticPage {
	/// The concrete path the page was generated for.
	pub path: String,
	/// The full document markup.
	pub html: String,
}

/// A failure inside the render pipeline, recovered into a 500 result.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// The page module failed to load.
	#[error("page module failed to load: {0}")]
	Module(#[from] ModuleLoadError),
	/// The route's data hook failed.
	#[error("data hook failed: {0}")]
	Hook(#[source] HookError),
}

/// A custom document component: receives the rendered content and the
/// hydration payload, returns the document body. The hydration script
/// is appended after it.
pub type DocumentFn = Arc<dyn Fn(&str, &HydrationPayload) -> Page + Send + Sync>;

/// Registers per-request services on the render's container before
/// any data loading runs.
pub type SetupServicesFn =
	Arc<dyn Fn(Arc<RenderContext>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Observes render failures for logging or telemetry.
pub type OnErrorFn = Arc<dyn Fn(&RenderError, &RenderContext) + Send + Sync>;

const DEFAULT_TEMPLATE: &str = "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
<title>Nimbus App</title>\n\
</head>\n\
<body>\n\
<div id=\"app\">{{content}}</div>\n\
{{hydration}}\n\
<script src=\"/bundle.js\"></script>\n\
</body>\n\
</html>";

/// Options for [`SsrRenderer`].
#[derive(Clone, Default)]
pub struct SsrOptions {
	/// Document template with `{{content}}` and `{{hydration}}`
	/// placeholders, used when no document component is set.
	pub template: Option<String>,
	/// Custom document component.
	pub document: Option<DocumentFn>,
	/// Per-request service setup, run before data hooks.
	pub setup_services: Option<SetupServicesFn>,
	/// Error callback for failed renders.
	pub on_error: Option<OnErrorFn>,
}

impl SsrOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the document template.
	pub fn template(mut self, template: impl Into<String>) -> Self {
		self.template = Some(template.into());
		self
	}

	/// Sets the custom document component.
	pub fn document<F>(mut self, document: F) -> Self
	where
		F: Fn(&str, &HydrationPayload) -> Page + Send + Sync + 'static,
	{
		self.document = Some(Arc::new(document));
		self
	}

	/// Sets the per-request service setup hook.
	pub fn setup_services<F, Fut>(mut self, setup: F) -> Self
	where
		F: Fn(Arc<RenderContext>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		self.setup_services = Some(Arc::new(move |ctx| Box::pin(setup(ctx))));
		self
	}

	/// Sets the error callback.
	pub fn on_error<F>(mut self, on_error: F) -> Self
	where
		F: Fn(&RenderError, &RenderContext) + Send + Sync + 'static,
	{
		self.on_error = Some(Arc::new(on_error));
		self
	}
}

/// Renders pages server-side against a route table.
pub struct SsrRenderer {
	routes: Arc<RouteTable>,
	loader: Arc<dyn ModuleLoader>,
	options: SsrOptions,
}

impl SsrRenderer {
	/// Creates a renderer with default options.
	pub fn new(routes: Arc<RouteTable>, loader: Arc<dyn ModuleLoader>) -> Self {
		Self {
			routes,
			loader,
			options: SsrOptions::default(),
		}
	}

	/// Creates a renderer with custom options.
	pub fn with_options(
		routes: Arc<RouteTable>,
		loader: Arc<dyn ModuleLoader>,
		options: SsrOptions,
	) -> Self {
		Self {
			routes,
			loader,
			options,
		}
	}

	/// Renders one request.
	///
	/// Within the pass, service setup always completes before the
	/// data hook, and the hook before component rendering; a redirect
	/// or not-found hook outcome skips rendering entirely.
	pub async fn render_page(&self, ctx: RenderContext) -> RenderResult {
		let mut ctx = ctx;
		let matched = self.routes.match_path(&ctx.pathname);
		let Some(matched) = matched else {
			return self.render_not_found(&ctx);
		};

		ctx.params = matched.params.clone();
		let page_id = matched.entry.page_id.clone();
		let ctx = Arc::new(ctx);

		match self.try_render(ctx.clone(), &page_id).await {
			Ok(result) => result,
			Err(err) => {
				tracing::error!(pathname = %ctx.pathname, error = %err, "server render failed");
				if let Some(on_error) = &self.options.on_error {
					on_error(&err, &ctx);
				}
				self.render_error(&err, &ctx)
			}
		}
	}

	async fn try_render(
		&self,
		ctx: Arc<RenderContext>,
		page_id: &str,
	) -> Result<RenderResult, RenderError> {
		if let Some(setup) = &self.options.setup_services {
			setup(ctx.clone()).await;
		}

		let module = self.loader.load_page(page_id).await?;

		let mut props = Props::new();
		if let Some(hook) = &module.server_props {
			match hook(ctx.clone()).await.map_err(RenderError::Hook)? {
				PropsOutcome::Redirect {
					destination,
					permanent,
				} => {
					return Ok(RenderResult {
						html: String::new(),
						initial_data: None,
						status_code: if permanent { 301 } else { 302 },
						redirect: Some(destination),
						headers: ctx.response.read().headers.clone(),
					});
				}
				PropsOutcome::NotFound => return Ok(self.render_not_found(&ctx)),
				PropsOutcome::Props(hook_props) => props = hook_props,
			}
		}

		let page_ctx = PageContext {
			props: props.clone(),
			params: ctx.params.clone(),
			query: ctx.query.clone(),
			services: Some(ctx.services.clone()),
		};
		let content = (module.component)(&page_ctx).render_to_string();

		let payload = HydrationPayload {
			pathname: ctx.pathname.clone(),
			params: ctx.params.clone(),
			query: ctx.query.clone(),
			props,
		};
		let response = ctx.response.read().clone();

		Ok(RenderResult {
			html: self.wrap_document(&content, &payload),
			initial_data: Some(payload),
			status_code: response.status,
			redirect: None,
			headers: response.headers,
		})
	}

	/// Pre-renders every statically renderable route.
	///
	/// Routes exporting both a paths hook and a static props hook are
	/// generated once per enumerated parameter set; routes exporting
	/// only a static props hook are generated once when their pattern
	/// has no dynamic segments. Parameter sets whose hook signals
	/// not-found or redirect are skipped. Every page renders against
	/// a fresh, request-independent service container.
	pub async fn generate_static_pages(&self) -> Vec<StaticPage> {
		let mut pages = Vec::new();

		for entry in self.routes.entries() {
			let module = match self.loader.load_page(&entry.page_id).await {
				Ok(module) => module,
				Err(err) => {
					tracing::warn!(page = %entry.page_id, error = %err, "skipping unloadable page");
					continue;
				}
			};
			let Some(static_props) = &module.static_props else {
				continue;
			};

			let param_sets: Vec<Params> = if let Some(static_paths) = &module.static_paths {
				match static_paths().await {
					Ok(paths) => paths,
					Err(err) => {
						tracing::warn!(page = %entry.page_id, error = %err, "static paths hook failed");
						continue;
					}
				}
			} else if !entry.pattern.is_dynamic() {
				vec![Params::new()]
			} else {
				// A dynamic route without a paths hook cannot be
				// enumerated.
				continue;
			};

			for params in param_sets {
				let outcome = match static_props(StaticPropsContext {
					params: params.clone(),
				})
				.await
				{
					Ok(outcome) => outcome,
					Err(err) => {
						tracing::warn!(page = %entry.page_id, error = %err, "static props hook failed");
						continue;
					}
				};
				let props = match outcome {
					PropsOutcome::Props(props) => props,
					PropsOutcome::NotFound | PropsOutcome::Redirect { .. } => continue,
				};

				let path = instantiate_path(entry.pattern.segments(), &params);
				let services = Arc::new(ServiceContainer::new());
				let page_ctx = PageContext {
					props: props.clone(),
					params: params.clone(),
					query: Query::new(),
					services: Some(services),
				};
				let content = (module.component)(&page_ctx).render_to_string();
				let payload = HydrationPayload {
					pathname: path.clone(),
					params,
					query: Query::new(),
					props,
				};
				pages.push(StaticPage {
					path,
					html: self.wrap_document(&content, &payload),
				});
			}
		}

		pages
	}

	fn wrap_document(&self, content: &str, payload: &HydrationPayload) -> String {
		let hydration_script = payload.to_script_tag();

		if let Some(document) = &self.options.document {
			let body = document(content, payload).render_to_string();
			return format!("<!DOCTYPE html>{}{}", body, hydration_script);
		}

		self.options
			.template
			.as_deref()
			.unwrap_or(DEFAULT_TEMPLATE)
			.replace("{{content}}", content)
			.replace("{{hydration}}", &hydration_script)
	}

	fn render_not_found(&self, ctx: &RenderContext) -> RenderResult {
		let payload = HydrationPayload::new(ctx.pathname.clone());
		RenderResult {
			html: self.wrap_document("<div><h1>404 - Page Not Found</h1></div>", &payload),
			initial_data: None,
			status_code: 404,
			redirect: None,
			headers: HashMap::new(),
		}
	}

	fn render_error(&self, err: &RenderError, ctx: &RenderContext) -> RenderResult {
		// Message only; stack traces and error sources never reach
		// the response body.
		let content = format!(
			"<div><h1>500 - Server Error</h1><p>{}</p></div>",
			escape_html(&err.to_string())
		);
		let payload = HydrationPayload::new(ctx.pathname.clone());
		RenderResult {
			html: self.wrap_document(&content, &payload),
			initial_data: None,
			status_code: 500,
			redirect: None,
			headers: HashMap::new(),
		}
	}
}

/// Substitutes captured parameters back into a pattern, producing the
/// concrete generated path.
fn instantiate_path(segments: &[RouteSegment], params: &Params) -> String {
	let mut parts = Vec::with_capacity(segments.len());
	for segment in segments {
		match segment {
			RouteSegment::Literal(literal) => parts.push(literal.clone()),
			RouteSegment::Param(name) | RouteSegment::CatchAll(name) => {
				match params.get(name) {
					Some(value) => parts.push(value.clone()),
					None => {
						tracing::warn!(param = %name, "static path parameter missing");
						parts.push(format!(":{}", name));
					}
				}
			}
		}
	}
	if parts.is_empty() {
		"/".to_string()
	} else {
		format!("/{}", parts.join("/"))
	}
}
