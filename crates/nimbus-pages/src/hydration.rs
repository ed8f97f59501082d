//! The server-to-client hydration handoff.
//!
//! The server serializes one [`HydrationPayload`] into the document as
//! an inline script assigning a well-known global. On first mount the
//! client reads the payload and passes it into the router bootstrap
//! explicitly; the process-global slot here exists only for that
//! outermost boundary and is consumed exactly once — core logic never
//! reads it.

use nimbus_core::{Params, Props, Query, escape_json_for_script};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The global variable name the document script assigns.
pub const HYDRATION_GLOBAL: &str = "__NIMBUS_DATA__";

/// Data computed on the server and replayed on the client: the
/// rendered path, its captured parameters, the parsed query, and the
/// props produced by the route's data hook.
///
/// Must be JSON-serializable; the embedded form escapes `</` so the
/// payload can never terminate its own script tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HydrationPayload {
	/// The rendered pathname.
	pub pathname: String,
	/// Captured route parameters.
	#[serde(default)]
	pub params: Params,
	/// Parsed query parameters.
	#[serde(default)]
	pub query: Query,
	/// Props computed by the server-side or static data hook.
	#[serde(default)]
	pub props: Props,
}

impl HydrationPayload {
	/// Creates a payload for a pathname with empty params, query and
	/// props.
	pub fn new(pathname: impl Into<String>) -> Self {
		Self {
			pathname: pathname.into(),
			..Self::default()
		}
	}

	/// Sets the route parameters.
	pub fn with_params(mut self, params: Params) -> Self {
		self.params = params;
		self
	}

	/// Sets the query parameters.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;
		self
	}

	/// Sets the props.
	pub fn with_props(mut self, props: Props) -> Self {
		self.props = props;
		self
	}

	/// Serializes the payload to JSON.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Parses a payload from JSON.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Renders the inline script tag assigning the payload to the
	/// hydration global, with `</` sequences escaped.
	pub fn to_script_tag(&self) -> String {
		let json = self.to_json().unwrap_or_else(|_| "null".to_string());
		format!(
			"<script>window.{} = {};</script>",
			HYDRATION_GLOBAL,
			escape_json_for_script(&json)
		)
	}
}

static SLOT: Mutex<Option<HydrationPayload>> = Mutex::new(None);

/// Stores a payload in the bootstrap slot. Called by the host's
/// entry script after parsing the document global.
pub fn set_payload(payload: HydrationPayload) {
	*SLOT.lock() = Some(payload);
}

/// Takes the payload out of the bootstrap slot, clearing it. The
/// second call in a session returns `None`.
pub fn take_payload() -> Option<HydrationPayload> {
	SLOT.lock().take()
}
