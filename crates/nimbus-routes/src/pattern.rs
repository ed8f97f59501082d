//! Route patterns and segment matching.
//!
//! A pattern is an ordered sequence of path segments: literals,
//! named captures (`:id`) and catch-alls (`*rest`). Matching is
//! segment-wise and case-sensitive; no regular expressions are
//! involved, which keeps the comparison identical between the client
//! router and the server renderer.

use nimbus_core::Params;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
	/// Must equal the path segment exactly.
	Literal(String),
	/// Captures a single path segment under the given name.
	Param(String),
	/// Captures one or more trailing path components under the given
	/// name. Only meaningful as the final segment; anywhere else it
	/// degrades to single-segment capture.
	CatchAll(String),
}

impl RouteSegment {
	fn parse(segment: &str) -> Self {
		if let Some(name) = segment.strip_prefix(':') {
			Self::Param(name.to_string())
		} else if let Some(name) = segment.strip_prefix('*') {
			Self::CatchAll(name.to_string())
		} else {
			Self::Literal(segment.to_string())
		}
	}

	/// Returns true for capture segments.
	pub fn is_dynamic(&self) -> bool {
		!matches!(self, Self::Literal(_))
	}
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
	raw: String,
	segments: Vec<RouteSegment>,
}

impl RoutePattern {
	/// Parses a pattern from its textual form, e.g. `/users/:id`.
	pub fn parse(pattern: &str) -> Self {
		let segments = pattern
			.split('/')
			.filter(|segment| !segment.is_empty())
			.map(RouteSegment::parse)
			.collect();
		Self {
			raw: pattern.to_string(),
			segments,
		}
	}

	/// The original textual form.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// The parsed segments.
	pub fn segments(&self) -> &[RouteSegment] {
		&self.segments
	}

	/// Returns true when the pattern contains any capture segment.
	pub fn is_dynamic(&self) -> bool {
		self.segments.iter().any(RouteSegment::is_dynamic)
	}

	fn has_trailing_catch_all(&self) -> bool {
		matches!(self.segments.last(), Some(RouteSegment::CatchAll(_)))
	}

	/// Matches a path against this pattern, returning the captured
	/// parameters on success.
	///
	/// Segment counts must be equal, except that a trailing catch-all
	/// accepts longer paths and captures the joined remainder.
	pub fn matches(&self, path: &str) -> Option<Params> {
		let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

		if self.has_trailing_catch_all() {
			if parts.len() < self.segments.len() {
				return None;
			}
		} else if parts.len() != self.segments.len() {
			return None;
		}

		let mut params = Params::new();
		for (index, segment) in self.segments.iter().enumerate() {
			match segment {
				RouteSegment::Literal(literal) => {
					if parts[index] != literal {
						return None;
					}
				}
				RouteSegment::Param(name) => {
					params.insert(name.clone(), parts[index].to_string());
				}
				RouteSegment::CatchAll(name) => {
					if index == self.segments.len() - 1 {
						params.insert(name.clone(), parts[index..].join("/"));
						break;
					}
					params.insert(name.clone(), parts[index].to_string());
				}
			}
		}
		Some(params)
	}
}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}
