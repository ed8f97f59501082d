//! The navigation history seam.
//!
//! The router mutates history through this trait rather than calling
//! a browser API directly, so navigation behaves the same whether the
//! session was hydrated from server markup or mounted fresh, and so
//! the router is testable off-browser. A WASM host implements the
//! trait over the History API; [`MemoryHistory`] is the default.

use parking_lot::Mutex;

/// Browser-history-shaped navigation state.
pub trait History: Send + Sync {
	/// Pushes a new entry.
	fn push(&self, path: &str, state: Option<serde_json::Value>);

	/// Replaces the current entry.
	fn replace(&self, path: &str, state: Option<serde_json::Value>);

	/// Moves back one entry, returning the new current path.
	fn back(&self) -> Option<String>;

	/// Moves forward one entry, returning the new current path.
	fn forward(&self) -> Option<String>;

	/// The current path, if any entry exists.
	fn current(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct MemoryHistoryInner {
	entries: Vec<(String, Option<serde_json::Value>)>,
	index: usize,
}

/// An in-memory [`History`]: the default outside a browser and the
/// natural test double.
#[derive(Debug, Default)]
pub struct MemoryHistory {
	inner: Mutex<MemoryHistoryInner>,
}

impl MemoryHistory {
	/// Creates an empty history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a history with one initial entry.
	pub fn starting_at(path: impl Into<String>) -> Self {
		let history = Self::new();
		history.push(&path.into(), None);
		history
	}
}

impl History for MemoryHistory {
	fn push(&self, path: &str, state: Option<serde_json::Value>) {
		let mut inner = self.inner.lock();
		let next = if inner.entries.is_empty() {
			0
		} else {
			inner.index + 1
		};
		// Pushing discards any forward entries.
		inner.entries.truncate(next);
		inner.entries.push((path.to_string(), state));
		inner.index = inner.entries.len() - 1;
	}

	fn replace(&self, path: &str, state: Option<serde_json::Value>) {
		let mut inner = self.inner.lock();
		if inner.entries.is_empty() {
			inner.entries.push((path.to_string(), state));
			inner.index = 0;
		} else {
			let index = inner.index;
			inner.entries[index] = (path.to_string(), state);
		}
	}

	fn back(&self) -> Option<String> {
		let mut inner = self.inner.lock();
		if inner.index == 0 {
			return None;
		}
		inner.index -= 1;
		inner.entries.get(inner.index).map(|(path, _)| path.clone())
	}

	fn forward(&self) -> Option<String> {
		let mut inner = self.inner.lock();
		if inner.index + 1 >= inner.entries.len() {
			return None;
		}
		inner.index += 1;
		inner.entries.get(inner.index).map(|(path, _)| path.clone())
	}

	fn current(&self) -> Option<String> {
		let inner = self.inner.lock();
		inner.entries.get(inner.index).map(|(path, _)| path.clone())
	}
}
