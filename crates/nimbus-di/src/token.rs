//! Service registration keys.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(0);

/// A key under which a service is registered.
///
/// Three flavors, mirroring the usual registration styles:
/// - [`ServiceToken::name`] — a plain string key.
/// - [`ServiceToken::unique`] — a process-unique key that cannot
///   collide with any other token, carrying a label for diagnostics.
/// - [`ServiceToken::of`] — the identity of a concrete service type.
///
/// Uniqueness is per-container; two containers may hold different
/// services under equal tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceToken {
	/// A string key.
	Name(String),
	/// A process-unique key with a diagnostic label.
	Unique {
		/// The unique id.
		id: u64,
		/// Label shown in error messages.
		label: &'static str,
	},
	/// A concrete type's identity.
	Type {
		/// The type id.
		id: TypeId,
		/// Type name shown in error messages.
		name: &'static str,
	},
}

impl ServiceToken {
	/// Creates a string token.
	pub fn name(name: impl Into<String>) -> Self {
		Self::Name(name.into())
	}

	/// Creates a fresh token that is distinct from every other token
	/// in the process.
	pub fn unique(label: &'static str) -> Self {
		Self::Unique {
			id: NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
			label,
		}
	}

	/// Creates the token identifying the type `T`.
	pub fn of<T: 'static>() -> Self {
		Self::Type {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}
}

impl std::fmt::Display for ServiceToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Name(name) => write!(f, "{}", name),
			Self::Unique { id, label } => write!(f, "{}#{}", label, id),
			Self::Type { name, .. } => write!(f, "{}", name),
		}
	}
}

impl From<&str> for ServiceToken {
	fn from(name: &str) -> Self {
		Self::Name(name.to_string())
	}
}

impl From<String> for ServiceToken {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}
