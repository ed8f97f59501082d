//! The service trait and lifecycle hooks.

use crate::error::ServiceError;
use async_trait::async_trait;

/// Anything that can live in a [`ServiceContainer`](crate::ServiceContainer).
///
/// Both hooks default to no-ops, so a plain data holder implements the
/// trait with an empty block:
///
/// ```
/// use nimbus_di::Service;
///
/// struct FeatureFlags {
///     dark_mode: bool,
/// }
///
/// impl Service for FeatureFlags {}
/// # let _ = FeatureFlags { dark_mode: true }.dark_mode;
/// ```
///
/// `initialize` is awaited by `get_async` exactly once, right after
/// the instance is constructed and before it is returned to the
/// caller. `destroy` runs when the service is removed from its
/// container or the container is cleared.
#[async_trait]
pub trait Service: Send + Sync + 'static {
	/// Post-construction hook, awaited by async resolution.
	async fn initialize(&self) -> Result<(), ServiceError> {
		Ok(())
	}

	/// Teardown hook, invoked on `remove` and `clear`.
	fn destroy(&self) {}
}

/// A service the container can build on demand when nothing is
/// registered under its type token — the fallback for resolving a
/// concrete type directly instead of a registration.
pub trait ConstructibleService: Service {
	/// Builds a fresh instance with no arguments.
	fn construct() -> Self
	where
		Self: Sized;
}

impl<T: Service + Default> ConstructibleService for T {
	fn construct() -> Self {
		T::default()
	}
}
