//! Container resolution errors.
//!
//! These are programmer errors, not runtime conditions: they are
//! thrown to the immediate caller and never swallowed by the
//! container.

use crate::token::ServiceToken;

/// Errors produced by [`ServiceContainer`](crate::ServiceContainer)
/// resolution.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	/// No instance or factory is registered under the token.
	#[error("service \"{0}\" not found; make sure it is registered in the container")]
	NotFound(ServiceToken),

	/// `get` was called on a token whose factory is asynchronous.
	#[error("service \"{0}\" is async and requires get_async(); use container.get_async(\"{0}\") instead")]
	AsyncService(ServiceToken),

	/// `get_async` re-entered a token that is still resolving.
	#[error("circular dependency detected for service \"{0}\"")]
	CircularDependency(ServiceToken),

	/// The registered service is not of the requested type.
	#[error("service \"{token}\" is not of the requested type {expected}")]
	TypeMismatch {
		/// The token that was resolved.
		token: ServiceToken,
		/// The type the caller asked for.
		expected: &'static str,
	},

	/// The service's initialize hook failed.
	#[error("service \"{token}\" failed to initialize: {message}")]
	Initialization {
		/// The token being initialized.
		token: ServiceToken,
		/// The underlying failure, stringified.
		message: String,
	},
}
