//! The dependency injection container.

use crate::error::ServiceError;
use crate::service::{ConstructibleService, Service};
use crate::token::ServiceToken;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A resolved service: one allocation viewed both as `Any` (for typed
/// downcasts) and as `Service` (for lifecycle hooks).
#[derive(Clone)]
struct ServiceInstance {
	any: Arc<dyn Any + Send + Sync>,
	service: Arc<dyn Service>,
}

impl ServiceInstance {
	fn new<T: Service>(service: T) -> Self {
		Self::from_arc(Arc::new(service))
	}

	fn from_arc<T: Service>(service: Arc<T>) -> Self {
		Self {
			any: service.clone(),
			service,
		}
	}

	fn downcast<T: Service>(&self, token: &ServiceToken) -> Result<Arc<T>, ServiceError> {
		self.any
			.clone()
			.downcast::<T>()
			.map_err(|_| ServiceError::TypeMismatch {
				token: token.clone(),
				expected: std::any::type_name::<T>(),
			})
	}
}

type SyncFactory = Arc<dyn Fn() -> ServiceInstance + Send + Sync>;
type AsyncFactory =
	Arc<dyn Fn() -> BoxFuture<'static, Result<ServiceInstance, ServiceError>> + Send + Sync>;

#[derive(Clone)]
enum Factory {
	Sync(SyncFactory),
	Async(AsyncFactory),
}

/// Options accepted by the `register_*_with` variants.
#[derive(Debug, Clone, Copy)]
pub struct RegisterOptions {
	/// Whether the first resolved instance is cached and reused.
	/// Defaults to true. With `singleton = false` the factory re-runs
	/// on every resolution and nothing is cached.
	pub singleton: bool,
}

impl Default for RegisterOptions {
	fn default() -> Self {
		Self { singleton: true }
	}
}

impl RegisterOptions {
	/// Options for a non-cached registration.
	pub fn transient() -> Self {
		Self { singleton: false }
	}
}

/// Clears the "initializing" marker for a token when async resolution
/// finishes, successfully or not.
struct InitGuard<'a> {
	initializing: &'a Mutex<HashSet<ServiceToken>>,
	token: ServiceToken,
}

impl Drop for InitGuard<'_> {
	fn drop(&mut self) {
		self.initializing.lock().remove(&self.token);
	}
}

/// A token-keyed service registry with lazy resolution.
///
/// One container is constructed per render context — per server
/// request, per static-generation unit, per browser session — and is
/// never shared across concurrent renders. Services registered as
/// singletons are therefore render-scoped, not process-global: this
/// is the isolation boundary that keeps request state from leaking
/// between renders.
///
/// ```
/// use nimbus_di::{Service, ServiceContainer};
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl Service for Greeter {}
///
/// let container = ServiceContainer::new();
/// container.register("greeter", Greeter { greeting: "hello".to_string() });
///
/// let greeter = container.get::<Greeter>("greeter").unwrap();
/// assert_eq!(greeter.greeting, "hello");
/// ```
///
/// Resolution of a given token is not coalesced across concurrent
/// `get_async` callers beyond the circular-dependency guard; callers
/// that need single-flight semantics should register an
/// already-resolved instance or use idempotent factories.
pub struct ServiceContainer {
	instances: RwLock<HashMap<ServiceToken, ServiceInstance>>,
	factories: RwLock<HashMap<ServiceToken, Factory>>,
	singletons: RwLock<HashSet<ServiceToken>>,
	initializing: Mutex<HashSet<ServiceToken>>,
}

impl Default for ServiceContainer {
	fn default() -> Self {
		Self::new()
	}
}

impl ServiceContainer {
	/// Creates an empty container.
	pub fn new() -> Self {
		Self {
			instances: RwLock::new(HashMap::new()),
			factories: RwLock::new(HashMap::new()),
			singletons: RwLock::new(HashSet::new()),
			initializing: Mutex::new(HashSet::new()),
		}
	}

	/// Registers an already-constructed service instance.
	///
	/// Re-registering a token overwrites the prior registration
	/// without destroying the old instance; tearing it down first is
	/// the caller's responsibility.
	pub fn register<T: Service>(&self, token: impl Into<ServiceToken>, service: T) {
		self.register_arc(token, Arc::new(service));
	}

	/// Registers a shared service instance.
	pub fn register_arc<T: Service>(&self, token: impl Into<ServiceToken>, service: Arc<T>) {
		let token = token.into();
		self.factories.write().remove(&token);
		self.singletons.write().insert(token.clone());
		self.instances
			.write()
			.insert(token, ServiceInstance::from_arc(service));
	}

	/// Registers a synchronous factory, cached as a singleton on
	/// first resolution.
	pub fn register_factory<T, F>(&self, token: impl Into<ServiceToken>, factory: F)
	where
		T: Service,
		F: Fn() -> T + Send + Sync + 'static,
	{
		self.register_factory_with(token, factory, RegisterOptions::default());
	}

	/// Registers a synchronous factory with explicit options.
	pub fn register_factory_with<T, F>(
		&self,
		token: impl Into<ServiceToken>,
		factory: F,
		options: RegisterOptions,
	) where
		T: Service,
		F: Fn() -> T + Send + Sync + 'static,
	{
		let token = token.into();
		self.instances.write().remove(&token);
		self.set_singleton_flag(&token, options.singleton);
		self.factories.write().insert(
			token,
			Factory::Sync(Arc::new(move || ServiceInstance::new(factory()))),
		);
	}

	/// Registers an asynchronous factory, cached as a singleton on
	/// first resolution. Resolvable only through [`Self::get_async`];
	/// a synchronous `get` on this token fails with
	/// [`ServiceError::AsyncService`].
	pub fn register_async_factory<T, F, Fut>(&self, token: impl Into<ServiceToken>, factory: F)
	where
		T: Service,
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
	{
		self.register_async_factory_with(token, factory, RegisterOptions::default());
	}

	/// Registers an asynchronous factory with explicit options.
	pub fn register_async_factory_with<T, F, Fut>(
		&self,
		token: impl Into<ServiceToken>,
		factory: F,
		options: RegisterOptions,
	) where
		T: Service,
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
	{
		let token = token.into();
		self.instances.write().remove(&token);
		self.set_singleton_flag(&token, options.singleton);
		self.factories.write().insert(
			token,
			Factory::Async(Arc::new(move || {
				let fut = factory();
				Box::pin(async move { fut.await.map(ServiceInstance::new) })
					as BoxFuture<'static, Result<ServiceInstance, ServiceError>>
			})),
		);
	}

	fn set_singleton_flag(&self, token: &ServiceToken, singleton: bool) {
		let mut singletons = self.singletons.write();
		if singleton {
			singletons.insert(token.clone());
		} else {
			singletons.remove(token);
		}
	}

	fn is_singleton(&self, token: &ServiceToken) -> bool {
		self.singletons.read().contains(token)
	}

	/// Resolves a service synchronously.
	///
	/// Returns the cached instance if one exists; otherwise invokes a
	/// registered synchronous factory (caching the result if the
	/// registration is a singleton). A token backed by an async
	/// factory fails with [`ServiceError::AsyncService`] rather than
	/// silently returning a pending value; an unregistered token
	/// fails with [`ServiceError::NotFound`].
	pub fn get<T: Service>(&self, token: impl Into<ServiceToken>) -> Result<Arc<T>, ServiceError> {
		let token = token.into();

		if let Some(instance) = self.instances.read().get(&token).cloned() {
			return instance.downcast::<T>(&token);
		}

		let factory = self.factories.read().get(&token).cloned();
		match factory {
			Some(Factory::Sync(factory)) => {
				let instance = factory();
				if self.is_singleton(&token) {
					self.instances
						.write()
						.insert(token.clone(), instance.clone());
				}
				instance.downcast::<T>(&token)
			}
			Some(Factory::Async(_)) => Err(ServiceError::AsyncService(token)),
			None => Err(ServiceError::NotFound(token)),
		}
	}

	/// Resolves a service, awaiting asynchronous factories.
	///
	/// Re-entering a token that is still resolving fails immediately
	/// with [`ServiceError::CircularDependency`] — it never blocks
	/// waiting for itself. Newly constructed instances have their
	/// [`Service::initialize`] hook awaited before being returned;
	/// the in-flight marker is cleared whether resolution succeeds or
	/// fails.
	pub async fn get_async<T: Service>(
		&self,
		token: impl Into<ServiceToken>,
	) -> Result<Arc<T>, ServiceError> {
		let token = token.into();

		if self.initializing.lock().contains(&token) {
			return Err(ServiceError::CircularDependency(token));
		}

		if let Some(instance) = self.instances.read().get(&token).cloned() {
			return instance.downcast::<T>(&token);
		}

		self.initializing.lock().insert(token.clone());
		let _guard = InitGuard {
			initializing: &self.initializing,
			token: token.clone(),
		};

		let factory = self.factories.read().get(&token).cloned();
		let instance = match factory {
			Some(Factory::Sync(factory)) => factory(),
			Some(Factory::Async(factory)) => factory().await?,
			None => return Err(ServiceError::NotFound(token)),
		};

		if self.is_singleton(&token) {
			self.instances
				.write()
				.insert(token.clone(), instance.clone());
		}

		instance
			.service
			.initialize()
			.await
			.map_err(|err| ServiceError::Initialization {
				token: token.clone(),
				message: err.to_string(),
			})?;

		instance.downcast::<T>(&token)
	}

	/// Resolves `T` by its type token, constructing a fresh,
	/// non-cached instance when nothing is registered under it.
	pub fn get_or_construct<T: ConstructibleService>(&self) -> Result<Arc<T>, ServiceError> {
		let token = ServiceToken::of::<T>();
		if self.has(token.clone()) {
			return self.get::<T>(token);
		}
		Ok(Arc::new(T::construct()))
	}

	/// Async variant of [`Self::get_or_construct`]; a freshly
	/// constructed instance has its initialize hook awaited.
	pub async fn get_or_construct_async<T: ConstructibleService>(
		&self,
	) -> Result<Arc<T>, ServiceError> {
		let token = ServiceToken::of::<T>();
		if self.has(token.clone()) {
			return self.get_async::<T>(token).await;
		}
		let instance = Arc::new(T::construct());
		instance
			.initialize()
			.await
			.map_err(|err| ServiceError::Initialization {
				token,
				message: err.to_string(),
			})?;
		Ok(instance)
	}

	/// Returns true when an instance or factory is registered under
	/// the token. The construct-on-demand fallback does not count.
	pub fn has(&self, token: impl Into<ServiceToken>) -> bool {
		let token = token.into();
		self.instances.read().contains_key(&token) || self.factories.read().contains_key(&token)
	}

	/// Removes a registration, invoking the held instance's destroy
	/// hook first.
	pub fn remove(&self, token: impl Into<ServiceToken>) {
		let token = token.into();
		let instance = self.instances.write().remove(&token);
		if let Some(instance) = instance {
			instance.service.destroy();
		}
		self.factories.write().remove(&token);
		self.singletons.write().remove(&token);
	}

	/// Destroys every held instance and empties all registries.
	pub fn clear(&self) {
		let drained: Vec<ServiceInstance> = self.instances.write().drain().map(|(_, v)| v).collect();
		tracing::debug!(instances = drained.len(), "clearing service container");
		for instance in drained {
			instance.service.destroy();
		}
		self.factories.write().clear();
		self.singletons.write().clear();
		self.initializing.lock().clear();
	}

	/// All registered tokens: held instances first, then factories
	/// that have not resolved yet.
	pub fn tokens(&self) -> Vec<ServiceToken> {
		let mut seen = HashSet::new();
		let mut tokens = Vec::new();
		for token in self.instances.read().keys() {
			if seen.insert(token.clone()) {
				tokens.push(token.clone());
			}
		}
		for token in self.factories.read().keys() {
			if seen.insert(token.clone()) {
				tokens.push(token.clone());
			}
		}
		tokens
	}
}

impl std::fmt::Debug for ServiceContainer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServiceContainer")
			.field("instances", &self.instances.read().len())
			.field("factories", &self.factories.read().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[derive(Default, Debug)]
	struct Counter {
		value: usize,
	}

	impl Service for Counter {}

	#[derive(Debug)]
	struct Tracked {
		destroyed: Arc<AtomicUsize>,
	}

	impl Service for Tracked {
		fn destroy(&self) {
			self.destroyed.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[test]
	fn test_register_and_get_instance() {
		let container = ServiceContainer::new();
		container.register("counter", Counter { value: 7 });

		let counter = container.get::<Counter>("counter").unwrap();
		assert_eq!(counter.value, 7);
	}

	#[test]
	fn test_get_unregistered_token_fails() {
		let container = ServiceContainer::new();
		let err = container.get::<Counter>("missing").unwrap_err();
		assert!(matches!(err, ServiceError::NotFound(_)));
	}

	#[test]
	fn test_singleton_factory_resolves_once() {
		let container = ServiceContainer::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let calls_in_factory = calls.clone();
		container.register_factory("counter", move || {
			calls_in_factory.fetch_add(1, Ordering::SeqCst);
			Counter { value: 1 }
		});

		let first = container.get::<Counter>("counter").unwrap();
		let second = container.get::<Counter>("counter").unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_transient_factory_resolves_fresh_each_time() {
		let container = ServiceContainer::new();
		container.register_factory_with(
			"counter",
			|| Counter { value: 1 },
			RegisterOptions::transient(),
		);

		let first = container.get::<Counter>("counter").unwrap();
		let second = container.get::<Counter>("counter").unwrap();
		assert!(!Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn test_sync_get_on_async_factory_fails() {
		let container = ServiceContainer::new();
		container.register_async_factory("counter", || async { Ok(Counter { value: 1 }) });

		let err = container.get::<Counter>("counter").unwrap_err();
		assert!(matches!(err, ServiceError::AsyncService(_)));
		assert!(err.to_string().contains("get_async"));
	}

	#[tokio::test]
	async fn test_async_factory_resolves_and_caches() {
		let container = ServiceContainer::new();
		container.register_async_factory("counter", || async { Ok(Counter { value: 3 }) });

		let first = container.get_async::<Counter>("counter").await.unwrap();
		assert_eq!(first.value, 3);

		// Cached: now resolvable synchronously too.
		let second = container.get::<Counter>("counter").unwrap();
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[tokio::test]
	async fn test_circular_dependency_fails_fast() {
		let container = Arc::new(ServiceContainer::new());
		let inner = container.clone();
		container.register_async_factory("a", move || {
			let inner = inner.clone();
			async move {
				inner.get_async::<Counter>("a").await?;
				Ok(Counter { value: 0 })
			}
		});

		let err = container.get_async::<Counter>("a").await.unwrap_err();
		assert!(matches!(err, ServiceError::CircularDependency(_)));

		// The marker is cleared on failure; a non-circular factory
		// registered afterwards resolves normally.
		container.register_async_factory("a", || async { Ok(Counter { value: 9 }) });
		let counter = container.get_async::<Counter>("a").await.unwrap();
		assert_eq!(counter.value, 9);
	}

	#[tokio::test]
	async fn test_initialize_hook_awaited() {
		struct WithInit {
			initialized: Arc<AtomicUsize>,
		}

		#[async_trait::async_trait]
		impl Service for WithInit {
			async fn initialize(&self) -> Result<(), ServiceError> {
				self.initialized.fetch_add(1, Ordering::SeqCst);
				Ok(())
			}
		}

		let container = ServiceContainer::new();
		let initialized = Arc::new(AtomicUsize::new(0));
		let in_factory = initialized.clone();
		container.register_async_factory("svc", move || {
			let initialized = in_factory.clone();
			async move { Ok(WithInit { initialized }) }
		});

		container.get_async::<WithInit>("svc").await.unwrap();
		assert_eq!(initialized.load(Ordering::SeqCst), 1);

		// Cached instance is not re-initialized.
		container.get_async::<WithInit>("svc").await.unwrap();
		assert_eq!(initialized.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_remove_invokes_destroy() {
		let container = ServiceContainer::new();
		let destroyed = Arc::new(AtomicUsize::new(0));
		container.register(
			"tracked",
			Tracked {
				destroyed: destroyed.clone(),
			},
		);

		container.remove("tracked");
		assert_eq!(destroyed.load(Ordering::SeqCst), 1);
		assert!(!container.has("tracked"));
	}

	#[test]
	fn test_clear_destroys_all_instances() {
		let container = ServiceContainer::new();
		let destroyed = Arc::new(AtomicUsize::new(0));
		container.register(
			"one",
			Tracked {
				destroyed: destroyed.clone(),
			},
		);
		container.register(
			"two",
			Tracked {
				destroyed: destroyed.clone(),
			},
		);
		container.register_factory("three", || Counter::default());

		container.clear();
		assert_eq!(destroyed.load(Ordering::SeqCst), 2);
		assert!(container.tokens().is_empty());
	}

	#[test]
	fn test_reregistration_overwrites_without_destroy() {
		let container = ServiceContainer::new();
		let destroyed = Arc::new(AtomicUsize::new(0));
		container.register(
			"svc",
			Tracked {
				destroyed: destroyed.clone(),
			},
		);
		container.register("svc", Counter { value: 5 });

		// Old instance was not destroyed, and the new one shadows it.
		assert_eq!(destroyed.load(Ordering::SeqCst), 0);
		assert_eq!(container.get::<Counter>("svc").unwrap().value, 5);
	}

	#[test]
	fn test_has_counts_instances_and_factories_only() {
		let container = ServiceContainer::new();
		container.register_factory("factory", Counter::default);
		container.register("instance", Counter::default());

		assert!(container.has("factory"));
		assert!(container.has("instance"));
		assert!(!container.has(ServiceToken::of::<Counter>()));
	}

	#[test]
	fn test_get_or_construct_builds_fresh_uncached() {
		let container = ServiceContainer::new();
		let first = container.get_or_construct::<Counter>().unwrap();
		let second = container.get_or_construct::<Counter>().unwrap();
		assert!(!Arc::ptr_eq(&first, &second));
		assert!(!container.has(ServiceToken::of::<Counter>()));
	}

	#[test]
	fn test_get_or_construct_prefers_registration() {
		let container = ServiceContainer::new();
		container.register(ServiceToken::of::<Counter>(), Counter { value: 11 });
		let counter = container.get_or_construct::<Counter>().unwrap();
		assert_eq!(counter.value, 11);
	}

	#[test]
	fn test_type_mismatch_is_reported() {
		let container = ServiceContainer::new();
		container.register("svc", Counter::default());
		let err = container
			.get::<Tracked>("svc")
			.unwrap_err();
		assert!(matches!(err, ServiceError::TypeMismatch { .. }));
	}
}
