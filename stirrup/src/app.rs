//! Hand-wired application bootstrap.
//!
//! No dependency-injection container: services are registered as explicit
//! constructor closures and resolved by walking the dependency graph at
//! startup. The [`App`] owns the configuration reader and the shared store
//! handle; repositories and application services borrow both from it.
//!
//! Two registration styles mirror how applications are assembled:
//! deferred constructors ([`App::provide`]) for repositories and services,
//! resolved and memoized on first use, and eager constructors
//! ([`App::invoke`]) for controllers that must be built immediately.
//! Registration and resolution failures are bootstrap defects and belong
//! to the fatal error tier — the expectation is that `main` aborts on them.

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::Arc,
};
use tracing::debug;

use stirrup_core::{
    backend::StoreBackend,
    entity::Entity,
    error::{StoreError, StoreResult},
    repository::Repository,
};

use crate::config::Settings;

type Service = Arc<dyn Any + Send + Sync>;
type Factory = Box<dyn FnOnce(&mut App) -> StoreResult<Service> + Send>;

/// The bootstrap shell: configuration, the shared store handle, and a
/// registry of explicitly wired services.
///
/// # Example
///
/// ```ignore
/// use stirrup::{app::App, config::Settings, memory::MemoryStore};
///
/// let mut app = App::new(Settings::load("local")?);
/// app.attach_store(MemoryStore::new());
///
/// app.provide(|app| Ok(OrderService::new(app.repository()?)))?;
/// app.invoke(|app| {
///     let service = app.resolve::<OrderService>()?;
///     Ok(OrderController::new(service))
/// })?;
/// ```
pub struct App {
    settings: Settings,
    store: Option<Arc<dyn StoreBackend>>,
    factories: HashMap<TypeId, Factory>,
    services: HashMap<TypeId, Service>,
}

impl App {
    /// Creates a bootstrap shell around a loaded configuration.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            store: None,
            factories: HashMap::new(),
            services: HashMap::new(),
        }
    }

    /// The configuration reader this shell was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Installs the shared database handle.
    ///
    /// The handle is owned here, by the shell — repositories only borrow
    /// it, and it outlives all of them.
    pub fn attach_store(&mut self, backend: impl StoreBackend + 'static) {
        self.attach_shared_store(Arc::new(backend));
    }

    /// Installs an already shared database handle.
    pub fn attach_shared_store(&mut self, backend: Arc<dyn StoreBackend>) {
        debug!(store = ?backend, "store attached");
        self.store = Some(backend);
    }

    /// The shared database handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Initialization`] if no store has been attached.
    pub fn store(&self) -> StoreResult<Arc<dyn StoreBackend>> {
        self.store
            .clone()
            .ok_or_else(|| StoreError::Initialization("no store attached".to_string()))
    }

    /// Constructs a repository for `T`, bound to its derived collection,
    /// with options taken from the configuration reader.
    pub fn repository<T: Entity>(&self) -> StoreResult<Repository<T>> {
        Ok(Repository::with_options(
            self.store()?,
            self.settings.repo_options(),
        ))
    }

    /// Registers a deferred constructor for a service type.
    ///
    /// The constructor runs at most once, on the first [`App::resolve`] of
    /// `S`; it receives the shell and may resolve its own dependencies,
    /// which is how the dependency graph is traversed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateProvider`] if `S` already has a
    /// registered constructor or resolved instance.
    pub fn provide<S, F>(&mut self, factory: F) -> StoreResult<()>
    where
        S: Send + Sync + 'static,
        F: FnOnce(&mut App) -> StoreResult<S> + Send + 'static,
    {
        let id = TypeId::of::<S>();

        if self.factories.contains_key(&id) || self.services.contains_key(&id) {
            return Err(StoreError::DuplicateProvider(type_name::<S>().to_string()));
        }

        self.factories
            .insert(id, Box::new(move |app| Ok(Arc::new(factory(app)?) as Service)));

        Ok(())
    }

    /// Resolves a service, constructing and memoizing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnresolvedDependency`] if no constructor was
    /// registered for `S`, or if `S` is reached again while its own
    /// constructor is still running (a dependency cycle).
    pub fn resolve<S: Send + Sync + 'static>(&mut self) -> StoreResult<Arc<S>> {
        let id = TypeId::of::<S>();

        if let Some(existing) = self.services.get(&id) {
            return Self::downcast(existing.clone());
        }

        // Taking the factory out makes a cycle surface as an unresolved
        // dependency instead of recursing forever.
        let factory = self
            .factories
            .remove(&id)
            .ok_or_else(|| StoreError::UnresolvedDependency(type_name::<S>().to_string()))?;

        debug!(service = type_name::<S>(), "constructing service");
        let service = factory(self)?;
        self.services.insert(id, service.clone());

        Self::downcast(service)
    }

    /// Registers and immediately runs a controller constructor.
    ///
    /// The closure receives the shell with full resolution access.
    pub fn invoke<R>(
        &mut self,
        controller: impl FnOnce(&mut App) -> StoreResult<R>,
    ) -> StoreResult<R> {
        controller(self)
    }

    /// Builds a MongoDB store from the `database.*` configuration keys and
    /// attaches it.
    ///
    /// `database.uri` and `database.name` are required;
    /// `database.username`/`database.password` are applied as a credential
    /// pair when both are present. Caller-supplied mutators are applied to
    /// the parsed client options before the client is built.
    #[cfg(feature = "mongodb")]
    pub async fn connect_mongodb(
        &mut self,
        mutators: impl IntoIterator<Item = stirrup_mongodb::ClientOptionsMutator>,
    ) -> StoreResult<()> {
        use stirrup_core::backend::StoreBackendBuilder;
        use stirrup_mongodb::MongoStore;

        let uri = self.settings.get_string("database.uri")?;
        let database = self.settings.get_string("database.name")?;

        let mut builder = MongoStore::builder(&uri, &database);
        for mutator in mutators {
            builder = builder.with_client_option(mutator);
        }

        let credentials = (
            self.settings.get_string("database.username"),
            self.settings.get_string("database.password"),
        );
        if let (Ok(username), Ok(password)) = credentials {
            builder = builder.with_credentials(username, password);
        }

        self.attach_store(builder.build().await?);

        Ok(())
    }

    fn downcast<S: Send + Sync + 'static>(service: Service) -> StoreResult<Arc<S>> {
        service
            .downcast::<S>()
            .map_err(|_| StoreError::UnresolvedDependency(type_name::<S>().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::fs;
    use stirrup_memory::MemoryStore;

    fn settings(value: serde_json::Value) -> Settings {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.json"), value.to_string()).unwrap();

        Settings::load_from(dir.path(), "test").unwrap()
    }

    fn app() -> App {
        App::new(settings(json!({})))
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Order {
        id: u64,
    }

    impl Entity for Order {}

    struct OrderService {
        label: &'static str,
    }

    struct OrderController {
        service: Arc<OrderService>,
    }

    #[test]
    fn repository_requires_an_attached_store() {
        let app = app();

        assert!(matches!(
            app.repository::<Order>(),
            Err(StoreError::Initialization(_))
        ));
    }

    #[test]
    fn repository_binds_the_derived_collection() {
        let mut app = app();
        app.attach_store(MemoryStore::new());

        let orders = app.repository::<Order>().unwrap();

        assert_eq!(orders.collection(), "order");
    }

    #[test]
    fn deferred_provider_is_resolved_and_memoized() {
        let mut app = app();
        app.provide(|_| Ok(OrderService { label: "orders" }))
            .unwrap();

        let first = app.resolve::<OrderService>().unwrap();
        let second = app.resolve::<OrderService>().unwrap();

        assert_eq!(first.label, "orders");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn factories_resolve_their_own_dependencies() {
        let mut app = app();
        app.provide(|_| Ok(OrderService { label: "orders" }))
            .unwrap();
        app.provide(|app| {
            Ok(OrderController { service: app.resolve::<OrderService>()? })
        })
        .unwrap();

        let controller = app.resolve::<OrderController>().unwrap();

        assert_eq!(controller.service.label, "orders");
    }

    #[test]
    fn duplicate_provider_is_rejected() {
        let mut app = app();
        app.provide(|_| Ok(OrderService { label: "a" })).unwrap();

        assert!(matches!(
            app.provide(|_| Ok(OrderService { label: "b" })),
            Err(StoreError::DuplicateProvider(_))
        ));
    }

    #[test]
    fn unregistered_type_is_unresolved() {
        let mut app = app();

        assert!(matches!(
            app.resolve::<OrderService>(),
            Err(StoreError::UnresolvedDependency(_))
        ));
    }

    #[test]
    fn self_cycle_is_unresolved_rather_than_divergent() {
        let mut app = app();
        app.provide(|app| {
            app.resolve::<OrderService>()?;
            Ok(OrderService { label: "loop" })
        })
        .unwrap();

        assert!(matches!(
            app.resolve::<OrderService>(),
            Err(StoreError::UnresolvedDependency(_))
        ));
    }

    #[test]
    fn invoke_runs_eagerly_with_resolution_access() {
        let mut app = app();
        app.provide(|_| Ok(OrderService { label: "orders" }))
            .unwrap();

        let controller = app
            .invoke(|app| {
                Ok(OrderController { service: app.resolve::<OrderService>()? })
            })
            .unwrap();

        assert_eq!(controller.service.label, "orders");
    }

    #[test]
    fn repository_options_come_from_settings() {
        let mut app = App::new(settings(json!({
            "repository": { "read_failures": "propagate" }
        })));
        app.attach_store(MemoryStore::new());

        // Just proves construction consumes the configured options; the
        // policy behavior itself is covered in stirrup-core.
        assert!(app.repository::<Order>().is_ok());
    }
}
