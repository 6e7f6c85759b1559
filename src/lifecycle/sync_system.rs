use crate::config::ApiConfig;
use crate::state::{ResourceState, StateStore, StoreClient, StoreError};
use crate::sync::{CrudDispatcher, CrudError, FetchOptions, Record, WriteOptions};
use crate::transport::{Requester, Transport};
use tracing::{error, info};

/// A dispatcher wired to a running state store.
///
/// Operations run through [`SyncSystem`] emit their transitions into the store, so a
/// [`SyncSystem::state`] query made after an operation returns reflects it.
///
/// # Example
///
/// ```ignore
/// let transport = HttpTransport::for_config(&config)?;
/// let system = SyncSystem::new(transport, config, ["photos"]);
///
/// system.fetch("photos", FetchOptions::default()).await?;
/// let photos = system.state("photos").await?;
///
/// system.shutdown().await?;
/// ```
pub struct SyncSystem<T> {
    pub dispatcher: CrudDispatcher<T>,
    pub store: StoreClient,
    handle: tokio::task::JoinHandle<()>,
}

impl<T: Transport> SyncSystem<T> {
    /// Spawns a store holding the given resources.
    pub fn new<I, S>(transport: T, config: ApiConfig, resource_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_requester(Requester::new(transport, config), resource_names)
    }

    pub fn from_requester<I, S>(requester: Requester<T>, resource_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (store, client) = StateStore::new(resource_names);
        let handle = tokio::spawn(store.run());

        Self {
            dispatcher: CrudDispatcher::from_requester(requester),
            store: client,
            handle,
        }
    }

    pub async fn fetch(
        &self,
        resource_name: &str,
        options: FetchOptions,
    ) -> Result<Vec<Record>, CrudError> {
        self.dispatcher.fetch(&self.store, resource_name, options).await
    }

    pub async fn create(
        &self,
        resource_name: &str,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, CrudError> {
        self.dispatcher.create(&self.store, resource_name, record, options).await
    }

    pub async fn update(
        &self,
        resource_name: &str,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, CrudError> {
        self.dispatcher.update(&self.store, resource_name, record, options).await
    }

    pub async fn destroy(
        &self,
        resource_name: &str,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, CrudError> {
        self.dispatcher.destroy(&self.store, resource_name, record, options).await
    }

    pub async fn state(&self, resource_name: &str) -> Result<Option<ResourceState>, StoreError> {
        self.store.state(resource_name).await
    }

    /// Closes the store and waits for its task to finish.
    ///
    /// Clones of [`SyncSystem::store`] held elsewhere keep the store open; drop them first.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!("Shutting down sync system...");
        drop(self.store);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(StoreError::TaskFailed(e.to_string()));
        }

        info!("Sync system shutdown complete.");
        Ok(())
    }
}
