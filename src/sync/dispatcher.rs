//! # CRUD Dispatcher
//!
//! Runs one CRUD operation against the API and reports it as transitions.
//!
//! Every operation follows the same shape:
//!
//! 1. Resolve the wire path and root key. A missing path fails before anything else.
//! 2. Emit the `Start` transition.
//! 3. Talk to the API (unless a write is local-only).
//! 4. Emit exactly one `Success` or `Error` transition and return the same outcome.
//!
//! Fetches for the same path share one network call through the [`InFlightCache`], but
//! every caller still sees its own start and terminal transitions.

use super::options::resolve_path;
use super::{
    into_records, CrudError, Dispatch, FetchOptions, Record, TransitionCreators, WriteOptions,
    ID_FIELD,
};
use crate::cache::InFlightCache;
use crate::config::ApiConfig;
use crate::keys;
use crate::transport::{Method, Requester, Transport, TransportError};
use crate::validation;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

type FetchOutcome = Result<Value, TransportError>;

/// Entry point for the CRUD operations. Cheap to clone; clones share the in-flight cache.
pub struct CrudDispatcher<T> {
    requester: Requester<T>,
    in_flight: Arc<InFlightCache<FetchOutcome>>,
}

impl<T> Clone for CrudDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            requester: self.requester.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<T: Transport> CrudDispatcher<T> {
    pub fn new(transport: T, config: ApiConfig) -> Self {
        Self::from_requester(Requester::new(transport, config))
    }

    /// Uses a preconfigured requester, e.g. one with a custom login redirect.
    pub fn from_requester(requester: Requester<T>) -> Self {
        Self {
            requester,
            in_flight: Arc::new(InFlightCache::new()),
        }
    }

    pub fn requester(&self) -> &Requester<T> {
        &self.requester
    }

    /// Number of fetches currently on the wire.
    pub fn pending_fetches(&self) -> usize {
        self.in_flight.len()
    }

    fn path_for(resource_name: &str, path: Option<&str>) -> Result<String, CrudError> {
        resolve_path(resource_name, path).ok_or_else(|| CrudError::MissingPath {
            resource: resource_name.to_string(),
        })
    }

    /// Loads the collection at the resource's path and resolves with the records found.
    ///
    /// Concurrent fetches for the same path share a single GET.
    #[instrument(skip_all, fields(resource = resource_name))]
    pub async fn fetch<D>(
        &self,
        dispatch: &D,
        resource_name: &str,
        options: FetchOptions,
    ) -> Result<Vec<Record>, CrudError>
    where
        D: Dispatch + ?Sized,
    {
        let path = Self::path_for(resource_name, options.path.as_deref())?;
        let key = options.key.resolve(resource_name);
        let creators = TransitionCreators::for_resource(resource_name);

        dispatch.dispatch(creators.fetch_start());

        let requester = self.requester.clone();
        let request_path = path.clone();
        let outcome = self
            .in_flight
            .acquire(&path, || async move {
                requester.request(&request_path, Method::Get, None, true).await
            })
            .await;

        match outcome {
            Ok(body) => {
                let records = into_records(keys::unwrap(body, key.as_deref()));
                info!(%path, count = records.len(), "Fetched");
                dispatch.dispatch(creators.fetch_success(records.clone(), Utc::now(), options.replace));
                Ok(records)
            }
            Err(e) => {
                error!(%path, error = %e, "Fetch failed");
                dispatch.dispatch(creators.fetch_error(e.info()));
                Err(CrudError::Transport(e))
            }
        }
    }

    /// Creates a record. With `persist: false` the record is accepted locally as-is.
    #[instrument(skip_all, fields(resource = resource_name))]
    pub async fn create<D>(
        &self,
        dispatch: &D,
        resource_name: &str,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, CrudError>
    where
        D: Dispatch + ?Sized,
    {
        let path = Self::path_for(resource_name, options.path.as_deref())?;
        let key = options.key.resolve(resource_name);
        let creators = TransitionCreators::for_resource(resource_name);

        dispatch.dispatch(creators.create_start(record.clone()));
        let cid = record.get(ID_FIELD).cloned();

        if !options.persist {
            debug!("Created locally");
            dispatch.dispatch(creators.create_success(record.clone(), cid));
            return Ok(record);
        }

        match self.write(Method::Post, &path, &record, key.as_deref()).await {
            Ok(saved) => {
                info!(%path, "Created");
                dispatch.dispatch(creators.create_success(saved.clone(), cid));
                Ok(saved)
            }
            Err(e) => {
                log_write_failure(&path, &e);
                dispatch.dispatch(creators.create_error(e.clone(), record));
                Err(e)
            }
        }
    }

    /// Updates a record. With `persist: false` the record is accepted locally as-is.
    #[instrument(skip_all, fields(resource = resource_name))]
    pub async fn update<D>(
        &self,
        dispatch: &D,
        resource_name: &str,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, CrudError>
    where
        D: Dispatch + ?Sized,
    {
        let path = Self::path_for(resource_name, options.path.as_deref())?;
        let key = options.key.resolve(resource_name);
        let creators = TransitionCreators::for_resource(resource_name);

        dispatch.dispatch(creators.update_start(record.clone()));

        if !options.persist {
            debug!("Updated locally");
            dispatch.dispatch(creators.update_success(record.clone(), None));
            return Ok(record);
        }

        match self.write(Method::Put, &path, &record, key.as_deref()).await {
            Ok(saved) => {
                info!(%path, "Updated");
                let id = record.get(ID_FIELD).cloned();
                dispatch.dispatch(creators.update_success(saved.clone(), id));
                Ok(saved)
            }
            Err(e) => {
                log_write_failure(&path, &e);
                dispatch.dispatch(creators.update_error(e.clone(), record));
                Err(e)
            }
        }
    }

    /// Deletes a record. The response body is ignored; success resolves with the
    /// record that was passed in.
    #[instrument(skip_all, fields(resource = resource_name))]
    pub async fn destroy<D>(
        &self,
        dispatch: &D,
        resource_name: &str,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, CrudError>
    where
        D: Dispatch + ?Sized,
    {
        let path = Self::path_for(resource_name, options.path.as_deref())?;
        let creators = TransitionCreators::for_resource(resource_name);

        dispatch.dispatch(creators.delete_start(record.clone()));

        if !options.persist {
            debug!("Deleted locally");
            dispatch.dispatch(creators.delete_success(record.clone()));
            return Ok(record);
        }

        match self.requester.request(&path, Method::Delete, None, false).await {
            Ok(_) => {
                info!(%path, "Deleted");
                dispatch.dispatch(creators.delete_success(record.clone()));
                Ok(record)
            }
            Err(e) => {
                let e = CrudError::Transport(e);
                log_write_failure(&path, &e);
                dispatch.dispatch(creators.delete_error(e.clone(), record));
                Err(e)
            }
        }
    }

    /// Sends a record without its id and unwraps the saved record from the response.
    async fn write(
        &self,
        method: Method,
        path: &str,
        record: &Record,
        key: Option<&str>,
    ) -> Result<Record, CrudError> {
        let mut fields = record.clone();
        fields.remove(ID_FIELD);
        let body = keys::serialize(Value::Object(fields), key)
            .map_err(|e| CrudError::Encode(e.to_string()))?;

        match self.requester.request(path, method, Some(body), true).await {
            Ok(response) => match keys::unwrap(response, key) {
                Value::Object(saved) => Ok(saved),
                other => Err(CrudError::UnexpectedPayload(other.to_string())),
            },
            Err(e) if e.status() == 422 => match e.json() {
                Ok(body) => Err(CrudError::Validation(validation::from_wire(body))),
                Err(_) => Err(CrudError::Transport(e)),
            },
            Err(e) => Err(CrudError::Transport(e)),
        }
    }
}

fn log_write_failure(path: &str, e: &CrudError) {
    match e {
        CrudError::Validation(errors) => warn!(path, %errors, "Rejected by validation"),
        other => error!(path, error = %other, "Write failed"),
    }
}
