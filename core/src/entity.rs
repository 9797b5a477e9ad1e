//! Generic CRUD surface for one entity type.
//!
//! # Design
//! An `EntitySchema` names the four types of a resource: the decoded record,
//! the create payload, the update payload and the list filters. An
//! `EntityApi` pairs a schema with a base path and a query transformer and
//! exposes `get_all`, `get_one`, `create`, `update`, `patch` and `delete`.
//!
//! As in the rest of the crate each operation is split into a `build_*`
//! method producing an `HttpRequest` and a `parse_*` method consuming an
//! `HttpResponse`; the async methods chain the two through the client's
//! transport. Payloads are not checked before sending, only responses are
//! decoded against the schema.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::{check_status, decode_body, KankaClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{pagination_only, QueryTransform};
use crate::schema::{PaginatedResponse, SingleResponse};
use crate::transport::Transport;

/// Numeric identifier assigned by the server.
pub type EntityId = u64;

/// Type-level description of one remote resource.
pub trait EntitySchema {
    /// Record returned by the server.
    type Entity: DeserializeOwned;
    /// Payload accepted by `create`.
    type Create: Serialize;
    /// Partial payload accepted by `update` and `patch`.
    type Update: Serialize;
    /// Filters accepted by `get_all`.
    type Filters: Serialize + Default;
}

/// Base path and query transformer for an `EntityApi`.
pub struct EntityApiConfig<S: EntitySchema> {
    pub base_path: String,
    pub transform: QueryTransform<S::Filters>,
}

impl<S: EntitySchema> EntityApiConfig<S> {
    /// Config sending only `page` and `per_page` on list calls.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_matches('/').to_string(),
            transform: pagination_only::<S::Filters>,
        }
    }

    pub fn with_transform(mut self, transform: QueryTransform<S::Filters>) -> Self {
        self.transform = transform;
        self
    }
}

impl<S: EntitySchema> Clone for EntityApiConfig<S> {
    fn clone(&self) -> Self {
        Self {
            base_path: self.base_path.clone(),
            transform: self.transform,
        }
    }
}

impl<S: EntitySchema> fmt::Debug for EntityApiConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityApiConfig")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

/// CRUD operations for schema `S` over transport `T`.
pub struct EntityApi<S: EntitySchema, T> {
    client: KankaClient<T>,
    config: EntityApiConfig<S>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: EntitySchema, T> Clone for EntityApi<S, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: EntitySchema, T> fmt::Debug for EntityApi<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityApi")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: EntitySchema, T> EntityApi<S, T> {
    pub fn new(client: KankaClient<T>, config: EntityApiConfig<S>) -> Self {
        Self {
            client,
            config,
            _schema: PhantomData,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.config.base_path
    }

    fn item_path(&self, id: EntityId) -> String {
        format!("{}/{id}", self.config.base_path)
    }

    pub fn build_get_all(&self, filters: Option<&S::Filters>) -> Result<HttpRequest, ApiError> {
        let query = match filters {
            Some(filters) => (self.config.transform)(filters)?,
            None => (self.config.transform)(&S::Filters::default())?,
        };
        let mut request = self.client.request(HttpMethod::Get, &self.config.base_path);
        request.query = query;
        Ok(request)
    }

    pub fn build_get_one(&self, id: EntityId) -> HttpRequest {
        self.client.request(HttpMethod::Get, &self.item_path(id))
    }

    pub fn build_create(&self, params: &S::Create) -> Result<HttpRequest, ApiError> {
        self.client
            .json_request(HttpMethod::Post, &self.config.base_path, params)
    }

    pub fn build_update(&self, id: EntityId, params: &S::Update) -> Result<HttpRequest, ApiError> {
        self.client
            .json_request(HttpMethod::Put, &self.item_path(id), params)
    }

    pub fn build_patch(&self, id: EntityId, params: &S::Update) -> Result<HttpRequest, ApiError> {
        self.client
            .json_request(HttpMethod::Patch, &self.item_path(id), params)
    }

    pub fn build_delete(&self, id: EntityId) -> HttpRequest {
        self.client.request(HttpMethod::Delete, &self.item_path(id))
    }

    pub fn parse_get_all(
        &self,
        response: HttpResponse,
    ) -> Result<PaginatedResponse<S::Entity>, ApiError> {
        let response = check_status(response)?;
        decode_body(&response)
    }

    /// Parses the response of `get_one`, `create`, `update` and `patch`.
    pub fn parse_single(&self, response: HttpResponse) -> Result<S::Entity, ApiError> {
        let response = check_status(response)?;
        decode_body::<SingleResponse<S::Entity>>(&response).map(|envelope| envelope.data)
    }

    /// Any 2xx status is success; the body is not inspected.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response)?;
        Ok(())
    }
}

impl<S: EntitySchema, T: Transport> EntityApi<S, T> {
    /// Lists one page of entities, in the order the server returned them.
    pub async fn get_all(
        &self,
        filters: Option<&S::Filters>,
    ) -> Result<PaginatedResponse<S::Entity>, ApiError> {
        let request = self.build_get_all(filters)?;
        debug!(path = %self.config.base_path, params = request.query.len(), "listing entities");
        let response = self.client.execute(request).await?;
        self.parse_get_all(response)
    }

    pub async fn get_one(&self, id: EntityId) -> Result<S::Entity, ApiError> {
        let response = self.client.execute(self.build_get_one(id)).await?;
        self.parse_single(response)
    }

    pub async fn create(&self, params: &S::Create) -> Result<S::Entity, ApiError> {
        let response = self.client.execute(self.build_create(params)?).await?;
        self.parse_single(response)
    }

    /// Replaces the fields present in `params` (PUT).
    pub async fn update(&self, id: EntityId, params: &S::Update) -> Result<S::Entity, ApiError> {
        let response = self.client.execute(self.build_update(id, params)?).await?;
        self.parse_single(response)
    }

    /// Same payload as `update`, sent as PATCH.
    pub async fn patch(&self, id: EntityId, params: &S::Update) -> Result<S::Entity, ApiError> {
        let response = self.client.execute(self.build_patch(id, params)?).await?;
        self.parse_single(response)
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        let response = self.client.execute(self.build_delete(id)).await?;
        self.parse_delete(response)
    }
}

impl<T> KankaClient<T> {
    /// Instantiates the CRUD surface for schema `S`.
    pub fn entity_api<S: EntitySchema>(&self, config: EntityApiConfig<S>) -> EntityApi<S, T> {
        EntityApi::new(self.clone(), config)
    }
}
