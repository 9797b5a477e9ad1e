//! Typed async client for the Kanka campaign-management API.
//!
//! # Overview
//! Every entity type (characters, locations, items, maps, ...) exposes the
//! same five operations. Instead of writing them per resource, `EntityApi`
//! instantiates them from an `EntitySchema` and a base path; resource
//! modules only declare their record, payload and filter types.
//!
//! # Design
//! - `KankaClient` is stateless: it holds an explicit `ClientConfig` and a
//!   `Transport`, and nothing is read from the environment at call time.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   each operation has a pure `build_*` / `parse_*` pair and an async
//!   method that runs both around one transport call.
//! - List filters are shaped into query pairs by `query::shape`, which drops
//!   absent fields and explodes arrays into `field[i]` keys.
//! - Responses are decoded with path-aware errors; failures are one of the
//!   three `ApiError` variants and are never retried.

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod query;
pub mod resources;
pub mod schema;
pub mod transport;

pub use client::{KankaClient, UploadOptions};
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL};
pub use entity::{EntityApi, EntityApiConfig, EntityId, EntitySchema};
pub use error::{ApiError, NetworkError, NetworkErrorKind, ValidationError};
pub use http::{FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use query::{PageFilters, QueryParams};
pub use schema::{ListResponse, PaginatedResponse, PaginationLinks, PaginationMeta, SingleResponse};
pub use transport::{ReqwestTransport, Transport};
