//! In-memory stand-in for the Kanka API.
//!
//! Entity collections are generic: any `/campaigns/{campaign_id}/{resource}`
//! stores JSON objects in insertion order, so one set of handlers serves
//! characters, locations, items and maps alike. Every route requires a
//! bearer token, mirroring the real service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_PER_PAGE: usize = 15;
const TIMESTAMP: &str = "2024-01-01T00:00:00.000000Z";

type CollectionKey = (u64, String);

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    collections: HashMap<CollectionKey, Vec<Value>>,
    permissions: HashMap<(u64, u64), Vec<Value>>,
    thumbnails: HashMap<CollectionKey, String>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route(
            "/campaigns/{campaign_id}/entities/{entity_id}/entity_permissions",
            get(list_permissions).post(create_permissions),
        )
        .route(
            "/campaigns/{campaign_id}/default-thumbnails",
            axum::routing::post(upload_thumbnail).delete(delete_thumbnail),
        )
        .route(
            "/campaigns/{campaign_id}/{resource}",
            get(list_entities).post(create_entity),
        )
        .route(
            "/campaigns/{campaign_id}/{resource}/{id}",
            get(get_entity)
                .put(update_entity)
                .patch(update_entity)
                .delete(delete_entity),
        )
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Not found.")
}

fn required(field: &str) -> Response {
    let message = format!("The {field} field is required.");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": message, "errors": { field: [message] } })),
    )
        .into_response()
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if !authorized {
        return error(StatusCode::UNAUTHORIZED, "Unauthenticated.");
    }
    next.run(request).await
}

// --- entity collections ---

async fn list_entities(
    State(db): State<Db>,
    Path((campaign_id, resource)): Path<(u64, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut page = 1usize;
    let mut per_page = DEFAULT_PER_PAGE;
    let mut filters = Vec::new();
    for (key, value) in params {
        match key.as_str() {
            "page" => match value.parse::<usize>() {
                Ok(p) if p > 0 => page = p,
                _ => return error(StatusCode::UNPROCESSABLE_ENTITY, "The page must be at least 1."),
            },
            "per_page" => match value.parse::<usize>() {
                Ok(p) if p > 0 => per_page = p,
                _ => {
                    return error(StatusCode::UNPROCESSABLE_ENTITY, "The per page must be at least 1.")
                }
            },
            _ => filters.push((key, value)),
        }
    }

    let store = db.read().await;
    let matching: Vec<&Value> = store
        .collections
        .get(&(campaign_id, resource.clone()))
        .map(|items| items.iter().filter(|item| matches_all(item, &filters)).collect())
        .unwrap_or_default();

    let total = matching.len();
    let last_page = total.div_ceil(per_page).max(1);
    let start = (page - 1).saturating_mul(per_page);
    let data: Vec<Value> = matching
        .into_iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();
    let (from, to) = if data.is_empty() {
        (Value::Null, Value::Null)
    } else {
        (json!(start + 1), json!(start + data.len()))
    };

    let path = format!("/campaigns/{campaign_id}/{resource}");
    let link = |p: usize| json!(format!("{path}?page={p}"));
    let prev = if page > 1 { link(page - 1) } else { Value::Null };
    let next = if page < last_page { link(page + 1) } else { Value::Null };
    Json(json!({
        "data": data,
        "meta": {
            "current_page": page,
            "from": from,
            "last_page": last_page,
            "per_page": per_page,
            "to": to,
            "total": total,
            "path": path,
        },
        "links": {
            "first": link(1),
            "last": link(last_page),
            "prev": prev,
            "next": next,
        },
    }))
    .into_response()
}

/// `name` is a case-insensitive substring match; `field[i]` requires the
/// array `field` to contain the value; any other key compares a scalar.
/// Keys naming fields the record does not have are ignored.
fn matches_all(item: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(key, value)| {
        if key == "name" {
            let name = item["name"].as_str().unwrap_or_default().to_lowercase();
            return name.contains(&value.to_lowercase());
        }
        if let Some((field, _)) = key.split_once('[') {
            return match item.get(field) {
                Some(Value::Array(values)) => values.iter().any(|v| scalar(v) == *value),
                Some(_) => false,
                None => true,
            };
        }
        match item.get(key) {
            Some(field) => scalar(field) == *value,
            None => true,
        }
    })
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn create_entity(
    State(db): State<Db>,
    Path((campaign_id, resource)): Path<(u64, String)>,
    Json(input): Json<Value>,
) -> Response {
    let Value::Object(mut fields) = input else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "The payload must be an object.");
    };
    let has_name = fields
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return required("name");
    }

    let mut store = db.write().await;
    let id = store.next_id();
    let entity_id = store.next_id();
    fields.insert("id".to_string(), json!(id));
    fields.insert("entity_id".to_string(), json!(entity_id));
    fill_defaults(&mut fields);

    let entity = Value::Object(fields);
    store
        .collections
        .entry((campaign_id, resource))
        .or_default()
        .push(entity.clone());
    (StatusCode::CREATED, Json(json!({ "data": entity }))).into_response()
}

fn fill_defaults(fields: &mut Map<String, Value>) {
    let defaults = [
        ("entry", Value::Null),
        ("image_full", Value::Null),
        ("image_thumb", Value::Null),
        ("is_private", json!(false)),
        ("tags", json!([])),
        ("is_dead", json!(false)),
        ("races", json!([])),
        ("families", json!([])),
        ("is_real", json!(false)),
        ("created_at", json!(TIMESTAMP)),
        ("updated_at", json!(TIMESTAMP)),
    ];
    for (key, value) in defaults {
        fields.entry(key.to_string()).or_insert(value);
    }
}

fn find<'a>(store: &'a Store, key: &CollectionKey, id: u64) -> Option<&'a Value> {
    store
        .collections
        .get(key)?
        .iter()
        .find(|item| item["id"] == json!(id))
}

fn find_mut<'a>(store: &'a mut Store, key: &CollectionKey, id: u64) -> Option<&'a mut Value> {
    store
        .collections
        .get_mut(key)?
        .iter_mut()
        .find(|item| item["id"] == json!(id))
}

async fn get_entity(
    State(db): State<Db>,
    Path((campaign_id, resource, id)): Path<(u64, String, u64)>,
) -> Response {
    let store = db.read().await;
    match find(&store, &(campaign_id, resource), id) {
        Some(entity) => Json(json!({ "data": entity })).into_response(),
        None => not_found(),
    }
}

async fn update_entity(
    State(db): State<Db>,
    Path((campaign_id, resource, id)): Path<(u64, String, u64)>,
    Json(input): Json<Value>,
) -> Response {
    let Value::Object(changes) = input else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "The payload must be an object.");
    };
    let mut store = db.write().await;
    let Some(Value::Object(entity)) = find_mut(&mut store, &(campaign_id, resource), id) else {
        return not_found();
    };
    for (key, value) in changes {
        if key != "id" && key != "entity_id" {
            entity.insert(key, value);
        }
    }
    Json(json!({ "data": entity })).into_response()
}

async fn delete_entity(
    State(db): State<Db>,
    Path((campaign_id, resource, id)): Path<(u64, String, u64)>,
) -> Response {
    let mut store = db.write().await;
    let Some(items) = store.collections.get_mut(&(campaign_id, resource)) else {
        return not_found();
    };
    let before = items.len();
    items.retain(|item| item["id"] != json!(id));
    if items.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

// --- entity permissions ---

async fn list_permissions(
    State(db): State<Db>,
    Path((campaign_id, entity_id)): Path<(u64, u64)>,
) -> Response {
    let store = db.read().await;
    let data = store
        .permissions
        .get(&(campaign_id, entity_id))
        .cloned()
        .unwrap_or_default();
    Json(json!({ "data": data })).into_response()
}

async fn create_permissions(
    State(db): State<Db>,
    Path((campaign_id, entity_id)): Path<(u64, u64)>,
    Json(grants): Json<Vec<Value>>,
) -> Response {
    for grant in &grants {
        if !grant["action"].as_u64().is_some_and(|a| (1..=6).contains(&a)) {
            return required("action");
        }
        if !grant["access"].is_boolean() {
            return required("access");
        }
    }

    let mut store = db.write().await;
    let mut created = Vec::with_capacity(grants.len());
    for grant in grants {
        let id = store.next_id();
        created.push(json!({
            "id": id,
            "entity_id": entity_id,
            "user_id": grant.get("user_id").cloned().unwrap_or(Value::Null),
            "role_id": grant.get("role_id").cloned().unwrap_or(Value::Null),
            "action": grant["action"],
            "access": grant["access"],
        }));
    }
    store
        .permissions
        .entry((campaign_id, entity_id))
        .or_default()
        .extend(created.iter().cloned());
    Json(json!({ "data": created })).into_response()
}

// --- default thumbnails ---

struct ThumbnailForm {
    entity_type: Option<String>,
    file_name: Option<String>,
}

async fn read_thumbnail_form(mut multipart: Multipart) -> Result<ThumbnailForm, Response> {
    let bad_request = |e: axum::extract::multipart::MultipartError| {
        error(StatusCode::BAD_REQUEST, &e.body_text())
    };
    let mut form = ThumbnailForm {
        entity_type: None,
        file_name: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("entity_type") => form.entity_type = Some(field.text().await.map_err(bad_request)?),
            Some("default_entity_image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                if !bytes.is_empty() {
                    form.file_name = Some(file_name);
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn upload_thumbnail(
    State(db): State<Db>,
    Path(campaign_id): Path<u64>,
    multipart: Multipart,
) -> Response {
    let form = match read_thumbnail_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let Some(entity_type) = form.entity_type else {
        return required("entity_type");
    };
    let Some(file_name) = form.file_name else {
        return required("default_entity_image");
    };
    let url = format!("/thumbnails/{campaign_id}/{file_name}");
    db.write()
        .await
        .thumbnails
        .insert((campaign_id, entity_type.clone()), url.clone());
    Json(json!({ "data": { "entity_type": entity_type, "url": url } })).into_response()
}

async fn delete_thumbnail(
    State(db): State<Db>,
    Path(campaign_id): Path<u64>,
    multipart: Multipart,
) -> Response {
    let form = match read_thumbnail_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let Some(entity_type) = form.entity_type else {
        return required("entity_type");
    };
    match db.write().await.thumbnails.remove(&(campaign_id, entity_type)) {
        Some(_) => Json(json!({ "data": true })).into_response(),
        None => not_found(),
    }
}
