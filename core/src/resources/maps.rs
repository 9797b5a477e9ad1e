//! Maps and their placement in the world.

use serde::{Deserialize, Serialize};

use crate::client::KankaClient;
use crate::entity::{EntityApi, EntityApiConfig, EntityId, EntitySchema};
use crate::query::shape;

use super::campaign_path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub id: EntityId,
    pub entity_id: EntityId,
    pub name: String,
    pub entry: Option<String>,
    pub image_full: Option<String>,
    pub image_thumb: Option<String>,
    pub is_private: bool,
    pub tags: Vec<EntityId>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location_id: Option<EntityId>,
    pub is_real: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateMap {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_real: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_real: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EntityId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapFilters {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location_id: Option<EntityId>,
    pub tags: Vec<EntityId>,
}

pub struct Maps;

impl EntitySchema for Maps {
    type Entity = Map;
    type Create = CreateMap;
    type Update = UpdateMap;
    type Filters = MapFilters;
}

pub fn api<T>(client: &KankaClient<T>, campaign_id: EntityId) -> EntityApi<Maps, T> {
    let config =
        EntityApiConfig::<Maps>::new(campaign_path(campaign_id, "maps")).with_transform(shape);
    client.entity_api(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ApiError;
    use crate::http::HttpResponse;

    #[test]
    fn is_real_is_required() {
        let client = KankaClient::with_transport(ClientConfig::new("k"), ());
        let body = r#"{"data":{"id":2,"entity_id":9,"name":"Coast","is_private":false,
            "tags":[],"width":800,"height":600}}"#;
        match api(&client, 1).parse_single(HttpResponse::new(200, body)).unwrap_err() {
            ApiError::Validation(err) => assert_eq!(err.path, "data.is_real"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let body = r#"{"data":{"id":2,"entity_id":9,"name":"Coast","is_private":false,
            "tags":[],"is_real":true,"width":800,"height":600}}"#;
        let map = api(&client, 1).parse_single(HttpResponse::new(200, body)).unwrap();
        assert!(map.is_real);
        assert_eq!(map.width, Some(800));
    }
}
