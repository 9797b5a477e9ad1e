//! Locations, nested through `location_id`.

use serde::{Deserialize, Serialize};

use crate::client::KankaClient;
use crate::entity::{EntityApi, EntityApiConfig, EntityId, EntitySchema};
use crate::query::shape;

use super::campaign_path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
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
    /// Parent location.
    pub location_id: Option<EntityId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateLocation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateLocation {
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
    pub tags: Option<Vec<EntityId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationFilters {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_private: Option<bool>,
    pub location_id: Option<EntityId>,
    pub tags: Vec<EntityId>,
}

pub struct Locations;

impl EntitySchema for Locations {
    type Entity = Location;
    type Create = CreateLocation;
    type Update = UpdateLocation;
    type Filters = LocationFilters;
}

pub fn api<T>(client: &KankaClient<T>, campaign_id: EntityId) -> EntityApi<Locations, T> {
    let config = EntityApiConfig::<Locations>::new(campaign_path(campaign_id, "locations"))
        .with_transform(shape);
    client.entity_api(config)
}
