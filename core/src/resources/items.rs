//! Items: objects owned by characters or kept at locations.

use serde::{Deserialize, Serialize};

use crate::client::KankaClient;
use crate::entity::{EntityApi, EntityApiConfig, EntityId, EntitySchema};
use crate::query::shape;

use super::campaign_path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
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
    pub price: Option<String>,
    pub size: Option<String>,
    pub character_id: Option<EntityId>,
    pub location_id: Option<EntityId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EntityId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemFilters {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_private: Option<bool>,
    pub character_id: Option<EntityId>,
    pub location_id: Option<EntityId>,
    pub tags: Vec<EntityId>,
}

pub struct Items;

impl EntitySchema for Items {
    type Entity = Item;
    type Create = CreateItem;
    type Update = UpdateItem;
    type Filters = ItemFilters;
}

pub fn api<T>(client: &KankaClient<T>, campaign_id: EntityId) -> EntityApi<Items, T> {
    let config =
        EntityApiConfig::<Items>::new(campaign_path(campaign_id, "items")).with_transform(shape);
    client.entity_api(config)
}
