//! Characters: people and creatures of a campaign.

use serde::{Deserialize, Serialize};

use crate::client::KankaClient;
use crate::entity::{EntityApi, EntityApiConfig, EntityId, EntitySchema};
use crate::query::shape;

use super::campaign_path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub entity_id: EntityId,
    pub name: String,
    pub entry: Option<String>,
    pub image_full: Option<String>,
    pub image_thumb: Option<String>,
    pub is_private: bool,
    pub tags: Vec<EntityId>,
    pub title: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub pronouns: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_dead: bool,
    pub location_id: Option<EntityId>,
    pub races: Vec<EntityId>,
    pub families: Vec<EntityId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCharacter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dead: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub races: Vec<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub families: Vec<EntityId>,
}

/// Fields left as `None` are not sent and stay unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCharacter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dead: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub races: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub families: Option<Vec<EntityId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CharacterFilters {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_private: Option<bool>,
    pub is_dead: Option<bool>,
    pub tags: Vec<EntityId>,
    pub races: Vec<EntityId>,
    pub families: Vec<EntityId>,
    pub locations: Vec<EntityId>,
}

pub struct Characters;

impl EntitySchema for Characters {
    type Entity = Character;
    type Create = CreateCharacter;
    type Update = UpdateCharacter;
    type Filters = CharacterFilters;
}

/// Character endpoints of one campaign.
pub fn api<T>(client: &KankaClient<T>, campaign_id: EntityId) -> EntityApi<Characters, T> {
    let config = EntityApiConfig::<Characters>::new(campaign_path(campaign_id, "characters"))
        .with_transform(shape);
    client.entity_api(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn client() -> KankaClient<()> {
        KankaClient::with_transport(ClientConfig::new("k").with_base_url("http://localhost:3000"), ())
    }

    #[test]
    fn list_explodes_every_array_filter() {
        let filters = CharacterFilters {
            per_page: Some(50),
            is_dead: Some(false),
            races: vec![3, 1],
            families: vec![8],
            locations: vec![],
            ..CharacterFilters::default()
        };
        let req = api(&client(), 12).build_get_all(Some(&filters)).unwrap();
        assert_eq!(req.url, "http://localhost:3000/campaigns/12/characters");
        let pairs: Vec<(&str, &str)> = req.query.iter().collect();
        assert_eq!(
            pairs,
            [
                ("per_page", "50"),
                ("is_dead", "false"),
                ("races[0]", "3"),
                ("races[1]", "1"),
                ("families[0]", "8"),
            ]
        );
    }

    #[test]
    fn type_field_uses_wire_name() {
        let filters = CharacterFilters {
            kind: Some("NPC".to_string()),
            ..CharacterFilters::default()
        };
        let req = api(&client(), 1).build_get_all(Some(&filters)).unwrap();
        assert_eq!(req.query.get("type"), Some("NPC"));
    }

    #[test]
    fn create_payload_omits_unset_fields() {
        let payload = CreateCharacter {
            name: "Ari".to_string(),
            is_private: Some(false),
            tags: vec![2],
            ..CreateCharacter::default()
        };
        let req = api(&client(), 1).build_create(&payload).unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_json().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "name": "Ari", "is_private": false, "tags": [2] })
        );
    }

    #[test]
    fn decodes_complete_record() {
        let body = r#"{"data":{"id":1,"entity_id":10,"name":"Ari","entry":null,
            "image_full":null,"image_thumb":null,"is_private":false,"tags":[],"title":null,
            "age":null,"sex":null,"pronouns":null,"type":null,"is_dead":true,"location_id":null,
            "races":[4],"families":[],"created_at":null,"updated_at":null}}"#;
        let response = crate::http::HttpResponse::new(200, body);
        let character = api(&client(), 1).parse_single(response).unwrap();
        assert_eq!(character.name, "Ari");
        assert!(character.is_dead);
        assert_eq!(character.races, [4]);
    }

    #[test]
    fn missing_flags_and_lists_are_not_defaulted() {
        let body = r#"{"data":{"id":1,"entity_id":10,"name":"Ari","is_private":false,
            "tags":[],"races":[],"families":[]}}"#;
        let response = crate::http::HttpResponse::new(200, body);
        match api(&client(), 1).parse_single(response).unwrap_err() {
            crate::error::ApiError::Validation(err) => assert_eq!(err.path, "data.is_dead"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let body = r#"{"data":{"id":1,"entity_id":10,"name":"Ari","is_private":false,
            "tags":[],"is_dead":false,"families":[]}}"#;
        let response = crate::http::HttpResponse::new(200, body);
        match api(&client(), 1).parse_single(response).unwrap_err() {
            crate::error::ApiError::Validation(err) => assert_eq!(err.path, "data.races"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
