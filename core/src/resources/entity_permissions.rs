//! Per-entity permission grants.
//!
//! Creating permissions is the one write endpoint whose envelope holds an
//! array: `POST` takes a list of grants and answers `{ "data": [ ... ] }`.

use serde::{Deserialize, Serialize};

use crate::client::{check_status, decode_body, KankaClient};
use crate::entity::EntityId;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::schema::ListResponse;
use crate::transport::Transport;

use super::campaign_path;

/// Action a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PermissionAction {
    Read,
    Edit,
    Add,
    Delete,
    Posts,
    Permissions,
}

impl From<PermissionAction> for u8 {
    fn from(action: PermissionAction) -> Self {
        match action {
            PermissionAction::Read => 1,
            PermissionAction::Edit => 2,
            PermissionAction::Add => 3,
            PermissionAction::Delete => 4,
            PermissionAction::Posts => 5,
            PermissionAction::Permissions => 6,
        }
    }
}

impl TryFrom<u8> for PermissionAction {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PermissionAction::Read),
            2 => Ok(PermissionAction::Edit),
            3 => Ok(PermissionAction::Add),
            4 => Ok(PermissionAction::Delete),
            5 => Ok(PermissionAction::Posts),
            6 => Ok(PermissionAction::Permissions),
            other => Err(format!("unknown permission action {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPermission {
    pub id: u64,
    pub entity_id: EntityId,
    pub user_id: Option<u64>,
    pub role_id: Option<u64>,
    pub action: PermissionAction,
    pub access: bool,
}

/// One grant to create; target a user or a campaign role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
    pub action: PermissionAction,
    pub access: bool,
}

impl PermissionGrant {
    pub fn for_role(role_id: u64, action: PermissionAction, access: bool) -> Self {
        Self {
            user_id: None,
            role_id: Some(role_id),
            action,
            access,
        }
    }

    pub fn for_user(user_id: u64, action: PermissionAction, access: bool) -> Self {
        Self {
            user_id: Some(user_id),
            role_id: None,
            action,
            access,
        }
    }
}

/// Permission endpoints of one campaign.
#[derive(Debug, Clone)]
pub struct EntityPermissions<T> {
    client: KankaClient<T>,
    campaign_id: EntityId,
}

impl<T> EntityPermissions<T> {
    pub fn new(client: &KankaClient<T>, campaign_id: EntityId) -> Self {
        Self {
            client: client.clone(),
            campaign_id,
        }
    }

    fn path(&self, entity_id: EntityId) -> String {
        campaign_path(
            self.campaign_id,
            &format!("entities/{entity_id}/entity_permissions"),
        )
    }

    pub fn build_list(&self, entity_id: EntityId) -> HttpRequest {
        self.client.request(HttpMethod::Get, &self.path(entity_id))
    }

    pub fn build_create(
        &self,
        entity_id: EntityId,
        grants: &[PermissionGrant],
    ) -> Result<HttpRequest, ApiError> {
        self.client
            .json_request(HttpMethod::Post, &self.path(entity_id), grants)
    }

    /// Parses the `{ "data": [ ... ] }` answer of both `list` and `create`.
    pub fn parse(&self, response: HttpResponse) -> Result<Vec<EntityPermission>, ApiError> {
        let response = check_status(response)?;
        decode_body::<ListResponse<EntityPermission>>(&response).map(|list| list.data)
    }
}

impl<T: Transport> EntityPermissions<T> {
    pub async fn list(&self, entity_id: EntityId) -> Result<Vec<EntityPermission>, ApiError> {
        let response = self.client.execute(self.build_list(entity_id)).await?;
        self.parse(response)
    }

    pub async fn create(
        &self,
        entity_id: EntityId,
        grants: &[PermissionGrant],
    ) -> Result<Vec<EntityPermission>, ApiError> {
        let response = self
            .client
            .execute(self.build_create(entity_id, grants)?)
            .await?;
        self.parse(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn permissions() -> EntityPermissions<()> {
        let client = KankaClient::with_transport(ClientConfig::new("k"), ());
        EntityPermissions::new(&client, 2)
    }

    #[test]
    fn create_posts_grant_array() {
        let grants = [
            PermissionGrant::for_role(5, PermissionAction::Read, true),
            PermissionGrant::for_user(9, PermissionAction::Edit, false),
        ];
        let req = permissions().build_create(31, &grants).unwrap();
        assert_eq!(
            req.url,
            "https://api.kanka.io/1.0/campaigns/2/entities/31/entity_permissions"
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_json().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!([
                { "role_id": 5, "action": 1, "access": true },
                { "user_id": 9, "action": 2, "access": false }
            ])
        );
    }

    #[test]
    fn create_response_is_an_array_under_data() {
        let body = r#"{"data":[
            {"id":1,"entity_id":31,"user_id":null,"role_id":5,"action":1,"access":true},
            {"id":2,"entity_id":31,"user_id":9,"role_id":null,"action":2,"access":false}
        ]}"#;
        let created = permissions().parse(HttpResponse::new(200, body)).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].action, PermissionAction::Read);
        assert_eq!(created[1].user_id, Some(9));
    }

    #[test]
    fn unknown_action_code_is_a_validation_error() {
        let body = r#"{"data":[{"id":1,"entity_id":31,"user_id":null,"role_id":5,"action":42,"access":true}]}"#;
        match permissions().parse(HttpResponse::new(200, body)).unwrap_err() {
            ApiError::Validation(err) => assert_eq!(err.path, "data[0].action"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
