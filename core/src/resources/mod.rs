//! Per-resource instantiations of the entity API.
//!
//! Entity resources live under `campaigns/{campaign_id}/`. Each module
//! declares its record, payload and filter types and an `api` constructor;
//! `entity_permissions` and `default_thumbnails` cover the two endpoints
//! that do not fit the CRUD pattern.

pub mod characters;
pub mod default_thumbnails;
pub mod entity_permissions;
pub mod items;
pub mod locations;
pub mod maps;

use crate::entity::EntityId;

/// Path prefix of everything scoped to one campaign.
pub fn campaign_path(campaign_id: EntityId, rest: &str) -> String {
    format!("campaigns/{campaign_id}/{}", rest.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_path_joins_segments() {
        assert_eq!(campaign_path(4, "characters"), "campaigns/4/characters");
        assert_eq!(campaign_path(4, "/entities/9"), "campaigns/4/entities/9");
    }
}
