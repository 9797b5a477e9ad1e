//! Campaign-wide default thumbnails per entity type.
//!
//! Uploading is a multipart POST. Removal is a DELETE that still carries a
//! multipart body naming the entity type, so both go through
//! `KankaClient::upload_file`.

use serde_json::Value;

use crate::client::{KankaClient, UploadOptions};
use crate::entity::EntityId;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, MultipartForm};
use crate::transport::Transport;

use super::campaign_path;

const ENTITY_TYPE_FIELD: &str = "entity_type";
const IMAGE_FIELD: &str = "default_entity_image";

/// Image bytes with the metadata multipart needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DefaultThumbnails<T> {
    client: KankaClient<T>,
    campaign_id: EntityId,
}

impl<T> DefaultThumbnails<T> {
    pub fn new(client: &KankaClient<T>, campaign_id: EntityId) -> Self {
        Self {
            client: client.clone(),
            campaign_id,
        }
    }

    fn path(&self) -> String {
        campaign_path(self.campaign_id, "default-thumbnails")
    }

    fn upload_form(entity_type: &str, image: ImageFile) -> MultipartForm {
        MultipartForm::new().text(ENTITY_TYPE_FIELD, entity_type).file(
            IMAGE_FIELD,
            image.file_name,
            image.mime,
            image.bytes,
        )
    }

    fn delete_form(entity_type: &str) -> MultipartForm {
        MultipartForm::new().text(ENTITY_TYPE_FIELD, entity_type)
    }

    pub fn build_upload(&self, entity_type: &str, image: ImageFile) -> HttpRequest {
        self.client.multipart_request(
            HttpMethod::Post,
            &self.path(),
            Self::upload_form(entity_type, image),
        )
    }

    pub fn build_delete(&self, entity_type: &str) -> HttpRequest {
        self.client
            .multipart_request(HttpMethod::Delete, &self.path(), Self::delete_form(entity_type))
    }
}

impl<T: Transport> DefaultThumbnails<T> {
    /// Sets the default image for `entity_type` (e.g. `character`).
    pub async fn upload(&self, entity_type: &str, image: ImageFile) -> Result<Value, ApiError> {
        self.client
            .upload_file(
                &self.path(),
                Self::upload_form(entity_type, image),
                UploadOptions::default(),
            )
            .await
    }

    pub async fn delete(&self, entity_type: &str) -> Result<Value, ApiError> {
        self.client
            .upload_file(
                &self.path(),
                Self::delete_form(entity_type),
                UploadOptions {
                    method: HttpMethod::Delete,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{FormPart, RequestBody};

    fn thumbnails() -> DefaultThumbnails<()> {
        let client = KankaClient::with_transport(ClientConfig::new("k"), ());
        DefaultThumbnails::new(&client, 8)
    }

    #[test]
    fn upload_is_multipart_post() {
        let image = ImageFile::new("npc.png", "image/png", vec![137, 80, 78, 71]);
        let req = thumbnails().build_upload("character", image);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.kanka.io/1.0/campaigns/8/default-thumbnails");
        let RequestBody::Multipart(form) = req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.text_value(ENTITY_TYPE_FIELD), Some("character"));
        assert!(matches!(
            &form.parts[1],
            FormPart::File { name, file_name, .. } if name == IMAGE_FIELD && file_name == "npc.png"
        ));
    }

    #[test]
    fn delete_is_multipart_delete() {
        let req = thumbnails().build_delete("location");
        assert_eq!(req.method, HttpMethod::Delete);
        let RequestBody::Multipart(form) = req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.parts.len(), 1);
        assert_eq!(form.text_value(ENTITY_TYPE_FIELD), Some("location"));
    }
}
