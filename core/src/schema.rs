//! Response envelopes and path-aware decoding.
//!
//! # Design
//! A resource schema is an ordinary `Deserialize` type: required fields are
//! plain fields, nullable ones are `Option`, unknown fields are ignored.
//! `decode` reports where a body diverged from that shape (`data[2].name`)
//! and never substitutes defaults for missing required fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Path used when the failure concerns the whole document.
pub const ROOT_PATH: &str = "$";

/// `{ "data": T }`, the envelope of single-entity endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResponse<T> {
    pub data: T,
}

/// `{ "data": [T] }` without pagination, used by small sub-resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// `{ "data": [T], "meta": {..}, "links": {..} }` for list endpoints.
///
/// `data` keeps the order the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
    pub links: PaginationLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    /// Index of the first item on this page; `null` for an empty page.
    pub from: Option<u64>,
    pub last_page: u32,
    pub per_page: u32,
    pub to: Option<u64>,
    pub total: u64,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    pub first: Option<String>,
    pub last: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl<T> PaginatedResponse<T> {
    pub fn has_next_page(&self) -> bool {
        self.links.next.is_some()
    }
}

/// Decodes a JSON body into `T`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ValidationError> {
    let mut de = serde_json::Deserializer::from_str(body);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let path = err.path().to_string();
        to_validation_error(&path, err.into_inner())
    })?;
    de.end()
        .map_err(|e| ValidationError::new(ROOT_PATH, e.to_string()))?;
    Ok(value)
}

fn to_validation_error(path: &str, inner: serde_json::Error) -> ValidationError {
    let message = inner.to_string();
    if inner.is_syntax() || inner.is_eof() {
        return ValidationError::new(ROOT_PATH, message);
    }
    let path = match missing_field(&message) {
        Some(field) => join(path, field),
        None if path == "." => ROOT_PATH.to_string(),
        None => path.to_string(),
    };
    ValidationError::new(path, message)
}

/// Extracts `name` from serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

fn join(parent: &str, field: &str) -> String {
    if parent == "." {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: u64,
        name: String,
        entry: Option<String>,
    }

    const META: &str = r#""meta":{"current_page":1,"from":1,"last_page":1,"per_page":15,"to":2,"total":2,"path":"x"},"links":{"first":"x?page=1","last":"x?page=1","prev":null,"next":null}"#;

    #[test]
    fn decodes_single_envelope() {
        let body = r#"{"data":{"id":1,"name":"Ari","entry":null}}"#;
        let decoded: SingleResponse<Record> = decode(body).unwrap();
        assert_eq!(
            decoded.data,
            Record {
                id: 1,
                name: "Ari".to_string(),
                entry: None
            }
        );
    }

    #[test]
    fn paginated_keeps_server_order() {
        let body = format!(
            r#"{{"data":[{{"id":9,"name":"b"}},{{"id":2,"name":"a"}}],{META}}}"#
        );
        let decoded: PaginatedResponse<Record> = decode(&body).unwrap();
        let ids: Vec<u64> = decoded.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, [9, 2]);
        assert!(!decoded.has_next_page());
        assert_eq!(decoded.meta.total, 2);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = r#"{"data":{"id":1,"name":"Ari","entry":"x","extra":[1,2]}}"#;
        let decoded: SingleResponse<Record> = decode(body).unwrap();
        assert_eq!(decoded.data.entry.as_deref(), Some("x"));
    }

    #[test]
    fn missing_required_field_reports_its_path() {
        let body = r#"{"data":{"id":1,"entry":null}}"#;
        let err = decode::<SingleResponse<Record>>(body).unwrap_err();
        assert_eq!(err.path, "data.name");
        assert!(err.message.contains("missing field `name`"));
    }

    #[test]
    fn missing_field_inside_list_reports_index() {
        let body = format!(r#"{{"data":[{{"id":1,"name":"a"}},{{"id":2}}],{META}}}"#);
        let err = decode::<PaginatedResponse<Record>>(&body).unwrap_err();
        assert_eq!(err.path, "data[1].name");
    }

    #[test]
    fn wrong_type_reports_field_path() {
        let body = r#"{"data":{"id":"one","name":"a"}}"#;
        let err = decode::<SingleResponse<Record>>(body).unwrap_err();
        assert_eq!(err.path, "data.id");
    }

    #[test]
    fn null_in_required_field_is_rejected() {
        let body = r#"{"data":{"id":1,"name":null}}"#;
        let err = decode::<SingleResponse<Record>>(body).unwrap_err();
        assert_eq!(err.path, "data.name");
    }

    #[test]
    fn missing_envelope_reports_root_field() {
        let err = decode::<SingleResponse<Record>>(r#"{"id":1}"#).unwrap_err();
        assert_eq!(err.path, "data");
    }

    #[test]
    fn malformed_json_reports_root() {
        let err = decode::<SingleResponse<Record>>("not json").unwrap_err();
        assert_eq!(err.path, ROOT_PATH);
        let err = decode::<SingleResponse<Record>>("").unwrap_err();
        assert_eq!(err.path, ROOT_PATH);
    }
}
