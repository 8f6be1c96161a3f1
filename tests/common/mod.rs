#![allow(dead_code)]

use rbx_open_cloud::{ClientConfig, ErrorCode, ErrorEnvelope, OpenCloud};
use serde_json::json;
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";
pub const UNIVERSE_ID: &str = "1234";

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(API_KEY, UNIVERSE_ID).with_base_url(server.uri())
}

pub fn client(server: &MockServer) -> OpenCloud {
    OpenCloud::new(config(server)).unwrap()
}

pub fn client_without_hashing(server: &MockServer) -> OpenCloud {
    OpenCloud::new(config(server).with_hash_content(false)).unwrap()
}

pub fn stores_path() -> String {
    format!("/datastores/v1/universes/{UNIVERSE_ID}/standard-datastores")
}

pub fn entries_path(suffix: &str) -> String {
    format!("{}/datastore/entries{suffix}", stores_path())
}

pub fn not_found_body() -> serde_json::Value {
    json!({"Error": "NOT_FOUND", "Message": "Entry not found in the datastore."})
}

pub fn not_found_envelope() -> ErrorEnvelope {
    ErrorEnvelope {
        code: ErrorCode::NotFound,
        message: "Entry not found in the datastore.".to_string(),
        details: None,
    }
}

pub fn entry_version_json(version: &str) -> serde_json::Value {
    json!({
        "version": version,
        "deleted": false,
        "contentLength": 3,
        "createdTime": "2024-03-01T12:00:00.1234567Z",
        "objectCreatedTime": "2024-01-01T00:00:00Z"
    })
}
