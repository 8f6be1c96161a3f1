//! Place publishing.

use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::Transport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionType {
    /// Save the place file without publishing it.
    Saved,
    /// Save and publish the place file.
    Published,
}

/// A place file to upload with the new version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaceFile {
    /// `.rbxl`
    Binary(Vec<u8>),
    /// `.rbxlx`
    Xml(String),
}

impl PlaceFile {
    fn content_type(&self) -> &'static str {
        match self {
            PlaceFile::Binary(_) => "application/octet-stream",
            PlaceFile::Xml(_) => "application/xml",
        }
    }

    fn into_body(self) -> Vec<u8> {
        match self {
            PlaceFile::Binary(bytes) => bytes,
            PlaceFile::Xml(xml) => xml.into_bytes(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishPlace {
    pub place_id: String,
    pub version_type: VersionType,
    pub file: Option<PlaceFile>,
}

impl PublishPlace {
    pub fn new(place_id: impl Into<String>, version_type: VersionType) -> Self {
        Self {
            place_id: place_id.into(),
            version_type,
            file: None,
        }
    }

    pub fn with_file(mut self, file: PlaceFile) -> Self {
        self.file = Some(file);
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishPlaceQuery {
    version_type: VersionType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPlaceResponse {
    pub version_number: u64,
}

#[derive(Clone, Copy)]
pub struct PlacePublishing<'a> {
    transport: &'a Transport,
}

impl<'a> PlacePublishing<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    fn publish_request(&self, request: &PublishPlace) -> RequestBuilder {
        let path = format!(
            "universes/v1/{}/places/{}/versions",
            self.transport.config().universe_id,
            request.place_id
        );
        let builder = self.transport.post(&path).query(&PublishPlaceQuery {
            version_type: request.version_type,
        });
        match request.file.clone() {
            Some(file) => builder
                .header(CONTENT_TYPE, file.content_type())
                .body(file.into_body()),
            None => builder,
        }
    }

    /// Creates a new version of a place, returning its version number.
    pub async fn publish_place(&self, request: &PublishPlace) -> Result<Option<PublishPlaceResponse>> {
        self.transport
            .send_json(self.publish_request(request))
            .await
    }
}
