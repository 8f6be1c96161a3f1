//! Client for the Roblox Open Cloud API.
//!
//! ```no_run
//! use rbx_open_cloud::{ClientConfig, OpenCloud, SetEntry};
//!
//! # async fn demo() -> rbx_open_cloud::Result<()> {
//! let cloud = OpenCloud::new(ClientConfig::new("api-key", "1234567"))?;
//!
//! let coins = cloud.data_stores().data_store("Coins");
//! coins.set_entry(&SetEntry::new("player_1", "100")).await?;
//!
//! cloud.messaging().publish("Announcements", "Double coins weekend").await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every operation returns `Result<Option<T>>` (or `Result<()>` when there is no payload):
//! `Err(OpenCloudError::Api(_))` carries the error envelope sent by the server, and
//! `Ok(None)` means the request failed without one.

pub mod api;
pub mod checksum;
pub mod config;
mod error;
pub mod transport;
pub(crate) mod util;

pub use api::datastore::{
    DataStore, DataStoreList, DataStores, DeleteEntry, Entry, EntryHeaders, EntryKeyPage,
    EntryMetadata, EntryVersion, EntryVersionPage, GetEntry, GetEntryVersion, IncrementEntry,
    KeyInfo, ListDataStores, ListEntries, ListEntryVersions, SetEntry, SortOrder,
};
pub use api::messaging::Messaging;
pub use api::place_publishing::{
    PlaceFile, PlacePublishing, PublishPlace, PublishPlaceResponse, VersionType,
};
pub use checksum::{content_md5, content_md5_str, TextEncoding};
pub use config::ClientConfig;
pub use error::{ErrorCode, ErrorEnvelope, OpenCloudError, Result};
pub use transport::Transport;

/// Entry point: owns the configuration and the shared transport.
///
/// Resource modules are cheap borrowed views, so one `OpenCloud` can serve any number
/// of concurrent calls.
pub struct OpenCloud {
    transport: Transport,
}

impl OpenCloud {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    /// Builds a client from `ROBLOX_OPEN_CLOUD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Builds a client from `~/.rbx-open-cloud/config.json`.
    pub fn from_default_config() -> Result<Self> {
        Self::new(ClientConfig::load_default()?)
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn data_stores(&self) -> DataStores<'_> {
        DataStores::new(&self.transport)
    }

    pub fn messaging(&self) -> Messaging<'_> {
        Messaging::new(&self.transport)
    }

    pub fn place_publishing(&self) -> PlacePublishing<'_> {
        PlacePublishing::new(&self.transport)
    }
}
