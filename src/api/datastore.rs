//! Standard data stores: listing stores and reading, writing and versioning entries.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::checksum::content_md5;
use crate::error::Result;
use crate::transport::Transport;
use crate::util::parse_timestamp;

pub const ATTRIBUTES_HEADER: &str = "roblox-entry-attributes";
pub const USER_IDS_HEADER: &str = "roblox-entry-userids";
pub const CONTENT_MD5_HEADER: &str = "content-md5";
pub const CREATED_TIME_HEADER: &str = "roblox-entry-created-time";
pub const VERSION_HEADER: &str = "roblox-entry-version";

fn non_empty(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.is_empty())
}

// ── Request parameters ──────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDataStores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ListDataStores {
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// List keys across every scope. Keys come back with their scope attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_scopes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListEntries {
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_all_scopes(mut self, all_scopes: bool) -> Self {
        self.all_scopes = Some(all_scopes);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntry {
    pub entry_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl GetEntry {
    pub fn new(entry_key: impl Into<String>) -> Self {
        Self {
            entry_key: entry_key.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntry {
    pub entry_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl DeleteEntry {
    pub fn new(entry_key: impl Into<String>) -> Self {
        Self {
            entry_key: entry_key.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntryVersion {
    pub entry_key: String,
    pub version_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl GetEntryVersion {
    pub fn new(entry_key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            entry_key: entry_key.into(),
            version_id: version_id.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Earlier versions first.
    Ascending,
    /// Later versions first.
    Descending,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntryVersions {
    pub entry_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Exclude versions created before this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Exclude versions created after this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListEntryVersions {
    pub fn new(entry_key: impl Into<String>) -> Self {
        Self {
            entry_key: entry_key.into(),
            scope: None,
            cursor: None,
            start_time: None,
            end_time: None,
            sort_order: None,
            limit: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Attribute and user-id headers attached to a write.
///
/// Omitting either clears the stored value on the new version.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryHeaders {
    /// Serialized JSON object.
    pub attributes: Option<String>,
    /// JSON array of Roblox user ids, e.g. `[269323]`.
    pub user_ids: Option<String>,
}

impl EntryHeaders {
    fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(attributes) = &self.attributes {
            request = request.header(ATTRIBUTES_HEADER, attributes);
        }
        if let Some(user_ids) = &self.user_ids {
            request = request.header(USER_IDS_HEADER, user_ids);
        }
        request
    }
}

/// Writes `content` to an entry, creating a new version.
#[derive(Clone, Debug, PartialEq)]
pub struct SetEntry {
    pub entry_key: String,
    pub content: String,
    pub scope: Option<String>,
    /// Only write if the current version matches.
    pub match_version: Option<String>,
    /// Only write if the entry does not exist yet.
    pub exclusive_create: Option<bool>,
    pub headers: EntryHeaders,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetEntryQuery<'r> {
    entry_key: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_version: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusive_create: Option<bool>,
}

impl SetEntry {
    pub fn new(entry_key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            entry_key: entry_key.into(),
            content: content.into(),
            scope: None,
            match_version: None,
            exclusive_create: None,
            headers: EntryHeaders::default(),
        }
    }

    /// Serializes `value` as the entry content.
    pub fn json<T: Serialize + ?Sized>(entry_key: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self::new(entry_key, serde_json::to_string(value)?))
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_match_version(mut self, version: impl Into<String>) -> Self {
        self.match_version = Some(version.into());
        self
    }

    pub fn with_exclusive_create(mut self, exclusive_create: bool) -> Self {
        self.exclusive_create = Some(exclusive_create);
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.headers.attributes = Some(attributes.into());
        self
    }

    pub fn with_user_ids(mut self, user_ids: impl Into<String>) -> Self {
        self.headers.user_ids = Some(user_ids.into());
        self
    }

    fn query(&self) -> SetEntryQuery<'_> {
        SetEntryQuery {
            entry_key: &self.entry_key,
            scope: self.scope.as_deref(),
            match_version: self.match_version.as_deref(),
            exclusive_create: self.exclusive_create,
        }
    }
}

/// Adds `increment_by` to a numeric entry, creating it with that value if missing.
#[derive(Clone, Debug, PartialEq)]
pub struct IncrementEntry {
    pub entry_key: String,
    pub increment_by: i64,
    pub scope: Option<String>,
    pub headers: EntryHeaders,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IncrementEntryQuery<'r> {
    entry_key: &'r str,
    increment_by: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'r str>,
}

impl IncrementEntry {
    pub fn new(entry_key: impl Into<String>, increment_by: i64) -> Self {
        Self {
            entry_key: entry_key.into(),
            increment_by,
            scope: None,
            headers: EntryHeaders::default(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.headers.attributes = Some(attributes.into());
        self
    }

    pub fn with_user_ids(mut self, user_ids: impl Into<String>) -> Self {
        self.headers.user_ids = Some(user_ids.into());
        self
    }

    fn query(&self) -> IncrementEntryQuery<'_> {
        IncrementEntryQuery {
            entry_key: &self.entry_key,
            increment_by: self.increment_by,
            scope: self.scope.as_deref(),
        }
    }
}

// ── Responses ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDataStoresResponse {
    #[serde(default)]
    datastores: Vec<DataStoreInfo>,
    next_page_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataStoreInfo {
    name: String,
    created_time: Option<DateTime<Utc>>,
}

/// One page of data stores.
#[derive(Debug)]
pub struct DataStoreList<'a> {
    pub data_stores: Vec<DataStore<'a>>,
    pub next_page_cursor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub key: String,
}

/// One page of entry keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryKeyPage {
    #[serde(default)]
    pub keys: Vec<KeyInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_cursor: Option<String>,
}

/// Metadata of one version of an entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryVersion {
    pub version: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub content_length: u64,
    /// When this version was created.
    pub created_time: DateTime<Utc>,
    /// When the entry itself was first created.
    pub object_created_time: DateTime<Utc>,
}

/// One page of entry versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryVersionPage {
    #[serde(default)]
    pub versions: Vec<EntryVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_cursor: Option<String>,
}

/// Metadata Open Cloud returns in the headers of an entry read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryMetadata {
    pub created_time: Option<DateTime<Utc>>,
    /// `last-modified`: when the returned version was written.
    pub version_created_time: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub attributes: Option<String>,
    pub user_ids: Option<String>,
    pub content_md5: Option<String>,
}

impl EntryMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            created_time: text(CREATED_TIME_HEADER).and_then(|t| parse_timestamp(&t)),
            version_created_time: text(LAST_MODIFIED.as_str()).and_then(|t| parse_timestamp(&t)),
            version: text(VERSION_HEADER),
            attributes: text(ATTRIBUTES_HEADER),
            user_ids: text(USER_IDS_HEADER),
            content_md5: text(CONTENT_MD5_HEADER),
        }
    }

    /// The attribute header parsed as JSON.
    pub fn attributes_json(&self) -> Option<serde_json::Value> {
        self.attributes
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// The user-id header as numbers. Accepts `[1, 2]` or `1,2`.
    pub fn user_id_list(&self) -> Vec<u64> {
        let Some(raw) = self.user_ids.as_deref() else {
            return Vec::new();
        };
        raw.trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }
}

/// An entry's content together with its metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub content: String,
    pub metadata: EntryMetadata,
}

impl Entry {
    /// Decodes the content as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.content)?)
    }
}

async fn send_entry(transport: &Transport, request: RequestBuilder) -> Result<Option<Entry>> {
    let Some(response) = transport.dispatch(request).await? else {
        return Ok(None);
    };
    let metadata = EntryMetadata::from_headers(response.headers());
    match response.text().await {
        Ok(content) => Ok(Some(Entry { content, metadata })),
        Err(e) => {
            warn!(error = %e, "failed to read entry body");
            Ok(None)
        }
    }
}

// ── Resource ────────────────────────────────────────────────────

/// Data-store operations of one universe.
#[derive(Clone, Copy)]
pub struct DataStores<'a> {
    transport: &'a Transport,
}

impl<'a> DataStores<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    fn path(&self) -> String {
        format!(
            "datastores/v1/universes/{}/standard-datastores",
            self.transport.config().universe_id
        )
    }

    /// A handle to the named data store. No request is made.
    pub fn data_store(&self, name: impl Into<String>) -> DataStore<'a> {
        DataStore {
            transport: self.transport,
            name: name.into(),
            created_at: None,
        }
    }

    fn list_request(&self, params: &ListDataStores) -> RequestBuilder {
        self.transport.get(&self.path()).query(params)
    }

    /// Lists the data stores of the universe.
    pub async fn list(&self, params: &ListDataStores) -> Result<Option<DataStoreList<'a>>> {
        let request = self.list_request(params);
        let Some(response) = self
            .transport
            .send_json::<ListDataStoresResponse>(request)
            .await?
        else {
            return Ok(None);
        };

        let data_stores = response
            .datastores
            .into_iter()
            .map(|info| DataStore {
                transport: self.transport,
                name: info.name,
                created_at: info.created_time,
            })
            .collect();

        Ok(Some(DataStoreList {
            data_stores,
            next_page_cursor: non_empty(response.next_page_cursor),
        }))
    }
}

/// A named data store. Holds no entry data.
#[derive(Clone)]
pub struct DataStore<'a> {
    transport: &'a Transport,
    name: String,
    created_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for DataStore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl<'a> DataStore<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only known for handles returned by [`DataStores::list`].
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn entries_path(&self, suffix: &str) -> String {
        format!(
            "datastores/v1/universes/{}/standard-datastores/datastore/entries{suffix}",
            self.transport.config().universe_id
        )
    }

    fn scoped(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("datastoreName", self.name.as_str())])
    }

    fn list_entries_request(&self, params: &ListEntries) -> RequestBuilder {
        self.scoped(self.transport.get(&self.entries_path(""))).query(params)
    }

    fn get_entry_request(&self, params: &GetEntry) -> RequestBuilder {
        self.scoped(self.transport.get(&self.entries_path("/entry")))
            .query(params)
    }

    fn set_entry_request(&self, request: &SetEntry) -> RequestBuilder {
        let mut builder = self
            .scoped(self.transport.post(&self.entries_path("/entry")))
            .query(&request.query())
            .header(CONTENT_TYPE, "application/json");
        if self.transport.config().hash_content {
            builder = builder.header(CONTENT_MD5_HEADER, content_md5(&request.content));
        }
        request
            .headers
            .apply(builder)
            .body(request.content.clone())
    }

    fn delete_entry_request(&self, params: &DeleteEntry) -> RequestBuilder {
        self.scoped(self.transport.delete(&self.entries_path("/entry")))
            .query(params)
    }

    fn increment_entry_request(&self, request: &IncrementEntry) -> RequestBuilder {
        let builder = self
            .scoped(self.transport.post(&self.entries_path("/entry/increment")))
            .query(&request.query());
        request.headers.apply(builder)
    }

    fn get_entry_version_request(&self, params: &GetEntryVersion) -> RequestBuilder {
        self.scoped(self.transport.get(&self.entries_path("/entry/versions/version")))
            .query(params)
    }

    fn list_entry_versions_request(&self, params: &ListEntryVersions) -> RequestBuilder {
        self.scoped(self.transport.get(&self.entries_path("/entry/versions")))
            .query(params)
    }

    /// Lists entry keys in this data store.
    pub async fn list_entries(&self, params: &ListEntries) -> Result<Option<EntryKeyPage>> {
        let page = self
            .transport
            .send_json::<EntryKeyPage>(self.list_entries_request(params))
            .await?;
        Ok(page.map(|mut page| {
            page.next_page_cursor = non_empty(page.next_page_cursor);
            page
        }))
    }

    /// Reads the latest version of an entry.
    pub async fn get_entry(&self, params: &GetEntry) -> Result<Option<Entry>> {
        send_entry(self.transport, self.get_entry_request(params)).await
    }

    /// Writes an entry. Sends `content-md5` unless hashing is disabled in the config.
    pub async fn set_entry(&self, request: &SetEntry) -> Result<Option<EntryVersion>> {
        self.transport
            .send_json(self.set_entry_request(request))
            .await
    }

    /// Marks an entry as deleted. Open Cloud keeps the tombstone version for 30 days.
    pub async fn delete_entry(&self, params: &DeleteEntry) -> Result<()> {
        self.transport
            .send_empty(self.delete_entry_request(params))
            .await
    }

    pub async fn increment_entry(&self, request: &IncrementEntry) -> Result<Option<Entry>> {
        send_entry(self.transport, self.increment_entry_request(request)).await
    }

    /// Reads a specific version of an entry.
    pub async fn get_entry_version(&self, params: &GetEntryVersion) -> Result<Option<Entry>> {
        send_entry(self.transport, self.get_entry_version_request(params)).await
    }

    pub async fn list_entry_versions(
        &self,
        params: &ListEntryVersions,
    ) -> Result<Option<EntryVersionPage>> {
        let page = self
            .transport
            .send_json::<EntryVersionPage>(self.list_entry_versions_request(params))
            .await?;
        Ok(page.map(|mut page| {
            page.next_page_cursor = non_empty(page.next_page_cursor);
            page
        }))
    }
}
