// src/links/model.rs
// =============================================================================
// Data model of public/data/friends.json.
//
// The document is maintained by hand, so it is kept as a JSON tree and only
// ever edited in one place: the `responseTime` key of a link object. Key
// order, unknown keys and the `categories` array are written back exactly as
// they were read.
//
// `LinkRecord` is the read-only view the checker works from. It only pulls
// the few fields checking needs and tolerates everything else being absent.
// =============================================================================

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct FriendLinksDocument {
    root: Value,
}

impl FriendLinksDocument {
    // The root must be an object holding a `links` array.
    pub fn from_value(root: Value) -> Result<Self> {
        match root.get("links") {
            Some(Value::Array(_)) => Ok(Self { root }),
            Some(_) => bail!("`links` is not an array"),
            None => bail!("missing `links` array"),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Checker view of every link entry, in document order.
    ///
    /// Entries that are not objects, or whose `name`/`url`/`status` have the
    /// wrong type, are logged and left out: they are never checked, and they
    /// are written back untouched.
    pub fn links(&self) -> Vec<LinkRecord> {
        self.link_entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match LinkRecord::deserialize(entry) {
                Ok(link) => Some(link),
                Err(e) => {
                    warn!(target: "check_links", index, "ignoring malformed link entry: {e}");
                    None
                }
            })
            .collect()
    }

    pub(super) fn link_objects_mut(&mut self) -> impl Iterator<Item = &mut Map<String, Value>> {
        self.root
            .get_mut("links")
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object_mut)
    }

    fn link_entries(&self) -> &[Value] {
        self.root
            .get("links")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// One outbound link tracked for health, as seen by the checker.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LinkRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: LinkStatus,
    /// Last measured latency in milliseconds. Absent until the first run
    /// that probes this link.
    #[serde(rename = "responseTime", default)]
    pub response_time: Option<u64>,
}

impl LinkRecord {
    pub fn is_active(&self) -> bool {
        self.status == LinkStatus::Active
    }
}

// Lifecycle status of a link. Only `active` links are probed; a missing
// status reads as `Other("")` and is never probed either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkStatus {
    Active,
    Inactive,
    Other(String),
}

impl Default for LinkStatus {
    fn default() -> Self {
        LinkStatus::Other(String::new())
    }
}

impl From<String> for LinkStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => LinkStatus::Active,
            "inactive" => LinkStatus::Inactive,
            _ => LinkStatus::Other(raw),
        }
    }
}

impl From<LinkStatus> for String {
    fn from(status: LinkStatus) -> Self {
        match status {
            LinkStatus::Active => "active".to_string(),
            LinkStatus::Inactive => "inactive".to_string(),
            LinkStatus::Other(raw) => raw,
        }
    }
}
