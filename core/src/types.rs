//! Wire DTOs for the catalog API.
//!
//! # Design
//! These types mirror the catalog's JSON shapes but are defined independently
//! from the mock-server crate; integration tests catch schema drift. The
//! catalog attaches arbitrary additional fields to items, so `Item` and
//! `ItemFields` carry a flattened extras map rather than enumerating every
//! server-defined field. ACL principal sets use `BTreeSet` so a principal
//! appears at most once and add/remove are idempotent set operations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A catalog item: hierarchical placement, metadata, optional attachments.
///
/// Optional fields may be omitted entirely by the catalog when a `fields`
/// selector excludes them, hence `Option` rather than empty defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileInfo>>,
    /// Extracted-metadata blocks, present only after a scrape-on-upload.
    /// Shape is catalog-defined, so blocks stay as raw JSON values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<serde_json::Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Descriptor for a file attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Fields supplied when creating, updating, or upserting an item.
///
/// `id` is only meaningful on the upsert path: present means update that
/// item, absent means create a new one. Omitted fields are not sent, so an
/// update leaves them unchanged on the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemFields {
    /// Convenience for the common create shape: a title under a parent.
    pub fn titled(title: &str, parent_id: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            parent_id: Some(parent_id.to_string()),
            ..Self::default()
        }
    }
}

/// Options for single-item reads. `fields` restricts which optional fields
/// the catalog populates; it is sent as one comma-separated query parameter.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub fields: Vec<String>,
}

impl QueryOptions {
    pub fn with_fields(names: &[&str]) -> Self {
        Self {
            fields: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// A filtered item search. Ordering of results is catalog-defined and not
/// guaranteed stable across calls.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub parent_id: Option<String>,
    pub q: Option<String>,
    pub fields: Vec<String>,
    pub max: Option<u32>,
    pub page_token: Option<String>,
}

impl SearchQuery {
    pub fn under_parent(parent_id: &str) -> Self {
        Self {
            parent_id: Some(parent_id.to_string()),
            ..Self::default()
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<Item>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// The read half of an item's permission document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadAccess {
    #[serde(default)]
    pub acl: BTreeSet<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub inherited: bool,
}

/// The write half of an item's permission document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteAccess {
    #[serde(default)]
    pub acl: BTreeSet<String>,
}

/// An item's full access-control document, as returned by every ACL call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    #[serde(default)]
    pub read: ReadAccess,
    #[serde(default)]
    pub write: WriteAccess,
}

impl Permissions {
    /// True iff the read ACL's public flag is set. Pure; no I/O.
    pub fn has_public_read(&self) -> bool {
        self.read.is_public
    }
}

/// Diagnostic rendering of an ACL document, one principal per line.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "read (public: {}, inherited: {}):",
            self.read.is_public, self.read.inherited
        )?;
        for principal in &self.read.acl {
            writeln!(f, "  {principal}")?;
        }
        writeln!(f, "write:")?;
        for principal in &self.write.acl {
            writeln!(f, "  {principal}")?;
        }
        Ok(())
    }
}

/// A directed link between two items. Created only; never updated
/// client-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItemLink {
    #[serde(default)]
    pub id: Option<String>,
    pub item_id: String,
    pub related_item_id: String,
    #[serde(default, rename = "type")]
    pub link_type: Option<String>,
}

/// Build the principal token for a user: `"USER:<email>"`, case-sensitive.
pub fn user_token(email: &str) -> String {
    format!("USER:{email}")
}

/// Build the principal token for a role: `"ROLE:<name>"`, case-sensitive.
pub fn role_token(role: &str) -> String {
    format!("ROLE:{role}")
}
