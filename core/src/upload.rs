//! File attachment: batch upload-and-upsert and per-file incremental upload.
//!
//! # Design
//! Both public paths share one multipart primitive parameterized by a
//! sequence of files; the per-file path calls it with length 1. The batch
//! path minimizes round trips for bulk ingestion; the per-file path trades
//! throughput for per-file failure isolation (earlier files stay attached
//! when a later one fails).
//!
//! Neither path is transactional: an item can exist with only some of its
//! files attached after a partial failure. The client does not auto-rollback;
//! callers inspect the error and compensate (for example by deleting the
//! partially created item).

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::api::Api;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest};
use crate::session::Session;
use crate::types::{Item, ItemFields};

/// One file read into memory for a multipart request. Ephemeral; lives only
/// for the duration of an upload call.
#[derive(Debug)]
struct FilePart {
    name: String,
    bytes: Vec<u8>,
}

fn read_parts<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FilePart>, Error> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::Upload(format!("invalid file path: {}", path.display())))?
                .to_string();
            let bytes = fs::read(path)
                .map_err(|e| Error::Upload(format!("cannot read {}: {e}", path.display())))?;
            Ok(FilePart { name, bytes })
        })
        .collect()
}

/// Encode parts as `multipart/form-data`, returning the content-type header
/// value (with boundary) and the body bytes.
fn encode_multipart(parts: &[FilePart]) -> (String, Vec<u8>) {
    let boundary = format!("catalog-{}", Uuid::new_v4().simple());
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                part.name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

impl Api {
    fn build_upload_files(&self, item_id: &str, scrape: bool, parts: &[FilePart]) -> HttpRequest {
        let (content_type, body) = encode_multipart(parts);
        let mut req = HttpRequest::new(
            HttpMethod::Post,
            self.url(&format!("items/{item_id}/files")),
        );
        req.query
            .push(("scrape".to_string(), scrape.to_string()));
        req.headers.push(("content-type".to_string(), content_type));
        req.body = Some(body);
        req
    }
}

impl Session {
    /// Create or update an item from `fields`, then attach all of `paths` as
    /// one multipart batch. With `scrape_file` the catalog extracts metadata
    /// into `facets`; without it `facets` stays absent.
    pub fn upload_files_and_upsert_item<P: AsRef<Path>>(
        &self,
        fields: &ItemFields,
        paths: &[P],
        scrape_file: bool,
    ) -> Result<Item, Error> {
        let item = self.upsert_item(fields)?;
        if paths.is_empty() {
            return Ok(item);
        }
        self.attach_files(&item.id, paths, scrape_file)
    }

    /// Attach a single file to an existing item, returning the updated item
    /// with the appended file descriptor. Calling this per file is
    /// equivalent to one batch call except each failure is isolated to its
    /// file.
    pub fn upload_file_to_item<P: AsRef<Path>>(
        &self,
        item: &Item,
        path: P,
        scrape_file: bool,
    ) -> Result<Item, Error> {
        self.attach_files(&item.id, &[path], scrape_file)
    }

    fn attach_files<P: AsRef<Path>>(
        &self,
        item_id: &str,
        paths: &[P],
        scrape: bool,
    ) -> Result<Item, Error> {
        let parts = read_parts(paths)?;
        let req = self.api.build_upload_files(item_id, scrape, &parts);
        let response = self.transport.execute(&req).map_err(|e| match e {
            Error::Transport(msg) => Error::Upload(msg),
            other => other,
        })?;
        self.api.parse_item(response, 200)
    }
}
