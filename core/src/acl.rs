//! Per-item access control: read and write ACLs for users and roles.
//!
//! # Design
//! An ACL is a set of principal tokens plus the public/inherited flags, not
//! an event log: add and remove are idempotent set operations. The catalog
//! exposes only get/set of the full permission document, so every add/remove
//! is a read-modify-write; when the set is already in the requested state
//! the write round trip is skipped entirely.

use crate::api::Api;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{role_token, user_token, Permissions};

#[derive(Debug, Clone, Copy)]
enum Access {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy)]
enum AclOp {
    Add,
    Remove,
}

impl Api {
    fn build_get_permissions(&self, item_id: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Get,
            self.url(&format!("items/{item_id}/permissions")),
        )
    }

    fn build_set_permissions(
        &self,
        item_id: &str,
        permissions: &Permissions,
    ) -> Result<HttpRequest, Error> {
        self.json_request(
            HttpMethod::Put,
            &format!("items/{item_id}/permissions"),
            permissions,
        )
    }

    fn parse_permissions(&self, response: HttpResponse) -> Result<Permissions, Error> {
        crate::api::check_status(&response, 200)?;
        crate::api::parse_json(&response.body)
    }
}

impl Session {
    /// Fetch an item's full `{read, write}` permission document.
    pub fn get_permissions(&self, item_id: &str) -> Result<Permissions, Error> {
        let req = self.api.build_get_permissions(item_id);
        let response = self.transport.execute(&req)?;
        self.api.parse_permissions(response)
    }

    /// Replace an item's permission document, returning the stored state.
    pub fn set_permissions(
        &self,
        item_id: &str,
        permissions: &Permissions,
    ) -> Result<Permissions, Error> {
        let req = self.api.build_set_permissions(item_id, permissions)?;
        let response = self.transport.execute(&req)?;
        self.api.parse_permissions(response)
    }

    pub fn add_acl_user_read(&self, email: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Read, AclOp::Add, user_token(email))
    }

    pub fn add_acl_user_write(&self, email: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Write, AclOp::Add, user_token(email))
    }

    pub fn remove_acl_user_read(&self, email: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Read, AclOp::Remove, user_token(email))
    }

    pub fn remove_acl_user_write(&self, email: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Write, AclOp::Remove, user_token(email))
    }

    pub fn add_acl_role_read(&self, role: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Read, AclOp::Add, role_token(role))
    }

    pub fn add_acl_role_write(&self, role: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Write, AclOp::Add, role_token(role))
    }

    pub fn remove_acl_role_read(&self, role: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Read, AclOp::Remove, role_token(role))
    }

    pub fn remove_acl_role_write(&self, role: &str, item_id: &str) -> Result<Permissions, Error> {
        self.modify_acl(item_id, Access::Write, AclOp::Remove, role_token(role))
    }

    fn modify_acl(
        &self,
        item_id: &str,
        access: Access,
        op: AclOp,
        token: String,
    ) -> Result<Permissions, Error> {
        let mut permissions = self.get_permissions(item_id)?;
        let acl = match access {
            Access::Read => &mut permissions.read.acl,
            Access::Write => &mut permissions.write.acl,
        };
        let changed = match op {
            AclOp::Add => acl.insert(token),
            AclOp::Remove => acl.remove(&token),
        };
        if !changed {
            // already in the requested state; skip the write round trip
            return Ok(permissions);
        }
        self.set_permissions(item_id, &permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Api {
        Api::new("http://localhost:3000")
    }

    #[test]
    fn build_get_permissions_targets_item_path() {
        let req = api().build_get_permissions("abc123");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/items/abc123/permissions");
    }

    #[test]
    fn build_set_permissions_puts_full_document() {
        let mut permissions = Permissions::default();
        permissions.read.acl.insert("USER:a@b.gov".to_string());
        let req = api().build_set_permissions("abc123", &permissions).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        let body: serde_json::Value =
            serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["read"]["acl"][0], "USER:a@b.gov");
        assert_eq!(body["read"]["isPublic"], false);
        assert_eq!(body["write"]["acl"], serde_json::json!([]));
    }

    #[test]
    fn parse_permissions_reads_both_halves() {
        let response = HttpResponse {
            status: 200,
            body: r#"{"read":{"acl":["ROLE:Admin"],"isPublic":true,"inherited":false},"write":{"acl":["USER:a@b.gov"]}}"#
                .to_string(),
        };
        let permissions = api().parse_permissions(response).unwrap();
        assert!(permissions.read.acl.contains("ROLE:Admin"));
        assert!(permissions.write.acl.contains("USER:a@b.gov"));
        assert!(permissions.has_public_read());
    }

    #[test]
    fn parse_permissions_maps_404() {
        let response = HttpResponse {
            status: 404,
            body: String::new(),
        };
        let err = api().parse_permissions(response).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }
}
