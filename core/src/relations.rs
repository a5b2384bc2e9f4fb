//! Directed relationships between items.

use serde::Serialize;

use crate::api::Api;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::RelatedItemLink;

const RELATED_LINK_TYPE: &str = "related";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLink<'a> {
    item_id: &'a str,
    related_item_id: &'a str,
    #[serde(rename = "type")]
    link_type: &'a str,
}

impl Api {
    fn build_create_related_item_link(
        &self,
        item_id: &str,
        related_item_id: &str,
    ) -> Result<HttpRequest, Error> {
        self.json_request(
            HttpMethod::Post,
            "relationships",
            &CreateLink {
                item_id,
                related_item_id,
                link_type: RELATED_LINK_TYPE,
            },
        )
    }

    fn parse_related_item_link(&self, response: HttpResponse) -> Result<RelatedItemLink, Error> {
        crate::api::check_status(&response, 201)?;
        crate::api::parse_json(&response.body)
    }
}

impl Session {
    /// Create a directed link from `item_id` to `related_item_id`. No
    /// reciprocal link is created. Fails with `Error::Validation` when
    /// either id is unknown to the catalog.
    pub fn create_related_item_link(
        &self,
        item_id: &str,
        related_item_id: &str,
    ) -> Result<RelatedItemLink, Error> {
        let req = self
            .api
            .build_create_related_item_link(item_id, related_item_id)?;
        let response = self.transport.execute(&req)?;
        self.api.parse_related_item_link(response)
    }
}
