//! Item CRUD: get, find, create, update, upsert, delete.

use crate::api::Api;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{Item, ItemFields, QueryOptions, SearchQuery, SearchResult};

impl Api {
    fn build_get_item(&self, id: &str, options: Option<&QueryOptions>) -> HttpRequest {
        let mut req = HttpRequest::new(HttpMethod::Get, self.url(&format!("items/{id}")));
        if let Some(options) = options {
            if !options.fields.is_empty() {
                req.query
                    .push(("fields".to_string(), options.fields.join(",")));
            }
        }
        req
    }

    fn build_find_items(&self, query: &SearchQuery) -> HttpRequest {
        let mut req = HttpRequest::new(HttpMethod::Get, self.url("items"));
        if let Some(parent_id) = &query.parent_id {
            req.query.push(("parentId".to_string(), parent_id.clone()));
        }
        if let Some(q) = &query.q {
            req.query.push(("q".to_string(), q.clone()));
        }
        if !query.fields.is_empty() {
            req.query
                .push(("fields".to_string(), query.fields.join(",")));
        }
        if let Some(max) = query.max {
            req.query.push(("max".to_string(), max.to_string()));
        }
        if let Some(token) = &query.page_token {
            req.query.push(("pageToken".to_string(), token.clone()));
        }
        req
    }

    fn parse_find_items(&self, response: HttpResponse) -> Result<SearchResult, Error> {
        crate::api::check_status(&response, 200)?;
        crate::api::parse_json(&response.body)
    }

    fn build_create_item(&self, fields: &ItemFields) -> Result<HttpRequest, Error> {
        self.json_request(HttpMethod::Post, "items", fields)
    }

    fn build_update_item(&self, id: &str, fields: &ItemFields) -> Result<HttpRequest, Error> {
        self.json_request(HttpMethod::Put, &format!("items/{id}"), fields)
    }

    fn build_delete_item(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&format!("items/{id}")))
    }

    fn parse_delete_item(&self, response: HttpResponse) -> Result<(), Error> {
        crate::api::check_status(&response, 204)
    }
}

impl Session {
    /// Fetch one item by id. A `fields` selector restricts which optional
    /// fields the catalog populates; unrequested fields may be omitted
    /// entirely.
    pub fn get_item(&self, id: &str, options: Option<&QueryOptions>) -> Result<Item, Error> {
        let req = self.api.build_get_item(id, options);
        let response = self.transport.execute(&req)?;
        self.api.parse_item(response, 200)
    }

    /// Filtered search returning one page of results. Ordering is
    /// catalog-defined; pass `query.page_token` from a previous result to
    /// continue.
    pub fn find_items(&self, query: &SearchQuery) -> Result<SearchResult, Error> {
        let req = self.api.build_find_items(query);
        let response = self.transport.execute(&req)?;
        self.api.parse_find_items(response)
    }

    /// Create a new item under `fields.parent_id`, or under the caller's
    /// personal root when omitted. Returns the created item including the
    /// server-assigned id and computed ancestors.
    pub fn create_item(&self, fields: &ItemFields) -> Result<Item, Error> {
        let req = self.api.build_create_item(fields)?;
        let response = self.transport.execute(&req)?;
        self.api.parse_item(response, 201)
    }

    /// Merge `fields` onto an existing item; omitted fields are unchanged.
    pub fn update_item(&self, id: &str, fields: &ItemFields) -> Result<Item, Error> {
        let req = self.api.build_update_item(id, fields)?;
        let response = self.transport.execute(&req)?;
        self.api.parse_item(response, 200)
    }

    /// Update when `fields.id` is set, create otherwise.
    pub fn upsert_item(&self, fields: &ItemFields) -> Result<Item, Error> {
        match &fields.id {
            Some(id) => self.update_item(id, fields),
            None => self.create_item(fields),
        }
    }

    /// Permanently remove an item and its file attachments.
    ///
    /// Deletion is not idempotent at the transport level: deleting an
    /// already-deleted item fails with `Error::NotFound`, so callers that
    /// need blind-retry safety must check existence first.
    pub fn delete_item(&self, item: &Item) -> Result<(), Error> {
        let req = self.api.build_delete_item(&item.id);
        let response = self.transport.execute(&req)?;
        self.api.parse_delete_item(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Api {
        Api::new("http://localhost:3000")
    }

    #[test]
    fn build_get_item_without_options() {
        let req = api().build_get_item("abc123", None);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/items/abc123");
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_item_joins_fields_with_commas() {
        let options = QueryOptions::with_fields(&["parentId", "ancestors"]);
        let req = api().build_get_item("abc123", Some(&options));
        assert_eq!(
            req.query,
            vec![("fields".to_string(), "parentId,ancestors".to_string())]
        );
    }

    #[test]
    fn build_find_items_sets_filter_params() {
        let query = SearchQuery {
            parent_id: Some("root1".to_string()),
            q: Some("boundary".to_string()),
            fields: vec!["parentId".to_string(), "ancestors".to_string()],
            max: Some(5),
            page_token: None,
        };
        let req = api().build_find_items(&query);
        assert_eq!(req.path, "http://localhost:3000/items");
        assert_eq!(
            req.query,
            vec![
                ("parentId".to_string(), "root1".to_string()),
                ("q".to_string(), "boundary".to_string()),
                ("fields".to_string(), "parentId,ancestors".to_string()),
                ("max".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn build_create_item_posts_json_fields() {
        let fields = ItemFields::titled("Project", "root1");
        let req = api().build_create_item(&fields).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/items");
        let body: serde_json::Value =
            serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Project");
        assert_eq!(body["parentId"], "root1");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn build_update_item_puts_to_item_path() {
        let fields = ItemFields {
            title: Some("Renamed".to_string()),
            ..ItemFields::default()
        };
        let req = api().build_update_item("abc123", &fields).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/items/abc123");
    }

    #[test]
    fn build_delete_item_produces_delete_request() {
        let req = api().build_delete_item("abc123");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/items/abc123");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_find_items_reads_page() {
        let response = HttpResponse {
            status: 200,
            body: r#"{"items":[{"id":"a1","title":"One"}],"total":3,"nextPageToken":"20"}"#
                .to_string(),
        };
        let page = api().parse_find_items(response).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.next_page_token.as_deref(), Some("20"));
    }

    #[test]
    fn parse_find_items_allows_empty_page() {
        let response = HttpResponse {
            status: 200,
            body: r#"{"items":[],"total":0}"#.to_string(),
        };
        let page = api().parse_find_items(response).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn parse_item_maps_404_to_not_found() {
        let response = HttpResponse {
            status: 404,
            body: r#"{"message":"item not found"}"#.to_string(),
        };
        let err = api().parse_item(response, 200).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn parse_item_maps_403_to_authentication() {
        let response = HttpResponse {
            status: 403,
            body: r#"{"message":"no read access"}"#.to_string(),
        };
        let err = api().parse_item(response, 200).unwrap_err();
        assert!(matches!(err, Error::Authentication(msg) if msg == "no read access"));
    }

    #[test]
    fn parse_delete_item_rejects_wrong_status() {
        let response = HttpResponse {
            status: 404,
            body: String::new(),
        };
        let err = api().parse_delete_item(response).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }
}
