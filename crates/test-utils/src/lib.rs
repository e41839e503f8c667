//! CMSmall test utilities.
//!
//! Fixture builders that produce the JSON bodies clients send, plus
//! assertion helpers for API responses.

use serde_json::{Value as JsonValue, json};

/// Create a test page with a Header and a Paragraph block.
pub fn test_page(title: &str) -> TestPage {
    TestPage {
        id: None,
        title: title.to_string(),
        owner_user_id: None,
        creation_date: "2024-01-01".to_string(),
        publication_date: Some("2024-01-02".to_string()),
        blocks: vec![
            TestBlock::header("Heading"),
            TestBlock::paragraph("Some text"),
        ],
    }
}

/// A page draft builder for request bodies.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub id: Option<i64>,
    pub title: String,
    pub owner_user_id: Option<i64>,
    pub creation_date: String,
    pub publication_date: Option<String>,
    pub blocks: Vec<TestBlock>,
}

impl TestPage {
    /// Set the body id (checked against the path on update).
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner_user_id: i64) -> Self {
        self.owner_user_id = Some(owner_user_id);
        self
    }

    pub fn with_creation_date(mut self, date: &str) -> Self {
        self.creation_date = date.to_string();
        self
    }

    /// Set the publication date.
    pub fn published_on(mut self, date: &str) -> Self {
        self.publication_date = Some(date.to_string());
        self
    }

    /// Remove the publication date.
    pub fn draft(mut self) -> Self {
        self.publication_date = None;
        self
    }

    /// Replace every block.
    pub fn with_blocks(mut self, blocks: Vec<TestBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Append a block.
    pub fn with_block(mut self, block: TestBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Serialize as a request body. Block orders follow list position.
    pub fn to_json(&self) -> JsonValue {
        let blocks: Vec<JsonValue> = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| {
                json!({
                    "type": b.block_type,
                    "content": b.content,
                    "order": b.order.unwrap_or(i as i64 + 1),
                })
            })
            .collect();

        let mut body = json!({
            "title": self.title,
            "creationDate": self.creation_date,
            "publicationDate": self.publication_date,
            "blocks": blocks,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(id) = self.id {
                obj.insert("id".to_string(), json!(id));
            }
            if let Some(owner) = self.owner_user_id {
                obj.insert("ownerUserId".to_string(), json!(owner));
            }
        }
        body
    }
}

/// A block of a [`TestPage`].
#[derive(Debug, Clone)]
pub struct TestBlock {
    pub block_type: String,
    pub content: String,
    /// Explicit order; defaults to list position.
    pub order: Option<i64>,
}

impl TestBlock {
    pub fn new(block_type: &str, content: &str) -> Self {
        Self {
            block_type: block_type.to_string(),
            content: content.to_string(),
            order: None,
        }
    }

    pub fn header(content: &str) -> Self {
        Self::new("Header", content)
    }

    pub fn paragraph(content: &str) -> Self {
        Self::new("Paragraph", content)
    }

    pub fn image(name: &str) -> Self {
        Self::new("Image", name)
    }

    /// Force a specific order value.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a validation response names the given field.
    pub fn has_field_error(value: &Value, param: &str) {
        let found = value["errors"]
            .as_array()
            .is_some_and(|errors| errors.iter().any(|e| e["param"] == param));
        assert!(found, "Expected a validation error for '{param}', got: {value}");
    }

    /// Page ids of a listing, in order.
    pub fn page_ids(value: &Value) -> Vec<i64> {
        value
            .as_array()
            .map(|pages| pages.iter().filter_map(|p| p["id"].as_i64()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_builder() {
        let page = test_page("Hello")
            .with_owner(5)
            .draft()
            .with_block(TestBlock::image("cat.png"));

        let json = page.to_json();
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["ownerUserId"], 5);
        assert!(json["publicationDate"].is_null());
        assert!(json.get("id").is_none());

        let blocks = json["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2]["type"], "Image");
        assert_eq!(blocks[2]["order"], 3);
    }

    #[test]
    fn explicit_order_is_kept() {
        let json = test_page("T")
            .with_blocks(vec![
                TestBlock::header("H").with_order(1),
                TestBlock::paragraph("P").with_order(1),
            ])
            .to_json();
        assert_eq!(json["blocks"][1]["order"], 1);
    }

    #[test]
    fn test_assertions() {
        let errors = json!({"errors": [{"param": "title", "msg": "empty"}]});
        assert::has_key(&errors, "errors");
        assert::has_field_error(&errors, "title");

        let listing = json!([{"id": 3}, {"id": 1}]);
        assert_eq!(assert::page_ids(&listing), vec![3, 1]);
    }
}
