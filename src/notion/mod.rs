//! Raw records as the content source returns them, and the seam the
//! fetchers talk through.

pub mod client;
pub mod property;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

pub use client::NotionClient;
pub use property::Property;

/// One database page. Properties are kept loosely typed and interpreted
/// through [`Property::parse`] at the point of use. Decoding never fails:
/// fields of the wrong shape come out empty and the normalizer drops the
/// record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Value")]
pub struct Page {
    pub id: String,
    pub created_time: Option<String>,
    pub properties: Option<Map<String, Value>>,
}

impl From<Value> for Page {
    fn from(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Page::default();
        };
        let string = |v: Option<Value>| match v {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        Page {
            id: string(obj.remove("id")).unwrap_or_default(),
            created_time: string(obj.remove("created_time")),
            properties: match obj.remove("properties") {
                Some(Value::Object(props)) => Some(props),
                _ => None,
            },
        }
    }
}

impl Page {
    pub fn property(&self, name: &str) -> Option<Property<'_>> {
        self.properties.as_ref()?.get(name).map(Property::parse)
    }

    /// Properties in source order.
    pub fn iter_properties(&self) -> impl Iterator<Item = (&str, Property<'_>)> {
        self.properties
            .iter()
            .flat_map(|props| props.iter())
            .map(|(k, v)| (k.as_str(), Property::parse(v)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
}

/// The two operations the data layer needs from the content source.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// POST a collection query body.
    async fn query(&self, body: &Value) -> Result<QueryResponse>;

    /// GET a single record by its hyphenated id.
    async fn retrieve(&self, page_id: &str) -> Result<Page>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_keeps_property_order() {
        let page: Page = serde_json::from_value(json!({
            "id": "p1",
            "properties": {
                "z": {"rich_text": []},
                "a": {"title": []},
            }
        }))
        .unwrap();
        let names: Vec<&str> = page.iter_properties().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn page_without_properties() {
        let page: Page = serde_json::from_value(json!({"id": "p1"})).unwrap();
        assert!(page.properties.is_none());
        assert!(page.property("anything").is_none());
        assert_eq!(page.iter_properties().count(), 0);
    }

    #[test]
    fn malformed_records_decode_leniently() {
        let r: QueryResponse = serde_json::from_value(json!({
            "results": [
                {"id": "good", "properties": {"병원명": {"title": []}}},
                {"id": null, "created_time": 7, "properties": {}},
                {"id": "b", "properties": []},
                null,
                "junk"
            ]
        }))
        .unwrap();
        assert_eq!(r.results.len(), 5);
        assert_eq!(r.results[0].id, "good");
        assert!(r.results[0].properties.is_some());
        assert_eq!(r.results[1].id, "");
        assert_eq!(r.results[1].created_time, None);
        assert_eq!(r.results[2].id, "b");
        assert!(r.results[2].properties.is_none());
        assert!(r.results[3].properties.is_none());
        assert!(r.results[4].properties.is_none());
    }

    #[test]
    fn query_response_defaults() {
        let r: QueryResponse = serde_json::from_value(json!({"object": "list"})).unwrap();
        assert!(r.results.is_empty());
        assert!(!r.has_more);
    }
}
