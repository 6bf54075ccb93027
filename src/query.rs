use serde_json::{json, Value};

use crate::model::ListOptions;
use crate::normalize::{LEGACY_TYPE_FIELD, TYPE_FIELD, VISIBILITY_FIELD};

pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Floor on the upstream page size so display ordering can be computed
/// locally before trimming.
pub const MIN_FETCH_SIZE: usize = 50;

fn default_sorts() -> Value {
    json!([{ "timestamp": "created_time", "direction": "descending" }])
}

/// Visible entries, optionally restricted to one category.
pub fn build_query(options: &ListOptions) -> Value {
    let mut clauses = vec![json!({
        "property": VISIBILITY_FIELD,
        "checkbox": { "equals": true },
    })];

    if let Some(category) = options.category_filter() {
        clauses.push(json!({
            "or": [
                { "property": TYPE_FIELD, "multi_select": { "contains": category } },
                { "property": LEGACY_TYPE_FIELD, "select": { "equals": category } },
            ]
        }));
    }

    json!({
        "filter": { "and": clauses },
        "sorts": default_sorts(),
        "page_size": options.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(MIN_FETCH_SIZE),
    })
}

/// No filter at all; used when the visibility-filtered query comes back empty.
pub fn build_unfiltered_query(page_size: Option<usize>) -> Value {
    let mut body = json!({ "sorts": default_sorts() });
    if let Some(size) = page_size {
        body["page_size"] = json!(size);
    }
    body
}
