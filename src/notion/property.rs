use serde_json::Value;
use tracing::debug;

/// Type discriminators understood here, in the order they are tried when a
/// property value carries no explicit `type` tag.
const KNOWN_KINDS: &[&str] = &[
    "title",
    "rich_text",
    "select",
    "multi_select",
    "date",
    "files",
    "checkbox",
    "created_time",
];

/// A property value, branched on its type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Property<'a> {
    Title(Vec<&'a str>),
    RichText(Vec<&'a str>),
    Select(Option<&'a str>),
    MultiSelect(Vec<&'a str>),
    Date(Option<&'a str>),
    Files(&'a [Value]),
    Checkbox(bool),
    CreatedTime(Option<&'a str>),
    Unsupported,
}

impl<'a> Property<'a> {
    pub fn parse(value: &'a Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .or_else(|| KNOWN_KINDS.iter().copied().find(|k| value.get(*k).is_some()));
        let Some(kind) = kind else {
            return Property::Unsupported;
        };
        let body = value.get(kind);

        match kind {
            "title" => Property::Title(text_fragments(body)),
            "rich_text" => Property::RichText(text_fragments(body)),
            "select" => Property::Select(body.and_then(|s| s.get("name")).and_then(Value::as_str)),
            "multi_select" => Property::MultiSelect(
                body.and_then(Value::as_array)
                    .map(|opts| {
                        opts.iter()
                            .filter_map(|o| o.get("name").and_then(Value::as_str))
                            .filter(|n| !n.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            "date" => Property::Date(body.and_then(|d| d.get("start")).and_then(Value::as_str)),
            "files" => Property::Files(body.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])),
            "checkbox" => Property::Checkbox(body.and_then(Value::as_bool).unwrap_or(false)),
            "created_time" => Property::CreatedTime(body.and_then(Value::as_str)),
            _ => Property::Unsupported,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Property::Title(_))
    }

    /// Text fragments of a title property only.
    pub fn title(&self) -> Option<&[&'a str]> {
        match self {
            Property::Title(t) => Some(t),
            _ => None,
        }
    }

    pub fn rich_text(&self) -> Option<&[&'a str]> {
        match self {
            Property::RichText(t) => Some(t),
            _ => None,
        }
    }

    pub fn select(&self) -> Option<&'a str> {
        match self {
            Property::Select(s) => *s,
            _ => None,
        }
    }

    pub fn multi_select(&self) -> Option<&[&'a str]> {
        match self {
            Property::MultiSelect(v) => Some(v),
            _ => None,
        }
    }

    pub fn date_start(&self) -> Option<&'a str> {
        match self {
            Property::Date(d) => *d,
            _ => None,
        }
    }

    pub fn files(&self) -> Option<&'a [Value]> {
        match self {
            Property::Files(f) => Some(f),
            _ => None,
        }
    }

    pub fn created_time(&self) -> Option<&'a str> {
        match self {
            Property::CreatedTime(t) => *t,
            _ => None,
        }
    }
}

fn text_fragments(body: Option<&Value>) -> Vec<&str> {
    body.and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

fn hosted_file(f: &Value) -> Option<&str> {
    f.get("file")?.get("url")?.as_str()
}

fn external_file(f: &Value) -> Option<&str> {
    f.get("external")?.get("url")?.as_str()
}

fn name_field(f: &Value) -> Option<&str> {
    f.get("name")?.as_str()
}

fn bare_string(f: &Value) -> Option<&str> {
    f.as_str()
}

/// Ways a file entry may carry its URL, tried in order.
const FILE_URL_SHAPES: &[fn(&Value) -> Option<&str>] =
    &[hosted_file, external_file, name_field, bare_string];

/// URL of a single file entry, if any shape yields a usable one.
pub fn file_url(entry: &Value) -> Option<&str> {
    let mut rejected = None;
    for shape in FILE_URL_SHAPES {
        match shape(entry) {
            Some(url) if is_usable_url(url) => return Some(url),
            Some(url) => rejected = Some(url),
            None => {}
        }
    }
    if let Some(url) = rejected {
        debug!("Dropping malformed file url: {}", url);
    }
    None
}

/// All usable URLs of a files property, in order.
pub fn extract_urls(files: &[Value]) -> Vec<String> {
    files
        .iter()
        .filter_map(file_url)
        .map(str::to_string)
        .collect()
}

pub fn extract_first_url(files: &[Value]) -> Option<String> {
    files.iter().find_map(file_url).map(str::to_string)
}

/// Only absolute http(s) URLs with a host are usable.
pub fn is_usable_url(raw: &str) -> bool {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return false;
    }
    url::Url::parse(raw)
        .map(|u| u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const URL: &str = "https://prod-files-secure.s3.us-west-2.amazonaws.com/a/b/sign.jpg?X-Amz-Expires=3600";

    #[test]
    fn every_file_shape_yields_same_url() {
        let shapes = [
            json!({"type": "file", "name": "sign.jpg", "file": {"url": URL}}),
            json!({"type": "external", "name": "sign", "external": {"url": URL}}),
            json!({"name": URL}),
            json!(URL),
        ];
        for shape in &shapes {
            assert_eq!(extract_urls(std::slice::from_ref(shape)), vec![URL.to_string()]);
        }
    }

    #[test]
    fn later_shape_used_when_earlier_is_unusable() {
        let entry = json!({"name": "photo.jpg", "external": {"url": URL}});
        assert_eq!(file_url(&entry), Some(URL));
    }

    #[test]
    fn non_http_strings_are_excluded() {
        let files = vec![
            json!("ftp://example.com/a.jpg"),
            json!({"name": "photo.jpg"}),
            json!({"file": {"url": "/relative/a.jpg"}}),
            json!("HTTPS://example.com/upper.jpg"),
            json!("https://"),
            json!(null),
            json!({"file": {"url": null}}),
            json!("http://example.com/ok.png"),
        ];
        assert_eq!(extract_urls(&files), vec!["http://example.com/ok.png".to_string()]);
    }

    #[test]
    fn first_url_skips_unusable_entries() {
        let files = vec![json!({"name": "x"}), json!(URL), json!("https://example.com/2.jpg")];
        assert_eq!(extract_first_url(&files).as_deref(), Some(URL));
        assert_eq!(extract_first_url(&[]), None);
    }

    #[test]
    fn parse_uses_type_tag_when_present() {
        let v = json!({"id": "x", "type": "rich_text", "rich_text": [{"plain_text": "a"}, {"plain_text": "b"}]});
        assert_eq!(Property::parse(&v), Property::RichText(vec!["a", "b"]));
    }

    #[test]
    fn parse_infers_kind_without_tag() {
        let v = json!({"title": [{"plain_text": "Clinic A"}]});
        let p = Property::parse(&v);
        assert!(p.is_title());
        assert_eq!(p.title(), Some(&["Clinic A"][..]));
        assert_eq!(p.rich_text(), None);
    }

    #[test]
    fn parse_tolerates_missing_bodies() {
        assert_eq!(Property::parse(&json!({"type": "select", "select": null})).select(), None);
        assert_eq!(Property::parse(&json!({"type": "date", "date": null})).date_start(), None);
        assert_eq!(Property::parse(&json!({"type": "files"})).files(), Some(&[][..]));
        assert_eq!(Property::parse(&json!({"type": "formula"})), Property::Unsupported);
        assert_eq!(Property::parse(&json!(42)), Property::Unsupported);
    }

    #[test]
    fn multi_select_drops_blank_names() {
        let v = json!({"multi_select": [{"name": "LED채널"}, {"name": ""}, {"id": "x"}, {"name": "네온"}]});
        assert_eq!(Property::parse(&v).multi_select(), Some(&["LED채널", "네온"][..]));
    }

    #[test]
    fn checkbox_and_created_time() {
        assert_eq!(Property::parse(&json!({"checkbox": true})), Property::Checkbox(true));
        assert_eq!(
            Property::parse(&json!({"type": "created_time", "created_time": "2024-01-01T00:00:00.000Z"}))
                .created_time(),
            Some("2024-01-01T00:00:00.000Z")
        );
    }
}
