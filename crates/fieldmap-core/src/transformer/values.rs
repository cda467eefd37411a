//! Readers for Notion property value shapes
//!
//! Notion returns most properties as nested JSON (rich text blocks, option
//! objects, file objects). These helpers pull out the parts the built-in
//! transformations need and turn anything unexpected into a [`ValueError`].

use super::types::ValueError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

type ValueResult<T> = std::result::Result<T, ValueError>;

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn slug_separator() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"[^a-z0-9]+")
}

fn image_extension() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)\.(png|jpe?g|gif|webp|svg|avif|bmp)(\?.*)?$")
}

pub fn array(value: &Value) -> ValueResult<&Vec<Value>> {
    value.as_array().ok_or_else(|| ValueError::shape("array", value))
}

pub fn object(value: &Value) -> ValueResult<&Map<String, Value>> {
    value.as_object().ok_or_else(|| ValueError::shape("object", value))
}

pub fn string(value: &Value) -> ValueResult<&str> {
    value.as_str().ok_or_else(|| ValueError::shape("string", value))
}

fn str_at<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a str> {
    let (last, parents) = path.split_last()?;
    let mut current = object;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)?.as_str()
}

/// Plain text of one rich text block (`plain_text`, falling back to `text.content`)
pub fn block_text(block: &Value) -> ValueResult<&str> {
    let object = object(block)?;
    str_at(object, &["plain_text"])
        .or_else(|| str_at(object, &["text", "content"]))
        .ok_or_else(|| ValueError::invalid("rich text block has neither plain_text nor text.content"))
}

/// Concatenated plain text of a rich text array
pub fn plain_text(value: &Value) -> ValueResult<String> {
    array(value)?
        .iter()
        .map(block_text)
        .collect::<ValueResult<Vec<_>>>()
        .map(|parts| parts.concat())
}

/// Rich text array rendered as inline HTML
pub fn rich_text_html(value: &Value) -> ValueResult<String> {
    let mut html = String::new();
    for block in array(value)? {
        let mut segment = escape_html(block_text(block)?).replace('\n', "<br>");
        let annotations = block.get("annotations");
        let flag = |name: &str| {
            annotations
                .and_then(|a| a.get(name))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        for (name, tag) in [
            ("code", "code"),
            ("bold", "strong"),
            ("italic", "em"),
            ("strikethrough", "del"),
            ("underline", "u"),
        ] {
            if flag(name) {
                segment = format!("<{tag}>{segment}</{tag}>");
            }
        }
        let href = block
            .get("href")
            .and_then(Value::as_str)
            .or_else(|| object(block).ok().and_then(|o| str_at(o, &["text", "link", "url"])));
        if let Some(href) = href {
            segment = format!("<a href=\"{}\">{}</a>", escape_html(href), segment);
        }
        html.push_str(&segment);
    }
    Ok(html)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Lowercase, ASCII-only, hyphen separated
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let replaced = match slug_separator() {
        Some(re) => re.replace_all(&lower, "-").into_owned(),
        None => lower
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect(),
    };
    replaced
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Name of a select or status option, given as an option object or a bare string
pub fn option_name(value: &Value) -> ValueResult<String> {
    match value {
        Value::String(name) => Ok(name.clone()),
        Value::Object(object) => str_at(object, &["name"])
            .map(str::to_string)
            .ok_or_else(|| ValueError::invalid("option object has no name")),
        other => Err(ValueError::shape("option object", other)),
    }
}

/// Names of every option in a multi select array
pub fn option_names(value: &Value) -> ValueResult<Vec<String>> {
    array(value)?.iter().map(option_name).collect()
}

/// `(start, end)` of a date property, given as an object or a bare string
pub fn date_range(value: &Value) -> ValueResult<(&str, Option<&str>)> {
    match value {
        Value::String(start) => Ok((start.as_str(), None)),
        Value::Object(object) => {
            let start = str_at(object, &["start"])
                .ok_or_else(|| ValueError::invalid("date object has no start"))?;
            Ok((start, str_at(object, &["end"])))
        }
        other => Err(ValueError::shape("date object", other)),
    }
}

/// Hosted or external URL of a file object
pub fn file_url(file: &Value) -> ValueResult<Option<&str>> {
    let object = object(file)?;
    Ok(str_at(object, &["file", "url"])
        .or_else(|| str_at(object, &["external", "url"]))
        .or_else(|| str_at(object, &["url"])))
}

pub fn file_name(file: &Value) -> ValueResult<&str> {
    let object = object(file)?;
    Ok(str_at(object, &["name"]).unwrap_or(""))
}

pub fn looks_like_image(path: &str) -> bool {
    match image_extension() {
        Some(re) => re.is_match(path),
        None => false,
    }
}

/// `name` of a person, falling back to their id
pub fn person_name(person: &Value) -> ValueResult<&str> {
    let object = object(person)?;
    str_at(object, &["name"])
        .or_else(|| str_at(object, &["id"]))
        .ok_or_else(|| ValueError::invalid("person has neither name nor id"))
}

/// `id` of a user or page reference
pub fn reference_id(reference: &Value) -> ValueResult<&str> {
    let object = object(reference)?;
    str_at(object, &["id"]).ok_or_else(|| ValueError::invalid("reference has no id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_falls_back_to_text_content() {
        let value = json!([{"plain_text": "a"}, {"text": {"content": "b"}}]);
        assert_eq!(plain_text(&value).unwrap(), "ab");
    }

    #[test]
    fn test_rich_text_html_applies_annotations() {
        let value = json!([
            {"plain_text": "bold", "annotations": {"bold": true}},
            {"plain_text": " & "},
            {"plain_text": "link", "href": "https://example.com"}
        ]);
        assert_eq!(
            rich_text_html(&value).unwrap(),
            "<strong>bold</strong> &amp; <a href=\"https://example.com\">link</a>"
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello, World! 2025 "), "hello-world-2025");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_option_name_accepts_object_or_string() {
        assert_eq!(option_name(&json!({"name": "Draft"})).unwrap(), "Draft");
        assert_eq!(option_name(&json!("Draft")).unwrap(), "Draft");
        assert!(option_name(&json!(3)).is_err());
    }

    #[test]
    fn test_file_url_prefers_hosted_then_external() {
        let hosted = json!({"name": "a.png", "file": {"url": "https://s3/a.png"}});
        let external = json!({"name": "b.png", "external": {"url": "https://cdn/b.png"}});
        assert_eq!(file_url(&hosted).unwrap(), Some("https://s3/a.png"));
        assert_eq!(file_url(&external).unwrap(), Some("https://cdn/b.png"));
        assert_eq!(file_url(&json!({"name": "c"})).unwrap(), None);
    }

    #[test]
    fn test_looks_like_image() {
        assert!(looks_like_image("https://cdn/photo.JPG?width=300"));
        assert!(!looks_like_image("https://cdn/report.pdf"));
    }
}
