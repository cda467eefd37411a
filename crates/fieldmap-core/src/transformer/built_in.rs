//! Built-in transformations between Notion properties and website fields
//!
//! Every `MEDIUM` and `LOW` pair of the compatibility matrix has at least one
//! entry here. A few `HIGH`/`PERFECT` pairs get optional refinements (for
//! example `richText-to-html` or `url-normalize`).
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::types::{Transformation, ValueError};
use super::values;
use crate::types::{PerformanceImpact as Impact, SourceFieldType as S, TargetFieldType as T};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Value};
use url::Url;

type Applied = std::result::Result<Value, ValueError>;

/// Longest excerpt produced by `richText-to-excerpt`, in characters
pub const EXCERPT_LENGTH: usize = 160;

/// Separator used when a list is flattened into one string
pub const LIST_SEPARATOR: &str = ", ";

/// Concatenate rich text blocks into plain text
pub fn plain_text(value: &Value) -> Applied {
    Ok(Value::String(values::plain_text(value)?))
}

/// Plain text with surrounding whitespace removed
pub fn trimmed_text(value: &Value) -> Applied {
    Ok(json!(values::plain_text(value)?.trim()))
}

/// Render rich text annotations as inline HTML
pub fn rich_text_to_html(value: &Value) -> Applied {
    Ok(Value::String(values::rich_text_html(value)?))
}

/// URL slug from rich text
pub fn rich_text_to_slug(value: &Value) -> Applied {
    Ok(json!(values::slugify(&values::plain_text(value)?)))
}

/// Whitespace-collapsed plain text cut at a word boundary
pub fn rich_text_to_excerpt(value: &Value) -> Applied {
    let plain = values::plain_text(value)?;
    let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_LENGTH {
        return Ok(json!(collapsed));
    }
    let cut: String = collapsed.chars().take(EXCERPT_LENGTH).collect();
    let cut = match cut.rfind(' ') {
        Some(i) if i > 0 => &cut[..i],
        _ => cut.as_str(),
    };
    Ok(json!(format!("{}...", cut.trim_end())))
}

/// Comma separated rich text split into tags
pub fn rich_text_to_tags(value: &Value) -> Applied {
    let plain = values::plain_text(value)?;
    let tags: Vec<&str> = plain
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect();
    Ok(json!(tags))
}

/// Round a number to the nearest integer
pub fn number_to_integer(value: &Value) -> Applied {
    let n = value.as_f64().ok_or_else(|| ValueError::shape("number", value))?;
    let rounded = n.round();
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(ValueError::invalid(format!("{n} does not fit in an integer")));
    }
    Ok(json!(rounded as i64))
}

/// Decimal representation of a number
pub fn number_to_string(value: &Value) -> Applied {
    match value {
        Value::Number(n) => Ok(json!(n.to_string())),
        other => Err(ValueError::shape("number", other)),
    }
}

/// Zero is false, anything else true
pub fn number_to_boolean(value: &Value) -> Applied {
    let n = value.as_f64().ok_or_else(|| ValueError::shape("number", value))?;
    Ok(json!(n != 0.0))
}

/// Name of the selected option
pub fn option_to_string(value: &Value) -> Applied {
    Ok(json!(values::option_name(value)?))
}

/// Selected option as a single tag
pub fn select_to_tags(value: &Value) -> Applied {
    Ok(json!([values::option_name(value)?]))
}

/// Option names as tags
pub fn multi_select_to_tags(value: &Value) -> Applied {
    Ok(json!(values::option_names(value)?))
}

/// Option names joined into one string
pub fn multi_select_to_string(value: &Value) -> Applied {
    Ok(json!(values::option_names(value)?.join(LIST_SEPARATOR)))
}

/// First option name, empty when nothing is selected
pub fn multi_select_to_category(value: &Value) -> Applied {
    let names = values::option_names(value)?;
    Ok(json!(names.into_iter().next().unwrap_or_default()))
}

fn parse_date(text: &str) -> std::result::Result<NaiveDate, ValueError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.date_naive());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| ValueError::invalid(format!("'{text}' is not an ISO 8601 date")))
}

fn normalize_datetime(text: &str) -> std::result::Result<String, ValueError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    let date = parse_date(text)?;
    Ok(format!("{}T00:00:00Z", date.format("%Y-%m-%d")))
}

fn format_range(value: &Value, pattern: &str, separator: &str) -> Applied {
    let (start, end) = values::date_range(value)?;
    let mut formatted = parse_date(start)?.format(pattern).to_string();
    if let Some(end) = end {
        formatted.push_str(separator);
        formatted.push_str(&parse_date(end)?.format(pattern).to_string());
    }
    Ok(json!(formatted))
}

/// Start of a date property as a UTC timestamp
pub fn date_to_datetime(value: &Value) -> Applied {
    let (start, _) = values::date_range(value)?;
    Ok(json!(normalize_datetime(start)?))
}

/// ISO date, or an ISO interval for ranges
pub fn date_to_string(value: &Value) -> Applied {
    format_range(value, "%Y-%m-%d", "/")
}

/// `DD/MM/YYYY`, ranges joined with a dash
pub fn date_to_text(value: &Value) -> Applied {
    format_range(value, "%d/%m/%Y", " - ")
}

fn checkbox(value: &Value) -> std::result::Result<bool, ValueError> {
    value.as_bool().ok_or_else(|| ValueError::shape("boolean", value))
}

/// `"true"` or `"false"`
pub fn checkbox_to_string(value: &Value) -> Applied {
    Ok(json!(checkbox(value)?.to_string()))
}

/// `"Yes"` or `"No"`
pub fn checkbox_to_text(value: &Value) -> Applied {
    Ok(json!(if checkbox(value)? { "Yes" } else { "No" }))
}

/// Add a missing scheme and validate the URL
pub fn normalize_url(value: &Value) -> Applied {
    let raw = values::string(value)?.trim();
    if raw.is_empty() {
        return Ok(json!(""));
    }
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate)
        .map_err(|e| ValueError::invalid(format!("'{raw}' is not a valid URL: {e}")))?;
    Ok(json!(url.to_string()))
}

/// Files as gallery items `{url, name, type}`
pub fn files_to_gallery(value: &Value) -> Applied {
    let mut items = Vec::new();
    for file in values::array(value)? {
        let name = values::file_name(file)?;
        let url = values::file_url(file)?
            .ok_or_else(|| ValueError::invalid(format!("file '{name}' has no url")))?;
        let kind = file.get("type").and_then(Value::as_str).unwrap_or("file");
        items.push(json!({"url": url, "name": name, "type": kind}));
    }
    Ok(Value::Array(items))
}

/// URL of the first file that looks like an image, empty when none does
pub fn files_to_image(value: &Value) -> Applied {
    for file in values::array(value)? {
        if let Some(url) = values::file_url(file)? {
            if values::looks_like_image(url) || values::looks_like_image(values::file_name(file)?) {
                return Ok(json!(url));
            }
        }
    }
    Ok(json!(""))
}

/// URL of the first file, empty when there is none
pub fn files_to_url(value: &Value) -> Applied {
    for file in values::array(value)? {
        if let Some(url) = values::file_url(file)? {
            return Ok(json!(url));
        }
    }
    Ok(json!(""))
}

/// File names joined into one string
pub fn files_to_string(value: &Value) -> Applied {
    let names = values::array(value)?
        .iter()
        .map(values::file_name)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(json!(names.join(LIST_SEPARATOR)))
}

/// `name (url)` per file
pub fn files_to_text(value: &Value) -> Applied {
    let mut parts = Vec::new();
    for file in values::array(value)? {
        let name = values::file_name(file)?;
        parts.push(match values::file_url(file)? {
            Some(url) => format!("{name} ({url})"),
            None => name.to_string(),
        });
    }
    Ok(json!(parts.join(LIST_SEPARATOR)))
}

/// Ids of referenced users or pages
pub fn reference_ids(value: &Value) -> Applied {
    let ids = values::array(value)?
        .iter()
        .map(values::reference_id)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(json!(ids))
}

/// People names joined into one string
pub fn people_to_string(value: &Value) -> Applied {
    let names = values::array(value)?
        .iter()
        .map(values::person_name)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(json!(names.join(LIST_SEPARATOR)))
}

/// Calendar date of a timestamp
pub fn timestamp_to_date(value: &Value) -> Applied {
    let date = parse_date(values::string(value)?)?;
    Ok(json!(date.format("%Y-%m-%d").to_string()))
}

/// Timestamp normalized to UTC with second precision
pub fn timestamp_to_string(value: &Value) -> Applied {
    Ok(json!(normalize_datetime(values::string(value)?)?))
}

fn rich_text_sample() -> Value {
    json!([{"plain_text": "Hello "}, {"plain_text": "World"}])
}

fn files_sample() -> Value {
    json!([
        {"name": "brief.pdf", "type": "file", "file": {"url": "https://files.example.com/brief.pdf"}},
        {"name": "cover.png", "type": "external", "external": {"url": "https://cdn.example.com/cover.png"}}
    ])
}

fn people_sample() -> Value {
    json!([{"object": "user", "id": "u-1", "name": "Ada Lovelace"}, {"object": "user", "id": "u-2", "name": "Alan Turing"}])
}

/// The built-in catalog, in declaration order
pub fn catalog() -> Vec<Transformation> {
    vec![
        Transformation::builder("title-to-plain", S::Title, T::String, plain_text)
            .name("Title to plain text")
            .description("Concatenate the title's text blocks, dropping formatting")
            .example(rich_text_sample(), json!("Hello World"))
            .build(),
        Transformation::builder("title-to-html", S::Title, T::Html, rich_text_to_html)
            .name("Title to HTML")
            .description("Render the title's annotations as inline HTML")
            .performance_impact(Impact::Medium)
            .example(
                json!([{"plain_text": "Launch", "annotations": {"bold": true}}]),
                json!("<strong>Launch</strong>"),
            )
            .build(),
        Transformation::builder("title-to-slug", S::Title, T::Slug, rich_text_to_slug)
            .name("Title to slug")
            .description("Lowercase, hyphen separated URL slug")
            .example(json!([{"plain_text": "Case Study: Acme 2025"}]), json!("case-study-acme-2025"))
            .build(),
        Transformation::builder("richText-to-plain", S::RichText, T::String, plain_text)
            .name("Rich text to plain text")
            .description("Concatenate text blocks, discarding formatting")
            .example(rich_text_sample(), json!("Hello World"))
            .build(),
        Transformation::builder("richText-to-excerpt", S::RichText, T::String, rich_text_to_excerpt)
            .name("Rich text to excerpt")
            .description("Plain text collapsed and cut at a word boundary")
            .example(json!([{"plain_text": "Short   summary\n"}]), json!("Short summary"))
            .build(),
        Transformation::builder("richText-to-text", S::RichText, T::Text, trimmed_text)
            .name("Rich text to text")
            .description("Plain text with surrounding whitespace removed")
            .example(json!([{"plain_text": " Line one\nLine two "}]), json!("Line one\nLine two"))
            .build(),
        Transformation::builder("richText-to-html", S::RichText, T::Html, rich_text_to_html)
            .name("Rich text to HTML")
            .description("Annotations become <strong>, <em>, <del>, <u>, <code> and links")
            .performance_impact(Impact::Medium)
            .example(
                json!([{"plain_text": "Read "}, {"plain_text": "more", "annotations": {"italic": true}, "href": "https://example.com"}]),
                json!("Read <a href=\"https://example.com\"><em>more</em></a>"),
            )
            .build(),
        Transformation::builder("richText-to-tags", S::RichText, T::Tags, rich_text_to_tags)
            .name("Rich text to tags")
            .description("Split comma separated text into tags")
            .example(json!([{"plain_text": "design, rust ,"}]), json!(["design", "rust"]))
            .build(),
        Transformation::builder("richText-to-slug", S::RichText, T::Slug, rich_text_to_slug)
            .name("Rich text to slug")
            .description("Lowercase, hyphen separated URL slug")
            .example(rich_text_sample(), json!("hello-world"))
            .build(),
        Transformation::builder("number-to-integer", S::Number, T::Integer, number_to_integer)
            .name("Number to integer")
            .description("Round to the nearest integer")
            .example(json!(3.6), json!(4))
            .build(),
        Transformation::builder("number-to-string", S::Number, T::String, number_to_string)
            .name("Number to string")
            .example(json!(42), json!("42"))
            .build(),
        Transformation::builder("number-to-text", S::Number, T::Text, number_to_string)
            .name("Number to text")
            .example(json!(1.5), json!("1.5"))
            .build(),
        Transformation::builder("number-to-boolean", S::Number, T::Boolean, number_to_boolean)
            .name("Number to boolean")
            .description("Zero is false, anything else true")
            .example(json!(0), json!(false))
            .build(),
        Transformation::builder("select-to-string", S::Select, T::String, option_to_string)
            .name("Select to string")
            .description("Name of the selected option")
            .example(json!({"name": "Published", "color": "green"}), json!("Published"))
            .build(),
        Transformation::builder("select-to-tags", S::Select, T::Tags, select_to_tags)
            .name("Select to tags")
            .description("Selected option as a single tag")
            .example(json!({"name": "Design"}), json!(["Design"]))
            .build(),
        Transformation::builder("multiSelect-to-tags", S::MultiSelect, T::Tags, multi_select_to_tags)
            .name("Multi-select to tags")
            .description("Option names as tags")
            .example(json!([{"name": "rust"}, {"name": "cms"}]), json!(["rust", "cms"]))
            .build(),
        Transformation::builder("multiSelect-to-string", S::MultiSelect, T::String, multi_select_to_string)
            .name("Multi-select to string")
            .description("Option names joined with a comma")
            .example(json!([{"name": "rust"}, {"name": "cms"}]), json!("rust, cms"))
            .build(),
        Transformation::builder("multiSelect-to-text", S::MultiSelect, T::Text, multi_select_to_string)
            .name("Multi-select to text")
            .description("Option names joined with a comma")
            .example(json!([{"name": "rust"}]), json!("rust"))
            .build(),
        Transformation::builder("multiSelect-to-category", S::MultiSelect, T::Category, multi_select_to_category)
            .name("Multi-select to category")
            .description("First option only, the rest are dropped")
            .example(json!([{"name": "News"}, {"name": "Blog"}]), json!("News"))
            .build(),
        Transformation::builder("status-to-string", S::Status, T::String, option_to_string)
            .name("Status to string")
            .example(json!({"name": "In progress"}), json!("In progress"))
            .build(),
        Transformation::builder("status-to-text", S::Status, T::Text, option_to_string)
            .name("Status to text")
            .example(json!({"name": "Done"}), json!("Done"))
            .build(),
        Transformation::builder("date-to-datetime", S::Date, T::Datetime, date_to_datetime)
            .name("Date to datetime")
            .description("Start of the date as a UTC timestamp")
            .example(json!({"start": "2025-03-14", "end": null}), json!("2025-03-14T00:00:00Z"))
            .build(),
        Transformation::builder("date-to-string", S::Date, T::String, date_to_string)
            .name("Date to string")
            .description("ISO date, ranges as an ISO interval")
            .example(json!({"start": "2025-03-14", "end": "2025-03-20"}), json!("2025-03-14/2025-03-20"))
            .build(),
        Transformation::builder("date-to-text", S::Date, T::Text, date_to_text)
            .name("Date to text")
            .description("Formatted as DD/MM/YYYY")
            .example(json!({"start": "2025-03-14"}), json!("14/03/2025"))
            .build(),
        Transformation::builder("checkbox-to-string", S::Checkbox, T::String, checkbox_to_string)
            .name("Checkbox to string")
            .example(json!(true), json!("true"))
            .build(),
        Transformation::builder("checkbox-to-text", S::Checkbox, T::Text, checkbox_to_text)
            .name("Checkbox to text")
            .description("Yes or No")
            .example(json!(false), json!("No"))
            .build(),
        Transformation::builder("url-normalize", S::Url, T::Url, normalize_url)
            .name("Normalize URL")
            .description("Add a missing https:// scheme and validate")
            .example(json!("example.com/about"), json!("https://example.com/about"))
            .build(),
        Transformation::builder("url-to-image", S::Url, T::Image, normalize_url)
            .name("URL to image")
            .description("Use the link as the image source")
            .example(json!("cdn.example.com/hero.png"), json!("https://cdn.example.com/hero.png"))
            .build(),
        Transformation::builder("files-to-gallery", S::Files, T::Gallery, files_to_gallery)
            .name("Files to gallery")
            .description("Every file as a gallery item")
            .performance_impact(Impact::Medium)
            .example(
                json!([{"name": "cover.png", "type": "file", "file": {"url": "https://files.example.com/cover.png"}}]),
                json!([{"url": "https://files.example.com/cover.png", "name": "cover.png", "type": "file"}]),
            )
            .build(),
        Transformation::builder("files-to-image", S::Files, T::Image, files_to_image)
            .name("Files to image")
            .description("First file with an image extension")
            .example(files_sample(), json!("https://cdn.example.com/cover.png"))
            .build(),
        Transformation::builder("files-to-url", S::Files, T::Url, files_to_url)
            .name("Files to URL")
            .description("URL of the first file")
            .example(files_sample(), json!("https://files.example.com/brief.pdf"))
            .build(),
        Transformation::builder("files-to-string", S::Files, T::String, files_to_string)
            .name("Files to string")
            .description("File names joined with a comma")
            .example(files_sample(), json!("brief.pdf, cover.png"))
            .build(),
        Transformation::builder("files-to-text", S::Files, T::Text, files_to_text)
            .name("Files to text")
            .description("name (url) for every file")
            .example(
                json!([{"name": "brief.pdf", "file": {"url": "https://files.example.com/brief.pdf"}}]),
                json!("brief.pdf (https://files.example.com/brief.pdf)"),
            )
            .build(),
        Transformation::builder("people-to-reference", S::People, T::Reference, reference_ids)
            .name("People to reference")
            .description("User ids")
            .example(people_sample(), json!(["u-1", "u-2"]))
            .build(),
        Transformation::builder("people-to-string", S::People, T::String, people_to_string)
            .name("People to string")
            .example(people_sample(), json!("Ada Lovelace, Alan Turing"))
            .build(),
        Transformation::builder("people-to-text", S::People, T::Text, people_to_string)
            .name("People to text")
            .example(people_sample(), json!("Ada Lovelace, Alan Turing"))
            .build(),
        Transformation::builder("relation-to-tags", S::Relation, T::Tags, reference_ids)
            .name("Relation to tags")
            .description("Related page ids as tags")
            .example(json!([{"id": "page-1"}]), json!(["page-1"]))
            .build(),
        Transformation::builder("createdTime-to-date", S::CreatedTime, T::Date, timestamp_to_date)
            .name("Created time to date")
            .example(json!("2025-03-14T09:30:00.000Z"), json!("2025-03-14"))
            .build(),
        Transformation::builder("createdTime-to-string", S::CreatedTime, T::String, timestamp_to_string)
            .name("Created time to string")
            .example(json!("2025-03-14T09:30:00.000Z"), json!("2025-03-14T09:30:00Z"))
            .build(),
        Transformation::builder("lastEditedTime-to-date", S::LastEditedTime, T::Date, timestamp_to_date)
            .name("Last edited time to date")
            .example(json!("2025-03-14T23:10:00.000+02:00"), json!("2025-03-14"))
            .build(),
        Transformation::builder("lastEditedTime-to-string", S::LastEditedTime, T::String, timestamp_to_string)
            .name("Last edited time to string")
            .example(json!("2025-03-14T23:10:00.000+02:00"), json!("2025-03-14T21:10:00Z"))
            .build(),
    ]
}
