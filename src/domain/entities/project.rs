use std::borrow::Cow;

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::AppError;

// ───── Constants ──────────────────────────────────────────────────────
const MIN_YEAR: u16 = 1900;
const MAX_YEAR: u16 = 2100;

// ───── Database Models ───────────────────────────────────────────────

/// One row of the `porto` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: Vec<String>,
    pub link: Option<String>,
    pub github: Option<String>,
    pub year: String,
    pub created_at: DateTime<Utc>,
}

/// Normalized fields for a new row. Built from either request shape and
/// validated before anything is written.
#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct ProjectInsert {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(custom(function = "validate_description"))]
    pub description: String,

    pub tags: Vec<String>,

    pub image: Vec<String>,

    #[validate(custom(function = "validate_url"))]
    pub link: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub github: Option<String>,

    #[validate(custom(function = "validate_year"))]
    pub year: String,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectCreatedResponse {
    pub success: bool,
    pub data: ProjectRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectUploadedResponse {
    pub success: bool,
    pub project: ProjectRecord,
}

// ───── Input Requests ───────────────────────────────────────────────

/// A field clients send either as one string or as an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    List(Vec<String>),
    Text(String),
}

impl StringOrList {
    /// Tags: a plain string is read like the multipart `tags` field.
    pub fn into_tags(self) -> Result<Vec<String>, AppError> {
        match self {
            StringOrList::List(items) => Ok(normalize_list(items)),
            StringOrList::Text(text) => parse_tags_field(&text),
        }
    }

    /// Images: a plain string is a single path.
    pub fn into_paths(self) -> Vec<String> {
        match self {
            StringOrList::List(items) => normalize_list(items),
            StringOrList::Text(text) => normalize_list(vec![text]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Text(String),
    Number(i64),
}

impl YearInput {
    pub fn into_text(self) -> String {
        match self {
            YearInput::Text(text) => text.trim().to_string(),
            YearInput::Number(n) => n.to_string(),
        }
    }
}

/// JSON body of `POST /api/porto`. Every field is optional at the wire level
/// so missing required fields surface as validation errors naming the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<StringOrList>,
    pub image: Option<StringOrList>,
    pub link: Option<String>,
    pub github: Option<String>,
    pub year: Option<YearInput>,
}

impl TryFrom<NewProjectRequest> for ProjectInsert {
    type Error = AppError;

    fn try_from(request: NewProjectRequest) -> Result<Self, Self::Error> {
        let tags = match request.tags {
            Some(tags) => tags.into_tags()?,
            None => Vec::new(),
        };

        Ok(ProjectInsert {
            title: normalize_text(request.title),
            description: normalize_text(request.description),
            tags,
            image: request.image.map(StringOrList::into_paths).unwrap_or_default(),
            link: normalize_optional(request.link),
            github: normalize_optional(request.github),
            year: request.year.map(YearInput::into_text).unwrap_or_default(),
        })
    }
}

/// Multipart body of `POST /api/porto`: text fields plus up to five `images` parts.
#[derive(Debug, MultipartForm)]
pub struct ProjectUpload {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    /// JSON-encoded array, or a comma-delimited string.
    pub tags: Option<Text<String>>,
    pub year: Option<Text<String>>,
    pub link: Option<Text<String>>,
    pub github: Option<Text<String>>,
    #[multipart(rename = "images")]
    pub images: Vec<TempFile>,
}

impl ProjectUpload {
    /// Text fields as an insert with no images yet.
    pub fn to_insert(&self) -> Result<ProjectInsert, AppError> {
        let tags = match &self.tags {
            Some(raw) => parse_tags_field(&raw.0)?,
            None => Vec::new(),
        };

        Ok(ProjectInsert {
            title: normalize_text(text_value(&self.title)),
            description: normalize_text(text_value(&self.description)),
            tags,
            image: Vec::new(),
            link: normalize_optional(text_value(&self.link)),
            github: normalize_optional(text_value(&self.github)),
            year: normalize_text(text_value(&self.year)),
        })
    }
}

/// One binary part of a multipart submission, read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File type detected from magic bytes; the declared content type is not trusted.
    pub fn sniffed_type(&self) -> Option<infer::Type> {
        infer::get(&self.bytes)
    }

    pub fn display_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or("unnamed file")
    }

    pub fn check(&self, max_bytes: usize) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::validation(
                "images",
                format!("{} is empty", self.display_name()),
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::validation(
                "images",
                format!("{} exceeds the maximum size of {} bytes", self.display_name(), max_bytes),
            ));
        }
        match self.sniffed_type() {
            Some(kind) if kind.mime_type().starts_with("image/") => Ok(()),
            _ => Err(AppError::validation(
                "images",
                format!("{} is not a supported image", self.display_name()),
            )),
        }
    }
}

// ───── Normalization Helpers ────────────────────────────────────────

fn text_value(field: &Option<Text<String>>) -> Option<String> {
    field.as_ref().map(|text| text.0.clone())
}

fn normalize_text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn split_delimited(text: &str) -> Vec<String> {
    normalize_list(text.split(',').map(str::to_string).collect())
}

/// Parses the multipart `tags` field.
pub fn parse_tags_field(raw: &str) -> Result<Vec<String>, AppError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let tags: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|_| AppError::validation("tags", "Tags must be a JSON array of strings"))?;
        Ok(normalize_list(tags))
    } else {
        Ok(split_delimited(trimmed))
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(new_validation_error("title_required", "Title is required"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(new_validation_error("description_required", "Description is required"));
    }
    Ok(())
}

pub fn validate_year(year: &str) -> Result<(), ValidationError> {
    if year.is_empty() {
        return Err(new_validation_error("year_required", "Year is required"));
    }
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(new_validation_error("year_format", "Year must be a four-digit number"));
    }
    match year.parse::<u16>() {
        Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => Ok(()),
        _ => Err(new_validation_error("year_range", "Year must be between 1900 and 2100")),
    }
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}
