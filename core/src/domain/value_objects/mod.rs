//! Forms value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIME types an upload field accepts.
pub const ALLOWED_UPLOAD_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// Returns true when `mime` is in [`ALLOWED_UPLOAD_TYPES`].
pub fn is_allowed_upload(mime: &str) -> bool {
    ALLOWED_UPLOAD_TYPES.contains(&mime)
}

/// The closed palette of question types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Dropdown,
    Checkbox,
    Radio,
    Upload,
    Datetime,
    Password,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Email,
        FieldType::Dropdown,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Upload,
        FieldType::Datetime,
        FieldType::Password,
    ];

    /// Dropdown, checkbox and radio questions carry an option list.
    pub fn takes_options(self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::Checkbox | FieldType::Radio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Upload => "upload",
            FieldType::Datetime => "datetime",
            FieldType::Password => "password",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("unknown field type '{}'", s))
    }
}

/// One question of a form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct Field {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// A required field without options.
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            options: None,
            required: true,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// The option list, empty when the field has none.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options().iter().any(|o| o == option)
    }
}

/// A file chosen in an upload control, held until the submitter uploads it.
#[derive(Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl PickedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

impl fmt::Debug for PickedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickedFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// In-progress value of a control, keyed by field id in a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Selected checkbox options, kept in the field's option order.
    Choices(Vec<String>),
    Flag(bool),
    File(PickedFile),
    /// A picked file that has already been stored, by URL.
    Uploaded(String),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Choices(c) => c.is_empty(),
            FieldValue::Flag(b) => !*b,
            FieldValue::File(_) => false,
            FieldValue::Uploaded(url) => url.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A submitted answer as it travels on the wire and sits in storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    #[default]
    Empty,
    Flag(bool),
    Text(String),
    Choices(Vec<String>),
}

impl Answer {
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Empty => true,
            Answer::Flag(b) => !*b,
            Answer::Text(s) => s.is_empty(),
            Answer::Choices(c) => c.is_empty(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Empty => Ok(()),
            Answer::Flag(true) => f.write_str("yes"),
            Answer::Flag(false) => f.write_str("no"),
            Answer::Text(s) => f.write_str(s),
            Answer::Choices(c) => f.write_str(&c.join(", ")),
        }
    }
}

/// One `{key, value}` pair of a response; `key` is the field label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct ResponseEntry {
    pub key: String,
    /// `null`, a string, an array of strings, or a boolean.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub value: Answer,
}

impl ResponseEntry {
    pub fn new(key: impl Into<String>, value: Answer) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
