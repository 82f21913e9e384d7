//! Form and response aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::value_objects::{Answer, Field, FieldType, ResponseEntry};

/// Structural problems in a form definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Form title is required")]
    EmptyTitle,

    #[error("A form needs at least one field")]
    NoFields,

    #[error("Field label is required")]
    EmptyLabel,

    #[error("Field with the label \"{0}\" already exists")]
    DuplicateLabel(String),

    #[error("Field id \"{0}\" is used twice")]
    DuplicateId(String),

    #[error("Field \"{0}\" needs at least one option")]
    MissingOptions(String),

    #[error("Field \"{0}\" does not take options")]
    UnexpectedOptions(String),

    #[error("Field \"{0}\" has a blank option")]
    BlankOption(String),

    #[error("Field \"{label}\" lists option \"{option}\" twice")]
    DuplicateOption { label: String, option: String },
}

/// Checks a single field against the option invariant.
pub fn check_field(field: &Field) -> Result<(), SchemaError> {
    if field.label.trim().is_empty() {
        return Err(SchemaError::EmptyLabel);
    }
    match (&field.options, field.field_type.takes_options()) {
        (None, true) => Err(SchemaError::MissingOptions(field.label.clone())),
        (Some(options), true) if options.is_empty() => {
            Err(SchemaError::MissingOptions(field.label.clone()))
        }
        (Some(_), false) => Err(SchemaError::UnexpectedOptions(field.label.clone())),
        (Some(options), true) => {
            let mut seen = HashSet::new();
            for option in options {
                if option.trim().is_empty() {
                    return Err(SchemaError::BlankOption(field.label.clone()));
                }
                if !seen.insert(option.as_str()) {
                    return Err(SchemaError::DuplicateOption {
                        label: field.label.clone(),
                        option: option.clone(),
                    });
                }
            }
            Ok(())
        }
        (None, false) => Ok(()),
    }
}

/// Checks every field plus label and id uniqueness.
pub fn check_fields(fields: &[Field]) -> Result<(), SchemaError> {
    if fields.is_empty() {
        return Err(SchemaError::NoFields);
    }
    let mut labels = HashSet::new();
    let mut ids = HashSet::new();
    for field in fields {
        check_field(field)?;
        if !labels.insert(field.label.as_str()) {
            return Err(SchemaError::DuplicateLabel(field.label.clone()));
        }
        if !ids.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateId(field.id.clone()));
        }
    }
    Ok(())
}

/// Payload that creates a form: `{creatorId, title, fields}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewForm {
    pub creator_id: String,
    pub title: String,
    pub fields: Vec<Field>,
}

impl NewForm {
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.title.trim().is_empty() {
            return Err(SchemaError::EmptyTitle);
        }
        check_fields(&self.fields)
    }
}

/// A published form. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(rename = "_id")]
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub fields: Vec<Field>,
    pub created_at: DateTime<Utc>,
}

impl Form {
    /// Validates the payload and stamps a fresh id.
    pub fn create(new: NewForm) -> Result<Self, SchemaError> {
        new.check()?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            creator_id: new.creator_id,
            title: new.title.trim().to_string(),
            fields: new.fields,
            created_at: Utc::now(),
        })
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_label(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label == label)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// Checks submitted entries against this form's fields.
    pub fn check_entries(&self, entries: &[ResponseEntry]) -> Result<(), EntryError> {
        let mut seen = HashSet::new();
        for entry in entries {
            let field = self
                .field_by_label(&entry.key)
                .ok_or_else(|| EntryError::UnknownKey(entry.key.clone()))?;
            if !seen.insert(entry.key.as_str()) {
                return Err(EntryError::DuplicateKey(entry.key.clone()));
            }
            check_answer(field, &entry.value)?;
        }
        Ok(())
    }
}

fn check_answer(field: &Field, answer: &Answer) -> Result<(), EntryError> {
    let mismatch = || EntryError::MismatchedValue(field.label.clone());
    let unknown = |option: &str| EntryError::UnknownOption {
        key: field.label.clone(),
        option: option.to_string(),
    };
    match (field.field_type, answer) {
        (_, Answer::Empty) => Ok(()),
        (FieldType::Checkbox, Answer::Choices(choices)) if field.options.is_some() => {
            match choices.iter().find(|c| !field.has_option(c)) {
                Some(bad) => Err(unknown(bad.as_str())),
                None => Ok(()),
            }
        }
        (FieldType::Checkbox, Answer::Flag(_)) if field.options.is_none() => Ok(()),
        (FieldType::Checkbox, _) => Err(mismatch()),
        (FieldType::Dropdown | FieldType::Radio, Answer::Text(choice)) => {
            if field.has_option(choice) {
                Ok(())
            } else {
                Err(unknown(choice.as_str()))
            }
        }
        (_, Answer::Text(_)) if !field.field_type.takes_options() => Ok(()),
        _ => Err(mismatch()),
    }
}

/// Problems with a submitted response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Unknown field \"{0}\"")]
    UnknownKey(String),

    #[error("Field \"{0}\" answered twice")]
    DuplicateKey(String),

    #[error("\"{option}\" is not an option of \"{key}\"")]
    UnknownOption { key: String, option: String },

    #[error("Answer for \"{0}\" has the wrong shape")]
    MismatchedValue(String),
}

/// A stored submission. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub form_id: String,
    pub creator_id: String,
    pub responses: Vec<ResponseEntry>,
    pub created_at: DateTime<Utc>,
}

impl FormResponse {
    pub fn create(form: &Form, responses: Vec<ResponseEntry>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            form_id: form.id.clone(),
            creator_id: form.creator_id.clone(),
            responses,
            created_at: Utc::now(),
        }
    }
}
