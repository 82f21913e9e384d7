//! Form rendering and answer capture
//!
//! [`render`] turns a form into one control description per field. A
//! [`FormSession`] holds the answers typed into those controls; every edit
//! stores the new value and clears the error previously shown for that field.

use std::collections::HashMap;
use thiserror::Error;

use crate::domain::aggregates::Form;
use crate::domain::value_objects::{
    is_allowed_upload, Field, FieldType, FieldValue, PickedFile, ALLOWED_UPLOAD_TYPES,
};
use crate::validator::{validate, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Email,
    Password,
}

/// The interactive element a field is rendered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Input { kind: InputKind, placeholder: String },
    /// Select-one; `placeholder` is the always-present empty choice.
    Select { placeholder: String, options: Vec<String> },
    CheckboxGroup { options: Vec<String> },
    /// Single boolean toggle for a checkbox field without options.
    Toggle,
    /// Mutually exclusive group; `name` scopes the group to one field.
    RadioGroup { name: String, options: Vec<String> },
    FilePicker { accept: &'static [&'static str] },
    DateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub field_id: String,
    pub label: String,
    pub required: bool,
    pub widget: Widget,
}

/// One control per field, in form order.
pub fn render(form: &Form) -> Vec<Control> {
    form.fields.iter().map(control_for).collect()
}

fn control_for(field: &Field) -> Control {
    let input = |kind| Widget::Input {
        kind,
        placeholder: format!("Enter {}", field.label),
    };
    let widget = match field.field_type {
        FieldType::Text => input(InputKind::Text),
        FieldType::Number => input(InputKind::Number),
        FieldType::Email => input(InputKind::Email),
        FieldType::Password => input(InputKind::Password),
        FieldType::Dropdown => Widget::Select {
            placeholder: format!("Select {}", field.label),
            options: field.options().to_vec(),
        },
        FieldType::Checkbox => match &field.options {
            Some(options) => Widget::CheckboxGroup {
                options: options.clone(),
            },
            None => Widget::Toggle,
        },
        FieldType::Radio => Widget::RadioGroup {
            name: field.id.clone(),
            options: field.options().to_vec(),
        },
        FieldType::Upload => Widget::FilePicker {
            accept: &ALLOWED_UPLOAD_TYPES,
        },
        FieldType::Datetime => Widget::DateTime,
    };
    Control {
        field_id: field.id.clone(),
        label: field.label.clone(),
        required: field.required,
        widget,
    }
}

/// Edits the session refuses to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no field with id '{0}'")]
    UnknownField(String),

    #[error("'{option}' is not an option of field '{field}'")]
    UnknownOption { field: String, option: String },

    #[error("field '{field}' is not a {expected} control")]
    WrongControl { field: String, expected: &'static str },

    #[error("{message}")]
    RejectedUpload { field: String, message: String },
}

/// In-progress answers to one form.
#[derive(Debug, Clone)]
pub struct FormSession {
    form: Form,
    values: HashMap<String, FieldValue>,
    errors: ValidationReport,
    upload_error: Option<String>,
}

impl FormSession {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            values: HashMap::new(),
            errors: ValidationReport::default(),
            upload_error: None,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn controls(&self) -> Vec<Control> {
        render(&self.form)
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    pub fn values(&self) -> &HashMap<String, FieldValue> {
        &self.values
    }

    /// Error shown under a field; empty when none.
    pub fn error(&self, field_id: &str) -> &str {
        self.errors.error(field_id)
    }

    pub fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn is_checked(&self, field_id: &str, option: &str) -> bool {
        match self.values.get(field_id) {
            Some(FieldValue::Choices(selected)) => selected.iter().any(|s| s == option),
            Some(FieldValue::Flag(on)) => *on,
            _ => false,
        }
    }

    /// Free-text entry for text, number, email, password and datetime fields.
    pub fn input(&mut self, field_id: &str, text: impl Into<String>) -> Result<(), EngineError> {
        let field = self.field(field_id)?;
        match field.field_type {
            FieldType::Text
            | FieldType::Number
            | FieldType::Email
            | FieldType::Password
            | FieldType::Datetime => {}
            _ => return Err(wrong(field, "text input")),
        }
        self.update(field_id, FieldValue::Text(text.into()));
        Ok(())
    }

    /// Dropdown choice; the empty placeholder clears the answer.
    pub fn select(&mut self, field_id: &str, option: &str) -> Result<(), EngineError> {
        let field = self.field(field_id)?;
        if field.field_type != FieldType::Dropdown {
            return Err(wrong(field, "dropdown"));
        }
        if !option.is_empty() && !field.has_option(option) {
            return Err(unknown_option(field, option));
        }
        self.update(field_id, FieldValue::Text(option.to_string()));
        Ok(())
    }

    /// Radio choice.
    pub fn choose(&mut self, field_id: &str, option: &str) -> Result<(), EngineError> {
        let field = self.field(field_id)?;
        if field.field_type != FieldType::Radio {
            return Err(wrong(field, "radio"));
        }
        if !field.has_option(option) {
            return Err(unknown_option(field, option));
        }
        self.update(field_id, FieldValue::Text(option.to_string()));
        Ok(())
    }

    /// Checks or unchecks one option of a checkbox group.
    pub fn toggle_option(
        &mut self,
        field_id: &str,
        option: &str,
        checked: bool,
    ) -> Result<(), EngineError> {
        let field = self.field(field_id)?;
        if field.field_type != FieldType::Checkbox || field.options.is_none() {
            return Err(wrong(field, "checkbox group"));
        }
        if !field.has_option(option) {
            return Err(unknown_option(field, option));
        }
        let selected: Vec<String> = field
            .options()
            .iter()
            .filter(|o| {
                if o.as_str() == option {
                    checked
                } else {
                    self.is_checked(field_id, o)
                }
            })
            .cloned()
            .collect();
        self.update(field_id, FieldValue::Choices(selected));
        Ok(())
    }

    /// Sets a checkbox field that has no options.
    pub fn set_flag(&mut self, field_id: &str, on: bool) -> Result<(), EngineError> {
        let field = self.field(field_id)?;
        if field.field_type != FieldType::Checkbox || field.options.is_some() {
            return Err(wrong(field, "toggle"));
        }
        self.update(field_id, FieldValue::Flag(on));
        Ok(())
    }

    /// Holds a file for an upload field. Disallowed types are refused and
    /// surface as the session's upload error.
    pub fn pick_file(&mut self, field_id: &str, file: PickedFile) -> Result<(), EngineError> {
        let field = self.field(field_id)?;
        if field.field_type != FieldType::Upload {
            return Err(wrong(field, "file picker"));
        }
        if !is_allowed_upload(&file.mime) {
            let message = format!(
                "Only JPEG, PNG images, and PDF files are allowed for {}",
                field.label
            );
            tracing::debug!(field = %field_id, mime = %file.mime, "upload rejected");
            self.upload_error = Some(message.clone());
            return Err(EngineError::RejectedUpload {
                field: field_id.to_string(),
                message,
            });
        }
        self.upload_error = None;
        self.update(field_id, FieldValue::File(file));
        Ok(())
    }

    /// Runs the full rule set and stores the report.
    pub fn validate(&mut self) -> bool {
        self.errors = validate(&self.form, &self.values);
        self.errors.is_valid()
    }

    /// Files waiting to be uploaded, by field id.
    pub fn pending_files(&self) -> impl Iterator<Item = (&str, &PickedFile)> {
        self.form.fields.iter().filter_map(|f| match self.values.get(&f.id) {
            Some(FieldValue::File(file)) => Some((f.id.as_str(), file)),
            _ => None,
        })
    }

    pub(crate) fn set_upload_error(&mut self, message: Option<String>) {
        self.upload_error = message;
    }

    /// Swaps a picked file for the URL it was stored under, so a retry does
    /// not upload it again.
    pub(crate) fn mark_uploaded(&mut self, field_id: &str, url: String) {
        if matches!(self.values.get(field_id), Some(FieldValue::File(_))) {
            self.values.insert(field_id.to_string(), FieldValue::Uploaded(url));
        }
    }

    fn field(&self, field_id: &str) -> Result<&Field, EngineError> {
        self.form
            .field(field_id)
            .ok_or_else(|| EngineError::UnknownField(field_id.to_string()))
    }

    fn update(&mut self, field_id: &str, value: FieldValue) {
        tracing::debug!(field = %field_id, "answer updated");
        self.values.insert(field_id.to_string(), value);
        self.errors.clear(field_id);
    }
}

fn wrong(field: &Field, expected: &'static str) -> EngineError {
    EngineError::WrongControl {
        field: field.id.clone(),
        expected,
    }
}

fn unknown_option(field: &Field, option: &str) -> EngineError {
    EngineError::UnknownOption {
        field: field.id.clone(),
        option: option.to_string(),
    }
}
