//! Form authoring
//!
//! A [`FormBuilder`] keeps the committed field list and a draft field being
//! edited. Commits go through the same schema checks the server applies.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::aggregates::{check_field, Form, NewForm, SchemaError};
use crate::domain::value_objects::{Field, FieldType};
use crate::ports::{FormStore, Notice, Notifier, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("no field with id '{0}'")]
    UnknownField(String),

    #[error("no option at position {0}")]
    UnknownOption(usize),

    #[error("could not save form: {0}")]
    Store(StoreError),
}

/// The field currently being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDraft {
    pub label: String,
    pub field_type: FieldType,
    pub options: Vec<String>,
    pub required: bool,
}

impl Default for FieldDraft {
    fn default() -> Self {
        Self {
            label: String::new(),
            field_type: FieldType::Text,
            options: Vec::new(),
            required: true,
        }
    }
}

impl FieldDraft {
    fn from_field(field: &Field) -> Self {
        Self {
            label: field.label.clone(),
            field_type: field.field_type,
            options: field.options().to_vec(),
            required: field.required,
        }
    }

    fn to_field(&self, id: String) -> Field {
        Field {
            id,
            label: self.label.trim().to_string(),
            field_type: self.field_type,
            options: self
                .field_type
                .takes_options()
                .then(|| self.options.clone()),
            required: self.required,
        }
    }
}

pub struct FormBuilder {
    creator_id: String,
    title: String,
    fields: Vec<Field>,
    draft: FieldDraft,
    editing: Option<String>,
    next_id: usize,
    store: Arc<dyn FormStore>,
    notifier: Arc<dyn Notifier>,
}

impl FormBuilder {
    pub fn new(
        creator_id: impl Into<String>,
        store: Arc<dyn FormStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            creator_id: creator_id.into(),
            title: String::new(),
            fields: Vec::new(),
            draft: FieldDraft::default(),
            editing: None,
            next_id: 1,
            store,
            notifier,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn draft(&self) -> &FieldDraft {
        &self.draft
    }

    /// Id of the committed field loaded into the draft, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.draft.label = label.into();
    }

    pub fn set_type(&mut self, field_type: FieldType) {
        self.draft.field_type = field_type;
    }

    pub fn set_required(&mut self, required: bool) {
        self.draft.required = required;
    }

    pub fn add_option(&mut self, option: impl Into<String>) -> Result<(), BuilderError> {
        let option: String = option.into();
        let option = option.trim().to_string();
        self.check_option(&option, None)?;
        self.draft.options.push(option);
        Ok(())
    }

    pub fn edit_option(
        &mut self,
        index: usize,
        option: impl Into<String>,
    ) -> Result<(), BuilderError> {
        if index >= self.draft.options.len() {
            return Err(BuilderError::UnknownOption(index));
        }
        let option: String = option.into();
        let option = option.trim().to_string();
        self.check_option(&option, Some(index))?;
        self.draft.options[index] = option;
        Ok(())
    }

    pub fn remove_option(&mut self, index: usize) -> Result<String, BuilderError> {
        if index >= self.draft.options.len() {
            return Err(BuilderError::UnknownOption(index));
        }
        Ok(self.draft.options.remove(index))
    }

    /// Loads a committed field into the draft; the next commit replaces it.
    pub fn edit_field(&mut self, field_id: &str) -> Result<(), BuilderError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.id == field_id)
            .ok_or_else(|| BuilderError::UnknownField(field_id.to_string()))?;
        self.draft = FieldDraft::from_field(field);
        self.editing = Some(field_id.to_string());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = FieldDraft::default();
    }

    /// Commits the draft: appends a new field, or replaces the one being edited.
    pub fn add_field(&mut self) -> Result<&Field, BuilderError> {
        let label = self.draft.label.trim();
        let duplicate = self
            .fields
            .iter()
            .any(|f| f.label == label && self.editing.as_deref() != Some(f.id.as_str()));
        if duplicate {
            return Err(SchemaError::DuplicateLabel(label.to_string()).into());
        }

        let id = match &self.editing {
            Some(id) => id.clone(),
            None => format!("field-{}", self.next_id),
        };
        let field = self.draft.to_field(id);
        check_field(&field)?;

        let index = match self.editing.take() {
            Some(id) => {
                let index = self
                    .fields
                    .iter()
                    .position(|f| f.id == id)
                    .ok_or(BuilderError::UnknownField(id))?;
                self.fields[index] = field;
                index
            }
            None => {
                self.next_id += 1;
                self.fields.push(field);
                self.fields.len() - 1
            }
        };
        self.draft = FieldDraft::default();
        tracing::debug!(field = %self.fields[index].id, "field committed");
        Ok(&self.fields[index])
    }

    pub fn delete_field(&mut self, field_id: &str) -> Result<Field, BuilderError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| BuilderError::UnknownField(field_id.to_string()))?;
        if self.editing.as_deref() == Some(field_id) {
            self.cancel_edit();
        }
        Ok(self.fields.remove(index))
    }

    /// The payload `submit_form` would send.
    pub fn to_new_form(&self) -> NewForm {
        NewForm {
            creator_id: self.creator_id.clone(),
            title: self.title.trim().to_string(),
            fields: self.fields.clone(),
        }
    }

    /// Sends the form to the store. Borrowing the builder mutably for the
    /// whole call keeps a second submit from starting while one is in flight.
    pub async fn submit_form(&mut self) -> Result<Form, BuilderError> {
        let payload = self.to_new_form();
        if let Err(e) = payload.check() {
            self.notifier.notify(Notice::error(e.to_string()));
            return Err(e.into());
        }

        match self.store.create_form(&payload).await {
            Ok(form) => {
                tracing::info!(form = %form.id, fields = form.fields.len(), "form created");
                self.notifier.notify(Notice::success("Form saved successfully"));
                Ok(form)
            }
            Err(e) => {
                tracing::error!(error = %e, "form creation failed");
                self.notifier.notify(Notice::error("Could not save the form. Please try again later."));
                Err(BuilderError::Store(e))
            }
        }
    }

    fn check_option(&self, option: &str, skip: Option<usize>) -> Result<(), BuilderError> {
        let label = self.draft.label.clone();
        if option.is_empty() {
            return Err(SchemaError::BlankOption(label).into());
        }
        let taken = self
            .draft
            .options
            .iter()
            .enumerate()
            .any(|(i, o)| o == option && Some(i) != skip);
        if taken {
            return Err(SchemaError::DuplicateOption {
                label,
                option: option.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
