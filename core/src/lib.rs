//! OpenForms Engine
//!
//! Form schema, rendering, validation and submission, shared by the REST
//! backend and the command-line client.
//!
//! ## Flow
//!
//! ```text
//! Form ──► render() ──► FormSession (edits) ──► validate() ──► ResponseSubmitter
//!                                                                 │
//!                                         BlobStore (uploads) ◄───┤
//!                                         ResponseSink        ◄───┘
//! ```
//!
//! ## Features
//! - Closed palette of nine field types with a checked option invariant
//! - Per-field validation with inline error messages
//! - File uploads restricted to JPEG, PNG and PDF, with progress reporting
//! - Authoring-side form builder with in-place field editing

pub mod builder;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod renderer;
pub mod submitter;
pub mod validator;

// Re-exports for convenience
pub use builder::{BuilderError, FieldDraft, FormBuilder};
pub use domain::aggregates::{
    check_field, check_fields, EntryError, Form, FormResponse, NewForm, SchemaError,
};
pub use domain::value_objects::{
    is_allowed_upload, Answer, Field, FieldType, FieldValue, PickedFile, ResponseEntry,
    ALLOWED_UPLOAD_TYPES,
};
pub use infrastructure::{LocalBlobStore, TracingNotifier};
pub use ports::{
    BlobStore, FormStore, Notice, NoticeLevel, Notifier, ResponseSink, StoreError,
    TransferProgress,
};
pub use renderer::{render, Control, EngineError, FormSession, InputKind, Widget};
pub use submitter::{Confirmation, ResponseSubmitter, SubmitError};
pub use validator::{is_valid_email, validate, ValidationReport};
