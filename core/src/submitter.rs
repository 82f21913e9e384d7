//! Response submission
//!
//! Validates a session, uploads any picked files, flattens the answers into
//! `{key, value}` entries and hands them to the response sink.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::value_objects::{Answer, FieldValue, ResponseEntry};
use crate::ports::{BlobStore, Notice, Notifier, ResponseSink, StoreError, TransferProgress};
use crate::renderer::FormSession;
use crate::validator::ValidationReport;

pub const SUBMIT_OK: &str = "Form submitted successfully!";
pub const SUBMIT_FAILED: &str = "Error submitting form. Please try again later.";
pub const UPLOAD_FAILED: &str = "File upload failed";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("validation failed")]
    Invalid(ValidationReport),

    #[error("file upload failed: {0}")]
    Upload(StoreError),

    #[error("submission failed: {0}")]
    Send(StoreError),
}

/// What the confirmation view shows after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub form_id: String,
    pub entries: Vec<ResponseEntry>,
}

/// Blob name for an upload: millisecond timestamp, then the original name.
pub fn storage_name(original: &str, millis: i64) -> String {
    format!("{}-{}", millis, original)
}

/// Turns a session's values into the ordered entry list, one per field.
/// Upload fields carry their stored URL; files not yet uploaded are empty.
pub fn collect_entries(session: &FormSession) -> Vec<ResponseEntry> {
    session
        .form()
        .fields
        .iter()
        .map(|field| {
            let value = match session.value(&field.id) {
                Some(FieldValue::Uploaded(url)) if !url.is_empty() => Answer::Text(url.clone()),
                Some(FieldValue::Text(s)) if !s.is_empty() => Answer::Text(s.clone()),
                Some(FieldValue::Choices(c)) => Answer::Choices(c.clone()),
                Some(FieldValue::Flag(b)) => Answer::Flag(*b),
                _ => Answer::Empty,
            };
            ResponseEntry::new(field.label.clone(), value)
        })
        .collect()
}

pub struct ResponseSubmitter {
    blobs: Arc<dyn BlobStore>,
    sink: Arc<dyn ResponseSink>,
    notifier: Arc<dyn Notifier>,
    progress: watch::Sender<Option<u8>>,
}

impl ResponseSubmitter {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        sink: Arc<dyn ResponseSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (progress, _) = watch::channel(None);
        Self {
            blobs,
            sink,
            notifier,
            progress,
        }
    }

    /// Upload percentage while a transfer runs, `None` otherwise.
    pub fn progress(&self) -> watch::Receiver<Option<u8>> {
        self.progress.subscribe()
    }

    pub async fn submit(&self, session: &mut FormSession) -> Result<Confirmation, SubmitError> {
        if !session.validate() {
            tracing::debug!(form = %session.form().id, "submission blocked by validation");
            return Err(SubmitError::Invalid(session.errors().clone()));
        }

        self.upload_pending(session).await?;
        let form_id = session.form().id.clone();
        let entries = collect_entries(session);

        if let Err(e) = self.sink.add_response(&form_id, &entries).await {
            tracing::error!(form = %form_id, error = %e, "response submission failed");
            self.notifier.notify(Notice::error(SUBMIT_FAILED));
            return Err(SubmitError::Send(e));
        }

        tracing::info!(form = %form_id, entries = entries.len(), "response submitted");
        self.notifier.notify(Notice::success(SUBMIT_OK));
        Ok(Confirmation { form_id, entries })
    }

    async fn upload_pending(&self, session: &mut FormSession) -> Result<(), SubmitError> {
        let pending: Vec<_> = session
            .pending_files()
            .map(|(id, file)| (id.to_string(), file.clone()))
            .collect();

        for (field_id, file) in pending {
            let name = storage_name(&file.name, Utc::now().timestamp_millis());
            let progress = self.progress.clone();
            let report = move |p: TransferProgress| {
                progress.send_replace(Some(p.percent()));
            };
            session.set_upload_error(None);

            let result = self.blobs.put(&name, &file.mime, &file.bytes, &report).await;
            self.progress.send_replace(None);

            match result {
                Ok(url) => {
                    tracing::info!(blob = %name, "file uploaded");
                    session.mark_uploaded(&field_id, url);
                }
                Err(e) => {
                    tracing::error!(blob = %name, error = %e, "file upload failed");
                    session.set_upload_error(Some(UPLOAD_FAILED.to_string()));
                    self.notifier.notify(Notice::error(UPLOAD_FAILED));
                    return Err(SubmitError::Upload(e));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Form, NewForm};
    use crate::domain::value_objects::{Field, FieldType, PickedFile};
    use async_trait::async_trait;
    use doubles::Recorder;

    mod doubles {
        use super::*;
        use std::sync::Mutex;

        #[derive(Default)]
        pub struct Recorder {
            pub sent: Mutex<Vec<(String, Vec<ResponseEntry>)>>,
            pub notices: Mutex<Vec<Notice>>,
            pub uploads: Mutex<Vec<String>>,
            pub fail_send: bool,
            pub fail_upload: bool,
        }

        #[async_trait]
        impl ResponseSink for Recorder {
            async fn add_response(
                &self,
                form_id: &str,
                entries: &[ResponseEntry],
            ) -> Result<(), StoreError> {
                if self.fail_send {
                    return Err(StoreError::Transport("connection reset".into()));
                }
                self.sent
                    .lock()
                    .unwrap()
                    .push((form_id.to_string(), entries.to_vec()));
                Ok(())
            }
        }

        #[async_trait]
        impl BlobStore for Recorder {
            async fn put(
                &self,
                name: &str,
                _content_type: &str,
                bytes: &[u8],
                progress: &(dyn Fn(TransferProgress) + Send + Sync),
            ) -> Result<String, StoreError> {
                if self.fail_upload {
                    return Err(StoreError::Storage("bucket unavailable".into()));
                }
                let total = bytes.len() as u64;
                progress(TransferProgress { transferred: total / 2, total });
                progress(TransferProgress { transferred: total, total });
                self.uploads.lock().unwrap().push(name.to_string());
                Ok(format!("https://blobs.test/{}", name))
            }
        }

        impl Notifier for Recorder {
            fn notify(&self, notice: Notice) {
                self.notices.lock().unwrap().push(notice);
            }
        }
    }

    fn session() -> FormSession {
        FormSession::new(
            Form::create(NewForm {
                creator_id: "u1".into(),
                title: "Application".into(),
                fields: vec![
                    Field::new("field-1", "Name", FieldType::Text),
                    Field::new("field-2", "Colours", FieldType::Checkbox).with_options(["Red", "Green"]),
                    Field::new("field-3", "CV", FieldType::Upload),
                    Field::new("field-4", "Note", FieldType::Text).optional(),
                ],
            })
            .unwrap(),
        )
    }

    fn filled() -> FormSession {
        let mut s = session();
        s.input("field-1", "Ada").unwrap();
        s.toggle_option("field-2", "Red", true).unwrap();
        s.pick_file("field-3", PickedFile::new("cv.pdf", "application/pdf", vec![7; 10]))
            .unwrap();
        s
    }

    fn submitter(rec: &Arc<Recorder>) -> ResponseSubmitter {
        ResponseSubmitter::new(rec.clone(), rec.clone(), rec.clone())
    }

    #[test]
    fn test_storage_name() {
        assert_eq!(storage_name("cv.pdf", 1700000000000), "1700000000000-cv.pdf");
    }

    #[tokio::test]
    async fn test_submit_uploads_then_sends_urls() {
        let rec = Arc::new(Recorder::default());
        let sub = submitter(&rec);
        let mut s = filled();

        let confirmation = sub.submit(&mut s).await.unwrap();

        let uploads = rec.uploads.lock().unwrap().clone();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].ends_with("-cv.pdf"));

        assert_eq!(
            confirmation.entries,
            vec![
                ResponseEntry::new("Name", Answer::Text("Ada".into())),
                ResponseEntry::new("Colours", Answer::Choices(vec!["Red".into()])),
                ResponseEntry::new("CV", Answer::Text(format!("https://blobs.test/{}", uploads[0]))),
                ResponseEntry::new("Note", Answer::Empty),
            ]
        );
        let sent = rec.sent.lock().unwrap();
        assert_eq!(sent[0].0, s.form().id);
        assert_eq!(sent[0].1, confirmation.entries);
        assert_eq!(rec.notices.lock().unwrap()[0], Notice::success(SUBMIT_OK));
        assert_eq!(*sub.progress().borrow(), None);
        assert_eq!(s.pending_files().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_blocks_network() {
        let rec = Arc::new(Recorder::default());
        let mut s = session();
        let err = submitter(&rec).submit(&mut s).await.unwrap_err();
        match err {
            SubmitError::Invalid(report) => assert_eq!(report.error("field-1"), "Name is required"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(rec.sent.lock().unwrap().is_empty());
        assert!(rec.uploads.lock().unwrap().is_empty());
        assert_eq!(s.error("field-3"), "CV is required");
    }

    #[tokio::test]
    async fn test_upload_failure_aborts() {
        let rec = Arc::new(Recorder {
            fail_upload: true,
            ..Default::default()
        });
        let mut s = filled();
        let err = submitter(&rec).submit(&mut s).await.unwrap_err();
        assert!(matches!(err, SubmitError::Upload(_)));
        assert!(rec.sent.lock().unwrap().is_empty());
        assert_eq!(s.upload_error(), Some(UPLOAD_FAILED));
        assert_eq!(rec.notices.lock().unwrap()[0], Notice::error(UPLOAD_FAILED));
    }

    #[tokio::test]
    async fn test_send_failure_notifies() {
        let rec = Arc::new(Recorder {
            fail_send: true,
            ..Default::default()
        });
        let mut s = filled();
        let err = submitter(&rec).submit(&mut s).await.unwrap_err();
        assert!(matches!(err, SubmitError::Send(_)));
        assert_eq!(rec.notices.lock().unwrap()[0], Notice::error(SUBMIT_FAILED));
    }

    #[tokio::test]
    async fn test_retry_after_send_failure_reuses_upload() {
        let blobs = Arc::new(Recorder::default());
        let offline = Arc::new(Recorder {
            fail_send: true,
            ..Default::default()
        });
        let mut s = filled();

        let failing = ResponseSubmitter::new(blobs.clone(), offline.clone(), offline.clone());
        assert!(matches!(failing.submit(&mut s).await, Err(SubmitError::Send(_))));
        assert_eq!(s.pending_files().count(), 0);

        let confirmation = submitter(&blobs).submit(&mut s).await.unwrap();
        let uploads = blobs.uploads.lock().unwrap().clone();
        assert_eq!(uploads.len(), 1);
        assert_eq!(
            confirmation.entries[2],
            ResponseEntry::new("CV", Answer::Text(format!("https://blobs.test/{}", uploads[0])))
        );
    }

    #[tokio::test]
    async fn test_same_file_name_in_two_fields() {
        let dir = tempfile::tempdir().unwrap();
        let rec = Arc::new(Recorder::default());
        let sub = ResponseSubmitter::new(
            Arc::new(crate::infrastructure::LocalBlobStore::new(dir.path())),
            rec.clone(),
            rec.clone(),
        );
        let mut s = FormSession::new(
            Form::create(NewForm {
                creator_id: "u1".into(),
                title: "ID check".into(),
                fields: vec![
                    Field::new("field-1", "Front", FieldType::Upload),
                    Field::new("field-2", "Back", FieldType::Upload),
                ],
            })
            .unwrap(),
        );
        s.pick_file("field-1", PickedFile::new("scan.png", "image/png", b"FRONT".to_vec()))
            .unwrap();
        s.pick_file("field-2", PickedFile::new("scan.png", "image/png", b"BACK".to_vec()))
            .unwrap();

        let confirmation = sub.submit(&mut s).await.unwrap();
        let stored: Vec<Vec<u8>> = confirmation
            .entries
            .iter()
            .map(|entry| match &entry.value {
                Answer::Text(url) => {
                    let path = url::Url::parse(url).unwrap().to_file_path().unwrap();
                    std::fs::read(path).unwrap()
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(stored, vec![b"FRONT".to_vec(), b"BACK".to_vec()]);
    }
}
