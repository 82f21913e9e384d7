//! Fill command: answer a form from the command line and submit it

use colored::Colorize;
use openforms_core::{
    Field, FieldType, FormSession, LocalBlobStore, PickedFile, ResponseEntry, ResponseSubmitter,
    SubmitError,
};
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{ConsoleNotifier, OutputFormat};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Answer")]
    answer: String,
}

fn entry_row(entry: &ResponseEntry) -> EntryRow {
    EntryRow {
        field: entry.key.clone(),
        answer: entry.value.to_string(),
    }
}

/// Splits `LABEL=VALUE`.
fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .map(|(label, value)| (label.trim(), value))
        .filter(|(label, _)| !label.is_empty())
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{}'", raw))
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" | "" => Ok(false),
        other => Err(format!("expected yes or no, got '{}'", other)),
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn field_by_label(session: &FormSession, label: &str) -> Result<Field, String> {
    session
        .form()
        .field_by_label(label)
        .cloned()
        .ok_or_else(|| format!("form has no field labelled '{}'", label))
}

/// Applies one `--answer`. Checkbox groups take one option per answer and
/// may be repeated.
pub fn apply_answer(session: &mut FormSession, label: &str, value: &str) -> Result<(), String> {
    let field = field_by_label(session, label)?;
    let result = match field.field_type {
        FieldType::Dropdown => session.select(&field.id, value),
        FieldType::Radio => session.choose(&field.id, value),
        FieldType::Checkbox if field.options.is_some() => {
            session.toggle_option(&field.id, value, true)
        }
        FieldType::Checkbox => session.set_flag(&field.id, parse_flag(value)?),
        FieldType::Upload => return Err(format!("'{}' is an upload field; use --file", label)),
        _ => session.input(&field.id, value),
    };
    result.map_err(|e| e.to_string())
}

/// Reads a file from disk into an upload field.
pub async fn attach_file(session: &mut FormSession, label: &str, path: &Path) -> Result<(), String> {
    let field = field_by_label(session, label)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("not a file path: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    session
        .pick_file(&field.id, PickedFile::new(name, mime_for(path), bytes))
        .map_err(|e| e.to_string())
}

pub async fn handle(
    client: &ApiClient,
    config: &Config,
    form_id: &str,
    answers: &[String],
    files: &[String],
    format: OutputFormat,
) -> Result<(), String> {
    let form = client.get_form(form_id).await?;
    let mut session = FormSession::new(form);

    for raw in answers {
        let (label, value) = split_assignment(raw)?;
        apply_answer(&mut session, label, value)?;
    }
    for raw in files {
        let (label, path) = split_assignment(raw)?;
        attach_file(&mut session, label, Path::new(path)).await?;
    }

    let mut blobs = LocalBlobStore::new(config.upload_dir());
    if let Some(base) = &config.upload_base_url {
        blobs = blobs.with_base_url(base).map_err(|e| e.to_string())?;
    }
    let submitter = ResponseSubmitter::new(
        Arc::new(blobs),
        Arc::new(client.clone()),
        Arc::new(ConsoleNotifier),
    );

    let mut progress = submitter.progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let pct = *progress.borrow_and_update();
            if let Some(pct) = pct {
                eprint!("\rUploading... {:>3}%", pct);
                if pct == 100 {
                    eprintln!();
                }
            }
        }
    });

    let outcome = submitter.submit(&mut session).await;
    drop(submitter);
    let _ = reporter.await;

    match outcome {
        Ok(confirmation) => {
            format.print_rows(&confirmation.entries, entry_row);
            Ok(())
        }
        Err(SubmitError::Invalid(report)) => {
            for (_, message) in report.failures() {
                eprintln!("  {} {}", "•".red(), message);
            }
            Err("the form has errors".into())
        }
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{signed_in, spawn_api};
    use openforms_core::{Answer, FieldValue, Form, NewForm};
    use std::time::Duration;

    fn session() -> FormSession {
        FormSession::new(
            Form::create(NewForm {
                creator_id: "u1".into(),
                title: "Survey".into(),
                fields: vec![
                    Field::new("field-1", "Name", FieldType::Text),
                    Field::new("field-2", "Colours", FieldType::Checkbox).with_options(["Red", "Green"]),
                    Field::new("field-3", "Size", FieldType::Dropdown).with_options(["S", "M"]),
                    Field::new("field-4", "Photo", FieldType::Upload).optional(),
                ],
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_apply_answers() {
        let mut s = session();
        apply_answer(&mut s, "Name", "Ada=Lovelace").unwrap();
        apply_answer(&mut s, "Colours", "Green").unwrap();
        apply_answer(&mut s, "Colours", "Red").unwrap();
        apply_answer(&mut s, "Size", "M").unwrap();

        assert_eq!(s.value("field-1"), Some(&FieldValue::Text("Ada=Lovelace".into())));
        assert_eq!(
            s.value("field-2"),
            Some(&FieldValue::Choices(vec!["Red".into(), "Green".into()]))
        );

        assert!(apply_answer(&mut s, "Size", "XL").is_err());
        assert!(apply_answer(&mut s, "Age", "3").is_err());
        assert!(apply_answer(&mut s, "Photo", "x").unwrap_err().contains("--file"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("Yes").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("Name=Ada=L").unwrap(), ("Name", "Ada=L"));
        assert_eq!(split_assignment(" Note =").unwrap(), ("Note", ""));
        assert!(split_assignment("=x").is_err());
        assert!(split_assignment("Name").is_err());
    }

    #[tokio::test]
    async fn test_attach_file_checks_type() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("cv.PDF");
        let exe = dir.path().join("setup.exe");
        std::fs::write(&pdf, b"%PDF").unwrap();
        std::fs::write(&exe, b"MZ").unwrap();

        let mut s = session();
        attach_file(&mut s, "Photo", &pdf).await.unwrap();
        assert_eq!(s.pending_files().count(), 1);

        let err = attach_file(&mut s, "Photo", &exe).await.unwrap_err();
        assert!(err.contains("Only JPEG, PNG images, and PDF files are allowed"));
        assert!(s.upload_error().is_some());
    }

    #[tokio::test]
    async fn test_fill_submits_response() {
        let base = spawn_api().await;
        let client = signed_in(&base, "owner@example.com").await;
        let owner = client.session().unwrap().user.id.clone();
        let form = client
            .add_form(&NewForm {
                creator_id: owner,
                title: "Survey".into(),
                fields: vec![
                    Field::new("field-1", "Name", FieldType::Text),
                    Field::new("field-2", "Photo", FieldType::Upload),
                ],
            })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("me.png");
        std::fs::write(&photo, b"\x89PNG").unwrap();
        let config = Config {
            upload_dir: Some(dir.path().join("uploads")),
            upload_base_url: Some("https://files.test".into()),
            ..Config::default()
        };

        let anon = ApiClient::new(&base, Duration::from_secs(5), None).unwrap();
        handle(
            &anon,
            &config,
            &form.id,
            &["Name=Ada".to_string()],
            &[format!("Photo={}", photo.display())],
            OutputFormat::Json,
        )
        .await
        .unwrap();

        let responses = client.list_responses(&form.id).await.unwrap();
        assert_eq!(responses.len(), 1);
        match &responses[0].responses[1].value {
            Answer::Text(url) => {
                assert!(url.starts_with("https://files.test/") && url.ends_with("-me.png"))
            }
            other => panic!("unexpected {other:?}"),
        }

        let missing = handle(&anon, &config, &form.id, &[], &[], OutputFormat::Json).await;
        assert_eq!(missing.unwrap_err(), "the form has errors");
    }
}
