//! Form commands

use colored::Colorize;
use openforms_core::{Field, FieldType, Form, FormBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::client::ApiClient;
use crate::output::{ConsoleNotifier, OutputFormat};
use crate::FormCommands;

#[derive(Tabled)]
struct FormRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Fields")]
    fields: usize,
    #[tabled(rename = "Created")]
    created: String,
}

fn form_row(form: &Form) -> FormRow {
    FormRow {
        id: form.id.clone(),
        title: form.title.clone(),
        fields: form.fields.len(),
        created: form.created_at.format("%Y-%m-%d %H:%M").to_string(),
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Type")]
    field_type: String,
    #[tabled(rename = "Required")]
    required: &'static str,
    #[tabled(rename = "Options")]
    options: String,
}

fn field_row(field: &Field) -> FieldRow {
    FieldRow {
        id: field.id.clone(),
        label: field.label.clone(),
        field_type: field.field_type.to_string(),
        required: if field.required { "yes" } else { "no" },
        options: field.options().join(", "),
    }
}

/// Form definition file read by `forms create`, in YAML or JSON.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormFile {
    pub title: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub label: String,
    #[serde(rename = "type", default = "text_type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "required_by_default")]
    pub required: bool,
}

fn text_type() -> FieldType {
    FieldType::Text
}

fn required_by_default() -> bool {
    true
}

pub fn parse_form_file(content: &str) -> Result<FormFile, String> {
    serde_yaml::from_str(content).map_err(|e| format!("invalid form file: {}", e))
}

/// Feeds every field of `file` through the builder, in order.
pub fn build(builder: &mut FormBuilder, file: FormFile) -> Result<(), String> {
    builder.set_title(file.title);
    for def in file.fields {
        if !def.field_type.takes_options() && !def.options.is_empty() {
            return Err(format!(
                "field \"{}\" of type {} does not take options",
                def.label, def.field_type
            ));
        }
        builder.set_label(def.label);
        builder.set_type(def.field_type);
        builder.set_required(def.required);
        for option in def.options {
            builder.add_option(option).map_err(|e| e.to_string())?;
        }
        builder.add_field().map_err(|e| e.to_string())?;
    }
    Ok(())
}

pub async fn handle(action: FormCommands, client: &ApiClient, format: OutputFormat) -> Result<(), String> {
    match action {
        FormCommands::List { creator } => {
            let creator = match creator {
                Some(c) => c,
                None => client.session()?.user.id.clone(),
            };
            let forms = client.list_forms(&creator).await?;
            format.print_rows(&forms, form_row);
        }
        FormCommands::Show { id, creator } => {
            let form = match creator {
                Some(creator) => client.get_owned_form(&id, &creator).await?,
                None => client.get_form(&id).await?,
            };
            match format {
                OutputFormat::Table => {
                    println!("{} ({})", form.title.bold(), form.id);
                    println!(
                        "{}",
                        Table::new(form.fields.iter().map(field_row)).with(Style::rounded())
                    );
                }
                _ => format.print(&form),
            }
        }
        FormCommands::Create { file, title } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| format!("{}: {}", file.display(), e))?;
            let mut def = parse_form_file(&content)?;
            if let Some(title) = title {
                def.title = title;
            }

            let creator = client.session()?.user.id.clone();
            let mut builder =
                FormBuilder::new(creator, Arc::new(client.clone()), Arc::new(ConsoleNotifier));
            build(&mut builder, def)?;
            let form = builder.submit_form().await.map_err(|e| e.to_string())?;

            match format {
                OutputFormat::Table => {
                    println!("Created form: {}", form.id);
                    println!("Share link: {}", client.share_url(&form.id));
                }
                _ => format.print(&form),
            }
        }
        FormCommands::Delete { id } => {
            let form = client.delete_form(&id).await?;
            println!("Deleted form: {} ({})", form.title, form.id);
        }
        FormCommands::Link { id } => {
            let form = client.get_form(&id).await?;
            println!("{}", client.share_url(&form.id));
        }
    }
    Ok(())
}
