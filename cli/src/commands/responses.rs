//! Response commands

use openforms_core::{FormResponse, ResponseEntry};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::OutputFormat;
use crate::ResponseCommands;

#[derive(Tabled)]
struct ResponseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Submitted")]
    submitted: String,
    #[tabled(rename = "Answers")]
    answers: String,
}

fn summary(entries: &[ResponseEntry]) -> String {
    entries
        .iter()
        .filter(|e| !e.value.is_empty())
        .map(|e| format!("{}: {}", e.key, e.value))
        .collect::<Vec<_>>()
        .join("; ")
}

fn response_row(response: &FormResponse) -> ResponseRow {
    ResponseRow {
        id: response.id.clone(),
        submitted: response.created_at.format("%Y-%m-%d %H:%M").to_string(),
        answers: summary(&response.responses),
    }
}

pub async fn handle(action: ResponseCommands, client: &ApiClient, format: OutputFormat) -> Result<(), String> {
    match action {
        ResponseCommands::List { form_id } => {
            let responses = client.list_responses(&form_id).await?;
            format.print_rows(&responses, response_row);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use openforms_core::Answer;

    #[test]
    fn test_summary_skips_empty_answers() {
        let entries = vec![
            ResponseEntry::new("Name", Answer::Text("Ada".into())),
            ResponseEntry::new("Note", Answer::Empty),
            ResponseEntry::new("Colours", Answer::Choices(vec!["Red".into(), "Green".into()])),
        ];
        assert_eq!(summary(&entries), "Name: Ada; Colours: Red, Green");
    }
}
