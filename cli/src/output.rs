//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use openforms_core::{Notice, NoticeLevel, Notifier};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            OutputFormat::Json | OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }

    /// Prints `items` as a table of `row`s, or serialized for json/yaml.
    pub fn print_rows<T, R, F>(&self, items: &[T], row: F)
    where
        T: Serialize,
        R: Tabled,
        F: Fn(&T) -> R,
    {
        match self {
            OutputFormat::Table => {
                println!("{}", Table::new(items.iter().map(row)).with(Style::rounded()));
            }
            _ => self.print(&items),
        }
    }
}

/// Prints notices to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => eprintln!("{} {}", "✓".green(), notice.message),
            NoticeLevel::Error => eprintln!("{} {}", "✗".red(), notice.message.red()),
        }
    }
}
