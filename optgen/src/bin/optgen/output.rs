use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format for the generation summary
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// One line per generated file
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be rendered as a table or a compact listing.
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        if options.no_color {
            colored::control::set_override(false);
        }
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(self)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.decorate(ICONS.success, message, THEME.success));
        }
    }

    /// Errors are printed even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.decorate(ICONS.error, message, THEME.error));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.decorate(ICONS.warning, message, THEME.warning));
        }
    }

    pub fn info(&self, message: &str) {
        if !self.options.quiet && !self.is_json() {
            println!("{}", self.decorate(ICONS.info, message, THEME.info));
        }
    }

    /// Only shown with `--verbose`.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.decorate(ICONS.arrow, message, THEME.muted));
        }
    }

    pub fn bullet(&self, text: &str) {
        if self.options.verbose && !self.options.quiet {
            let icon = if self.options.no_color {
                ICONS.bullet.to_string()
            } else {
                ICONS.bullet.color(THEME.muted).to_string()
            };
            eprintln!("  {icon} {text}");
        }
    }

    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }
        table
    }

    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let cells = headers.iter().map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if self.options.no_color {
                cell
            } else {
                cell.fg(TableColor::Cyan)
            }
        });
        table.set_header(cells.collect::<Vec<_>>());
    }

    fn decorate(&self, icon: &str, message: &str, color: Color) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Entry {
        name: String,
        count: usize,
    }

    impl TableDisplay for Entry {
        fn to_table(&self, output: &OutputManager) -> Table {
            let mut table = output.create_table();
            output.add_table_header(&mut table, &["Name", "Count"]);
            table.add_row(vec![Cell::new(&self.name), Cell::new(self.count)]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.name, self.count)
        }
    }

    fn manager(options: GlobalOptions) -> OutputManager {
        OutputManager::new(GlobalOptions {
            no_color: true,
            ..options
        })
    }

    #[test]
    fn test_display_in_every_format() {
        let entry = Entry {
            name: "Server".to_string(),
            count: 2,
        };
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Compact] {
            let output = manager(GlobalOptions {
                output_format: format,
                ..Default::default()
            });
            assert!(output.display(&entry).is_ok());
        }
    }

    #[test]
    fn test_plain_table_uses_ascii_borders() {
        let output = manager(GlobalOptions::default());
        let entry = Entry {
            name: "Server".to_string(),
            count: 2,
        };
        let rendered = entry.to_table(&output).to_string();
        assert!(rendered.contains("| Server"));
        assert!(rendered.contains("Count"));
    }

    #[test]
    fn test_plain_decoration() {
        let output = manager(GlobalOptions::default());
        assert_eq!(output.decorate(ICONS.error, "boom", THEME.error), "✗ boom");
    }
}
