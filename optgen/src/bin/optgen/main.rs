mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

use commands::generate::{self, GenerateArgs, handle_generate};
use examples::render_examples;
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::THEME;

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    (
        "OPTGEN_SENSITIVE_FIELD_NAME_MATCHES",
        "Default for --sensitive-field-name-matches",
    ),
    ("RUST_LOG", "Log filter, e.g. optgen_build=debug"),
];

#[derive(Parser)]
#[command(name = "optgen")]
#[command(version)]
#[command(
    about = "Generate functional options for Rust structs",
    long_about = r#"Generate a functional options API for Rust structs:

• <Type>Option aliases with with_<field>/set_<field> option functions
• Constructors with and without declared defaults
• to_option snapshots and with_options apply helpers
• debug_map introspection driven by #[optgen(debugmap = "...")] tags

Every field of a requested struct needs a debugmap tag. Fields whose names
match a sensitive pattern must be tagged "sensitive".
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(flatten)]
    generate: GenerateArgs,

    /// Output format for the summary
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        let matches = match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => matches,
            Err(err) => exit_with_clap_error(err),
        };
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| exit_with_clap_error(err))
    }

    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            output_format: self.format.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
            no_color: self.no_color || !detect_color_support(),
        }
    }
}

fn exit_with_clap_error(err: clap::error::Error) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = print_blank_line_stdout();
            if let Err(print_err) = err.print()
                && print_err.kind() != io::ErrorKind::BrokenPipe
            {
                eprintln!("Failed to display help: {print_err}");
            }
            let _ = print_blank_line_stdout();
            std::process::exit(0);
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let mut command = build_cli_command().styles(help_styles());
            let mut stderr = io::stderr();
            let _ = print_blank_line_stderr();
            if command.write_long_help(&mut stderr).is_ok() {
                let _ = IoWrite::write_all(&mut stderr, b"\n");
                let _ = IoWrite::flush(&mut stderr);
            }
            std::process::exit(err.exit_code());
        }
        _ => {
            let exit_code = err.exit_code();
            let _ = print_blank_line_stderr();
            if let Err(print_err) = err.print()
                && print_err.kind() != io::ErrorKind::BrokenPipe
            {
                eprintln!("Failed to display error: {print_err}");
            }
            let _ = print_blank_line_stderr();
            std::process::exit(exit_code);
        }
    }
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    Cli::command()
        .after_long_help(render_appendix(use_color))
        .color(if use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        })
}

fn render_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = render_examples(generate::EXAMPLES, use_color);
    buffer.push('\n');

    let env_heading = stylize("Environment Variables:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{env_heading}");
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let value_text = stylize(description, theme.value, false, use_color);
        let _ = writeln!(buffer, "  {key_text}  {value_text}");
    }

    buffer.push('\n');

    let tip_heading = stylize("Tip:", theme.highlight, true, use_color);
    let tip_text = stylize(
        "Settings can also live in an [optgen] table of optgen.toml at the project root.",
        theme.secondary,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{tip_heading} {tip_text}");

    buffer
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn print_blank_line_stderr() -> io::Result<()> {
    let mut stderr = io::stderr();
    IoWrite::write_all(&mut stderr, b"\n")?;
    IoWrite::flush(&mut stderr)
}

pub(crate) fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let styled = text.color(color);
    if bold {
        styled.bold().to_string()
    } else {
        styled.to_string()
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.secondary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(color_to_clap_color(color)))
}

fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    match color {
        ThemeColor::Black => ClapColor::Ansi(AnsiColor::Black),
        ThemeColor::Red => ClapColor::Ansi(AnsiColor::Red),
        ThemeColor::Green => ClapColor::Ansi(AnsiColor::Green),
        ThemeColor::Yellow => ClapColor::Ansi(AnsiColor::Yellow),
        ThemeColor::Blue => ClapColor::Ansi(AnsiColor::Blue),
        ThemeColor::Magenta => ClapColor::Ansi(AnsiColor::Magenta),
        ThemeColor::Cyan => ClapColor::Ansi(AnsiColor::Cyan),
        ThemeColor::White => ClapColor::Ansi(AnsiColor::White),
        ThemeColor::BrightBlack => ClapColor::Ansi(AnsiColor::BrightBlack),
        ThemeColor::BrightRed => ClapColor::Ansi(AnsiColor::BrightRed),
        ThemeColor::BrightGreen => ClapColor::Ansi(AnsiColor::BrightGreen),
        ThemeColor::BrightYellow => ClapColor::Ansi(AnsiColor::BrightYellow),
        ThemeColor::BrightBlue => ClapColor::Ansi(AnsiColor::BrightBlue),
        ThemeColor::BrightMagenta => ClapColor::Ansi(AnsiColor::BrightMagenta),
        ThemeColor::BrightCyan => ClapColor::Ansi(AnsiColor::BrightCyan),
        ThemeColor::BrightWhite => ClapColor::Ansi(AnsiColor::BrightWhite),
        ThemeColor::TrueColor { r, g, b } => ClapColor::Rgb(RgbColor(r, g, b)),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();
    let output = OutputManager::new(cli.global_options());

    match execute(cli, &output) {
        Ok(()) => {}
        Err(err) => {
            output.error(&format!("Error: {err:#}"));
            std::process::exit(1);
        }
    }
}

fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    handle_generate(cli.generate, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_positionals_and_flags() {
        let cli = Cli::try_parse_from([
            "optgen",
            "src/models.rs",
            "Server",
            "Upstream",
            "--output",
            "src/options.rs",
            "--package",
            "crate::options",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.generate.types, ["Server", "Upstream"]);
        assert_eq!(cli.generate.package.as_deref(), Some("crate::options"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_requires_a_type_name() {
        assert!(Cli::try_parse_from(["optgen", "src/models.rs"]).is_err());
    }

    #[test]
    fn test_plain_appendix() {
        let appendix = render_appendix(false);
        assert!(appendix.starts_with("Examples:\n"));
        assert!(appendix.contains("OPTGEN_SENSITIVE_FIELD_NAME_MATCHES"));
    }
}
