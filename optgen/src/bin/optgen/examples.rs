use std::fmt::Write;

use crate::theme::{ICONS, THEME};
use crate::stylize;

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

pub fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let heading = stylize("Examples:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{heading}");

    for (index, group) in groups.iter().enumerate() {
        let title = stylize(group.title, theme.primary, true, use_color);
        let _ = writeln!(buffer, "  {title}");

        for command in group.commands {
            let arrow = stylize(ICONS.arrow, theme.secondary, false, use_color);
            let command_text = stylize(command, theme.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {command_text}");
        }

        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rendering() {
        let groups = [
            ExampleGroup {
                title: "One",
                commands: &["optgen a.rs A"],
            },
            ExampleGroup {
                title: "Two",
                commands: &["optgen b.rs B"],
            },
        ];
        assert_eq!(
            render_examples(&groups, false),
            "Examples:\n  One\n    → optgen a.rs A\n\n  Two\n    → optgen b.rs B\n"
        );
    }
}
