//! Terminal output for suggestion lists.

use colored::Colorize;
use whence_core::Suggestion;

/// Configuration for suggestion printing.
#[derive(Debug, Clone, Copy)]
pub struct PrettyConfig {
    /// Enable colored output.
    pub color: bool,
    /// Print the strategy tag column.
    pub show_tags: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_tags: false,
        }
    }
}

/// Print one numbered suggestion list.
pub fn print_suggestions(suggestions: &[Suggestion], config: &PrettyConfig) {
    let width = suggestions.len().to_string().len();
    for (idx, suggestion) in suggestions.iter().enumerate() {
        let index = format!("{:>width$}", idx + 1, width = width);
        let label = &suggestion.label;
        let description = &suggestion.description;

        if config.color {
            print!(
                "{}  {}  {}",
                index.bright_black(),
                label.green().bold(),
                description.bright_black()
            );
        } else {
            print!("{}  {}  {}", index, label, description);
        }

        if config.show_tags {
            if config.color {
                print!("  [{}]", suggestion.tag.blue());
            } else {
                print!("  [{}]", suggestion.tag);
            }
        }
        println!();
    }
}
