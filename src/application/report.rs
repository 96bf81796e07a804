use colored::Colorize;
use supports_color::Stream;

use crate::application::PublishSummary;

/// Prints a short summary of a publish run, coloured when stdout supports it.
pub fn print_summary(summary: &PublishSummary) {
    colored::control::set_override(supports_color::on(Stream::Stdout).is_some());
    println!("{}", format_summary(summary));
}

fn format_summary(summary: &PublishSummary) -> String {
    let mut lines = vec![format!(
        "{} {}",
        "Published".green().bold(),
        summary.dist.display()
    )];
    if summary.cleaned {
        lines.push(format!("  {} previous output", "cleaned".yellow()));
    }
    lines.push(format!(
        "  {} asset file(s), {} content entr(ies)",
        summary.asset_files.to_string().cyan(),
        summary.content_nodes.to_string().cyan()
    ));
    lines.join("\n")
}
