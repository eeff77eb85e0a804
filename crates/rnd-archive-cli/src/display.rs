//! Terminal rendering of result views and toasts

use colored::Colorize;
use rnd_archive::services::render::{CardActionKind, Thumbnail};
use rnd_archive::{ChartCard, ResultsGrid, ResultsView, Severity, ToastMessage};

pub fn print_view(view: &ResultsView, base_url: &str) {
    if let Some(label) = &view.result_count_label {
        println!("{}", label.bold());
    }

    match &view.grid {
        ResultsGrid::NoResults(empty) => {
            println!("  {}", empty.heading.yellow());
            println!("  {}", empty.hint.dimmed());
        }
        ResultsGrid::Cards(cards) => {
            for card in cards {
                print_card(card, base_url);
            }
        }
    }

    if view.load_more_visible {
        println!("\n{}", format!("More results available ({} shown)", view.card_count()).dimmed());
    }
}

pub fn print_card(card: &ChartCard, base_url: &str) {
    let badge = card
        .archived_badge
        .as_deref()
        .map(|b| format!(" [{}]", b).yellow().to_string())
        .unwrap_or_default();
    let thumb = match &card.thumbnail {
        Thumbnail::Image { .. } => "▣",
        Thumbnail::Placeholder => "□",
    };

    println!(
        "  {} {} {}{}",
        thumb.dimmed(),
        truncate_string(&card.title, 60).cyan().bold(),
        format!("#{}", card.id).dimmed(),
        badge
    );
    println!("    {}", truncate_string(&card.description, 76));

    if !card.tags.is_empty() {
        let tags: Vec<String> = card.tags.iter().map(|t| format!("[{}]", t)).collect();
        println!("    {}", tags.join(" ").dimmed());
    }

    let details = card
        .actions
        .iter()
        .find(|a| a.kind == CardActionKind::Details)
        .map(|a| format!("{}{}", base_url.trim_end_matches('/'), a.href))
        .unwrap_or_default();
    println!("    {} {}", card.published_label.dimmed(), details.dimmed());
}

pub fn print_toast(toast: &ToastMessage) {
    let text = match toast.severity {
        Severity::Danger => toast.text.red(),
        Severity::Warning => toast.text.yellow(),
        Severity::Success => toast.text.green(),
        Severity::Info => toast.text.normal(),
    };
    eprintln!("{} {}", format!("[{}]", toast.severity).dimmed(), text);
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Wählergruppen", 5), "Wähle...");
        assert_eq!(truncate_string("kurz", 10), "kurz");
    }
}
