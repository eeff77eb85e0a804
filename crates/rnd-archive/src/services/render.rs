//! Rendering - Result items to view-models
//!
//! Pure functions; nothing here knows how cards end up on screen.

use serde::Serialize;

use crate::domain::entities::ResultItem;
use crate::domain::value_objects::SortKey;
use crate::services::format::format_optional_date;

pub const NO_DESCRIPTION: &str = "No description";
pub const NO_RESULTS_HEADING: &str = "No charts found";
pub const NO_RESULTS_HINT: &str = "Try different search terms or filters.";
pub const LOADING_MESSAGE: &str = "Loading...";
pub const ARCHIVED_BADGE: &str = "Archived";

/// One result card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartCard {
    pub id: String,
    pub title: String,
    /// Full title for when the card truncates it
    pub title_tooltip: String,
    pub description: String,
    pub description_tooltip: Option<String>,
    pub thumbnail: Thumbnail,
    pub archived_badge: Option<String>,
    pub tags: Vec<String>,
    pub published_label: String,
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Thumbnail {
    Image { src: String, alt: String },
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardActionKind {
    Details,
    Print,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAction {
    pub kind: CardActionKind,
    pub href: String,
    pub tooltip: String,
}

/// Placeholder shown instead of an empty grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub heading: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ResultsGrid {
    Cards(Vec<ChartCard>),
    NoResults(EmptyState),
}

impl ResultsGrid {
    pub fn cards(&self) -> &[ChartCard] {
        match self {
            ResultsGrid::Cards(cards) => cards,
            ResultsGrid::NoResults(_) => &[],
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, ResultsGrid::NoResults(_))
    }
}

impl Default for ResultsGrid {
    fn default() -> Self {
        ResultsGrid::Cards(Vec::new())
    }
}

/// Everything the browse page displays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    pub grid: ResultsGrid,
    pub result_count_label: Option<String>,
    pub load_more_visible: bool,
    /// Spinner text while a fetch is running
    pub loading: Option<String>,
    // Mirrors of the filter widgets
    pub query_text: String,
    pub selected_tags: Vec<String>,
    pub sort_key: SortKey,
}

impl ResultsView {
    /// Show a fresh result list, or the placeholder when it is empty
    pub fn replace(&mut self, cards: Vec<ChartCard>) {
        self.grid = if cards.is_empty() {
            ResultsGrid::NoResults(no_results())
        } else {
            ResultsGrid::Cards(cards)
        };
    }

    /// Add a continuation page after the cards already shown
    pub fn append(&mut self, cards: Vec<ChartCard>) {
        if let ResultsGrid::Cards(existing) = &mut self.grid {
            existing.extend(cards);
        } else if !cards.is_empty() {
            self.grid = ResultsGrid::Cards(cards);
        }
    }

    pub fn card_count(&self) -> usize {
        self.grid.cards().len()
    }
}

pub fn render_card(item: &ResultItem) -> ChartCard {
    let thumbnail = match item.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
        Some(src) => Thumbnail::Image {
            src: src.to_string(),
            alt: item.title.clone(),
        },
        None => Thumbnail::Placeholder,
    };

    let description = item.description_text();

    ChartCard {
        id: item.id.clone(),
        title: item.title.clone(),
        title_tooltip: item.title.clone(),
        description: description.unwrap_or(NO_DESCRIPTION).to_string(),
        description_tooltip: description.map(str::to_string),
        thumbnail,
        archived_badge: item.is_archived.then(|| ARCHIVED_BADGE.to_string()),
        tags: item.tags.clone(),
        published_label: format_optional_date(item.published_date.as_ref()),
        actions: vec![
            CardAction {
                kind: CardActionKind::Details,
                href: format!("/charts/{}/", item.id),
                tooltip: "Show details".to_string(),
            },
            CardAction {
                kind: CardActionKind::Print,
                href: format!("/charts/{}/print/", item.id),
                tooltip: "Print view".to_string(),
            },
        ],
    }
}

/// Render items in response order
pub fn render_page(items: &[ResultItem]) -> Vec<ChartCard> {
    items.iter().map(render_card).collect()
}

pub fn no_results() -> EmptyState {
    EmptyState {
        heading: NO_RESULTS_HEADING.to_string(),
        hint: NO_RESULTS_HINT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> ResultItem {
        ResultItem::new("a1B2c", "Sales by region")
            .with_description("Quarterly sales")
            .with_thumbnail("/media/a1B2c.png")
            .with_tags(["Wirtschaft", "Karte"])
            .with_published_date(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap())
    }

    #[test]
    fn test_render_card() {
        let card = render_card(&sample());

        assert_eq!(card.id, "a1B2c");
        assert_eq!(card.description, "Quarterly sales");
        assert_eq!(card.description_tooltip.as_deref(), Some("Quarterly sales"));
        assert_eq!(
            card.thumbnail,
            Thumbnail::Image {
                src: "/media/a1B2c.png".to_string(),
                alt: "Sales by region".to_string()
            }
        );
        assert_eq!(card.archived_badge, None);
        assert_eq!(card.tags, vec!["Wirtschaft", "Karte"]);
        let published = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(card.published_label, crate::services::format::format_date(&published));
        assert_eq!(card.actions[0].href, "/charts/a1B2c/");
        assert_eq!(card.actions[1].href, "/charts/a1B2c/print/");
    }

    #[test]
    fn test_render_card_fallbacks() {
        let item = ResultItem::new("z", "Bare").with_description("   ").archived();
        let card = render_card(&item);

        assert_eq!(card.description, NO_DESCRIPTION);
        assert_eq!(card.description_tooltip, None);
        assert_eq!(card.thumbnail, Thumbnail::Placeholder);
        assert_eq!(card.archived_badge.as_deref(), Some(ARCHIVED_BADGE));
        assert_eq!(card.published_label, "–");
    }

    #[test]
    fn test_replace_with_empty_shows_placeholder() {
        let mut view = ResultsView::default();
        view.replace(render_page(&[sample()]));
        assert_eq!(view.card_count(), 1);

        view.replace(Vec::new());
        assert!(view.grid.is_no_results());
        assert_eq!(view.card_count(), 0);
    }

    #[test]
    fn test_append_keeps_existing_cards() {
        let mut view = ResultsView::default();
        view.replace(render_page(&[ResultItem::new("1", "one")]));
        view.append(render_page(&[ResultItem::new("2", "two"), ResultItem::new("3", "three")]));

        let ids: Vec<_> = view.grid.cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
