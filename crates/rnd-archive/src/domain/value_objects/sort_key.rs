//! SortKey - Result ordering requested from the search endpoint

use serde::{Deserialize, Serialize};

/// Sort order for search results
///
/// A leading `-` means descending, as the archive backend expects.
/// Keys the client does not know are passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    PublishedDate,
    PublishedDateDesc,
    Title,
    TitleDesc,
    ChartId,
    ChartIdDesc,
    Other(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::PublishedDate => "published_date",
            SortKey::PublishedDateDesc => "-published_date",
            SortKey::Title => "title",
            SortKey::TitleDesc => "-title",
            SortKey::ChartId => "chart_id",
            SortKey::ChartIdDesc => "-chart_id",
            SortKey::Other(key) => key,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SortKey {
    fn from(s: &str) -> Self {
        match s.trim() {
            "" | "published_date" => SortKey::PublishedDate,
            "-published_date" => SortKey::PublishedDateDesc,
            "title" => SortKey::Title,
            "-title" => SortKey::TitleDesc,
            "chart_id" => SortKey::ChartId,
            "-chart_id" => SortKey::ChartIdDesc,
            other => SortKey::Other(other.to_string()),
        }
    }
}

impl From<String> for SortKey {
    fn from(s: String) -> Self {
        SortKey::from(s.as_str())
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_string()
    }
}

impl std::str::FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SortKey::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_parse() {
        assert_eq!(SortKey::from("-published_date"), SortKey::PublishedDateDesc);
        assert_eq!(SortKey::from("title"), SortKey::Title);
        assert_eq!(SortKey::from(""), SortKey::default());
    }

    #[test]
    fn test_unknown_key_passes_through() {
        let key: SortKey = "-updated_at".parse().unwrap();
        assert_eq!(key, SortKey::Other("-updated_at".to_string()));
        assert_eq!(key.as_str(), "-updated_at");
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let json = serde_json::to_string(&SortKey::TitleDesc).unwrap();
        assert_eq!(json, "\"-title\"");
        let parsed: SortKey = serde_json::from_str("\"chart_id\"").unwrap();
        assert_eq!(parsed, SortKey::ChartId);
    }
}
