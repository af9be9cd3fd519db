//! Feed descriptors.
//!
//! A feed is one category of time-series data published per entity. Each feed has
//! its own endpoint, date field, response layout and persisted file name.

use serde::{Deserialize, Serialize};

const CAFEF_DATA_HISTORY: &str = "https://cafef.vn/du-lieu/Ajax/PageNew/DataHistory";

/// Description of one remote feed and where its dataset lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    /// Short identifier used on the command line and in logs.
    pub name: String,
    /// Endpoint serving pages for this feed.
    pub url: String,
    /// Field holding the `dd/mm/yyyy` date of each record.
    pub date_field: String,
    /// File name of the persisted dataset inside the entity directory.
    pub file_name: String,
    /// JSON pointer to the total remote row count.
    pub total_count_pointer: String,
    /// JSON pointer to the array of records.
    pub rows_pointer: String,
}

impl FeedSpec {
    /// Daily price history.
    pub fn price_history() -> Self {
        Self {
            name: "price_history".into(),
            url: format!("{CAFEF_DATA_HISTORY}/PriceHistory.ashx"),
            date_field: "Ngay".into(),
            file_name: "PriceHistory.csv".into(),
            total_count_pointer: "/Data/TotalCount".into(),
            rows_pointer: "/Data/Data".into(),
        }
    }

    /// Foreign investor trading.
    pub fn foreign_trade() -> Self {
        Self {
            name: "foreign_trade".into(),
            url: format!("{CAFEF_DATA_HISTORY}/GDKhoiNgoai.ashx"),
            date_field: "Ngay".into(),
            file_name: "GDKhoiNgoai.csv".into(),
            total_count_pointer: "/Data/TotalCount".into(),
            rows_pointer: "/Data/Data".into(),
        }
    }

    /// Proprietary (broker self-account) trading.
    pub fn proprietary_trading() -> Self {
        Self {
            name: "proprietary_trading".into(),
            url: format!("{CAFEF_DATA_HISTORY}/GDTuDoanh.ashx"),
            date_field: "Date".into(),
            file_name: "GDTuDoanh.csv".into(),
            total_count_pointer: "/Data/TotalCount".into(),
            rows_pointer: "/Data/Data/ListDataTudoanh".into(),
        }
    }

    /// The built-in feeds in the order a sync visits them.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::price_history(),
            Self::foreign_trade(),
            Self::proprietary_trading(),
        ]
    }

    /// File name without extension, used for sidecar files.
    pub fn file_stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_feeds_have_unique_names_and_files() {
        let feeds = FeedSpec::defaults();
        assert_eq!(feeds.len(), 3);
        for (i, a) in feeds.iter().enumerate() {
            for b in &feeds[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.file_name, b.file_name);
            }
        }
    }

    #[test]
    fn proprietary_trading_uses_nested_rows() {
        let feed = FeedSpec::proprietary_trading();
        assert_eq!(feed.date_field, "Date");
        assert_eq!(feed.rows_pointer, "/Data/Data/ListDataTudoanh");
    }

    #[test]
    fn file_stem_strips_extension() {
        assert_eq!(FeedSpec::price_history().file_stem(), "PriceHistory");
        let mut feed = FeedSpec::price_history();
        feed.file_name = "noext".into();
        assert_eq!(feed.file_stem(), "noext");
    }
}
