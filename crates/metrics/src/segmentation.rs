use core_types::{TickerRecord, UNKNOWN_SEGMENT};
use std::collections::HashMap;

/// Maps ticker to its peer segment (the sector).
#[derive(Debug, Clone, Default)]
pub struct SegmentMap {
    sectors: HashMap<String, String>,
}

impl SegmentMap {
    pub fn from_tickers(tickers: &[TickerRecord]) -> Self {
        let sectors = tickers
            .iter()
            .filter_map(|t| {
                t.sector
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| (t.ticker.clone(), s.to_string()))
            })
            .collect();
        Self { sectors }
    }

    /// The ticker's sector, or `"Unknown"` when it has none.
    pub fn segment_for(&self, ticker: &str) -> &str {
        self.sectors
            .get(ticker)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SEGMENT)
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sector_maps_to_unknown() {
        let map = SegmentMap::from_tickers(&[
            TickerRecord {
                ticker: "AAPL".to_string(),
                sector: Some("Technology".to_string()),
            },
            TickerRecord {
                ticker: "SPAC".to_string(),
                sector: None,
            },
            TickerRecord {
                ticker: "BLNK".to_string(),
                sector: Some("  ".to_string()),
            },
        ]);
        assert_eq!(map.segment_for("AAPL"), "Technology");
        assert_eq!(map.segment_for("SPAC"), "Unknown");
        assert_eq!(map.segment_for("BLNK"), "Unknown");
        assert_eq!(map.segment_for("NOPE"), "Unknown");
        assert_eq!(map.len(), 1);
    }
}
