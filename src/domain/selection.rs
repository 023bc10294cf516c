//! Trade log candidate selection.
//!
//! Narrows the aggregated candidate rows to one strategy variant: drop the
//! excluded indices, keep one event type and one holding-day number.

use std::collections::HashSet;

use super::trade::TradeCandidate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLogFilter {
    pub exclude_indices: Vec<String>,
    pub event_type: Option<String>,
    pub holding_day: Option<u32>,
}

impl TradeLogFilter {
    pub fn is_empty(&self) -> bool {
        self.exclude_indices.is_empty() && self.event_type.is_none() && self.holding_day.is_none()
    }

    pub fn matches(&self, candidate: &TradeCandidate) -> bool {
        if !self.exclude_indices.is_empty() {
            if let Some(index) = &candidate.index_name {
                if self.exclude_indices.iter().any(|x| x == index) {
                    return false;
                }
            }
        }

        if let Some(event_type) = &self.event_type {
            if candidate.event_type.as_deref() != Some(event_type.as_str()) {
                return false;
            }
        }

        if let Some(day) = self.holding_day {
            if candidate.holding_day != Some(day) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, candidates: Vec<TradeCandidate>) -> Vec<TradeCandidate> {
        if self.is_empty() {
            return candidates;
        }
        let before = candidates.len();
        let kept: Vec<TradeCandidate> = candidates.into_iter().filter(|c| self.matches(c)).collect();
        log::info!("selection kept {} of {} candidates", kept.len(), before);
        kept
    }
}

/// Parse a comma separated index list, trimming blanks and duplicates.
pub fn parse_index_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candidate(index: Option<&str>, event: Option<&str>, day: Option<u32>) -> TradeCandidate {
        TradeCandidate {
            ticker: "X".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: Some(10.0),
            close: Some(10.0),
            previous_close: None,
            lookback_close: None,
            volume: Some(100.0),
            adv20: None,
            volatility: None,
            index_name: index.map(str::to_string),
            event_type: event.map(str::to_string),
            holding_day: day,
        }
    }

    fn sp400_ir7d() -> TradeLogFilter {
        TradeLogFilter {
            exclude_indices: vec![
                "DJIA".into(),
                "DJTA".into(),
                "S&P 100".into(),
                "S&P 500".into(),
                "S&P SmallCap 600".into(),
            ],
            event_type: Some("Index Review".into()),
            holding_day: Some(7),
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let f = TradeLogFilter::default();
        assert!(f.is_empty());
        let rows = vec![candidate(None, None, None), candidate(Some("DJIA"), None, None)];
        assert_eq!(f.apply(rows).len(), 2);
    }

    #[test]
    fn keeps_matching_row() {
        assert!(sp400_ir7d().matches(&candidate(Some("S&P MidCap 400"), Some("Index Review"), Some(7))));
    }

    #[test]
    fn drops_excluded_index() {
        assert!(!sp400_ir7d().matches(&candidate(Some("S&P 500"), Some("Index Review"), Some(7))));
    }

    #[test]
    fn drops_other_event_type() {
        assert!(!sp400_ir7d().matches(&candidate(Some("S&P MidCap 400"), Some("Corporate Action"), Some(7))));
    }

    #[test]
    fn drops_other_holding_day() {
        assert!(!sp400_ir7d().matches(&candidate(Some("S&P MidCap 400"), Some("Index Review"), Some(2))));
    }

    #[test]
    fn rows_without_required_metadata_are_dropped() {
        assert!(!sp400_ir7d().matches(&candidate(Some("S&P MidCap 400"), None, Some(7))));
        assert!(!sp400_ir7d().matches(&candidate(Some("S&P MidCap 400"), Some("Index Review"), None)));
    }

    #[test]
    fn parse_index_list_trims_and_dedups() {
        assert_eq!(
            parse_index_list(" DJIA, S&P 100 ,,DJIA "),
            vec!["DJIA".to_string(), "S&P 100".to_string()]
        );
    }
}
