#![allow(dead_code)]

use chrono::NaiveDate;
use idxtrader::domain::error::IdxtraderError;
use idxtrader::domain::rate::{RatePoint, RateSeries};
use idxtrader::domain::trade::{EntryPrice, TradeCandidate};
use idxtrader::ports::data_port::DataPort;
use std::cell::RefCell;
use std::io::Write;

pub struct MockDataPort {
    pub candidates: Vec<TradeCandidate>,
    pub rates: Vec<RatePoint>,
    pub trade_log_error: Option<String>,
    pub requested_entries: RefCell<Vec<EntryPrice>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            rates: Vec::new(),
            trade_log_error: None,
            requested_entries: RefCell::new(Vec::new()),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<TradeCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_rates(mut self, rates: Vec<RatePoint>) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_missing_column(mut self, column: &str) -> Self {
        self.trade_log_error = Some(column.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_trade_log(&self, entry: EntryPrice) -> Result<Vec<TradeCandidate>, IdxtraderError> {
        self.requested_entries.borrow_mut().push(entry);
        if let Some(column) = &self.trade_log_error {
            return Err(IdxtraderError::MissingColumn {
                file: "mock".to_string(),
                column: column.clone(),
            });
        }
        Ok(self.candidates.clone())
    }

    fn load_rates(&self) -> Result<RateSeries, IdxtraderError> {
        Ok(RateSeries::new(self.rates.clone()))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Candidate with every optional price present: previous and lookback
/// closes equal the open, ADV20 twice the volume.
pub fn make_candidate(ticker: &str, date: NaiveDate, open: f64, close: f64) -> TradeCandidate {
    TradeCandidate {
        ticker: ticker.to_string(),
        date,
        open: Some(open),
        close: Some(close),
        previous_close: Some(open),
        lookback_close: Some(open),
        volume: Some(1000.0),
        adv20: Some(2000.0),
        volatility: Some(0.01),
        index_name: None,
        event_type: None,
        holding_day: None,
    }
}

pub fn tagged(mut c: TradeCandidate, index: &str, event: &str, day: u32) -> TradeCandidate {
    c.index_name = Some(index.to_string());
    c.event_type = Some(event.to_string());
    c.holding_day = Some(day);
    c
}

pub fn flat_rates(start: NaiveDate, days: u64, rate: f64) -> Vec<RatePoint> {
    (0..days)
        .map(|i| RatePoint {
            date: start + chrono::Days::new(i),
            rate,
        })
        .collect()
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
