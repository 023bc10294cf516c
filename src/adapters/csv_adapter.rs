//! CSV file data adapter: trade log, rate series and snapshot reload.

use crate::domain::error::IdxtraderError;
use crate::domain::metrics::PnlRow;
use crate::domain::rate::{RatePoint, RateSeries};
use crate::domain::trade::{EntryPrice, TradeCandidate};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Columns every trade log must carry.
pub const REQUIRED_TRADE_COLUMNS: [&str; 7] =
    ["Date", "Ticker", "Open", "Close", "Volume", "ADV20", "Volatility"];

pub struct CsvAdapter {
    trade_log_path: PathBuf,
    rates_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(trade_log_path: PathBuf, rates_path: PathBuf) -> Self {
        Self {
            trade_log_path,
            rates_path,
        }
    }
}

/// Header name to column position.
struct Header {
    file: String,
    columns: HashMap<String, usize>,
}

impl Header {
    fn read<R: std::io::Read>(rdr: &mut csv::Reader<R>, file: &str) -> Result<Self, IdxtraderError> {
        let columns = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Ok(Self {
            file: file.to_string(),
            columns,
        })
    }

    fn require(&self, name: &str) -> Result<usize, IdxtraderError> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| IdxtraderError::MissingColumn {
                file: self.file.clone(),
                column: name.to_string(),
            })
    }

    fn optional(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    fn first_of(&self, names: &[&str]) -> Result<usize, IdxtraderError> {
        names
            .iter()
            .find_map(|n| self.optional(n))
            .ok_or_else(|| IdxtraderError::MissingColumn {
                file: self.file.clone(),
                column: names[0].to_string(),
            })
    }
}

/// One record with its source location for error messages.
struct Row<'a> {
    record: &'a csv::StringRecord,
    file: &'a str,
    line: u64,
}

impl<'a> Row<'a> {
    fn new(record: &'a csv::StringRecord, file: &'a str) -> Self {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Self { record, file, line }
    }

    fn invalid(&self, reason: String) -> IdxtraderError {
        IdxtraderError::InvalidRow {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }

    fn text(&self, col: usize) -> &'a str {
        self.record.get(col).unwrap_or("").trim()
    }

    fn opt_text(&self, col: Option<usize>) -> Option<String> {
        col.map(|c| self.text(c))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn date(&self, col: usize, name: &str) -> Result<NaiveDate, IdxtraderError> {
        parse_date(self.text(col))
            .ok_or_else(|| self.invalid(format!("invalid {} value '{}'", name, self.text(col))))
    }

    fn opt_number(&self, col: Option<usize>, name: &str) -> Result<Option<f64>, IdxtraderError> {
        let Some(col) = col else {
            return Ok(None);
        };
        let raw = self.text(col);
        if is_blank(raw) {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|e| self.invalid(format!("invalid {} value '{}': {}", name, raw, e)))
    }

    fn opt_day(&self, col: Option<usize>, name: &str) -> Result<Option<u32>, IdxtraderError> {
        match self.opt_number(col, name)? {
            None => Ok(None),
            Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(Some(v as u32)),
            Some(v) => Err(self.invalid(format!("invalid {} value {}", name, v))),
        }
    }
}

fn is_blank(raw: &str) -> bool {
    raw.is_empty() || raw == "." || raw.eq_ignore_ascii_case("nan")
}

/// Parse `YYYY-MM-DD`, ignoring any time or zone suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, IdxtraderError> {
    let file = std::fs::File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("failed to read {}: {}", path.display(), e))
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

pub fn read_trade_log(path: &Path, entry: EntryPrice) -> Result<Vec<TradeCandidate>, IdxtraderError> {
    let file = path.display().to_string();
    let mut rdr = open_reader(path)?;
    let header = Header::read(&mut rdr, &file)?;

    for column in REQUIRED_TRADE_COLUMNS {
        header.require(column)?;
    }
    header.require(entry.column())?;

    let date_col = header.require("Date")?;
    let ticker_col = header.require("Ticker")?;
    let open_col = header.require("Open")?;
    let close_col = header.require("Close")?;
    let volume_col = header.require("Volume")?;
    let adv20_col = header.require("ADV20")?;
    let volatility_col = header.require("Volatility")?;
    let prev_close_col = header.optional("Previous_Close");
    let lookback_col = header.optional("Previous_Close_7D");
    let index_col = header.optional("Index_Name");
    let event_col = header.optional("Event_Type");
    let day_col = header.optional("strategy_2_n");

    let mut candidates = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = Row::new(&record, &file);

        let ticker = row.text(ticker_col);
        if ticker.is_empty() {
            return Err(row.invalid("missing Ticker value".into()));
        }

        candidates.push(TradeCandidate {
            ticker: ticker.to_string(),
            date: row.date(date_col, "Date")?,
            open: row.opt_number(Some(open_col), "Open")?,
            close: row.opt_number(Some(close_col), "Close")?,
            previous_close: row.opt_number(prev_close_col, "Previous_Close")?,
            lookback_close: row.opt_number(lookback_col, "Previous_Close_7D")?,
            volume: row.opt_number(Some(volume_col), "Volume")?,
            adv20: row.opt_number(Some(adv20_col), "ADV20")?,
            volatility: row.opt_number(Some(volatility_col), "Volatility")?,
            index_name: row.opt_text(index_col),
            event_type: row.opt_text(event_col),
            holding_day: row.opt_day(day_col, "strategy_2_n")?,
        });
    }

    log::info!("loaded {} trade candidates from {}", candidates.len(), file);
    Ok(candidates)
}

pub fn read_rates(path: &Path) -> Result<RateSeries, IdxtraderError> {
    let file = path.display().to_string();
    let mut rdr = open_reader(path)?;
    let header = Header::read(&mut rdr, &file)?;
    let date_col = header.require("DATE")?;
    let rate_col = header.require("SOFR")?;

    let mut points = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = Row::new(&record, &file);

        let raw_date = row.text(date_col);
        let date = parse_date(raw_date).ok_or_else(|| IdxtraderError::MalformedRateSeries {
            reason: format!("{}:{}: unparseable date '{}'", file, row.line, raw_date),
        })?;

        let raw_rate = row.text(rate_col);
        if is_blank(raw_rate) {
            continue;
        }
        let rate = raw_rate
            .parse::<f64>()
            .map_err(|e| IdxtraderError::MalformedRateSeries {
                reason: format!("{}:{}: invalid rate '{}': {}", file, row.line, raw_rate, e),
            })?;

        points.push(RatePoint { date, rate });
    }

    log::info!("loaded {} financing rates from {}", points.len(), file);
    Ok(RateSeries::new(points))
}

/// Reload a snapshot CSV as the rows metrics need, sorted by date.
///
/// Accepts `Long_Overnight_Cost` in place of `Overnight_Cost`.
pub fn read_snapshot_pnl(path: &Path) -> Result<Vec<PnlRow>, IdxtraderError> {
    let file = path.display().to_string();
    let mut rdr = open_reader(path)?;
    let header = Header::read(&mut rdr, &file)?;
    let date_col = header.require("Date")?;
    let position_col = header.require("Total_Position_Size")?;
    let rgl_col = header.require("RGL")?;
    let tc_col = header.require("Transaction_Costs")?;
    let slippage_col = header.require("Slippage_Cost")?;
    let overnight_col = header.first_of(&["Overnight_Cost", "Long_Overnight_Cost"])?;

    let mut dated = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = Row::new(&record, &file);
        let date = row.date(date_col, "Date")?;
        let value = |col: usize, name: &str| -> Result<f64, IdxtraderError> {
            Ok(row.opt_number(Some(col), name)?.unwrap_or(0.0))
        };
        let daily_pnl = value(rgl_col, "RGL")?
            - value(tc_col, "Transaction_Costs")?
            - value(overnight_col, "Overnight_Cost")?
            - value(slippage_col, "Slippage_Cost")?;
        dated.push((
            date,
            PnlRow {
                total_position_size: value(position_col, "Total_Position_Size")?,
                daily_pnl,
            },
        ));
    }

    dated.sort_by_key(|(date, _)| *date);
    Ok(dated.into_iter().map(|(_, row)| row).collect())
}

impl DataPort for CsvAdapter {
    fn load_trade_log(&self, entry: EntryPrice) -> Result<Vec<TradeCandidate>, IdxtraderError> {
        read_trade_log(&self.trade_log_path, entry)
    }

    fn load_rates(&self) -> Result<RateSeries, IdxtraderError> {
        read_rates(&self.rates_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TRADE_LOG: &str = "Date,Ticker,Open,Close,Volume,ADV20,Volatility,Previous_Close,Previous_Close_7D,Index_Name,Event_Type,strategy_2_n\n\
        2024-03-18,DECK,100.0,102.0,1000,2000,0.01,99.5,97.0,S&P MidCap 400,Index Review,7\n\
        2024-03-18 00:00:00-04:00,SMCI,50.0,49.0,500,,,,,S&P MidCap 400,Index Review,7.0\n\
        2024-03-19,DECK,102.0,103.0,800,2100,0.02,102.0,98.0,S&P 500,Corporate Action,2\n";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 18);
        assert_eq!(parse_date("2024-03-18"), expected);
        assert_eq!(parse_date("2024-03-18 00:00:00-04:00"), expected);
        assert_eq!(parse_date("2024-03-18T09:30:00"), expected);
        assert_eq!(parse_date("03/18/2024"), None);
    }

    #[test]
    fn reads_trade_log_rows() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "log.csv", TRADE_LOG);
        let rows = read_trade_log(&path, EntryPrice::LookbackClose).unwrap();

        assert_eq!(rows.len(), 3);
        let deck = &rows[0];
        assert_eq!(deck.ticker, "DECK");
        assert_eq!(deck.date, NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
        assert_eq!(deck.open, Some(100.0));
        assert_eq!(deck.adv20, Some(2000.0));
        assert_eq!(deck.previous_close, Some(99.5));
        assert_eq!(deck.lookback_close, Some(97.0));
        assert_eq!(deck.index_name.as_deref(), Some("S&P MidCap 400"));
        assert_eq!(deck.holding_day, Some(7));

        let smci = &rows[1];
        assert_eq!(smci.adv20, None);
        assert_eq!(smci.volatility, None);
        assert_eq!(smci.lookback_close, None);
        assert_eq!(smci.holding_day, Some(7));
    }

    #[test]
    fn missing_required_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "log.csv", "Date,Ticker,Open,Close,Volume,Volatility\n");
        let err = read_trade_log(&path, EntryPrice::Open).unwrap_err();
        assert!(matches!(err, IdxtraderError::MissingColumn { column, .. } if column == "ADV20"));
    }

    #[test]
    fn missing_entry_basis_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "log.csv", "Date,Ticker,Open,Close,Volume,ADV20,Volatility\n");
        assert!(read_trade_log(&path, EntryPrice::Open).is_ok());
        let err = read_trade_log(&path, EntryPrice::PreviousClose).unwrap_err();
        assert!(matches!(err, IdxtraderError::MissingColumn { column, .. } if column == "Previous_Close"));
    }

    #[test]
    fn unparseable_price_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "log.csv",
            "Date,Ticker,Open,Close,Volume,ADV20,Volatility\n2024-01-02,X,abc,1,1,1,0.1\n",
        );
        let err = read_trade_log(&path, EntryPrice::Open).unwrap_err();
        assert!(matches!(err, IdxtraderError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn blank_price_cells_load_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "log.csv",
            "Date,Ticker,Open,Close,Volume,ADV20,Volatility,Previous_Close\n\
             2024-01-02,NOOPEN,,11,100,2000,0.01,10\n\
             2024-01-02,NOCLOSE,10,,100,2000,0.01,10\n\
             2024-01-02,NOVOL,10,11,,2000,0.01,10\n\
             2024-01-02,OK,10,11,100,2000,0.01,10\n",
        );
        let rows = read_trade_log(&path, EntryPrice::PreviousClose).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].open, None);
        assert_eq!(rows[0].entry_price(EntryPrice::PreviousClose), Some(10.0));
        assert_eq!(rows[1].close, None);
        assert_eq!(rows[2].volume, None);
        assert_eq!(rows[3].volume, Some(100.0));
    }

    #[test]
    fn blank_ticker_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "log.csv",
            "Date,Ticker,Open,Close,Volume,ADV20,Volatility\n2024-01-02,,10,11,100,2000,0.01\n",
        );
        let err = read_trade_log(&path, EntryPrice::Open).unwrap_err();
        assert!(matches!(err, IdxtraderError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn reads_and_sorts_rates() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sofr.csv", "DATE,SOFR\n2024-01-03,5.31\n2024-01-01,.\n2024-01-02,5.30\n");
        let series = read_rates(&path).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(series.points()[1].rate, 5.31);
    }

    #[test]
    fn unparseable_rate_date_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sofr.csv", "DATE,SOFR\n01/02/2024,5.3\n");
        let err = read_rates(&path).unwrap_err();
        assert!(matches!(err, IdxtraderError::MalformedRateSeries { .. }));
    }

    #[test]
    fn missing_rate_file_is_io_error() {
        let err = read_rates(Path::new("/nonexistent/sofr.csv")).unwrap_err();
        assert!(matches!(err, IdxtraderError::Io(_)));
    }

    #[test]
    fn snapshot_reload_accepts_long_overnight_alias() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "results.csv",
            "Date,Total_Position_Size,Total_Sale_Proceeds,RGL,Transaction_Costs,Slippage_Cost,Long_Overnight_Cost,Cumulative_Net_PnL\n\
             2024-01-03,1000,1010,10,1,0.5,0.5,16\n\
             2024-01-02,2000,2010,10,1,0.5,0.5,8\n",
        );
        let rows = read_snapshot_pnl(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total_position_size, 2000.0);
        assert!((rows[0].daily_pnl - 8.0).abs() < 1e-12);
    }

    #[test]
    fn adapter_implements_data_port() {
        let dir = TempDir::new().unwrap();
        let log = write(&dir, "log.csv", TRADE_LOG);
        let rates = write(&dir, "sofr.csv", "DATE,SOFR\n2024-01-02,5.3\n");
        let adapter = CsvAdapter::new(log, rates);
        assert_eq!(adapter.load_trade_log(EntryPrice::Open).unwrap().len(), 3);
        assert_eq!(adapter.load_rates().unwrap().len(), 1);
    }
}
