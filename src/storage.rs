//! CSV persistence for tickers and the discovered pair snapshot
//!
//! One CSV file per UTC date and pair, header written once per file. The
//! pair snapshot is a compact JSON array read by external dashboards so
//! they never have to call the exchange APIs themselves.

use crate::discovery::Pair;
use crate::ticker::Ticker;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn csv_path(&self, pair_name: &str) -> PathBuf {
        let date = Utc::now().format("%Y%m%d");
        self.data_dir
            .join(format!("{}_{}_futures.csv", date, pair_name.to_lowercase()))
    }

    /// Append one ticker row, writing the header first for a fresh file
    pub fn save_ticker(&self, ticker: &Ticker, pair_name: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.csv_path(pair_name);
        let write_header = !path.exists();

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if write_header {
            writeln!(file, "{}", Ticker::csv_header())?;
        }
        writeln!(file, "{}", ticker.to_csv_row())?;
        Ok(())
    }

    /// Overwrite the discovered pair list snapshot at `data/pairs.json`
    pub fn save_pairs(&self, pairs: &[Pair]) -> anyhow::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string(pairs)?;
        fs::write(self.pairs_path(), json)?;
        Ok(())
    }

    fn pairs_path(&self) -> PathBuf {
        self.data_dir.join("pairs.json")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ticker(exchange: &str) -> Ticker {
        Ticker {
            exchange: exchange.to_string(),
            symbol: "RIVER_USDT".to_string(),
            timestamp: Utc::now(),
            last_price: "1.23".to_string(),
            mark_price: "1.24".to_string(),
            index_price: "1.25".to_string(),
            funding_rate: "0.0001".to_string(),
            funding_interval_hours: Some(8.0),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path());

        store.save_ticker(&ticker("gate"), "RIVER").unwrap();
        store.save_ticker(&ticker("phemex"), "RIVER").unwrap();

        let path = store.csv_path("RIVER");
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], Ticker::csv_header());
        assert!(lines[1].contains(",gate,"));
        assert!(lines[2].contains(",phemex,"));
    }

    #[test]
    fn test_file_scoped_by_pair() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path());

        store.save_ticker(&ticker("gate"), "RIVER").unwrap();
        store.save_ticker(&ticker("gate"), "SENT").unwrap();

        assert!(store.csv_path("RIVER").exists());
        assert!(store.csv_path("SENT").exists());
        assert_ne!(store.csv_path("RIVER"), store.csv_path("SENT"));
    }

    #[test]
    fn test_csv_path_lowercases_pair() {
        let store = CsvStore::new("./data");
        let path = store.csv_path("RIVER");
        assert!(path.to_string_lossy().ends_with("_river_futures.csv"));
    }

    #[test]
    fn test_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("data");
        let store = CsvStore::new(&nested);

        store.save_ticker(&ticker("gate"), "RIVER").unwrap();
        assert!(store.data_dir().exists());
    }

    #[test]
    fn test_save_pairs_compact_json() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path());

        let pairs = vec![
            Pair {
                name: "BTC".to_string(),
                gate: "BTC_USDT".to_string(),
                phemex: "BTCUSDT".to_string(),
            },
            Pair {
                name: "ETH".to_string(),
                gate: "ETH_USDT".to_string(),
                phemex: "ETHUSDT".to_string(),
            },
        ];
        store.save_pairs(&pairs).unwrap();

        let content = std::fs::read_to_string(dir.path().join("pairs.json")).unwrap();
        assert!(content.starts_with(r#"[{"name":"BTC""#));
        assert!(!content.contains('\n'));

        let parsed: Vec<Pair> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, pairs);
    }

    #[test]
    fn test_save_pairs_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path());

        store
            .save_pairs(&[Pair {
                name: "BTC".to_string(),
                gate: "BTC_USDT".to_string(),
                phemex: "BTCUSDT".to_string(),
            }])
            .unwrap();
        store.save_pairs(&[]).unwrap();

        let content = std::fs::read_to_string(dir.path().join("pairs.json")).unwrap();
        assert_eq!(content, "[]");
    }
}
