use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One OHLC observation. Prices are expected to be strictly positive.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    #[inline]
    pub const fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Candles {
    pub timestamp: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl Candles {
    /// Columnar copy of `bars`. Timestamps are the bar indices and volume is
    /// left at zero.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut c = Candles::default();
        for (i, b) in bars.iter().enumerate() {
            c.timestamp.push(i as i64);
            c.open.push(b.open);
            c.high.push(b.high);
            c.low.push(b.low);
            c.close.push(b.close);
            c.volume.push(0.0);
        }
        c
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn select_candle_field(&self, field: &str) -> Result<&[f64], Box<dyn Error>> {
        match field.to_lowercase().as_str() {
            "open" => Ok(&self.open),
            "high" => Ok(&self.high),
            "low" => Ok(&self.low),
            "close" => Ok(&self.close),
            "volume" => Ok(&self.volume),
            _ => Err(format!("Invalid field: {}", field).into()),
        }
    }

    pub fn bar(&self, i: usize) -> Option<Bar> {
        if i >= self.len() {
            return None;
        }
        Some(Bar::new(self.open[i], self.high[i], self.low[i], self.close[i]))
    }

    /// Bars `start..end` as an owned sub-series.
    pub fn window(&self, start: usize, end: usize) -> Candles {
        let end = end.min(self.len());
        let start = start.min(end);
        Candles {
            timestamp: self.timestamp.get(start..end).map(<[i64]>::to_vec).unwrap_or_default(),
            open: self.open[start..end].to_vec(),
            high: self.high[start..end].to_vec(),
            low: self.low[start..end].to_vec(),
            close: self.close[start..end].to_vec(),
            volume: self.volume.get(start..end).map(<[f64]>::to_vec).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CandleRecord {
    #[serde(default)]
    timestamp: Option<i64>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Reads candles from any CSV source with a header row. Column names are
/// matched case-insensitively; `timestamp` and `volume` may be absent.
pub fn read_candles<R: Read>(reader: R) -> Result<Candles, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let headers: StringRecord = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect();
    rdr.set_headers(headers.clone());

    let mut candles = Candles::default();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let rec: CandleRecord = record.deserialize(Some(&headers))?;
        candles.timestamp.push(rec.timestamp.unwrap_or(row as i64));
        candles.open.push(rec.open);
        candles.high.push(rec.high);
        candles.low.push(rec.low);
        candles.close.push(rec.close);
        candles.volume.push(rec.volume.unwrap_or(0.0));
    }

    Ok(candles)
}

pub fn read_candles_from_csv<P: AsRef<Path>>(file_path: P) -> Result<Candles, Box<dyn Error>> {
    let file = File::open(file_path)?;
    read_candles(file)
}
