//! Loads the bank's recorded gold passbook quotes.
//!
//! The file is delimited text of unknown encoding. Decoding runs through an
//! ordered chain of strategies and the first one that yields the configured
//! column shape wins.

use crate::core::error::{AnalysisError, Result};
use crate::core::window::Dated;
use chrono::NaiveDate;
use csv::StringRecord;
use encoding_rs::BIG5;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const DATE_FORMAT: &str = "%Y%m%d";

/// Bank quotes for one day, in local currency per gram.
///
/// `bank_sell >= bank_buy` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotePoint {
    pub date: NaiveDate,
    pub bank_sell: f64,
    pub bank_buy: f64,
}

impl Dated for QuotePoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Header names of the required columns. Matched after trimming whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteColumns {
    pub date: String,
    pub bank_sell: String,
    pub bank_buy: String,
}

impl Default for QuoteColumns {
    fn default() -> Self {
        QuoteColumns {
            date: "日期".to_string(),
            bank_sell: "本行賣出價格".to_string(),
            bank_buy: "本行買入價格".to_string(),
        }
    }
}

/// Quote points strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuoteHistory {
    points: Vec<QuotePoint>,
}

impl QuoteHistory {
    /// Stable-sorts by date; the last point seen for a date wins.
    pub fn from_points(mut points: Vec<QuotePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<QuotePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        QuoteHistory { points: deduped }
    }

    pub fn points(&self) -> &[QuotePoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&QuotePoint> {
        self.points.last()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reads and parses the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P, columns: &QuoteColumns) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            AnalysisError::DataUnavailable(format!("Failed to read {}: {e}", path.display()))
        })?;
        let history = Self::parse_bytes(&bytes, columns)?;
        debug!("Loaded {} quotes from {}", history.len(), path.display());
        Ok(history)
    }

    /// Runs the decoder chain over raw file contents.
    pub fn parse_bytes(bytes: &[u8], columns: &QuoteColumns) -> Result<Self> {
        let mut schema_error = None;

        for decoder in DECODER_CHAIN {
            let Some(text) = decoder.decode(bytes) else {
                debug!("Quote file is not valid {}", decoder.name());
                continue;
            };
            match parse_text(&text, columns) {
                Ok(history) => {
                    debug!("Decoded quote file as {}", decoder.name());
                    return Ok(history);
                }
                Err(e @ AnalysisError::Schema(_)) => {
                    debug!("Decoded as {} but rejected: {}", decoder.name(), e);
                    schema_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(schema_error.unwrap_or_else(|| {
            AnalysisError::DataUnavailable(
                "Quote file could not be decoded with any supported encoding".to_string(),
            )
        }))
    }
}

/// One attempt at turning the raw bytes into text.
///
/// Only a file carrying the UTF-8 signature is taken as UTF-8 up front.
/// Unsigned files are tried as Big5 first, the usual export encoding, and
/// fall through to plain UTF-8 when Big5 rejects the bytes or the headers.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Decoder {
    Utf8WithSignature,
    Big5,
    Utf8,
}

const DECODER_CHAIN: [Decoder; 3] = [Decoder::Utf8WithSignature, Decoder::Big5, Decoder::Utf8];

impl Decoder {
    fn name(&self) -> &'static str {
        match self {
            Decoder::Utf8WithSignature => "UTF-8 with signature",
            Decoder::Big5 => "Big5",
            Decoder::Utf8 => "UTF-8",
        }
    }

    fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Decoder::Utf8WithSignature => bytes
                .strip_prefix(b"\xEF\xBB\xBF")
                .and_then(|rest| std::str::from_utf8(rest).ok())
                .map(str::to_string),
            Decoder::Big5 => BIG5
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            Decoder::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        }
    }
}

struct ColumnIndex {
    date: usize,
    bank_sell: usize,
    bank_buy: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &QuoteColumns) -> Result<Self> {
        let header_map: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();
        let find = |name: &str| {
            header_map.get(name.trim()).copied().ok_or_else(|| {
                AnalysisError::Schema(format!(
                    "Missing required column '{}' (found: {})",
                    name,
                    headers.iter().map(str::trim).collect::<Vec<_>>().join(", ")
                ))
            })
        };

        Ok(ColumnIndex {
            date: find(&columns.date)?,
            bank_sell: find(&columns.bank_sell)?,
            bank_buy: find(&columns.bank_buy)?,
        })
    }
}

fn parse_text(text: &str, columns: &QuoteColumns) -> Result<QuoteHistory> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::Schema(format!("Failed to read headers: {e}")))?
        .clone();
    let index = ColumnIndex::resolve(&headers, columns)?;

    let mut points = Vec::new();
    let mut rows = 0usize;
    let mut dropped = 0usize;

    for (line, record) in reader.records().enumerate() {
        // header is line 1
        let line = line + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line, "Skipping unreadable row: {e}");
                continue;
            }
        };
        rows += 1;

        let field = |i: usize| record.get(i).unwrap_or("");
        let Some(date) = parse_date(field(index.date)) else {
            dropped += 1;
            warn!(line, value = field(index.date), "Skipping row with invalid date");
            continue;
        };
        let (Some(bank_sell), Some(bank_buy)) =
            (parse_price(field(index.bank_sell)), parse_price(field(index.bank_buy)))
        else {
            dropped += 1;
            warn!(line, %date, "Skipping row with invalid price");
            continue;
        };

        points.push(QuotePoint {
            date,
            bank_sell,
            bank_buy,
        });
    }

    if rows > 0 && dropped == rows {
        return Err(AnalysisError::Schema(format!(
            "None of the {rows} rows has a {DATE_FORMAT} date in column '{}' and numeric prices in '{}' and '{}'",
            columns.date, columns.bank_sell, columns.bank_buy
        )));
    }

    let inverted = points.iter().filter(|p| p.bank_sell < p.bank_buy).count();
    if inverted > 0 {
        warn!(inverted, "Quotes where the bank sell price is below the buy price");
    }

    Ok(QuoteHistory::from_points(points))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn parse_price(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
