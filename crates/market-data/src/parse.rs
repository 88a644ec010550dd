use crate::error::ApiError;
use chrono::NaiveDate;
use core_types::{Instrument, PricePoint, PriceSeries};
use rust_decimal::Decimal;
use std::io::{Read, Write};
use std::str::FromStr;

pub const DATE_COLUMN: &str = "date";
pub const ADJ_CLOSE_COLUMN: &str = "adjClose";

/// Parses a price history in the provider's CSV layout.
///
/// Only the `date` and `adjClose` columns are read; any others are ignored.
/// Rows with a blank `adjClose` are skipped, which leaves a gap that the aligner
/// later drops for every instrument.
pub fn parse_price_csv<R: Read>(instrument: &Instrument, reader: R) -> Result<PriceSeries, ApiError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ApiError::InvalidData {
                instrument: instrument.clone(),
                line: 1,
                reason: format!("missing '{name}' column"),
            })
    };
    let date_idx = column(DATE_COLUMN)?;
    let price_idx = column(ADJ_CLOSE_COLUMN)?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let invalid = |reason: String| ApiError::InvalidData {
            instrument: instrument.clone(),
            line,
            reason,
        };

        let raw_price = record.get(price_idx).unwrap_or_default();
        if raw_price.is_empty() {
            skipped += 1;
            continue;
        }
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| invalid(format!("bad date '{raw_date}'")))?;
        let adj_close = parse_decimal(raw_price)
            .ok_or_else(|| invalid(format!("bad adjusted close '{raw_price}'")))?;
        points.push(PricePoint { date, adj_close });
    }

    if skipped > 0 {
        tracing::debug!(%instrument, skipped, "rows without an adjusted close were skipped");
    }
    Ok(PriceSeries::new(instrument.clone(), points))
}

/// Writes a price history in the layout read by [`parse_price_csv`].
pub fn write_price_csv<W: Write>(series: &PriceSeries, writer: W) -> Result<(), ApiError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([DATE_COLUMN, ADJ_CLOSE_COLUMN])?;
    for point in &series.points {
        writer.write_record([point.date.to_string(), point.adj_close.to_string()])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Accepts `YYYY-MM-DD` and timestamps that start with one (`2020-01-31T00:00:00.000Z`).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    if raw.len() > 10 && !raw[10..].starts_with(['T', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spy() -> Instrument {
        Instrument::normalized("SPY").unwrap()
    }

    const TIINGO_CSV: &str = "\
date,close,high,low,open,volume,adjClose,adjHigh,adjLow,adjOpen,adjVolume,divCash,splitFactor
2020-01-31,321.73,332.95,320.36,323.54,1.6e9,300.1234,310.5,298.8,301.7,1.6e9,0.0,1.0
2020-02-28,296.26,339.08,285.54,323.35,2.6e9,276.3501,316.2,266.3,301.5,2.6e9,0.0,1.0
2020-03-31,257.75,313.84,218.26,298.21,4.5e9,242.1002,294.8,205.0,280.1,4.5e9,1.4,1.0
";

    #[test]
    fn reads_date_and_adjusted_close() {
        let series = parse_price_csv(&spy(), TIINGO_CSV.as_bytes()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
        assert_eq!(series.points[2].adj_close, Decimal::from_str("242.1002").unwrap());
    }

    #[test]
    fn skips_blank_prices_and_accepts_timestamps() {
        let body = "date,adjClose\n2020-01-31T00:00:00.000Z,10.5\n2020-02-28,\n2020-03-31,1.2e1\n";
        let series = parse_price_csv(&spy(), body.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[1].adj_close, Decimal::from(12));
    }

    #[test]
    fn rejects_missing_columns_and_bad_values() {
        let missing = parse_price_csv(&spy(), "date,close\n2020-01-31,1\n".as_bytes());
        assert!(matches!(missing, Err(ApiError::InvalidData { line: 1, .. })));

        let bad_price = parse_price_csv(&spy(), "date,adjClose\n2020-01-31,abc\n".as_bytes());
        assert!(matches!(bad_price, Err(ApiError::InvalidData { line: 2, .. })));

        let bad_date = parse_price_csv(&spy(), "date,adjClose\n31/01/2020,1\n".as_bytes());
        assert!(matches!(bad_date, Err(ApiError::InvalidData { .. })));
    }

    #[test]
    fn written_files_read_back() {
        let series = parse_price_csv(&spy(), TIINGO_CSV.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_price_csv(&series, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("date,adjClose\n2020-01-31,300.1234\n"));
        assert_eq!(parse_price_csv(&spy(), buffer.as_slice()).unwrap(), series);
    }
}
