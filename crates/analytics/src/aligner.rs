use crate::error::AnalyticsError;
use crate::matrix::{PriceMatrix, PriceRow};
use chrono::NaiveDate;
use core_types::PriceSeries;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// Inner-joins the price series of every instrument on date.
///
/// Only dates for which every instrument has a price survive; nothing is imputed.
/// The first series is the benchmark and stays the first column. Fails when fewer
/// than two rows remain, since no growth ratio can be formed from them.
pub fn align(series: &[PriceSeries]) -> Result<PriceMatrix, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::NoInstruments);
    }

    let mut seen = HashSet::with_capacity(series.len());
    for s in series {
        if !seen.insert(&s.instrument) {
            return Err(AnalyticsError::DuplicateInstrument(s.instrument.clone()));
        }
    }

    let indexed: Vec<BTreeMap<NaiveDate, Decimal>> = series.iter().map(index_by_date).collect();
    let (benchmark, others) = indexed
        .split_first()
        .ok_or(AnalyticsError::NoInstruments)?;

    // The benchmark's dates are iterated in order, so the joined rows are sorted.
    let rows: Vec<PriceRow> = benchmark
        .iter()
        .filter_map(|(date, price)| {
            let mut prices = Vec::with_capacity(indexed.len());
            prices.push(*price);
            for other in others {
                prices.push(*other.get(date)?);
            }
            Some(PriceRow { date: *date, prices })
        })
        .collect();

    for (s, index) in series.iter().zip(&indexed) {
        let dropped = index.len() - rows.len();
        if dropped > 0 {
            tracing::debug!(
                instrument = %s.instrument,
                dropped,
                "dates without a price for every instrument were dropped"
            );
        }
    }

    if rows.len() < 2 {
        return Err(AnalyticsError::InsufficientData { rows: rows.len() });
    }

    let instruments = series.iter().map(|s| s.instrument.clone()).collect();
    Ok(PriceMatrix::new(instruments, rows))
}

/// Keys a series by date. When a date repeats, the later observation wins.
fn index_by_date(series: &PriceSeries) -> BTreeMap<NaiveDate, Decimal> {
    let mut index = BTreeMap::new();
    for point in &series.points {
        if index.insert(point.date, point.adj_close).is_some() {
            tracing::warn!(
                instrument = %series.instrument,
                date = %point.date,
                "duplicate price observation; keeping the later one"
            );
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Instrument, PricePoint};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    fn series(ticker: &str, points: &[(u32, Decimal)]) -> PriceSeries {
        PriceSeries::new(
            Instrument::normalized(ticker).unwrap(),
            points
                .iter()
                .map(|(d, p)| PricePoint { date: day(*d), adj_close: *p })
                .collect(),
        )
    }

    #[test]
    fn drops_dates_missing_from_any_instrument() {
        let spy = series("SPY", &[(1, dec!(100)), (2, dec!(101)), (3, dec!(102)), (4, dec!(103))]);
        let ato = series("ATO", &[(1, dec!(50)), (3, dec!(51)), (4, dec!(52))]);
        let ed = series("ED", &[(1, dec!(70)), (2, dec!(71)), (4, dec!(72)), (5, dec!(73))]);

        let matrix = align(&[spy, ato, ed]).unwrap();

        let dates: Vec<NaiveDate> = matrix.rows().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(4)]);
        assert_eq!(matrix.rows()[1].prices, vec![dec!(103), dec!(52), dec!(72)]);
        assert_eq!(matrix.benchmark().as_str(), "SPY");
    }

    #[test]
    fn sorts_rows_by_date() {
        let spy = series("SPY", &[(3, dec!(3)), (1, dec!(1)), (2, dec!(2))]);
        let matrix = align(&[spy]).unwrap();
        let prices: Vec<Decimal> = matrix.column(0).collect();
        assert_eq!(prices, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn fewer_than_two_common_rows_is_insufficient() {
        let spy = series("SPY", &[(1, dec!(100)), (2, dec!(101))]);
        let ato = series("ATO", &[(2, dec!(50)), (3, dec!(51))]);
        assert_eq!(
            align(&[spy, ato]),
            Err(AnalyticsError::InsufficientData { rows: 1 })
        );
    }

    #[test]
    fn rejects_empty_and_duplicate_input() {
        assert_eq!(align(&[]), Err(AnalyticsError::NoInstruments));

        let spy = series("SPY", &[(1, dec!(100)), (2, dec!(101))]);
        assert!(matches!(
            align(&[spy.clone(), spy]),
            Err(AnalyticsError::DuplicateInstrument(_))
        ));
    }

    #[test]
    fn duplicate_dates_keep_the_later_price() {
        let spy = series("SPY", &[(1, dec!(100)), (2, dec!(101)), (2, dec!(105))]);
        let matrix = align(&[spy]).unwrap();
        assert_eq!(matrix.rows()[1].prices, vec![dec!(105)]);
    }
}
