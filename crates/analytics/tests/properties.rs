use analytics::beta::{beta, market_variance};
use analytics::{align, compute_returns, AnalyticsError, PeriodClassification};
use chrono::{Days, NaiveDate};
use core_types::{Instrument, PricePoint, PriceSeries};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const TICKERS: [&str; 4] = ["SPY", "AAA", "BBB", "CCC"];

fn to_series(index: usize, prices: &BTreeMap<u64, i64>) -> PriceSeries {
    let origin = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    PriceSeries::new(
        Instrument::normalized(TICKERS[index]).unwrap(),
        prices
            .iter()
            .map(|(day, cents)| PricePoint {
                date: origin + Days::new(*day),
                adj_close: Decimal::new(*cents, 2),
            })
            .collect(),
    )
}

fn price_histories() -> impl Strategy<Value = Vec<BTreeMap<u64, i64>>> {
    prop::collection::vec(
        prop::collection::btree_map(0u64..60, 1i64..1_000_000, 0..40),
        1..=TICKERS.len(),
    )
}

proptest! {
    #[test]
    fn aligned_rows_are_complete_and_never_exceed_the_shortest_input(histories in price_histories()) {
        let series: Vec<PriceSeries> = histories.iter().enumerate().map(|(i, h)| to_series(i, h)).collect();
        let shortest = series.iter().map(|s| s.len()).min().unwrap_or(0);

        match align(&series) {
            Ok(matrix) => {
                prop_assert!(matrix.len() >= 2);
                prop_assert!(matrix.len() <= shortest);
                prop_assert!(matrix.rows().iter().all(|r| r.prices.len() == series.len()));
                prop_assert!(matrix.rows().windows(2).all(|w| w[0].date < w[1].date));
                prop_assert_eq!(matrix.benchmark().as_str(), "SPY");
            }
            Err(AnalyticsError::InsufficientData { rows }) => prop_assert!(rows < 2),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn returns_have_one_row_fewer_than_prices(histories in price_histories()) {
        let series: Vec<PriceSeries> = histories.iter().enumerate().map(|(i, h)| to_series(i, h)).collect();
        if let Ok(prices) = align(&series) {
            let returns = compute_returns(&prices).unwrap();
            prop_assert_eq!(returns.len(), prices.len() - 1);
            prop_assert_eq!(returns.rows()[0].date, prices.rows()[1].date);
            prop_assert_eq!(PeriodClassification::classify(&returns).len(), returns.len());
        }
    }

    #[test]
    fn constant_prices_grow_by_exactly_one(cents in 1i64..10_000_000, days in 2u64..50) {
        let flat: BTreeMap<u64, i64> = (0..days).map(|d| (d, cents)).collect();
        let returns = compute_returns(&align(&[to_series(0, &flat)]).unwrap()).unwrap();
        prop_assert!(returns.benchmark_column().iter().all(|g| *g == 1.0));
        prop_assert_eq!(PeriodClassification::classify(&returns).neither_periods(), returns.len());
    }

    #[test]
    fn benchmark_beta_against_itself_is_one(growth in prop::collection::vec(0.5f64..1.5, 2..60)) {
        if let Ok(variance) = market_variance(&growth) {
            let b = beta(&growth, &growth, Ok(variance)).unwrap();
            prop_assert!((b - 1.0).abs() < 1e-6, "beta was {}", b);
        }
    }
}
