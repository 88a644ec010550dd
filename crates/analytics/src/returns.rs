use crate::error::AnalyticsError;
use crate::matrix::{PriceMatrix, ReturnMatrix, ReturnRow};
use rust_decimal::prelude::*;

/// Converts aligned prices into growth ratios, `price[t] / price[t-1]`.
///
/// The first row is consumed, so the result has one row fewer than `prices`.
/// Every price must be strictly positive; a zero or negative price makes the
/// ratio meaningless and fails the whole run.
pub fn compute_returns(prices: &PriceMatrix) -> Result<ReturnMatrix, AnalyticsError> {
    if prices.len() < 2 {
        return Err(AnalyticsError::InsufficientData { rows: prices.len() });
    }

    for row in prices.rows() {
        for (instrument, price) in prices.instruments().iter().zip(&row.prices) {
            if *price <= Decimal::ZERO {
                return Err(AnalyticsError::InvalidPrice {
                    instrument: instrument.clone(),
                    date: row.date,
                    price: *price,
                });
            }
        }
    }

    let rows = prices
        .rows()
        .windows(2)
        .map(|pair| ReturnRow {
            date: pair[1].date,
            ratios: pair[1]
                .prices
                .iter()
                .zip(&pair[0].prices)
                .map(|(current, previous)| growth_ratio(*current, *previous))
                .collect(),
        })
        .collect();

    Ok(ReturnMatrix::new(prices.instruments().to_vec(), rows))
}

/// The ratio is taken in decimal arithmetic so that unchanged prices give exactly
/// 1.0; it falls back to floating point only if the decimal quotient overflows.
fn growth_ratio(current: Decimal, previous: Decimal) -> f64 {
    current
        .checked_div(previous)
        .and_then(|ratio| ratio.to_f64())
        .unwrap_or_else(|| as_f64(current) / as_f64(previous))
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
