use chrono::NaiveDate;
use core_types::Instrument;
use rust_decimal::Decimal;
use serde::Serialize;

/// One trading date with a price for every instrument, in instrument order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub prices: Vec<Decimal>,
}

/// Aligned adjusted closing prices: one row per date, one column per instrument.
///
/// Built once by the aligner and never mutated. Every row is complete, dates are
/// strictly increasing and the first column is the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMatrix {
    instruments: Vec<Instrument>,
    rows: Vec<PriceRow>,
}

impl PriceMatrix {
    pub(crate) fn new(instruments: Vec<Instrument>, rows: Vec<PriceRow>) -> Self {
        debug_assert!(!instruments.is_empty());
        debug_assert!(rows.iter().all(|r| r.prices.len() == instruments.len()));
        debug_assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
        Self { instruments, rows }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn benchmark(&self) -> &Instrument {
        &self.instruments[0]
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All prices of the instrument at `index`, oldest first.
    pub fn column(&self, index: usize) -> impl Iterator<Item = Decimal> + '_ {
        self.rows.iter().map(move |row| row.prices[index])
    }
}

/// Period-over-period growth ratios for one date (`price[t] / price[t-1]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRow {
    pub date: NaiveDate,
    pub ratios: Vec<f64>,
}

/// Growth ratios derived from a [`PriceMatrix`]. It has exactly one row fewer than
/// the prices it came from; each row is dated by the later of its two prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnMatrix {
    instruments: Vec<Instrument>,
    rows: Vec<ReturnRow>,
}

impl ReturnMatrix {
    pub(crate) fn new(instruments: Vec<Instrument>, rows: Vec<ReturnRow>) -> Self {
        Self { instruments, rows }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn benchmark(&self) -> &Instrument {
        &self.instruments[0]
    }

    pub fn rows(&self) -> &[ReturnRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, instrument: &Instrument) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    /// The growth ratio series of the instrument at `index`, oldest first.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row.ratios[index]).collect()
    }

    pub fn benchmark_column(&self) -> Vec<f64> {
        self.column(0)
    }
}
