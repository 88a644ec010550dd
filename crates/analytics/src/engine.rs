use crate::aligner::align;
use crate::beta::{beta, market_variance};
use crate::capture::CaptureStats;
use crate::classifier::PeriodClassification;
use crate::error::{AnalyticsError, MetricError};
use crate::matrix::{PriceMatrix, ReturnMatrix};
use crate::report::StatisticsRecord;
use crate::returns::compute_returns;
use crate::sortino::{sortino, sortino_detail, SortinoPeriod};
use configuration::AnalysisParams;
use core_types::{Instrument, PriceSeries};
use rayon::prelude::*;
use serde::Serialize;

/// A stateless calculator turning raw price series into comparative statistics.
#[derive(Debug, Clone)]
pub struct MarketStatsEngine {
    params: AnalysisParams,
}

/// Everything one run produces: the aligned prices, their growth ratios, the
/// market period labels and one statistics record per instrument.
#[derive(Debug, Clone, Serialize)]
pub struct MarketStatistics {
    pub prices: PriceMatrix,
    pub returns: ReturnMatrix,
    pub classification: PeriodClassification,
    pub statistics: Vec<StatisticsRecord>,
}

impl MarketStatistics {
    pub fn record(&self, instrument: &Instrument) -> Option<&StatisticsRecord> {
        self.statistics.iter().find(|r| &r.instrument == instrument)
    }
}

/// Values shared read-only by every per-instrument computation.
struct SharedInputs<'a> {
    classification: &'a PeriodClassification,
    benchmark: Vec<f64>,
    benchmark_capture: CaptureStats,
    market_variance: Result<f64, MetricError>,
}

impl MarketStatsEngine {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// The main entry point for calculating market statistics.
    ///
    /// # Arguments
    ///
    /// * `series` - One raw price series per instrument; the first is the benchmark.
    ///
    /// # Returns
    ///
    /// The full set of matrices and records, or an `AnalyticsError` when the input
    /// cannot be aligned into at least two rows of positive prices. Failures of
    /// individual statistics never abort the run; they are recorded in the
    /// affected cells instead.
    pub fn run(&self, series: &[PriceSeries]) -> Result<MarketStatistics, AnalyticsError> {
        let span = tracing::info_span!(
            "market_stats",
            instruments = series.len(),
            frequency = %self.params.frequency
        );
        let _enter = span.enter();

        let prices = align(series)?;
        tracing::debug!(rows = prices.len(), "price series aligned");

        let returns = compute_returns(&prices)?;
        let classification = PeriodClassification::classify(&returns);
        tracing::debug!(
            periods = classification.len(),
            up = classification.up_periods(),
            down = classification.down_periods(),
            neither = classification.neither_periods(),
            "market periods classified"
        );

        let statistics = self.compute_statistics(&returns, &classification);
        for record in &statistics {
            for (label, error) in record.errors() {
                tracing::warn!(instrument = %record.instrument, metric = label, %error, "statistic unavailable");
            }
        }
        tracing::info!(
            rows = prices.len(),
            periods = returns.len(),
            "market statistics computed"
        );

        Ok(MarketStatistics {
            prices,
            returns,
            classification,
            statistics,
        })
    }

    /// Computes one record per instrument from already derived returns.
    ///
    /// The benchmark series, its capture statistics and the market variance are
    /// computed once up front; instruments are then processed in parallel.
    pub fn compute_statistics(
        &self,
        returns: &ReturnMatrix,
        classification: &PeriodClassification,
    ) -> Vec<StatisticsRecord> {
        let periods_per_year = self.params.periods_per_year();
        let benchmark = returns.benchmark_column();
        let shared = SharedInputs {
            classification,
            benchmark_capture: CaptureStats::compute(&benchmark, classification, periods_per_year),
            market_variance: market_variance(&benchmark),
            benchmark,
        };
        match shared.market_variance {
            Ok(variance) => tracing::debug!(variance, "market variance computed"),
            Err(error) => tracing::warn!(%error, "beta is undefined for every instrument"),
        }

        returns
            .instruments()
            .par_iter()
            .enumerate()
            .map(|(index, instrument)| {
                self.instrument_statistics(instrument.clone(), &returns.column(index), &shared)
            })
            .collect()
    }

    /// The per-period working behind an instrument's Sortino ratio.
    pub fn sortino_detail(
        &self,
        output: &MarketStatistics,
        instrument: &Instrument,
    ) -> Option<Vec<SortinoPeriod>> {
        let index = output.returns.position(instrument)?;
        Some(sortino_detail(&output.returns.column(index), &self.params))
    }

    fn instrument_statistics(
        &self,
        instrument: Instrument,
        growth: &[f64],
        shared: &SharedInputs<'_>,
    ) -> StatisticsRecord {
        let capture = CaptureStats::compute(
            growth,
            shared.classification,
            self.params.periods_per_year(),
        );
        let beta = beta(growth, &shared.benchmark, shared.market_variance);
        let sortino = sortino(growth, &self.params);

        StatisticsRecord::assemble(
            instrument,
            beta,
            &capture,
            &shared.benchmark_capture,
            &sortino,
        )
    }
}
