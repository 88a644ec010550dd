use crate::error::ReportError;
use analytics::{
    MarketStatistics, PeriodClassification, PriceMatrix, ReturnMatrix, SortinoPeriod,
    StatisticValue, StatisticsRecord,
};
use chrono::{DateTime, Local, NaiveDate};
use configuration::Settings;
use core_types::{Frequency, Instrument};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DATA_SOURCE: &str = "Price data is from api.tiingo.com. All other data is calculated by this program.";
pub const DISCLAIMER: &str = "Not intended for trading or investment advice. \
    Ratio definitions may differ from other sources and results are not guaranteed to be error-free.";

/// Describes one run; every exported file name starts with [`ReportContext::file_stem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContext {
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_acceptable_return: f64,
}

impl ReportContext {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            description: settings.analysis.description.clone(),
            frequency: settings.analysis.frequency,
            start_date: settings.analysis.start_date,
            end_date: settings.analysis.end_date,
            min_acceptable_return: settings.analysis.min_acceptable_return,
        }
    }

    /// e.g. `tech stocks monthly data from 2016-12-01 to 2021-12-31`.
    pub fn file_stem(&self) -> String {
        format!(
            "{} {} data from {} to {}",
            self.description, self.frequency, self.start_date, self.end_date
        )
    }
}

/// The per-period Sortino working of one instrument, dated by the return rows.
#[derive(Debug, Clone, Serialize)]
pub struct SortinoDetail {
    pub instrument: Instrument,
    pub periods: Vec<DatedSortinoPeriod>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatedSortinoPeriod {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub period: SortinoPeriod,
}

impl SortinoDetail {
    pub fn new(instrument: Instrument, returns: &ReturnMatrix, periods: &[SortinoPeriod]) -> Self {
        let periods = returns
            .rows()
            .iter()
            .zip(periods)
            .map(|(row, period)| DatedSortinoPeriod {
                date: row.date,
                period: *period,
            })
            .collect();
        Self { instrument, periods }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Local>,
    data_source: &'static str,
    disclaimer: &'static str,
    #[serde(flatten)]
    context: &'a ReportContext,
    results: &'a MarketStatistics,
    sortino_detail: Option<&'a SortinoDetail>,
}

/// Writes the statistics, price, growth ratio, Sortino detail and JSON reports.
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
    context: ReportContext,
}

impl Exporter {
    pub fn new(directory: impl Into<PathBuf>, context: ReportContext) -> Self {
        Self {
            directory: directory.into(),
            context,
        }
    }

    pub fn path(&self, suffix: &str) -> PathBuf {
        self.directory
            .join(format!("{} {suffix}", self.context.file_stem()))
    }

    /// Writes every report file and returns their paths.
    pub fn export(
        &self,
        output: &MarketStatistics,
        detail: Option<&SortinoDetail>,
    ) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(&self.directory).map_err(|source| ReportError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let mut written = Vec::new();

        let path = self.path("statistics.csv");
        write_statistics_csv(&output.statistics, create(&path)?)?;
        written.push(path);

        let path = self.path("prices.csv");
        write_prices_csv(&output.prices, create(&path)?)?;
        written.push(path);

        let path = self.path("growth ratios.csv");
        write_returns_csv(&output.returns, &output.classification, create(&path)?)?;
        written.push(path);

        if let Some(detail) = detail {
            let path = self.path(&format!("sortino detail {}.csv", detail.instrument));
            write_sortino_csv(detail, create(&path)?)?;
            written.push(path);
        }

        let path = self.path("report.json");
        let report = JsonReport {
            generated_at: Local::now(),
            data_source: DATA_SOURCE,
            disclaimer: DISCLAIMER,
            context: &self.context,
            results: output,
            sortino_detail: detail,
        };
        serde_json::to_writer_pretty(create(&path)?, &report)?;
        written.push(path);

        for path in &written {
            tracing::info!(path = %path.display(), "report written");
        }
        Ok(written)
    }
}

fn create(path: &Path) -> Result<File, ReportError> {
    File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One row per instrument. Missing statistics are written as `n/a: <reason>`.
pub fn write_statistics_csv<W: Write>(
    statistics: &[StatisticsRecord],
    writer: W,
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut header = vec!["instrument"];
    header.extend(StatisticsRecord::LABELS);
    writer.write_record(&header)?;

    for record in statistics {
        let mut row = vec![record.instrument.to_string()];
        row.extend(record.values().iter().map(csv_cell));
        writer.write_record(&row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn csv_cell(value: &StatisticValue) -> String {
    match value {
        StatisticValue::Count(n) => n.to_string(),
        StatisticValue::Metric(m) => match m.value() {
            Some(v) => v.to_string(),
            None => m.to_string(),
        },
    }
}

pub fn write_prices_csv<W: Write>(prices: &PriceMatrix, writer: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut header = vec!["date".to_string()];
    header.extend(prices.instruments().iter().map(ToString::to_string));
    writer.write_record(&header)?;

    for row in prices.rows() {
        let mut record = vec![row.date.to_string()];
        record.extend(row.prices.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Growth ratios, not percentages, with the market label of each period.
pub fn write_returns_csv<W: Write>(
    returns: &ReturnMatrix,
    classification: &PeriodClassification,
    writer: W,
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut header = vec!["date".to_string(), "market".to_string()];
    header.extend(returns.instruments().iter().map(ToString::to_string));
    writer.write_record(&header)?;

    for (row, period) in returns.rows().iter().zip(classification.periods()) {
        let mut record = vec![row.date.to_string(), period.to_string()];
        record.extend(row.ratios.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_sortino_csv<W: Write>(detail: &SortinoDetail, writer: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["date", "stock return", "downside return", "cumulative growth"])?;
    for dated in &detail.periods {
        writer.write_record([
            dated.date.to_string(),
            dated.period.period_return.to_string(),
            dated.period.downside_return.to_string(),
            dated.period.cumulative_growth.to_string(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
