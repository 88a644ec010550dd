use analytics::{MarketStatistics, PeriodClassification, PriceMatrix, ReturnMatrix, StatisticValue, StatisticsRecord};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

fn new_table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// One row per instrument, one column per statistic.
pub fn statistics_table(output: &MarketStatistics) -> Table {
    let header = std::iter::once("instrument".to_string())
        .chain(StatisticsRecord::LABELS.iter().map(|l| l.to_string()))
        .collect();
    let mut table = new_table(header);
    for record in &output.statistics {
        let mut row = vec![Cell::new(&record.instrument)];
        row.extend(record.values().iter().map(statistic_cell));
        table.add_row(row);
    }
    table
}

fn statistic_cell(value: &StatisticValue) -> Cell {
    match value {
        StatisticValue::Metric(m) if !m.is_value() => Cell::new(m),
        other => number(other),
    }
}

/// The aligned adjusted closing prices, oldest first.
pub fn price_table(prices: &PriceMatrix) -> Table {
    let header = std::iter::once("date".to_string())
        .chain(prices.instruments().iter().map(ToString::to_string))
        .collect();
    let mut table = new_table(header);
    for row in prices.rows() {
        let mut cells = vec![Cell::new(row.date)];
        cells.extend(row.prices.iter().map(number));
        table.add_row(cells);
    }
    table
}

/// Growth ratios (not percentages) with the market period of each row.
pub fn return_table(returns: &ReturnMatrix, classification: &PeriodClassification) -> Table {
    let header = ["date".to_string(), "market".to_string()]
        .into_iter()
        .chain(returns.instruments().iter().map(ToString::to_string))
        .collect();
    let mut table = new_table(header);
    for (row, period) in returns.rows().iter().zip(classification.periods()) {
        let mut cells = vec![Cell::new(row.date), Cell::new(period)];
        cells.extend(row.ratios.iter().map(|r| number(format!("{r:.6}"))));
        table.add_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::MarketStatsEngine;
    use chrono::NaiveDate;
    use configuration::AnalysisParams;
    use core_types::{Frequency, Instrument, PricePoint, PriceSeries};
    use rust_decimal_macros::dec;

    fn output() -> MarketStatistics {
        let days = [1, 2, 3, 4].map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap());
        let series = |ticker: &str, prices: [rust_decimal::Decimal; 4]| {
            PriceSeries::new(
                Instrument::normalized(ticker).unwrap(),
                days.iter()
                    .zip(prices)
                    .map(|(date, adj_close)| PricePoint { date: *date, adj_close })
                    .collect(),
            )
        };
        MarketStatsEngine::new(AnalysisParams::new(Frequency::Daily, 0.0))
            .run(&[
                series("SPY", [dec!(100), dec!(110), dec!(99), dec!(108.9)]),
                series("GLD", [dec!(50), dec!(51), dec!(52), dec!(53)]),
            ])
            .unwrap()
    }

    #[test]
    fn statistics_table_has_a_row_per_instrument() {
        let mut table = statistics_table(&output());
        let rendered = table.force_no_tty().to_string();
        assert!(rendered.contains("upside capture %"));
        assert!(rendered.contains("SPY"));
        assert!(rendered.contains("GLD"));
        // GLD never falls, so its Sortino ratio is reported as missing.
        assert!(rendered.contains("n/a: downside deviation is zero"));
    }

    #[test]
    fn return_table_labels_market_periods() {
        let output = output();
        let mut table = return_table(&output.returns, &output.classification);
        let rendered = table.force_no_tty().to_string();
        assert!(rendered.contains("1.100000"));
        assert!(rendered.contains("down"));
        assert_eq!(price_table(&output.prices).row_iter().count(), 4);
    }
}
