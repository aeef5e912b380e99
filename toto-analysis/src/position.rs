use serde::Serialize;

use toto_db::models::{Column, DrawTable};

use crate::frequency::column_frequency;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionStats {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), 0 below two draws.
    pub std_dev: f64,
    pub min: u8,
    pub max: u8,
    /// Up to three most common values, with counts.
    pub most_common: Vec<(u8, u32)>,
}

/// Descriptive statistics of one column; `None` on an empty table.
pub fn position_stats(table: &DrawTable, column: Column) -> Option<PositionStats> {
    let values: Vec<f64> = table.column(column).map(f64::from).collect();
    let min = table.column(column).min()?;
    let max = table.column(column).max()?;

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    };

    let most_common = column_frequency(table, column)
        .most_frequent(3)
        .into_iter()
        .filter(|&(_, c)| c > 0)
        .collect();

    Some(PositionStats {
        column,
        count: values.len(),
        mean,
        std_dev,
        min,
        max,
        most_common,
    })
}

pub fn all_position_stats(table: &DrawTable, columns: &[Column]) -> Vec<PositionStats> {
    columns
        .iter()
        .filter_map(|&c| position_stats(table, c))
        .collect()
}
