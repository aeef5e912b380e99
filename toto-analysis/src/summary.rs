use serde::Serialize;

use toto_db::models::{Column, DrawTable};

use crate::frequency::{column_frequency, expected_count, overall_frequency};

/// Expected sum of six distinct numbers drawn from 1..=49.
pub const EXPECTED_WINNING_SUM: f64 = 150.0;
pub const EXPECTED_EVEN_COUNT: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub draws: usize,
    pub most_frequent: Vec<(u8, u32)>,
    pub least_frequent: Vec<(u8, u32)>,
    /// Expected count per number over all seven columns.
    pub expected_frequency: f64,
    /// Sample standard deviation of the 49 overall counts.
    pub frequency_spread: f64,
    /// `frequency_spread / expected_frequency`, comparable across table sizes; 0 when empty.
    pub relative_spread: f64,
    pub position_modes: Vec<(Column, Vec<(u8, u32)>)>,
    pub consecutive_draws: usize,
    pub consecutive_rate: f64,
    pub avg_even: f64,
    pub avg_sum: f64,
}

fn has_consecutive_pair(winning: &[u8]) -> bool {
    winning.windows(2).any(|w| w[1] == w[0] + 1)
}

pub fn summarize(table: &DrawTable) -> DatasetSummary {
    let freq = overall_frequency(table, &Column::ALL);

    let position_modes = Column::WINNING
        .iter()
        .map(|&c| {
            let top = column_frequency(table, c)
                .most_frequent(3)
                .into_iter()
                .filter(|&(_, n)| n > 0)
                .collect();
            (c, top)
        })
        .collect();

    let mut consecutive_draws = 0usize;
    let mut even_total = 0usize;
    let mut sum_total = 0u64;
    for draw in table {
        let winning = draw.winning();
        if has_consecutive_pair(winning) {
            consecutive_draws += 1;
        }
        even_total += winning.iter().filter(|&&n| n % 2 == 0).count();
        sum_total += winning.iter().map(|&n| u64::from(n)).sum::<u64>();
    }

    let draws = table.len();
    let expected_frequency = expected_count(draws, Column::ALL.len());
    let frequency_spread = freq.spread();
    let relative_spread = if expected_frequency > 0.0 {
        frequency_spread / expected_frequency
    } else {
        0.0
    };
    let per_draw = |total: f64| if draws == 0 { 0.0 } else { total / draws as f64 };

    DatasetSummary {
        draws,
        most_frequent: freq.most_frequent(5),
        least_frequent: freq.least_frequent(5),
        expected_frequency,
        frequency_spread,
        relative_spread,
        position_modes,
        consecutive_draws,
        consecutive_rate: per_draw(consecutive_draws as f64),
        avg_even: per_draw(even_total as f64),
        avg_sum: per_draw(sum_total as f64),
    }
}

/// Published results measured against a simulated baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub real: DatasetSummary,
    pub simulated: DatasetSummary,
    /// real spread / simulated spread; `None` when the simulated spread is zero.
    /// Raw spreads grow with the draw count, so this only reads well for tables of similar size.
    pub spread_ratio: Option<f64>,
    /// Same ratio over `relative_spread`, independent of the two table sizes.
    pub relative_spread_ratio: Option<f64>,
}

pub fn compare(real: &DrawTable, simulated: &DrawTable) -> Comparison {
    let real = summarize(real);
    let simulated = summarize(simulated);
    let ratio = |a: f64, b: f64| if b > 0.0 { Some(a / b) } else { None };
    let spread_ratio = ratio(real.frequency_spread, simulated.frequency_spread);
    let relative_spread_ratio = ratio(real.relative_spread, simulated.relative_spread);
    Comparison {
        real,
        simulated,
        spread_ratio,
        relative_spread_ratio,
    }
}
