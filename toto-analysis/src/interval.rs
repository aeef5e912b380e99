use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use toto_db::models::{Column, DrawTable};
use toto_db::{Result, TotoError};

use crate::frequency::{FrequencyTable, column_frequency};

pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Observed share of draws in which `number` occupied a column, with its
/// Wald (normal approximation) interval. Not an exact binomial interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceEntry {
    pub number: u8,
    pub count: u32,
    pub proportion: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceEntry {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Two-sided standard normal critical value for `level` (1.95996 at 0.95).
pub fn z_critical(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(TotoError::InvalidArgument(format!(
            "confidence level must lie strictly between 0 and 1, got {}",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| TotoError::InvalidArgument(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Intervals for every number, highest proportion first (ties by number).
/// With no trials every entry is zero. `freq` must count one column, so no
/// count may exceed `trials`.
pub fn intervals_from_counts(freq: &FrequencyTable, trials: usize, level: f64) -> Result<Vec<ConfidenceEntry>> {
    let z = z_critical(level)?;
    if let Some((number, count)) = freq.iter().find(|&(_, c)| c as usize > trials) {
        return Err(TotoError::InvalidArgument(format!(
            "number {} counted {} times in {} trials",
            number, count, trials
        )));
    }
    let n = trials as f64;

    let mut entries: Vec<ConfidenceEntry> = freq
        .iter()
        .map(|(number, count)| {
            if trials == 0 {
                return ConfidenceEntry {
                    number,
                    count,
                    proportion: 0.0,
                    std_error: 0.0,
                    lower: 0.0,
                    upper: 0.0,
                };
            }
            let p = count as f64 / n;
            let se = (p * (1.0 - p) / n).max(0.0).sqrt();
            ConfidenceEntry {
                number,
                count,
                proportion: p,
                std_error: se,
                lower: (p - z * se).max(0.0),
                upper: (p + z * se).min(1.0),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    Ok(entries)
}

pub fn confidence_intervals(table: &DrawTable, column: Column, level: f64) -> Result<Vec<ConfidenceEntry>> {
    let freq = column_frequency(table, column);
    intervals_from_counts(&freq, table.len(), level)
}

pub fn confidence_intervals_all(
    table: &DrawTable,
    columns: &[Column],
    level: f64,
) -> Result<Vec<(Column, Vec<ConfidenceEntry>)>> {
    columns
        .iter()
        .map(|&c| Ok((c, confidence_intervals(table, c, level)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::overall_frequency;
    use crate::generator::generate;
    use toto_db::models::DrawRecord;

    #[test]
    fn test_z_critical() {
        assert!((z_critical(0.95).unwrap() - 1.959_964).abs() < 1e-5);
        assert!((z_critical(0.99).unwrap() - 2.575_829).abs() < 1e-5);
        assert!(z_critical(0.0).is_err());
        assert!(z_critical(1.0).is_err());
        assert!(z_critical(f64::NAN).is_err());
    }

    #[test]
    fn test_wald_interval_values() {
        let table: DrawTable = (0..10)
            .map(|i| {
                let first = if i < 4 { 1 } else { 2 };
                DrawRecord::new([first, 10, 20, 30, 40, 45, 49]).unwrap()
            })
            .collect();
        let entries = confidence_intervals(&table, Column::Num1, 0.95).unwrap();
        assert_eq!(entries.len(), 49);

        assert_eq!(entries[0].number, 2);
        assert_eq!(entries[0].count, 6);
        assert_eq!(entries[1].number, 1);
        let e = &entries[1];
        assert!((e.proportion - 0.4).abs() < 1e-12);
        let se = (0.4f64 * 0.6 / 10.0).sqrt();
        assert!((e.std_error - se).abs() < 1e-12);
        assert!((e.lower - (0.4 - 1.959_964 * se)).abs() < 1e-5);
        assert!((e.upper - (0.4 + 1.959_964 * se)).abs() < 1e-5);
    }

    #[test]
    fn test_sorted_desc_with_number_tiebreak() {
        let table = generate(200, Some(9)).unwrap();
        let entries = confidence_intervals(&table, Column::Num3, 0.95).unwrap();
        for w in entries.windows(2) {
            assert!(
                w[0].proportion > w[1].proportion
                    || (w[0].proportion == w[1].proportion && w[0].number < w[1].number)
            );
        }
    }

    #[test]
    fn test_bounds_clamped_and_ordered() {
        let table = generate(300, Some(3)).unwrap();
        for (_, entries) in confidence_intervals_all(&table, &Column::ALL, 0.99).unwrap() {
            for e in entries {
                assert!(0.0 <= e.lower && e.lower <= e.proportion);
                assert!(e.proportion <= e.upper && e.upper <= 1.0);
            }
        }
        // A number present in every draw: p = 1, se = 0.
        let certain: DrawTable = (0..5)
            .map(|_| DrawRecord::new([1, 2, 3, 4, 5, 6, 7]).unwrap())
            .collect();
        let entries = confidence_intervals(&certain, Column::Num1, 0.95).unwrap();
        assert_eq!(entries[0].number, 1);
        assert_eq!(entries[0].upper, 1.0);
        assert_eq!(entries[0].lower, 1.0);
    }

    #[test]
    fn test_counts_above_trials_rejected() {
        let table: DrawTable = (0..4)
            .map(|_| DrawRecord::new([1, 2, 3, 4, 5, 6, 7]).unwrap())
            .collect();
        // Distinct values per draw: each number counted at most once per draw.
        let multi = overall_frequency(&table, &Column::ALL);
        assert!(intervals_from_counts(&multi, 4, 0.95).is_ok());

        let stacked = overall_frequency(&table, &[Column::Num1, Column::Num1]);
        assert_eq!(stacked.count(1), 8);
        assert!(matches!(
            intervals_from_counts(&stacked, 4, 0.95),
            Err(TotoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_table_gives_zero_entries() {
        let entries = confidence_intervals(&DrawTable::new(), Column::Num1, 0.95).unwrap();
        assert_eq!(entries.len(), 49);
        assert!(entries.iter().all(|e| e.proportion == 0.0 && e.upper == 0.0));
        assert_eq!(entries[0].number, 1);
    }
}
