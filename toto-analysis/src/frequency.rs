use serde::Serialize;

use toto_db::models::{Column, DrawTable, POOL_SIZE};

/// Occurrence count of every number 1..=49, zero counts included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    counts: Vec<u32>,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            counts: vec![0; POOL_SIZE as usize],
        }
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, number: u8) {
        if (1..=POOL_SIZE).contains(&number) {
            self.counts[(number - 1) as usize] += 1;
        }
    }

    pub fn count(&self, number: u8) -> u32 {
        if (1..=POOL_SIZE).contains(&number) {
            self.counts[(number - 1) as usize]
        } else {
            0
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts.iter().enumerate().map(|(i, &c)| (i as u8 + 1, c))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn mean(&self) -> f64 {
        self.total() as f64 / self.counts.len() as f64
    }

    /// Sample standard deviation of the 49 counts.
    pub fn spread(&self) -> f64 {
        let n = self.counts.len() as f64;
        let mean = self.mean();
        let ss: f64 = self.counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    }

    /// Highest counts first; ties go to the smaller number.
    pub fn most_frequent(&self, k: usize) -> Vec<(u8, u32)> {
        let mut entries: Vec<(u8, u32)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(k);
        entries
    }

    /// Lowest counts first; ties go to the smaller number.
    pub fn least_frequent(&self, k: usize) -> Vec<(u8, u32)> {
        let mut entries: Vec<(u8, u32)> = self.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        entries.truncate(k);
        entries
    }
}

/// Expected count per number if `columns` values per draw were uniform over 1..=49.
pub fn expected_count(rows: usize, columns: usize) -> f64 {
    (rows * columns) as f64 / POOL_SIZE as f64
}

/// Counts every value found in `columns`, across all draws.
pub fn overall_frequency(table: &DrawTable, columns: &[Column]) -> FrequencyTable {
    let mut freq = FrequencyTable::new();
    for draw in table {
        for &column in columns {
            freq.add(draw.get(column));
        }
    }
    freq
}

pub fn column_frequency(table: &DrawTable, column: Column) -> FrequencyTable {
    overall_frequency(table, &[column])
}

/// One dense table per column, for side-by-side comparison.
pub fn grouped_frequency(table: &DrawTable, columns: &[Column]) -> Vec<(Column, FrequencyTable)> {
    columns
        .iter()
        .map(|&c| (c, column_frequency(table, c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use toto_db::models::DrawRecord;

    fn table(rows: &[[u8; 7]]) -> DrawTable {
        rows.iter().map(|r| DrawRecord::new(*r).unwrap()).collect()
    }

    #[test]
    fn test_dense_domain() {
        let t = table(&[[1, 2, 3, 4, 5, 6, 7]]);
        let freq = overall_frequency(&t, &Column::ALL);
        assert_eq!(freq.len(), 49);
        assert_eq!(freq.count(49), 0);
        assert_eq!(freq.count(1), 1);
        assert_eq!(freq.iter().count(), 49);
    }

    #[test]
    fn test_total_is_rows_times_columns() {
        let t = table(&[
            [1, 2, 3, 4, 5, 6, 7],
            [1, 9, 17, 25, 33, 41, 49],
            [2, 3, 5, 7, 11, 13, 17],
        ]);
        assert_eq!(overall_frequency(&t, &Column::ALL).total(), 21);
        assert_eq!(overall_frequency(&t, &Column::WINNING).total(), 18);
        assert_eq!(overall_frequency(&t, &Column::ALL).count(1), 2);
        assert_eq!(overall_frequency(&t, &Column::ALL).count(17), 2);
    }

    #[test]
    fn test_empty_table() {
        let freq = overall_frequency(&DrawTable::new(), &Column::ALL);
        assert_eq!(freq.len(), 49);
        assert_eq!(freq.total(), 0);
        assert!(freq.is_empty());
        assert_eq!(freq.spread(), 0.0);
    }

    #[test]
    fn test_most_and_least_frequent() {
        let t = table(&[[1, 2, 3, 4, 5, 6, 7], [1, 2, 3, 10, 11, 12, 13], [1, 2, 20, 21, 22, 23, 24]]);
        let freq = overall_frequency(&t, &Column::ALL);
        assert_eq!(freq.most_frequent(3), vec![(1, 3), (2, 3), (3, 2)]);
        assert_eq!(freq.least_frequent(2), vec![(8, 0), (9, 0)]);
    }

    #[test]
    fn test_grouped_frequency() {
        let t = table(&[[1, 2, 3, 4, 5, 6, 7], [1, 8, 9, 10, 11, 12, 13]]);
        let grouped = grouped_frequency(&t, &Column::WINNING);
        assert_eq!(grouped.len(), 6);
        assert_eq!(grouped[0].0, Column::Num1);
        assert_eq!(grouped[0].1.count(1), 2);
        assert_eq!(grouped[1].1.count(2), 1);
        assert_eq!(grouped[1].1.count(8), 1);
    }

    #[test]
    fn test_expected_count() {
        assert!((expected_count(1000, 6) - 122.448_979).abs() < 1e-5);
    }
}
