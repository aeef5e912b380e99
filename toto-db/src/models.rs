use serde::{Deserialize, Serialize};

use crate::error::{Result, TotoError};
use crate::validate::check_values;

/// Highest number that can be drawn.
pub const POOL_SIZE: u8 = 49;
/// Winning numbers per draw, excluding the additional number.
pub const WINNING_COUNT: usize = 6;
/// Stored values per draw: six winning numbers plus the additional number.
pub const DRAW_SIZE: usize = 7;

/// Canonical column names, in storage order.
pub const CANONICAL_COLUMNS: [&str; DRAW_SIZE] = ["Num1", "Num2", "Num3", "Num4", "Num5", "Num6", "Num7"];

/// Column names of the published results export, renamed positionally to `CANONICAL_COLUMNS`.
pub const RESULTS_COLUMNS: [&str; DRAW_SIZE] = [
    "Winning Number 1",
    "2",
    "3",
    "4",
    "5",
    "6",
    "Additional Number",
];

pub const DATE_COLUMN: &str = "Date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
}

impl Column {
    pub const ALL: [Column; DRAW_SIZE] = [
        Column::Num1,
        Column::Num2,
        Column::Num3,
        Column::Num4,
        Column::Num5,
        Column::Num6,
        Column::Num7,
    ];

    /// The six sorted winning positions.
    pub const WINNING: [Column; WINNING_COUNT] = [
        Column::Num1,
        Column::Num2,
        Column::Num3,
        Column::Num4,
        Column::Num5,
        Column::Num6,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        CANONICAL_COLUMNS[self.index()]
    }

    pub fn from_index(idx: usize) -> Option<Column> {
        Column::ALL.get(idx).copied()
    }

    pub fn from_name(name: &str) -> Option<Column> {
        let name = name.trim();
        CANONICAL_COLUMNS
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(Column::from_index)
    }

    pub fn is_additional(&self) -> bool {
        *self == Column::Num7
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Column {
    type Err = TotoError;

    fn from_str(s: &str) -> Result<Self> {
        Column::from_name(s).ok_or_else(|| TotoError::InvalidArgument(format!("unknown column '{}'", s)))
    }
}

/// One TOTO draw: six ascending winning numbers followed by the additional number.
///
/// Only constructible through [`DrawRecord::new`] or the row validator, so every
/// instance satisfies the draw invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DrawRecord {
    numbers: [u8; DRAW_SIZE],
}

impl DrawRecord {
    pub fn new(numbers: [u8; DRAW_SIZE]) -> Result<Self> {
        let values = numbers.map(|n| Some(i64::from(n)));
        let violations = check_values(&values);
        if violations.is_empty() {
            Ok(Self { numbers })
        } else {
            Err(TotoError::InvalidDraw { violations })
        }
    }

    pub(crate) fn from_checked(numbers: [u8; DRAW_SIZE]) -> Self {
        Self { numbers }
    }

    pub fn numbers(&self) -> &[u8; DRAW_SIZE] {
        &self.numbers
    }

    pub fn winning(&self) -> &[u8] {
        &self.numbers[..WINNING_COUNT]
    }

    pub fn additional(&self) -> u8 {
        self.numbers[DRAW_SIZE - 1]
    }

    pub fn get(&self, column: Column) -> u8 {
        self.numbers[column.index()]
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

impl std::fmt::Display for DrawRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let winning = self
            .winning()
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");
        write!(f, "{} + {:2}", winning, self.additional())
    }
}

/// Ordered draws; chronological for published results, generation order for simulated ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawTable {
    draws: Vec<DrawRecord>,
}

impl DrawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            draws: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, draw: DrawRecord) {
        self.draws.push(draw);
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawRecord> {
        self.draws.iter()
    }

    pub fn column(&self, column: Column) -> impl Iterator<Item = u8> + '_ {
        self.draws.iter().map(move |d| d.get(column))
    }

    /// First `n` draws, as shown by the sample-data view.
    pub fn head(&self, n: usize) -> &[DrawRecord] {
        &self.draws[..n.min(self.draws.len())]
    }
}

impl From<Vec<DrawRecord>> for DrawTable {
    fn from(draws: Vec<DrawRecord>) -> Self {
        Self { draws }
    }
}

impl FromIterator<DrawRecord> for DrawTable {
    fn from_iter<I: IntoIterator<Item = DrawRecord>>(iter: I) -> Self {
        Self {
            draws: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DrawTable {
    type Item = &'a DrawRecord;
    type IntoIter = std::slice::Iter<'a, DrawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.draws.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_record_ok() {
        let draw = DrawRecord::new([1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(draw.winning(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(draw.additional(), 7);
        assert!(DrawRecord::new([44, 45, 46, 47, 48, 49, 1]).is_ok());
    }

    #[test]
    fn test_draw_record_rejects_invalid() {
        assert!(DrawRecord::new([0, 2, 3, 4, 5, 6, 7]).is_err());
        assert!(DrawRecord::new([1, 2, 3, 4, 5, 50, 7]).is_err());
        assert!(DrawRecord::new([1, 1, 3, 4, 5, 6, 7]).is_err());
        assert!(DrawRecord::new([6, 5, 4, 3, 2, 1, 7]).is_err());
        assert!(DrawRecord::new([1, 2, 3, 4, 5, 6, 6]).is_err());
    }

    #[test]
    fn test_additional_exempt_from_ordering() {
        assert!(DrawRecord::new([10, 20, 30, 40, 45, 49, 1]).is_ok());
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Column::Num1.name(), "Num1");
        assert_eq!(Column::Num7.to_string(), "Num7");
        assert_eq!(Column::from_name("num3"), Some(Column::Num3));
        assert_eq!(Column::from_name("Num8"), None);
        assert!("Winning".parse::<Column>().is_err());
        assert!(Column::Num7.is_additional());
        assert_eq!(Column::WINNING.len(), 6);
    }

    #[test]
    fn test_table_column() {
        let table: DrawTable = vec![
            DrawRecord::new([1, 2, 3, 4, 5, 6, 7]).unwrap(),
            DrawRecord::new([8, 9, 10, 11, 12, 13, 14]).unwrap(),
        ]
        .into();
        assert_eq!(table.column(Column::Num2).collect::<Vec<_>>(), vec![2, 9]);
        assert_eq!(table.column(Column::Num7).collect::<Vec<_>>(), vec![7, 14]);
        assert_eq!(table.head(1).len(), 1);
        assert_eq!(table.head(10).len(), 2);
    }
}
