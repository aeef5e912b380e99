use serde::{Deserialize, Serialize};

use toto_db::models::{DrawRecord, DrawTable, POOL_SIZE, WINNING_COUNT};
use toto_db::{Result, TotoError};

pub const DEFAULT_CANDIDATE: [u8; WINNING_COUNT] = [1, 7, 13, 19, 25, 31];

pub const DEFAULT_POSITION_RANGES: [PositionRange; WINNING_COUNT] = [
    PositionRange { low: 1, high: 5 },
    PositionRange { low: 7, high: 16 },
    PositionRange { low: 16, high: 25 },
    PositionRange { low: 25, high: 34 },
    PositionRange { low: 35, high: 44 },
    PositionRange { low: 40, high: 49 },
];

/// Matches needed for a draw to count as a win.
pub const MIN_WINNING_MATCHES: u8 = 3;

/// Six distinct numbers in 1..=49, kept sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    numbers: [u8; WINNING_COUNT],
}

impl CandidateSet {
    pub fn new(numbers: &[u8]) -> Result<Self> {
        if numbers.len() != WINNING_COUNT {
            return Err(TotoError::InvalidArgument(format!(
                "expected {} candidate numbers, got {}",
                WINNING_COUNT,
                numbers.len()
            )));
        }
        let mut sorted = [0u8; WINNING_COUNT];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();

        if let Some(n) = sorted.iter().find(|&&n| n < 1 || n > POOL_SIZE) {
            return Err(TotoError::InvalidArgument(format!(
                "candidate number {} outside 1-{}",
                n, POOL_SIZE
            )));
        }
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(TotoError::InvalidArgument(format!(
                "candidate number {} given twice",
                w[0]
            )));
        }
        Ok(Self { numbers: sorted })
    }

    pub fn numbers(&self) -> &[u8; WINNING_COUNT] {
        &self.numbers
    }
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self {
            numbers: DEFAULT_CANDIDATE,
        }
    }
}

/// Counts of draws scoring 3, 4, 5 and 6. Lower scores are not binned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchHistogram {
    bins: [usize; 4],
}

impl MatchHistogram {
    fn record(&mut self, score: u8) {
        if (MIN_WINNING_MATCHES..=6).contains(&score) {
            self.bins[(score - MIN_WINNING_MATCHES) as usize] += 1;
        }
    }

    pub fn get(&self, score: u8) -> usize {
        if (MIN_WINNING_MATCHES..=6).contains(&score) {
            self.bins[(score - MIN_WINNING_MATCHES) as usize]
        } else {
            0
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.bins
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as u8 + MIN_WINNING_MATCHES, c))
    }

    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
    }
}

/// Numbers of the draw, additional number included, that the candidate holds.
///
/// Official prize tiers only use the additional number as a bonus; here all
/// seven stored values count alike.
pub fn matched_numbers(draw: &DrawRecord, candidate: &CandidateSet) -> Vec<u8> {
    draw.numbers()
        .iter()
        .copied()
        .filter(|n| candidate.numbers().contains(n))
        .collect()
}

pub fn match_count(draw: &DrawRecord, candidate: &CandidateSet) -> u8 {
    draw.numbers()
        .iter()
        .filter(|n| candidate.numbers().contains(n))
        .count() as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub candidate: CandidateSet,
    pub total_draws: usize,
    /// Per draw, in table order.
    pub match_counts: Vec<u8>,
    pub histogram: MatchHistogram,
    pub winners: usize,
    pub mean_matches: f64,
    pub win_rate: f64,
}

pub fn backtest(table: &DrawTable, candidate: &CandidateSet) -> BacktestResult {
    let mut histogram = MatchHistogram::default();
    let match_counts: Vec<u8> = table
        .iter()
        .map(|draw| {
            let score = match_count(draw, candidate);
            histogram.record(score);
            score
        })
        .collect();

    let winners = match_counts.iter().filter(|&&m| m >= MIN_WINNING_MATCHES).count();
    let total_draws = table.len();
    let win_rate = if total_draws == 0 {
        0.0
    } else {
        winners as f64 / total_draws as f64
    };

    log::debug!(
        "backtest {:?}: {} winners over {} draws",
        candidate.numbers(),
        winners,
        total_draws
    );

    BacktestResult {
        candidate: *candidate,
        total_draws,
        mean_matches: mean(&match_counts),
        match_counts,
        histogram,
        winners,
        win_rate,
    }
}

/// Inclusive bounds for one sorted winning position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRange {
    pub low: u8,
    pub high: u8,
}

impl PositionRange {
    pub fn new(low: u8, high: u8) -> Result<Self> {
        if low < 1 || high > POOL_SIZE || low > high {
            return Err(TotoError::InvalidArgument(format!(
                "invalid range {}-{}: need 1 <= low <= high <= {}",
                low, high, POOL_SIZE
            )));
        }
        Ok(Self { low, high })
    }

    pub fn contains(&self, n: u8) -> bool {
        self.low <= n && n <= self.high
    }
}

impl std::fmt::Display for PositionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl std::str::FromStr for PositionRange {
    type Err = TotoError;

    /// Parses `low-high`, e.g. `7-16`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TotoError::InvalidArgument(format!("expected LOW-HIGH, got '{}'", s));
        let (low, high) = s.trim().split_once('-').ok_or_else(invalid)?;
        let low = low.trim().parse::<u8>().map_err(|_| invalid())?;
        let high = high.trim().parse::<u8>().map_err(|_| invalid())?;
        PositionRange::new(low, high)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionalBacktestResult {
    pub ranges: Vec<PositionRange>,
    pub total_draws: usize,
    /// Per draw: sorted winning numbers inside their position's range.
    pub correct_counts: Vec<u8>,
    /// Per draw: sorted winning numbers outside their position's range.
    pub opposite_counts: Vec<u8>,
    pub correct_histogram: MatchHistogram,
    pub opposite_histogram: MatchHistogram,
    pub mean_correct: f64,
    pub mean_opposite: f64,
}

/// Scores each draw's six winning positions against one range per position.
/// The additional number is not scored.
pub fn positional_backtest(table: &DrawTable, ranges: &[PositionRange]) -> Result<PositionalBacktestResult> {
    if ranges.len() != WINNING_COUNT {
        return Err(TotoError::InvalidArgument(format!(
            "expected {} position ranges, got {}",
            WINNING_COUNT,
            ranges.len()
        )));
    }
    for r in ranges {
        PositionRange::new(r.low, r.high)?;
    }

    let mut correct_histogram = MatchHistogram::default();
    let mut opposite_histogram = MatchHistogram::default();
    let mut correct_counts = Vec::with_capacity(table.len());
    let mut opposite_counts = Vec::with_capacity(table.len());

    for draw in table {
        let correct = draw
            .winning()
            .iter()
            .zip(ranges)
            .filter(|(n, r)| r.contains(**n))
            .count() as u8;
        let opposite = WINNING_COUNT as u8 - correct;

        correct_histogram.record(correct);
        opposite_histogram.record(opposite);
        correct_counts.push(correct);
        opposite_counts.push(opposite);
    }

    Ok(PositionalBacktestResult {
        ranges: ranges.to_vec(),
        total_draws: table.len(),
        mean_correct: mean(&correct_counts),
        mean_opposite: mean(&opposite_counts),
        correct_counts,
        opposite_counts,
        correct_histogram,
        opposite_histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;

    fn table(rows: &[[u8; 7]]) -> DrawTable {
        rows.iter().map(|r| DrawRecord::new(*r).unwrap()).collect()
    }

    #[test]
    fn test_candidate_validation() {
        assert!(CandidateSet::new(&[1, 7, 13, 19, 25, 31]).is_ok());
        assert_eq!(
            CandidateSet::new(&[31, 25, 19, 13, 7, 1]).unwrap().numbers(),
            &[1, 7, 13, 19, 25, 31]
        );
        assert!(CandidateSet::new(&[1, 2, 3, 4, 5]).is_err());
        assert!(CandidateSet::new(&[1, 2, 3, 4, 5, 5]).is_err());
        assert!(CandidateSet::new(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(CandidateSet::new(&[1, 2, 3, 4, 5, 50]).is_err());
        assert_eq!(CandidateSet::default().numbers(), &DEFAULT_CANDIDATE);
    }

    #[test]
    fn test_full_match() {
        let t = table(&[[1, 7, 13, 19, 25, 31, 2]]);
        let result = backtest(&t, &CandidateSet::new(&[1, 7, 13, 19, 25, 31]).unwrap());
        assert_eq!(result.match_counts, vec![6]);
        assert_eq!(result.histogram.get(6), 1);
        assert_eq!(result.winners, 1);
        assert_eq!(result.win_rate, 1.0);
    }

    #[test]
    fn test_additional_number_counts() {
        let t = table(&[[1, 7, 13, 20, 26, 32, 19]]);
        let c = CandidateSet::new(&[1, 7, 13, 19, 25, 31]).unwrap();
        assert_eq!(match_count(&t.draws()[0], &c), 4);
        assert_eq!(matched_numbers(&t.draws()[0], &c), vec![1, 7, 13, 19]);
    }

    #[test]
    fn test_histogram_and_mean() {
        let t = table(&[
            [1, 7, 13, 20, 21, 22, 23], // 3
            [2, 3, 4, 5, 6, 8, 9],      // 0
            [1, 2, 3, 4, 5, 6, 7],      // 2
            [1, 7, 13, 19, 22, 23, 24], // 4
        ]);
        let result = backtest(&t, &CandidateSet::default());
        assert_eq!(result.match_counts, vec![3, 0, 2, 4]);
        assert_eq!(result.histogram.get(3), 1);
        assert_eq!(result.histogram.get(4), 1);
        assert_eq!(result.histogram.get(2), 0);
        assert_eq!(result.histogram.total(), 2);
        assert_eq!(result.winners, 2);
        assert!((result.mean_matches - 2.25).abs() < 1e-12);
        assert!((result.win_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_table() {
        let result = backtest(&DrawTable::new(), &CandidateSet::default());
        assert_eq!(result.total_draws, 0);
        assert_eq!(result.mean_matches, 0.0);
        assert_eq!(result.win_rate, 0.0);
    }

    #[test]
    fn test_order_invariant_aggregates() {
        let t = generate(400, Some(11)).unwrap();
        let mut reversed: Vec<DrawRecord> = t.draws().to_vec();
        reversed.reverse();
        let reversed: DrawTable = reversed.into();

        let c = CandidateSet::new(&[3, 9, 17, 28, 33, 41]).unwrap();
        let a = backtest(&t, &c);
        let b = backtest(&reversed, &c);
        assert_eq!(a.histogram, b.histogram);
        assert_eq!(a.winners, b.winners);
        assert!((a.mean_matches - b.mean_matches).abs() < 1e-12);

        let mut rev_counts = b.match_counts.clone();
        rev_counts.reverse();
        assert_eq!(a.match_counts, rev_counts);
    }

    #[test]
    fn test_position_range_parse() {
        assert_eq!("7-16".parse::<PositionRange>().unwrap(), PositionRange { low: 7, high: 16 });
        assert_eq!(" 1 - 5 ".parse::<PositionRange>().unwrap().to_string(), "1-5");
        assert!("16-7".parse::<PositionRange>().is_err());
        assert!("0-5".parse::<PositionRange>().is_err());
        assert!("5".parse::<PositionRange>().is_err());
        assert!("a-b".parse::<PositionRange>().is_err());
    }

    #[test]
    fn test_positional_backtest() {
        let t = table(&[
            [3, 10, 20, 30, 40, 45, 1], // all in range
            [6, 8, 9, 10, 11, 12, 13],  // only Num2 in range
        ]);
        let result = positional_backtest(&t, &DEFAULT_POSITION_RANGES).unwrap();
        assert_eq!(result.correct_counts, vec![6, 1]);
        assert_eq!(result.opposite_counts, vec![0, 5]);
        assert_eq!(result.correct_histogram.get(6), 1);
        assert_eq!(result.opposite_histogram.get(5), 1);
        assert_eq!(result.correct_histogram.total(), 1);
        assert!((result.mean_correct - 3.5).abs() < 1e-12);
        assert!((result.mean_opposite - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_positional_backtest_rejects_bad_ranges() {
        let t = table(&[[1, 2, 3, 4, 5, 6, 7]]);
        assert!(positional_backtest(&t, &DEFAULT_POSITION_RANGES[..5]).is_err());
        let mut ranges = DEFAULT_POSITION_RANGES;
        ranges[2] = PositionRange { low: 30, high: 20 };
        assert!(positional_backtest(&t, &ranges).is_err());
    }
}
