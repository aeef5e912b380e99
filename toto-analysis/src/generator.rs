use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use toto_db::Result;
use toto_db::models::{DRAW_SIZE, DrawRecord, DrawTable, POOL_SIZE, WINNING_COUNT};

pub const DEFAULT_SIMULATED_DRAWS: usize = 1000;

/// Seeded when `seed` is given, otherwise drawn from the thread RNG.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Six distinct winning numbers in ascending order, then an additional
/// number drawn uniformly from the 43 that remain.
pub fn generate_draw<R: Rng>(rng: &mut R) -> Result<DrawRecord> {
    let mut winning: Vec<u8> = index::sample(rng, POOL_SIZE as usize, WINNING_COUNT)
        .into_iter()
        .map(|i| i as u8 + 1)
        .collect();
    winning.sort_unstable();

    let remaining: Vec<u8> = (1..=POOL_SIZE).filter(|n| !winning.contains(n)).collect();
    let additional = remaining[rng.random_range(0..remaining.len())];

    let mut numbers = [0u8; DRAW_SIZE];
    numbers[..WINNING_COUNT].copy_from_slice(&winning);
    numbers[DRAW_SIZE - 1] = additional;
    DrawRecord::new(numbers)
}

/// `count` independent simulated draws. `count == 0` gives an empty table.
pub fn generate(count: usize, seed: Option<u64>) -> Result<DrawTable> {
    let mut rng = make_rng(seed);
    let mut table = DrawTable::with_capacity(count);
    for _ in 0..count {
        table.push(generate_draw(&mut rng)?);
    }
    log::debug!("generated {} draws (seed {:?})", count, seed);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::overall_frequency;
    use toto_db::models::Column;

    #[test]
    fn test_generate_count() {
        assert_eq!(generate(0, Some(1)).unwrap().len(), 0);
        assert_eq!(generate(250, Some(1)).unwrap().len(), 250);
    }

    #[test]
    fn test_generated_draws_are_valid() {
        for seed in [0u64, 7, 42, 20_251_019] {
            let table = generate(500, Some(seed)).unwrap();
            for draw in &table {
                let n = draw.numbers();
                assert!(n.iter().all(|&v| (1..=49).contains(&v)));
                assert!(draw.winning().windows(2).all(|w| w[0] < w[1]));
                assert!(!draw.winning().contains(&draw.additional()));
                // Revalidating through the public constructor must succeed.
                assert!(DrawRecord::new(*n).is_ok());
            }
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let a = generate(50, Some(42)).unwrap();
        let b = generate(50, Some(42)).unwrap();
        let c = generate(50, Some(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_near_uniform_frequencies() {
        let table = generate(1000, Some(42)).unwrap();
        let freq = overall_frequency(&table, &Column::WINNING);
        let expected = 1000.0 * 6.0 / 49.0;
        let p: f64 = 6.0 / 49.0;
        let sd = (1000.0 * p * (1.0 - p)).sqrt();
        for (number, count) in freq.iter() {
            let dev = (count as f64 - expected).abs() / sd;
            assert!(dev < 5.0, "number {} count {} deviates {:.2} sd", number, count, dev);
        }
        assert_eq!(freq.total(), 6000);
    }
}
