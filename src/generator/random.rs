//! Random sample values
//!
//! Mirrors the board library: integers come from a half-open range, floats
//! from an integer draw scaled into `(0, 1)` by rejection.

use rand::Rng;

pub const DEFAULT_INT_LOWER: i64 = 0;
pub const DEFAULT_INT_UPPER: i64 = 100;
pub const DEFAULT_FLOAT_SCALE: f64 = 1.0;

/// Integer range the float draw starts from, upper bound exclusive
const FLOAT_DRAW_LOWER: i64 = 1;
const FLOAT_DRAW_UPPER: i64 = 401;
/// Divisor that maps the integer draw toward `(0, 1)`
const FLOAT_DIVISOR: f64 = 101.1;

/// Attempts after which a float draw is reported as unusually slow
const SLOW_DRAW_ATTEMPTS: u64 = 1_000;

/// Uniform integer in `[lower, upper)`; returns `lower` when the range is empty
pub fn random_integer<R: Rng + ?Sized>(rng: &mut R, lower: i64, upper: i64) -> i64 {
    if upper <= lower {
        return lower;
    }
    rng.gen_range(lower..upper)
}

/// Smallest and largest values `random_float` can return for `scale`
pub fn float_bounds(scale: f64) -> (f64, f64) {
    let largest_draw = (FLOAT_DIVISOR.ceil() as i64 - 1).min(FLOAT_DRAW_UPPER - 1);
    (
        FLOAT_DRAW_LOWER as f64 / FLOAT_DIVISOR * scale,
        largest_draw as f64 / FLOAT_DIVISOR * scale,
    )
}

/// Float in the open interval `(0, scale)`
pub fn random_float<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        let draw = random_integer(rng, FLOAT_DRAW_LOWER, FLOAT_DRAW_UPPER) as f64 / FLOAT_DIVISOR;
        if draw > 0.0 && draw < 1.0 {
            return draw * scale;
        }
        if attempts == SLOW_DRAW_ATTEMPTS {
            log::warn!("random_float still rejecting after {} draws", attempts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_integer_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for (lower, upper) in [(0, 100), (-5, 5), (10, 11), (-1_000, -990)] {
            for _ in 0..2_000 {
                let value = random_integer(&mut rng, lower, upper);
                assert!(value >= lower && value < upper, "{value} not in [{lower}, {upper})");
            }
        }
    }

    #[test]
    fn test_integer_upper_is_exclusive() {
        let mut rng = StdRng::seed_from_u64(1);
        let hit_top = (0..5_000).any(|_| random_integer(&mut rng, 0, 3) == 2);
        let hit_upper = (0..5_000).any(|_| random_integer(&mut rng, 0, 3) == 3);
        assert!(hit_top);
        assert!(!hit_upper);
    }

    #[test]
    fn test_integer_empty_range() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(random_integer(&mut rng, 5, 5), 5);
        assert_eq!(random_integer(&mut rng, 9, 2), 9);
    }

    #[test]
    fn test_float_open_interval() {
        let mut rng = StdRng::seed_from_u64(11);
        for scale in [DEFAULT_FLOAT_SCALE, 0.5, 10.0, 250.0] {
            for _ in 0..2_000 {
                let value = random_float(&mut rng, scale);
                assert!(value > 0.0 && value < scale, "{value} not in (0, {scale})");
            }
        }
    }

    #[test]
    fn test_float_granularity() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let steps = random_float(&mut rng, DEFAULT_FLOAT_SCALE) * FLOAT_DIVISOR;
            assert!((steps - steps.round()).abs() < 1e-9);
            assert!(steps.round() >= 1.0 && steps.round() <= 101.0);
        }
    }

    #[test]
    fn test_float_bounds_cover_every_draw() {
        let (smallest, largest) = float_bounds(2.0);
        assert!(smallest > 0.0 && largest < 2.0);

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let value = random_float(&mut rng, 2.0);
            assert!(value >= smallest && value <= largest, "{value}");
        }
    }
}
