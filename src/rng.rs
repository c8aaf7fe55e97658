const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u32>())
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn next_f64(&mut self) -> f64 {
        self.seed = self
            .seed
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.seed as f64 / TWO_POW_32
    }

    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Inclusive on both ends. An inverted range collapses toward `min`.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        self.range(min as f64, max as f64 + 1.0).floor() as i32
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.next_f64() * len as f64).floor() as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn first_draw_matches_recurrence() {
        let mut rng = Rng::new(0);
        let value = rng.next_f64();
        assert_eq!(rng.seed(), 1_013_904_223);
        assert_eq!(value, 1_013_904_223.0 / 4_294_967_296.0);
    }

    #[test]
    fn recurrence_wraps_modulo_two_pow_32() {
        let mut rng = Rng::new(u32::MAX);
        rng.next_f64();
        let expected = ((u32::MAX as u64) * 1_664_525 + 1_013_904_223) % (1u64 << 32);
        assert_eq!(rng.seed() as u64, expected);
    }

    #[test]
    fn same_seed_replays_same_stream() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..1_000 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn entropy_seed_replays_through_new() {
        let mut drawn = Rng::from_entropy();
        let mut replay = Rng::new(drawn.seed());
        for _ in 0..100 {
            assert_eq!(drawn.next_f64().to_bits(), replay.next_f64().to_bits());
        }
    }

    #[test]
    fn set_seed_restarts_stream() {
        let mut rng = Rng::new(7);
        let first: Vec<i32> = (0..10).map(|_| rng.int(0, 100)).collect();
        rng.set_seed(7);
        let second: Vec<i32> = (0..10).map(|_| rng.int(0, 100)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn int_stays_within_inclusive_bounds() {
        let mut rng = Rng::new(1234);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..5_000 {
            let value = rng.int(9, 15);
            assert!((9..=15).contains(&value));
            saw_min |= value == 9;
            saw_max |= value == 15;
        }
        assert!(saw_min && saw_max);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut rng = Rng::new(99);
        for _ in 0..10_000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn chance_extremes() {
        let mut rng = Rng::new(5);
        for _ in 0..500 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn pick_index_never_overflows() {
        let mut rng = Rng::new(3);
        for _ in 0..2_000 {
            assert!(rng.pick_index(4) < 4);
        }
        assert_eq!(rng.pick_index(0), 0);
    }
}
