use serde::Serialize;

use crate::types::EnemyKind;

pub const COMBO_TIMEOUT: u64 = 30;
const MAX_COMBO_MULTIPLIER: f64 = 3.0;
const STREAK_STEP: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillReward {
    pub points: u32,
    pub combo: u32,
    pub kill_streak: u32,
    pub multiplier: f64,
}

pub fn base_points(kind: EnemyKind) -> u32 {
    match kind {
        EnemyKind::Grunt | EnemyKind::Fast => 10,
        EnemyKind::Ranged => 15,
        EnemyKind::Boss => 50,
    }
}

#[derive(Clone, Debug, Default)]
pub struct PointsSystem {
    total: u32,
    combo: u32,
    kill_streak: u32,
    last_kill_tick: u64,
}

impl PointsSystem {
    /// Scores a kill, advancing the combo when it lands within the timeout.
    pub fn register_kill(&mut self, kind: EnemyKind, difficulty: f64, tick: u64) -> KillReward {
        if tick.saturating_sub(self.last_kill_tick) <= COMBO_TIMEOUT {
            self.combo += 1;
            self.kill_streak += 1;
        } else {
            self.combo = 1;
            self.kill_streak = 1;
        }
        self.last_kill_tick = tick;

        let multiplier = (1.0 + (self.combo as f64 - 1.0) * 0.2).min(MAX_COMBO_MULTIPLIER);
        let streak_bonus = (self.kill_streak / STREAK_STEP) * STREAK_STEP;
        let scaled = base_points(kind) as f64 * (1.0 + difficulty / 10.0) * multiplier;
        let points = scaled.floor().max(0.0) as u32 + streak_bonus;
        self.total += points;

        KillReward {
            points,
            combo: self.combo,
            kill_streak: self.kill_streak,
            multiplier,
        }
    }

    pub fn add(&mut self, amount: u32) {
        self.total += amount;
    }

    pub fn spend(&mut self, amount: u32) -> bool {
        if self.total < amount {
            return false;
        }
        self.total -= amount;
        true
    }

    pub fn update(&mut self, tick: u64) {
        if tick.saturating_sub(self.last_kill_tick) > COMBO_TIMEOUT && self.combo > 0 {
            self.combo = 0;
            self.kill_streak = 0;
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn kill_streak(&self) -> u32 {
        self.kill_streak
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
