use serde::Serialize;

use crate::rng::Rng;
use crate::types::{StatBonus, StatKey};

pub const UPGRADE_CHOICES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UpgradeOption {
    pub bonus: StatBonus,
}

#[derive(Clone, Debug, Default)]
pub struct UpgradeSystem {
    active: bool,
    options: Vec<UpgradeOption>,
}

pub fn upgrade_value(difficulty: f64) -> i32 {
    1 + (difficulty / 2.0).floor() as i32
}

impl UpgradeSystem {
    /// Rolls distinct stat upgrades and opens the menu.
    pub fn generate_options(&mut self, difficulty: f64, rng: &mut Rng) -> &[UpgradeOption] {
        let value = upgrade_value(difficulty);
        let mut options: Vec<UpgradeOption> = Vec::with_capacity(UPGRADE_CHOICES);
        while options.len() < UPGRADE_CHOICES {
            let stat = StatKey::ALL[rng.pick_index(StatKey::ALL.len())];
            if options.iter().any(|o| o.bonus.stat == stat) {
                continue;
            }
            options.push(UpgradeOption {
                bonus: StatBonus { stat, value },
            });
        }
        self.options = options;
        self.active = true;
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn options(&self) -> &[UpgradeOption] {
        &self.options
    }

    pub fn select(&self, index: usize) -> Option<UpgradeOption> {
        self.options.get(index).copied()
    }

    pub fn close(&mut self) {
        self.active = false;
        self.options.clear();
    }
}
