use serde::Serialize;

pub const DASH_DISTANCE: i32 = 3;
pub const AREA_RADIUS: i32 = 2;
pub const AREA_DAMAGE_FACTOR: i32 = 2;
pub const HEAL_AMOUNT: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    Dash,
    Area,
    Heal,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 3] = [AbilityKind::Dash, AbilityKind::Area, AbilityKind::Heal];

    pub fn key(self) -> &'static str {
        match self {
            AbilityKind::Dash => "dash",
            AbilityKind::Area => "aoe",
            AbilityKind::Heal => "heal",
        }
    }

    pub fn max_cooldown(self) -> u32 {
        match self {
            AbilityKind::Dash => 60,
            AbilityKind::Area => 90,
            AbilityKind::Heal => 120,
        }
    }

    pub fn cost(self) -> u32 {
        match self {
            AbilityKind::Dash => 200,
            AbilityKind::Area => 300,
            AbilityKind::Heal => 150,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityStatus {
    pub kind: AbilityKind,
    pub cooldown: u32,
    pub max_cooldown: u32,
    pub ready: bool,
    pub unlocked: bool,
    pub cost: u32,
}

#[derive(Clone, Copy, Debug, Default)]
struct AbilitySlot {
    cooldown: u32,
    unlocked: bool,
}

/// Cooldown and unlock bookkeeping for the player's active abilities.
/// The effects themselves are applied by the world.
#[derive(Clone, Debug, Default)]
pub struct AbilitySystem {
    slots: [AbilitySlot; 3],
}

impl AbilitySystem {
    fn slot(&self, kind: AbilityKind) -> &AbilitySlot {
        &self.slots[kind as usize]
    }

    fn slot_mut(&mut self, kind: AbilityKind) -> &mut AbilitySlot {
        &mut self.slots[kind as usize]
    }

    /// Returns false when the ability was already unlocked.
    pub fn unlock(&mut self, kind: AbilityKind) -> bool {
        let slot = self.slot_mut(kind);
        if slot.unlocked {
            return false;
        }
        slot.unlocked = true;
        true
    }

    pub fn is_unlocked(&self, kind: AbilityKind) -> bool {
        self.slot(kind).unlocked
    }

    pub fn is_ready(&self, kind: AbilityKind) -> bool {
        let slot = self.slot(kind);
        slot.unlocked && slot.cooldown == 0
    }

    pub fn cooldown(&self, kind: AbilityKind) -> u32 {
        self.slot(kind).cooldown
    }

    /// Starts the cooldown after a successful activation.
    pub fn trigger(&mut self, kind: AbilityKind) {
        self.slot_mut(kind).cooldown = kind.max_cooldown();
    }

    pub fn update(&mut self) {
        for slot in &mut self.slots {
            slot.cooldown = slot.cooldown.saturating_sub(1);
        }
    }

    pub fn status(&self) -> Vec<AbilityStatus> {
        AbilityKind::ALL
            .iter()
            .map(|kind| {
                let slot = self.slot(*kind);
                AbilityStatus {
                    kind: *kind,
                    cooldown: slot.cooldown,
                    max_cooldown: kind.max_cooldown(),
                    ready: slot.cooldown == 0,
                    unlocked: slot.unlocked,
                    cost: kind.cost(),
                }
            })
            .collect()
    }

    pub fn locked(&self) -> Vec<AbilityKind> {
        AbilityKind::ALL
            .into_iter()
            .filter(|kind| !self.is_unlocked(*kind))
            .collect()
    }
}
