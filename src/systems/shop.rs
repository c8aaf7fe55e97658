use serde::Serialize;
use thiserror::Error;

use crate::entity::Entity;
use crate::systems::ability::{AbilityKind, AbilitySystem};
use crate::systems::points::PointsSystem;
use crate::types::{StatBonus, StatKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("no shop offer at index {0}")]
    OutOfRange(usize),
    #[error("offer costs {cost} points but only {available} are available")]
    InsufficientPoints { cost: u32, available: u32 },
    #[error("ability {0} is already unlocked")]
    AlreadyUnlocked(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopEffect {
    Stat { bonus: StatBonus },
    Unlock { ability: AbilityKind },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShopOffer {
    pub cost: u32,
    pub effect: ShopEffect,
}

const STAT_OFFERS: [(StatKey, i32, u32); 6] = [
    (StatKey::Hp, 5, 50),
    (StatKey::Attack, 2, 75),
    (StatKey::Speed, 1, 60),
    (StatKey::Range, 2, 80),
    (StatKey::AttackSpeed, 1, 70),
    (StatKey::Hp, 10, 100),
];

#[derive(Clone, Debug, Default)]
pub struct ShopSystem {
    active: bool,
    offers: Vec<ShopOffer>,
}

impl ShopSystem {
    pub fn stock(&mut self, abilities: &AbilitySystem) {
        let mut offers: Vec<ShopOffer> = STAT_OFFERS
            .iter()
            .map(|(stat, value, cost)| ShopOffer {
                cost: *cost,
                effect: ShopEffect::Stat {
                    bonus: StatBonus {
                        stat: *stat,
                        value: *value,
                    },
                },
            })
            .collect();
        offers.extend(abilities.locked().into_iter().map(|ability| ShopOffer {
            cost: ability.cost(),
            effect: ShopEffect::Unlock { ability },
        }));
        self.offers = offers;
    }

    pub fn open(&mut self, abilities: &AbilitySystem) {
        self.stock(abilities);
        self.active = true;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn offers(&self) -> &[ShopOffer] {
        &self.offers
    }

    /// Charges the offer and applies it to the player.
    pub fn purchase(
        &mut self,
        index: usize,
        points: &mut PointsSystem,
        player: &mut Entity,
    ) -> Result<ShopOffer, PurchaseError> {
        let offer = *self
            .offers
            .get(index)
            .ok_or(PurchaseError::OutOfRange(index))?;

        if let ShopEffect::Unlock { ability } = offer.effect {
            let unlocked = player
                .behaviors
                .player
                .as_ref()
                .map(|control| control.abilities.is_unlocked(ability))
                .unwrap_or(false);
            if unlocked {
                return Err(PurchaseError::AlreadyUnlocked(ability.key()));
            }
        }

        if !points.spend(offer.cost) {
            return Err(PurchaseError::InsufficientPoints {
                cost: offer.cost,
                available: points.total(),
            });
        }

        match offer.effect {
            ShopEffect::Stat { bonus } => player.add_stats(bonus),
            ShopEffect::Unlock { ability } => {
                if let Some(control) = player.behaviors.player.as_mut() {
                    control.abilities.unlock(ability);
                }
                if let Some(control) = player.behaviors.player.as_ref() {
                    self.stock(&control.abilities);
                }
            }
        }
        Ok(offer)
    }
}

#[cfg(test)]
mod tests {
    use super::{PurchaseError, ShopEffect, ShopSystem};
    use crate::behavior::{BehaviorSet, PlayerControl};
    use crate::entity::Entity;
    use crate::systems::ability::{AbilityKind, AbilitySystem};
    use crate::systems::points::PointsSystem;
    use crate::types::{EntityId, EntityKind, Stats, Vec2};

    fn player() -> Entity {
        let mut entity = Entity::new(
            EntityId(1),
            EntityKind::Player,
            'P',
            Vec2::new(2, 2),
            Some(Stats {
                hp: Some(10),
                ..Stats::default()
            }),
        );
        entity.behaviors = BehaviorSet {
            player: Some(PlayerControl::default()),
            ..BehaviorSet::default()
        };
        entity
    }

    #[test]
    fn stock_lists_stats_then_locked_abilities() {
        let mut shop = ShopSystem::default();
        shop.open(&AbilitySystem::default());
        assert!(shop.is_active());
        assert_eq!(shop.offers().len(), 9);
        assert_eq!(shop.offers()[0].cost, 50);
        assert_eq!(
            shop.offers()[6].effect,
            ShopEffect::Unlock {
                ability: AbilityKind::Dash
            }
        );
    }

    #[test]
    fn purchase_applies_stat_and_deducts_points() {
        let mut shop = ShopSystem::default();
        let mut points = PointsSystem::default();
        let mut hero = player();
        shop.open(&AbilitySystem::default());
        points.add(120);

        assert!(shop.purchase(0, &mut points, &mut hero).is_ok());
        assert_eq!(hero.hp(), 15);
        assert_eq!(points.total(), 70);

        assert_eq!(
            shop.purchase(1, &mut points, &mut hero),
            Err(PurchaseError::InsufficientPoints {
                cost: 75,
                available: 70
            })
        );
        assert_eq!(
            shop.purchase(42, &mut points, &mut hero),
            Err(PurchaseError::OutOfRange(42))
        );
    }

    #[test]
    fn unlock_offer_is_removed_after_purchase() {
        let mut shop = ShopSystem::default();
        let mut points = PointsSystem::default();
        let mut hero = player();
        shop.open(&AbilitySystem::default());
        points.add(1_000);

        shop.purchase(8, &mut points, &mut hero).expect("heal unlock");
        let control = hero.behaviors.player.as_ref().expect("player control");
        assert!(control.abilities.is_unlocked(AbilityKind::Heal));
        assert_eq!(points.total(), 850);
        assert_eq!(shop.offers().len(), 8);
    }

    #[test]
    fn stale_unlock_offer_is_rejected() {
        let mut shop = ShopSystem::default();
        let mut points = PointsSystem::default();
        let mut hero = player();
        shop.open(&AbilitySystem::default());
        points.add(1_000);
        if let Some(control) = hero.behaviors.player.as_mut() {
            control.abilities.unlock(AbilityKind::Dash);
        }
        assert_eq!(
            shop.purchase(6, &mut points, &mut hero),
            Err(PurchaseError::AlreadyUnlocked("dash"))
        );
        assert_eq!(points.total(), 1_000);
    }
}
