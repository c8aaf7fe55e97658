use crate::behavior::BehaviorSet;
use crate::constants::{BOSS_RANGE, RANGED_ENEMY_RANGE};
use crate::entity::Entity;
use crate::rng::Rng;
use crate::types::{EnemyKind, EntityId, EntityKind, Stats, Vec2};

pub struct EnemyDescriptor {
    pub glyph: char,
    pub entity_kind: EntityKind,
    pub stats: fn(f64) -> Stats,
    pub behaviors: fn() -> BehaviorSet,
}

fn base_stats(difficulty: f64) -> Stats {
    Stats {
        hp: Some(difficulty.floor() as i32),
        attack: Some(1 + (difficulty / 2.0).floor() as i32),
        range: None,
        speed: Some(0.25 + (difficulty / 10.0).floor() as f32),
        attack_speed: Some(0.5 + (difficulty / 10.0).floor() as f32),
    }
}

fn fast_stats(difficulty: f64) -> Stats {
    let base = base_stats(difficulty);
    Stats {
        speed: base.speed.map(|s| s * 1.5),
        hp: base.hp.map(|hp| (hp as f64 * 0.75).floor() as i32),
        ..base
    }
}

fn ranged_stats(difficulty: f64) -> Stats {
    let base = base_stats(difficulty);
    Stats {
        attack: base.attack.map(|a| (a as f64 * 1.5).floor() as i32),
        attack_speed: base.attack_speed.map(|s| s / 2.0),
        range: Some(RANGED_ENEMY_RANGE),
        ..base
    }
}

fn boss_stats(difficulty: f64) -> Stats {
    let base = base_stats(difficulty);
    Stats {
        hp: base.hp.map(|hp| hp * 10),
        attack: base.attack.map(|a| a * 3),
        range: Some(BOSS_RANGE),
        speed: base.speed.map(|s| s * 0.8),
        attack_speed: base.attack_speed.map(|s| s * 1.5),
    }
}

fn ranged_behaviors() -> BehaviorSet {
    BehaviorSet::ranged(RANGED_ENEMY_RANGE)
}

fn boss_behaviors() -> BehaviorSet {
    BehaviorSet::ranged(BOSS_RANGE)
}

impl EnemyKind {
    pub fn descriptor(self) -> EnemyDescriptor {
        match self {
            EnemyKind::Grunt => EnemyDescriptor {
                glyph: 'E',
                entity_kind: EntityKind::Enemy,
                stats: base_stats,
                behaviors: BehaviorSet::melee,
            },
            EnemyKind::Fast => EnemyDescriptor {
                glyph: 'F',
                entity_kind: EntityKind::Enemy,
                stats: fast_stats,
                behaviors: BehaviorSet::melee,
            },
            EnemyKind::Ranged => EnemyDescriptor {
                glyph: 'R',
                entity_kind: EntityKind::RangedEnemy,
                stats: ranged_stats,
                behaviors: ranged_behaviors,
            },
            EnemyKind::Boss => EnemyDescriptor {
                glyph: 'B',
                entity_kind: EntityKind::Boss,
                stats: boss_stats,
                behaviors: boss_behaviors,
            },
        }
    }

    /// Builds a live enemy; hp is floored at 1 so fresh spawns are never dead.
    pub fn spawn(self, id: EntityId, position: Vec2, difficulty: f64) -> Entity {
        let descriptor = self.descriptor();
        let mut stats = (descriptor.stats)(difficulty);
        stats.hp = Some(stats.hp().max(1));
        let mut entity = Entity::new(
            id,
            descriptor.entity_kind,
            descriptor.glyph,
            position,
            Some(stats),
        );
        entity.behaviors = (descriptor.behaviors)();
        entity.enemy_kind = Some(self);
        entity
    }
}

#[derive(Clone, Debug)]
pub struct EnemyRegistry {
    entries: Vec<(EnemyKind, u32)>,
    total_weight: u32,
}

impl Default for EnemyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(EnemyKind::Grunt, 70);
        registry.register(EnemyKind::Ranged, 20);
        registry.register(EnemyKind::Fast, 20);
        registry
    }
}

impl EnemyRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            total_weight: 0,
        }
    }

    pub fn register(&mut self, kind: EnemyKind, weight: u32) {
        self.entries.push((kind, weight));
        self.total_weight += weight;
    }

    pub fn kinds(&self) -> impl Iterator<Item = EnemyKind> + '_ {
        self.entries.iter().map(|(kind, _)| *kind)
    }

    pub fn select(&self, rng: &mut Rng) -> Option<EnemyKind> {
        let (last, _) = self.entries.last()?;
        let mut roll = rng.next_f64() * self.total_weight as f64;
        for (kind, weight) in &self.entries {
            roll -= *weight as f64;
            if roll <= 0.0 {
                return Some(*kind);
            }
        }
        Some(*last)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::EnemyRegistry;
    use crate::behavior::BehaviorTag;
    use crate::rng::Rng;
    use crate::types::{EnemyKind, EntityId, EntityKind, Vec2};

    #[test]
    fn weighted_selection_roughly_matches_weights() {
        let registry = EnemyRegistry::default();
        let mut rng = Rng::new(17);
        let mut counts: HashMap<EnemyKind, u32> = HashMap::new();
        for _ in 0..11_000 {
            let kind = registry.select(&mut rng).expect("registered kind");
            *counts.entry(kind).or_default() += 1;
        }
        let grunts = counts.get(&EnemyKind::Grunt).copied().unwrap_or(0);
        let ranged = counts.get(&EnemyKind::Ranged).copied().unwrap_or(0);
        let fast = counts.get(&EnemyKind::Fast).copied().unwrap_or(0);
        assert!((6_500..7_500).contains(&grunts), "grunts={grunts}");
        assert!((1_600..2_400).contains(&ranged), "ranged={ranged}");
        assert!((1_600..2_400).contains(&fast), "fast={fast}");
        assert!(!counts.contains_key(&EnemyKind::Boss));
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let mut rng = Rng::new(1);
        assert_eq!(EnemyRegistry::empty().select(&mut rng), None);
    }

    #[test]
    fn stat_formulas_per_kind() {
        let grunt = EnemyKind::Grunt.spawn(EntityId(1), Vec2::new(1, 1), 4.0);
        let stats = grunt.stats.expect("stats");
        assert_eq!(stats.hp, Some(4));
        assert_eq!(stats.attack, Some(3));
        assert_eq!(stats.speed, Some(0.25));
        assert_eq!(stats.attack_speed, Some(0.5));
        assert_eq!(grunt.glyph, 'E');

        let fast = EnemyKind::Fast.spawn(EntityId(2), Vec2::new(1, 1), 4.0);
        let stats = fast.stats.expect("stats");
        assert_eq!(stats.hp, Some(3));
        assert_eq!(stats.speed, Some(0.375));

        let ranged = EnemyKind::Ranged.spawn(EntityId(3), Vec2::new(1, 1), 4.0);
        let stats = ranged.stats.expect("stats");
        assert_eq!(stats.attack, Some(4));
        assert_eq!(stats.attack_speed, Some(0.25));
        assert_eq!(stats.range, Some(5));
        assert_eq!(ranged.kind, EntityKind::RangedEnemy);
        assert!(ranged.behaviors.has(BehaviorTag::RangedCombat));

        let boss = EnemyKind::Boss.spawn(EntityId(4), Vec2::new(1, 1), 4.0);
        let stats = boss.stats.expect("stats");
        assert_eq!(stats.hp, Some(40));
        assert_eq!(stats.attack, Some(9));
        assert_eq!(stats.range, Some(9));
        assert_eq!(boss.behaviors.ranged.map(|r| r.range), Some(9));
        assert_eq!(boss.enemy_kind, Some(EnemyKind::Boss));
    }

    #[test]
    fn spawned_enemies_are_never_born_dead() {
        for kind in [EnemyKind::Grunt, EnemyKind::Fast, EnemyKind::Ranged, EnemyKind::Boss] {
            let enemy = kind.spawn(EntityId(5), Vec2::new(2, 2), 0.0);
            assert_eq!(enemy.hp(), 1, "{kind:?}");
            assert!(!enemy.dead);
        }
    }
}
