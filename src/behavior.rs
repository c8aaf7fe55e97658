use crate::constants::{attack_cooldown, PATH_CACHE_TTL, PATH_MAX_DISTANCE};
use crate::entity::Entity;
use crate::grid::GridQuery;
use crate::pathfinding::{find_next_step, greedy_candidates};
use crate::systems::ability::AbilitySystem;
use crate::types::{Direction, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorTag {
    Combat,
    RangedCombat,
    Movement,
    PlayerControl,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatBehavior;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangedCombatBehavior {
    pub range: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathCache {
    pub target: Vec2,
    pub step: Vec2,
    pub computed_at: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementBehavior {
    pub cache: Option<PathCache>,
}

#[derive(Clone, Debug, Default)]
pub struct PlayerControl {
    pub buffered_move: Option<Direction>,
    pub tick_counter: u32,
    pub abilities: AbilitySystem,
}

/// Capabilities an entity carries. Combat runs before movement.
#[derive(Clone, Debug, Default)]
pub struct BehaviorSet {
    pub combat: Option<CombatBehavior>,
    pub ranged: Option<RangedCombatBehavior>,
    pub movement: Option<MovementBehavior>,
    pub player: Option<PlayerControl>,
}

impl BehaviorSet {
    pub fn has(&self, tag: BehaviorTag) -> bool {
        match tag {
            BehaviorTag::Combat => self.combat.is_some(),
            BehaviorTag::RangedCombat => self.ranged.is_some(),
            BehaviorTag::Movement => self.movement.is_some(),
            BehaviorTag::PlayerControl => self.player.is_some(),
        }
    }

    pub fn melee() -> Self {
        Self {
            combat: Some(CombatBehavior),
            movement: Some(MovementBehavior::default()),
            ..Self::default()
        }
    }

    pub fn ranged(range: i32) -> Self {
        Self {
            combat: Some(CombatBehavior),
            ranged: Some(RangedCombatBehavior { range }),
            movement: Some(MovementBehavior::default()),
            ..Self::default()
        }
    }
}

/// Melee hit gated on cooldown and range. Returns whether the hit landed.
pub fn attack(attacker: &mut Entity, target: &mut Entity) -> bool {
    if !attacker.can_attack() {
        return false;
    }
    if attacker.distance_to(target) > attacker.range_stat() {
        return false;
    }
    target.apply_damage(attacker.attack_stat());
    target.last_attacker = Some(attacker.id);
    attacker.attack_cooldown = attack_cooldown(attacker.attack_speed_stat());
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangedAction {
    Melee,
    Shoot(Direction),
    Defer,
}

pub fn ranged_action(shooter: &Entity, range: i32, target: Vec2) -> RangedAction {
    let distance = shooter.position().manhattan(target);
    if distance == 1 {
        return RangedAction::Melee;
    }
    if distance > 1 && distance <= range {
        return RangedAction::Shoot(Direction::toward(target.x - shooter.x, target.y - shooter.y));
    }
    RangedAction::Defer
}

/// Steps one cell toward `target`. Returns whether the entity moved.
pub fn move_to_target(entity: &mut Entity, target: Vec2, grid: &impl GridQuery, tick: u64) -> bool {
    let here = entity.position();
    if here.manhattan(target) == 1 {
        return false;
    }

    let id = entity.id;
    let free = |cell: Vec2| !grid.is_occupied(cell.x, cell.y, Some(id), false);
    if let Some(step) = greedy_candidates(here, target).into_iter().find(|c| free(*c)) {
        entity.move_to(step);
        return true;
    }

    let mut movement = entity.behaviors.movement.take().unwrap_or_default();
    let cached = movement.cache.filter(|cache| {
        cache.target == target
            && tick.saturating_sub(cache.computed_at) < PATH_CACHE_TTL
            && cache.step.manhattan(here) == 1
            && free(cache.step)
    });
    let step = match cached {
        Some(cache) => Some(cache.step),
        None => {
            let step = find_next_step(here, target, grid, PATH_MAX_DISTANCE);
            movement.cache = step.map(|step| PathCache {
                target,
                step,
                computed_at: tick,
            });
            step
        }
    };
    entity.behaviors.movement = Some(movement);

    match step {
        Some(step) if free(step) => {
            entity.move_to(step);
            true
        }
        _ => false,
    }
}
