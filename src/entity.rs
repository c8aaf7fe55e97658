use crate::behavior::BehaviorSet;
use crate::types::{Direction, EnemyKind, EntityId, EntityKind, StatBonus, Stats, Vec2};

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub glyph: char,
    pub x: i32,
    pub y: i32,
    pub prev_x: i32,
    pub prev_y: i32,
    pub direction: Direction,
    pub stats: Option<Stats>,
    pub attack_cooldown: i32,
    pub tick_counter: u32,
    pub dead: bool,
    pub behaviors: BehaviorSet,
    /// Stat payload carried by items.
    pub effect: Option<StatBonus>,
    pub enemy_kind: Option<EnemyKind>,
    pub last_attacker: Option<EntityId>,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        glyph: char,
        position: Vec2,
        stats: Option<Stats>,
    ) -> Self {
        Self {
            id,
            kind,
            glyph,
            x: position.x,
            y: position.y,
            prev_x: position.x,
            prev_y: position.y,
            direction: Direction::South,
            stats,
            attack_cooldown: 0,
            tick_counter: 0,
            dead: false,
            behaviors: BehaviorSet::default(),
            effect: None,
            enemy_kind: None,
            last_attacker: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Entity) -> i32 {
        self.position().manhattan(other.position())
    }

    pub fn hp(&self) -> i32 {
        self.stats.map(|s| s.hp()).unwrap_or(0)
    }

    pub fn attack_stat(&self) -> i32 {
        self.stats.map(|s| s.attack()).unwrap_or(1)
    }

    pub fn range_stat(&self) -> i32 {
        self.stats.map(|s| s.range()).unwrap_or(1)
    }

    pub fn speed_stat(&self) -> f32 {
        self.stats.map(|s| s.speed()).unwrap_or(1.0)
    }

    pub fn attack_speed_stat(&self) -> f32 {
        self.stats.map(|s| s.attack_speed()).unwrap_or(1.0)
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.prev_x = self.x;
        self.prev_y = self.y;
        if let Some(direction) = Direction::from_delta(dx, dy) {
            self.direction = direction;
        }
        self.x += dx;
        self.y += dy;
    }

    pub fn move_to(&mut self, cell: Vec2) {
        self.move_by(cell.x - self.x, cell.y - self.y);
    }

    /// Turns toward an adjacent cell without moving.
    pub fn face_toward(&mut self, x: i32, y: i32) {
        if let Some(direction) = Direction::from_delta(x - self.x, y - self.y) {
            self.direction = direction;
        }
    }

    pub fn facing_cell(&self) -> Vec2 {
        self.position().offset(self.direction)
    }

    pub fn age_cooldown(&mut self) {
        self.attack_cooldown = (self.attack_cooldown - 1).max(0);
    }

    pub fn can_attack(&self) -> bool {
        self.attack_cooldown <= 0
    }

    pub fn add_stats(&mut self, bonus: StatBonus) {
        self.stats.get_or_insert_with(Stats::default).apply(bonus);
    }

    /// Returns true when this hit killed the entity.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        let Some(stats) = self.stats.as_mut() else {
            return false;
        };
        let hp = (stats.hp() - amount).max(0);
        stats.hp = Some(hp);
        if hp == 0 && !self.dead {
            self.dead = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::Entity;
    use crate::types::{Direction, EntityId, EntityKind, StatBonus, StatKey, Stats, Vec2};

    fn grunt(hp: i32) -> Entity {
        Entity::new(
            EntityId(9),
            EntityKind::Enemy,
            'E',
            Vec2::new(3, 3),
            Some(Stats {
                hp: Some(hp),
                ..Stats::default()
            }),
        )
    }

    #[test]
    fn damage_clamps_at_zero_and_marks_dead_once() {
        let mut entity = grunt(3);
        assert!(entity.apply_damage(4));
        assert_eq!(entity.hp(), 0);
        assert!(entity.dead);
        assert!(!entity.apply_damage(4));
        assert_eq!(entity.hp(), 0);
    }

    #[test]
    fn damage_without_stats_is_ignored() {
        let mut entity = Entity::new(
            EntityId(2),
            EntityKind::Item,
            'I',
            Vec2::new(1, 1),
            None,
        );
        assert!(!entity.apply_damage(10));
        assert!(!entity.dead);
        assert!(entity.stats.is_none());
    }

    #[test]
    fn move_records_previous_cell_and_direction() {
        let mut entity = grunt(5);
        entity.move_by(-1, 0);
        assert_eq!(entity.position(), Vec2::new(2, 3));
        assert_eq!((entity.prev_x, entity.prev_y), (3, 3));
        assert_eq!(entity.direction, Direction::West);
        assert_eq!(entity.facing_cell(), Vec2::new(1, 3));
        entity.face_toward(2, 2);
        assert_eq!(entity.direction, Direction::North);
        assert_eq!(entity.position(), Vec2::new(2, 3));
    }

    #[test]
    fn cooldown_never_goes_negative() {
        let mut entity = grunt(5);
        entity.attack_cooldown = 1;
        entity.age_cooldown();
        entity.age_cooldown();
        assert_eq!(entity.attack_cooldown, 0);
        assert!(entity.can_attack());
    }

    #[test]
    fn add_stats_creates_missing_bag() {
        let mut entity = Entity::new(
            EntityId(3),
            EntityKind::Player,
            'P',
            Vec2::new(1, 1),
            None,
        );
        entity.add_stats(StatBonus {
            stat: StatKey::Attack,
            value: 2,
        });
        assert_eq!(entity.attack_stat(), 2);
    }
}
