use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Vec2) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn offset(self, dir: Direction) -> Vec2 {
        let (dx, dy) = dir.delta();
        Vec2 {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Discretizes a delta onto one axis; ties go to the horizontal axis.
    pub fn toward(dx: i32, dy: i32) -> Self {
        if dx.abs() >= dy.abs() && dx != 0 {
            if dx > 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dy > 0 {
            Direction::South
        } else {
            Direction::North
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Enemy,
    RangedEnemy,
    Boss,
    Projectile,
    Item,
}

impl EntityKind {
    pub fn is_hostile(self) -> bool {
        matches!(
            self,
            EntityKind::Enemy | EntityKind::RangedEnemy | EntityKind::Boss
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    Hp,
    Attack,
    Range,
    Speed,
    AttackSpeed,
}

impl StatKey {
    pub const ALL: [StatKey; 5] = [
        StatKey::Hp,
        StatKey::Attack,
        StatKey::Range,
        StatKey::Speed,
        StatKey::AttackSpeed,
    ];

    pub const PICKUP: [StatKey; 4] = [StatKey::Hp, StatKey::Attack, StatKey::Range, StatKey::Speed];

    pub fn key(self) -> &'static str {
        match self {
            StatKey::Hp => "hp",
            StatKey::Attack => "attack",
            StatKey::Range => "range",
            StatKey::Speed => "speed",
            StatKey::AttackSpeed => "attackSpeed",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(rename = "attackSpeed", skip_serializing_if = "Option::is_none")]
    pub attack_speed: Option<f32>,
}

impl Stats {
    pub fn hp(&self) -> i32 {
        self.hp.unwrap_or(0)
    }

    pub fn attack(&self) -> i32 {
        self.attack.unwrap_or(1)
    }

    pub fn range(&self) -> i32 {
        self.range.unwrap_or(1)
    }

    pub fn speed(&self) -> f32 {
        self.speed.unwrap_or(1.0)
    }

    pub fn attack_speed(&self) -> f32 {
        self.attack_speed.unwrap_or(1.0)
    }

    pub fn apply(&mut self, bonus: StatBonus) {
        if bonus.value == 0 {
            return;
        }
        match bonus.stat {
            StatKey::Hp => *self.hp.get_or_insert(0) += bonus.value,
            StatKey::Attack => *self.attack.get_or_insert(0) += bonus.value,
            StatKey::Range => *self.range.get_or_insert(0) += bonus.value,
            StatKey::Speed => *self.speed.get_or_insert(0.0) += bonus.value as f32,
            StatKey::AttackSpeed => *self.attack_speed.get_or_insert(0.0) += bonus.value as f32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    pub stat: StatKey,
    pub value: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Grunt,
    Fast,
    Ranged,
    Boss,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    EnemySpawned {
        id: EntityId,
        kind: EnemyKind,
        x: i32,
        y: i32,
    },
    ItemSpawned {
        id: EntityId,
        bonus: StatBonus,
        x: i32,
        y: i32,
    },
    ItemPicked {
        id: EntityId,
        bonus: StatBonus,
    },
    ProjectileFired {
        id: EntityId,
        owner: EntityId,
        direction: Direction,
    },
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
        killer: Option<EntityId>,
    },
    PlayerHit {
        by: EntityId,
        damage: i32,
        hp: i32,
    },
    GameOver {
        tick: u64,
    },
}
