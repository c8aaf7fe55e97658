pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_COLS: i32 = 120;
pub const DEFAULT_ROWS: i32 = 60;
pub const DEFAULT_VIEW_COLS: i32 = 60;
pub const DEFAULT_VIEW_ROWS: i32 = 24;

pub const WALL_GLYPH: char = '#';
pub const FLOOR_GLYPH: char = ' ';
pub const PLAYER_GLYPH: char = 'P';
pub const PROJECTILE_GLYPH: char = '*';
pub const ITEM_GLYPH: char = 'I';

pub const MIN_ROOM_SIZE: i32 = 9;
pub const MAX_ROOM_SIZE: i32 = 15;
pub const CELLS_PER_ROOM: i32 = 100;
pub const VALID_POSITION_ATTEMPTS: usize = 100;

pub const ENEMY_SPAWN_RATE: f64 = 0.15;
pub const ITEM_SPAWN_RATE: f64 = 0.05;
pub const SPAWN_ATTEMPTS: usize = 50;
pub const SPAWN_BAND: i32 = 6;
pub const SPECIAL_ITEM_CHANCE: f64 = 0.1;

pub const BASE_TICK_DELAY: f64 = 10.0;
pub const BASE_ATTACK_COOLDOWN: f64 = 30.0;
pub const MIN_ATTACK_COOLDOWN: i32 = 5;

pub const PATH_MAX_DISTANCE: i32 = 20;
pub const PATH_CACHE_TTL: u64 = 5;

pub const PROJECTILE_SPEED: f32 = 2.0;
pub const DEFAULT_PROJECTILE_RANGE: i32 = 3;

pub const PLAYER_BASE_HP: i32 = 10;
pub const PLAYER_BASE_ATTACK: i32 = 1;
pub const PLAYER_BASE_RANGE: i32 = 5;
pub const PLAYER_BASE_SPEED: f32 = 1.0;
pub const PLAYER_BASE_ATTACK_SPEED: f32 = 3.0;

pub const RANGED_ENEMY_RANGE: i32 = 5;
pub const BOSS_RANGE: i32 = 9;

pub const NEARBY_ENEMY_DISTANCE: i32 = 3;

pub fn tick_delay(speed: f32) -> u32 {
    if speed <= 0.0 || !speed.is_finite() {
        return u32::MAX;
    }
    (BASE_TICK_DELAY / speed as f64).floor().max(1.0) as u32
}

pub fn attack_cooldown(attack_speed: f32) -> i32 {
    let attack_speed = if attack_speed == 0.0 || !attack_speed.is_finite() {
        1.0
    } else {
        attack_speed as f64
    };
    ((BASE_ATTACK_COOLDOWN / attack_speed).floor() as i32).max(MIN_ATTACK_COOLDOWN)
}

pub fn difficulty_factor(tick: u64) -> f64 {
    (tick as f64 / 100.0).sqrt()
}
