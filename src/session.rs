use serde::Serialize;
use tracing::{debug, info};

use crate::config::WorldConfig;
use crate::constants::NEARBY_ENEMY_DISTANCE;
use crate::engine::World;
use crate::input::{InputState, Key};
use crate::render::{InfoLine, RenderFrame};
use crate::systems::{PointsSystem, ShopEffect, ShopSystem, UpgradeSystem, WaveSystem};
use crate::types::{EntityKind, RuntimeEvent};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub kills: u32,
    pub enemies_spawned: u32,
    pub items_spawned: u32,
    pub items_picked: u32,
    pub projectiles_fired: u32,
    pub player_hits: u32,
}

/// One run: the world plus the meta-progression that steers it.
pub struct GameSession {
    world: World,
    points: PointsSystem,
    waves: WaveSystem,
    upgrades: UpgradeSystem,
    shop: ShopSystem,
    stats: SessionStats,
    last_events: Vec<RuntimeEvent>,
}

impl GameSession {
    pub fn new(config: WorldConfig) -> Self {
        Self::from_world(World::new(config))
    }

    pub fn from_world(world: World) -> Self {
        let mut session = Self {
            world,
            points: PointsSystem::default(),
            waves: WaveSystem::default(),
            upgrades: UpgradeSystem::default(),
            shop: ShopSystem::default(),
            stats: SessionStats::default(),
            last_events: Vec::new(),
        };
        session
            .world
            .set_difficulty_multiplier(session.waves.difficulty_multiplier());
        session
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn points(&self) -> &PointsSystem {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut PointsSystem {
        &mut self.points
    }

    pub fn waves(&self) -> &WaveSystem {
        &self.waves
    }

    pub fn upgrades(&self) -> &UpgradeSystem {
        &self.upgrades
    }

    pub fn shop(&self) -> &ShopSystem {
        &self.shop
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Events produced by the latest step.
    pub fn last_events(&self) -> &[RuntimeEvent] {
        &self.last_events
    }

    pub fn is_game_over(&self) -> bool {
        self.world.is_game_over()
    }

    pub fn step(&mut self, input: &mut impl InputState) -> RenderFrame {
        self.last_events.clear();
        self.handle_menus(&*input);
        self.world.apply_player_input(&*input);
        input.clear();

        self.world.update();
        self.absorb_events();
        self.advance_wave();
        self.world
            .set_difficulty_multiplier(self.waves.difficulty_multiplier());

        if !self.world.is_paused() && !self.world.is_game_over() {
            self.world.generate_enemies();
            self.world.generate_items();
            self.absorb_events();
        }
        if !self.world.is_paused() {
            self.world.tick_abilities();
        }
        self.points.update(self.world.tick());

        let grid = self.world.build_grid();
        RenderFrame {
            tick: self.world.tick(),
            grid,
            info: self.info_lines(),
            debug: Vec::new(),
        }
    }

    fn handle_menus(&mut self, input: &impl InputState) {
        if self.upgrades.is_active() {
            if let Some(option) = input.pressed_digit().and_then(|i| self.upgrades.select(i)) {
                if let Some(player) = self.world.player_mut() {
                    player.add_stats(option.bonus);
                }
                info!(stat = option.bonus.stat.key(), value = option.bonus.value, "upgrade chosen");
                self.upgrades.close();
            } else if input.is_pressed(Key::Cancel) {
                self.upgrades.close();
            }
            if !self.upgrades.is_active() {
                self.world.set_paused(self.shop.is_active());
            }
            return;
        }

        if self.shop.is_active() {
            if let Some(index) = input.pressed_digit() {
                let Some(player) = self.world.player_mut() else {
                    return;
                };
                match self.shop.purchase(index, &mut self.points, player) {
                    Ok(offer) => info!(cost = offer.cost, effect = ?offer.effect, "shop purchase"),
                    Err(error) => debug!(%error, "shop purchase rejected"),
                }
            } else if input.is_pressed(Key::Cancel) || input.is_pressed(Key::Shop) {
                self.shop.close();
                self.world.set_paused(false);
            }
            return;
        }

        if input.is_pressed(Key::Shop) && !self.world.is_game_over() {
            let Some(control) = self
                .world
                .player()
                .and_then(|player| player.behaviors.player.as_ref())
            else {
                return;
            };
            self.shop.open(&control.abilities);
            self.world.set_paused(true);
        }
    }

    fn absorb_events(&mut self) {
        let player_id = self.world.player_id();
        for event in self.world.drain_events() {
            match &event {
                RuntimeEvent::EnemyKilled { kind, killer, .. } => {
                    if *killer == Some(player_id) {
                        let reward =
                            self.points
                                .register_kill(*kind, self.world.difficulty(), self.world.tick());
                        self.waves.register_kill();
                        self.stats.kills += 1;
                        debug!(points = reward.points, combo = reward.combo, "kill scored");
                    }
                }
                RuntimeEvent::EnemySpawned { .. } => self.stats.enemies_spawned += 1,
                RuntimeEvent::ItemSpawned { .. } => self.stats.items_spawned += 1,
                RuntimeEvent::ItemPicked { .. } => self.stats.items_picked += 1,
                RuntimeEvent::ProjectileFired { .. } => self.stats.projectiles_fired += 1,
                RuntimeEvent::PlayerHit { .. } => self.stats.player_hits += 1,
                RuntimeEvent::GameOver { .. } => {}
            }
            self.last_events.push(event);
        }
    }

    fn advance_wave(&mut self) {
        if !self.waves.is_complete() || self.upgrades.is_active() {
            return;
        }
        self.waves.next_wave();
        if self.waves.is_boss_wave() {
            self.world.request_boss();
        }
        let difficulty = self.world.difficulty();
        self.upgrades
            .generate_options(difficulty, self.world.rng_mut());
        self.world.set_paused(true);
        info!(wave = self.waves.wave(), boss = self.waves.is_boss_wave(), "wave complete");
    }

    fn info_lines(&self) -> Vec<InfoLine> {
        let mut info = vec![
            InfoLine::new("Seed", self.world.seed()),
            InfoLine::new("Tick", self.world.tick()),
            InfoLine::new("Difficulty", self.world.difficulty().floor()),
        ];
        let wave = self.waves.info();
        info.push(InfoLine::new(
            "Wave",
            format!("{} ({}/{})", wave.wave, wave.killed, wave.required),
        ));
        info.push(InfoLine::new("Points", self.points.total()));
        info.push(InfoLine::new("Combo", self.points.combo()));

        if let Some(player) = self.world.player() {
            let stats = player
                .stats
                .and_then(|s| serde_json::to_string(&s).ok())
                .unwrap_or_default();
            info.push(InfoLine::new("Player", stats));

            let nearby = self.world.entities().iter().filter(|e| {
                e.kind.is_hostile() && e.distance_to(player) <= NEARBY_ENEMY_DISTANCE
            });
            for (i, enemy) in nearby.enumerate() {
                let tag = match enemy.kind {
                    EntityKind::RangedEnemy => 'R',
                    EntityKind::Boss => 'B',
                    _ => 'E',
                };
                info.push(InfoLine::new(
                    format!("{tag} {i}"),
                    format!(
                        "HP:{} ATK:{} SPD:{} ASPD:{:.1}",
                        enemy.hp(),
                        enemy.attack_stat(),
                        enemy.speed_stat(),
                        enemy.attack_speed_stat()
                    ),
                ));
            }
        }

        if self.upgrades.is_active() {
            for (i, option) in self.upgrades.options().iter().enumerate() {
                info.push(InfoLine::new(
                    format!("Upgrade {}", i + 1),
                    format!("+{} {}", option.bonus.value, option.bonus.stat.key()),
                ));
            }
        } else if self.shop.is_active() {
            for (i, offer) in self.shop.offers().iter().enumerate() {
                let label = match offer.effect {
                    ShopEffect::Stat { bonus } => format!("+{} {}", bonus.value, bonus.stat.key()),
                    ShopEffect::Unlock { ability } => format!("unlock {}", ability.key()),
                };
                info.push(InfoLine::new(
                    format!("Shop {}", i + 1),
                    format!("{label} ({})", offer.cost),
                ));
            }
        }

        if self.world.is_game_over() {
            info.push(InfoLine::flag("GAMEOVER"));
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::GameSession;
    use crate::config::WorldConfig;
    use crate::constants::WALL_GLYPH;
    use crate::engine::World;
    use crate::input::{Key, KeyLatch};
    use crate::maze::Maze;
    use crate::types::{EnemyKind, Vec2};

    fn quiet_session() -> GameSession {
        let config = WorldConfig {
            cols: 20,
            rows: 10,
            view_cols: 10,
            view_rows: 6,
            enemy_spawn_rate: 0.0,
            item_spawn_rate: 0.0,
            ..WorldConfig::default()
        };
        GameSession::from_world(World::with_maze(
            config,
            Maze::open(20, 10, WALL_GLYPH),
            3,
            Vec2::new(2, 2),
        ))
    }

    #[test]
    fn frame_carries_core_info_lines() {
        let mut session = quiet_session();
        let mut input = KeyLatch::default();
        let frame = session.step(&mut input);
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.grid.len(), 6);
        assert_eq!(frame.info_value("Seed"), Some("3"));
        assert_eq!(frame.info_value("Wave"), Some("1 (0/5)"));
        assert_eq!(frame.info_value("Points"), Some("0"));
        assert!(frame.info_value("Player").is_some());
        assert!(!frame.has_info("GAMEOVER"));
    }

    #[test]
    fn nearby_enemies_are_listed() {
        let mut session = quiet_session();
        session
            .world_mut()
            .spawn_enemy_at(EnemyKind::Ranged, Vec2::new(4, 3));
        session
            .world_mut()
            .spawn_enemy_at(EnemyKind::Grunt, Vec2::new(15, 8));
        let frame = session.step(&mut KeyLatch::default());
        assert!(frame.has_info("R 0"));
        assert!(!frame.has_info("E 1"));
    }

    #[test]
    fn input_is_cleared_after_each_step() {
        let mut session = quiet_session();
        let mut input = KeyLatch::default();
        input.press(Key::Shoot);
        session.step(&mut input);
        assert!(input.is_empty());
        assert_eq!(session.stats().projectiles_fired, 1);
    }

    #[test]
    fn shop_pauses_and_resumes() {
        let mut session = quiet_session();
        let mut input = KeyLatch::default();
        input.press(Key::Shop);
        let frame = session.step(&mut input);
        assert!(session.shop().is_active());
        assert!(session.world().is_paused());
        assert!(frame.has_info("Shop 1"));
        let paused_tick = session.world().tick();

        session.points_mut().add(100);
        input.press(Key::Digit(1));
        session.step(&mut input);
        assert_eq!(session.points().total(), 50);
        assert_eq!(session.world().player().map(|p| p.hp()), Some(15));
        assert_eq!(session.world().tick(), paused_tick);

        input.press(Key::Cancel);
        session.step(&mut input);
        assert!(!session.shop().is_active());
        assert_eq!(session.world().tick(), paused_tick + 1);
    }

    #[test]
    fn player_kills_complete_a_wave_and_open_upgrades() {
        let mut session = quiet_session();
        let player_id = session.world().player_id();
        for i in 0..5 {
            let id = session
                .world_mut()
                .spawn_enemy_at(EnemyKind::Grunt, Vec2::new(10 + i, 6));
            if let Some(enemy) = session.world_mut().entity_mut(id) {
                enemy.last_attacker = Some(player_id);
                enemy.apply_damage(100);
            }
        }
        let frame = session.step(&mut KeyLatch::default());
        assert_eq!(session.stats().kills, 5);
        assert_eq!(session.waves().wave(), 2);
        assert!(session.upgrades().is_active());
        assert!(session.world().is_paused());
        assert!(frame.has_info("Upgrade 3"));
        assert!(session.points().total() >= 50);

        let before = session.world().player().and_then(|p| p.stats).expect("stats");
        let choice = session.upgrades().options()[0].bonus;
        let mut input = KeyLatch::default();
        input.press(Key::Digit(1));
        session.step(&mut input);
        assert!(!session.upgrades().is_active());
        assert!(!session.world().is_paused());
        let mut expected = before;
        expected.apply(choice);
        assert_eq!(session.world().player().and_then(|p| p.stats), Some(expected));
    }

    #[test]
    fn game_over_is_reported() {
        let mut session = quiet_session();
        if let Some(player) = session.world_mut().player_mut() {
            player.apply_damage(100);
        }
        let frame = session.step(&mut KeyLatch::default());
        assert!(session.is_game_over());
        assert!(frame.has_info("GAMEOVER"));
    }
}
