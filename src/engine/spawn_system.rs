use super::*;

impl World {
    /// One spawn roll per call; a failed roll or a crowded map spawns nothing.
    pub fn generate_enemies(&mut self) -> Option<EntityId> {
        let chance = self.config.enemy_spawn_rate + self.difficulty() / 10.0;
        if !self.rng.chance(chance) {
            return None;
        }
        let cell = self.pick_spawn_cell()?;
        let kind = if self.boss_pending {
            EnemyKind::Boss
        } else {
            self.registry.select(&mut self.rng)?
        };
        if kind == EnemyKind::Boss {
            self.boss_pending = false;
        }
        Some(self.spawn_enemy_at(kind, cell))
    }

    pub fn generate_items(&mut self) -> Option<EntityId> {
        let difficulty = self.difficulty();
        let chance = self.config.item_spawn_rate + difficulty / 10.0;
        if !self.rng.chance(chance) {
            return None;
        }
        let cell = self.pick_spawn_cell()?;
        let value = 1 + (difficulty / 2.0).floor() as i32;
        let special = self.rng.chance(SPECIAL_ITEM_CHANCE);
        let bonus = if special {
            let stat = StatKey::ALL[self.rng.pick_index(StatKey::ALL.len())];
            StatBonus {
                stat,
                value: value * 2,
            }
        } else {
            let stat = StatKey::PICKUP[self.rng.pick_index(StatKey::PICKUP.len())];
            StatBonus { stat, value }
        };
        Some(self.spawn_item_at(bonus, cell, special))
    }

    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, cell: Vec2) -> EntityId {
        let id = self.make_id();
        let enemy = kind.spawn(id, cell, self.difficulty());
        self.grid.track(&enemy);
        self.entities.push(enemy);
        self.events.push(RuntimeEvent::EnemySpawned {
            id,
            kind,
            x: cell.x,
            y: cell.y,
        });
        debug!(tick = self.tick, entity = id.0, ?kind, x = cell.x, y = cell.y, "enemy spawned");
        id
    }

    pub fn spawn_item_at(&mut self, bonus: StatBonus, cell: Vec2, special: bool) -> EntityId {
        let id = self.make_id();
        let glyph = if special {
            special_item_glyph(bonus.stat)
        } else {
            ITEM_GLYPH
        };
        let mut item = Entity::new(id, EntityKind::Item, glyph, cell, None);
        item.effect = Some(bonus);
        self.grid.track(&item);
        self.entities.push(item);
        self.events.push(RuntimeEvent::ItemSpawned {
            id,
            bonus,
            x: cell.x,
            y: cell.y,
        });
        debug!(tick = self.tick, entity = id.0, stat = bonus.stat.key(), value = bonus.value, "item spawned");
        id
    }

    /// First half of the attempts sample a band just outside the camera view,
    /// the rest sample the whole interior.
    fn pick_spawn_cell(&mut self) -> Option<Vec2> {
        let cols = self.grid.cols();
        let rows = self.grid.rows();
        if cols < 3 || rows < 3 {
            return None;
        }
        let bounds = self.camera.visible_bounds();
        let band_min_x = (bounds.start_x - SPAWN_BAND).max(1);
        let band_max_x = (bounds.end_x - 1 + SPAWN_BAND).min(cols - 2);
        let band_min_y = (bounds.start_y - SPAWN_BAND).max(1);
        let band_max_y = (bounds.end_y - 1 + SPAWN_BAND).min(rows - 2);

        for attempt in 0..SPAWN_ATTEMPTS {
            let cell = if attempt < SPAWN_ATTEMPTS / 2 {
                let x = self.rng.int(band_min_x, band_max_x);
                let y = self.rng.int(band_min_y, band_max_y);
                if bounds.contains(x, y) {
                    continue;
                }
                Vec2::new(x, y)
            } else {
                Vec2::new(self.rng.int(1, cols - 2), self.rng.int(1, rows - 2))
            };
            if !self.grid.is_occupied(cell.x, cell.y, None, true) {
                return Some(cell);
            }
        }
        None
    }
}
