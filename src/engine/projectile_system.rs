use super::*;

impl World {
    /// Fires from the cell in front of the owner. Gated on the owner's
    /// cooldown; a wall in the spawn cell cancels the shot.
    pub(super) fn shoot_projectile(&mut self, owner_idx: usize, direction: Direction) -> Option<EntityId> {
        let owner = self.entities.get(owner_idx)?;
        if !owner.can_attack() {
            return None;
        }
        let cell = owner.position().offset(direction);
        if self.grid.is_wall(cell.x, cell.y) {
            return None;
        }
        let owner_id = owner.id;
        let owner_kind = owner.kind;
        let owner_attack = owner.attack_stat();
        let max_distance = owner
            .stats
            .and_then(|s| s.range)
            .unwrap_or(DEFAULT_PROJECTILE_RANGE);
        let cooldown = attack_cooldown(owner.attack_speed_stat());

        let id = self.make_id();
        let mut entity = Entity::new(
            id,
            EntityKind::Projectile,
            PROJECTILE_GLYPH,
            cell,
            Some(Stats {
                speed: Some(PROJECTILE_SPEED),
                ..Stats::default()
            }),
        );
        entity.direction = direction;
        self.grid.track(&entity);
        self.entities.push(entity);
        self.projectiles.push(Projectile {
            entity: id,
            owner: owner_id,
            owner_kind,
            direction,
            distance_traveled: 0,
            max_distance,
            owner_attack,
        });
        self.entities[owner_idx].attack_cooldown = cooldown;
        self.events.push(RuntimeEvent::ProjectileFired {
            id,
            owner: owner_id,
            direction,
        });
        Some(id)
    }

    pub(super) fn advance_projectiles(&mut self) {
        let ids: Vec<EntityId> = self.projectiles.iter().map(|p| p.entity).collect();
        for id in ids {
            self.advance_projectile(id);
        }
    }

    fn advance_projectile(&mut self, id: EntityId) {
        let Some(eidx) = self.entity_index(id) else {
            return;
        };
        let Some(projectile) = self.projectiles.iter().find(|p| p.entity == id).copied() else {
            return;
        };

        let delay = tick_delay(self.entities[eidx].speed_stat());
        let entity = &mut self.entities[eidx];
        entity.age_cooldown();
        entity.tick_counter = entity.tick_counter.saturating_add(1);
        if entity.tick_counter < delay {
            return;
        }
        entity.tick_counter = 0;

        let here = entity.position();
        let next = here.offset(projectile.direction);
        if self.grid.is_wall(next.x, next.y) {
            self.remove_entity(id);
            return;
        }

        let hit = self
            .first_collider(here, &projectile)
            .or_else(|| self.first_collider(next, &projectile));
        if let Some(target_idx) = hit {
            self.resolve_hit(&projectile, target_idx);
            self.remove_entity(id);
            return;
        }

        self.entities[eidx].move_to(next);
        self.grid.track(&self.entities[eidx]);
        let Some(record) = self.projectiles.iter_mut().find(|p| p.entity == id) else {
            return;
        };
        record.distance_traveled += 1;
        if record.distance_traveled >= record.max_distance {
            self.remove_entity(id);
        }
    }

    fn first_collider(&self, cell: Vec2, projectile: &Projectile) -> Option<usize> {
        self.entities.iter().position(|e| {
            e.kind != EntityKind::Projectile
                && e.id != projectile.owner
                && e.x == cell.x
                && e.y == cell.y
        })
    }

    fn resolve_hit(&mut self, projectile: &Projectile, target_idx: usize) {
        let target = &self.entities[target_idx];
        let valid = match projectile.owner_kind {
            EntityKind::Player => target.kind.is_hostile(),
            kind if kind.is_hostile() => target.kind == EntityKind::Player,
            _ => false,
        };
        if target.kind == EntityKind::Item || !valid {
            debug!(tick = self.tick, entity = projectile.entity.0, "projectile absorbed");
            return;
        }

        let damage = self
            .entity(projectile.owner)
            .map(|owner| owner.attack_stat())
            .unwrap_or(projectile.owner_attack);
        let target = &mut self.entities[target_idx];
        let died = target.apply_damage(damage);
        target.last_attacker = Some(projectile.owner);
        let (target_id, target_kind, hp) = (target.id, target.kind, target.hp());
        let enemy_kind = target.enemy_kind;
        debug!(tick = self.tick, entity = target_id.0, damage, hp, "projectile hit");

        if target_kind == EntityKind::Player {
            self.events.push(RuntimeEvent::PlayerHit {
                by: projectile.owner,
                damage,
                hp,
            });
            return;
        }
        if died {
            self.remove_entity(target_id);
            self.record_kill(target_id, enemy_kind, Some(projectile.owner));
        }
    }
}
