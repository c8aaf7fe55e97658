use super::*;

impl World {
    /// Buffered movement, actions and abilities for one tick of input.
    pub fn apply_player_input(&mut self, input: &impl InputState) {
        if self.paused || self.game_over {
            return;
        }
        let Some(idx) = self.player_index() else {
            return;
        };

        if let Some(direction) = input_direction(input) {
            if let Some(control) = self.entities[idx].behaviors.player.as_mut() {
                control.buffered_move = Some(direction);
            }
        }
        self.move_player(idx);

        if input.is_pressed(Key::Shoot) {
            let direction = self.entities[idx].direction;
            self.shoot_projectile(idx, direction);
        }
        if input.is_pressed(Key::Interact) {
            self.pick_up_facing_item(idx);
        }
        for (key, ability) in [
            (Key::AbilityDash, AbilityKind::Dash),
            (Key::AbilityArea, AbilityKind::Area),
            (Key::AbilityHeal, AbilityKind::Heal),
        ] {
            if input.is_pressed(key) {
                self.activate_ability(ability);
            }
        }
    }

    pub fn tick_abilities(&mut self) {
        if let Some(control) = self
            .player_mut()
            .and_then(|player| player.behaviors.player.as_mut())
        {
            control.abilities.update();
        }
    }

    /// Returns whether the ability fired and went on cooldown.
    pub fn activate_ability(&mut self, ability: AbilityKind) -> bool {
        let Some(idx) = self.player_index() else {
            return false;
        };
        let ready = self.entities[idx]
            .behaviors
            .player
            .as_ref()
            .map(|control| control.abilities.is_ready(ability))
            .unwrap_or(false);
        if !ready {
            return false;
        }

        let used = match ability {
            AbilityKind::Dash => self.dash(idx),
            AbilityKind::Area => self.area_attack(idx),
            AbilityKind::Heal => {
                self.entities[idx].add_stats(StatBonus {
                    stat: StatKey::Hp,
                    value: HEAL_AMOUNT,
                });
                true
            }
        };
        if used {
            if let Some(control) = self.entities[idx].behaviors.player.as_mut() {
                control.abilities.trigger(ability);
            }
            debug!(tick = self.tick, ability = ability.key(), "ability used");
        }
        used
    }

    fn move_player(&mut self, idx: usize) {
        let delay = tick_delay(self.entities[idx].speed_stat());
        let Some(control) = self.entities[idx].behaviors.player.as_mut() else {
            return;
        };
        control.tick_counter = control.tick_counter.saturating_add(1);
        if control.tick_counter < delay {
            return;
        }
        control.tick_counter = 0;
        let Some(direction) = control.buffered_move.take() else {
            return;
        };

        let player = &mut self.entities[idx];
        let next = player.position().offset(direction);
        player.face_toward(next.x, next.y);
        if self.grid.is_occupied(next.x, next.y, Some(player.id), true) {
            return;
        }
        player.move_to(next);
        self.grid.track(&self.entities[idx]);
    }

    fn pick_up_facing_item(&mut self, idx: usize) {
        let facing = self.entities[idx].facing_cell();
        let Some(Cell::Entity(occupant)) = self.grid.get_cell(facing.x, facing.y) else {
            return;
        };
        if occupant.kind != EntityKind::Item {
            return;
        }
        let Some(item) = self.remove_entity(occupant.id) else {
            return;
        };
        let Some(bonus) = item.effect else {
            return;
        };
        self.entities[idx].add_stats(bonus);
        self.events.push(RuntimeEvent::ItemPicked { id: item.id, bonus });
        debug!(tick = self.tick, entity = item.id.0, stat = bonus.stat.key(), value = bonus.value, "item picked");
    }

    fn dash(&mut self, idx: usize) -> bool {
        let player = &self.entities[idx];
        let (dx, dy) = player.direction.delta();
        let target = Vec2::new(player.x + dx * DASH_DISTANCE, player.y + dy * DASH_DISTANCE);
        if self.grid.is_wall(target.x, target.y)
            || self.grid.is_occupied(target.x, target.y, Some(player.id), false)
        {
            return false;
        }
        self.entities[idx].move_to(target);
        self.grid.track(&self.entities[idx]);
        true
    }

    fn area_attack(&mut self, idx: usize) -> bool {
        let player_id = self.entities[idx].id;
        let center = self.entities[idx].position();
        let damage = self.entities[idx].attack_stat() * AREA_DAMAGE_FACTOR;
        let mut hits = 0;
        for enemy in self.entities.iter_mut() {
            if !enemy.kind.is_hostile()
                || enemy.dead
                || enemy.stats.is_none()
                || enemy.position().manhattan(center) > AREA_RADIUS
            {
                continue;
            }
            enemy.apply_damage(damage);
            enemy.last_attacker = Some(player_id);
            hits += 1;
        }
        hits > 0
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::arena;
    use crate::input::{Key, KeyLatch};
    use crate::systems::ability::AbilityKind;
    use crate::types::{Direction, EnemyKind, RuntimeEvent, StatBonus, StatKey, Vec2};
    use crate::World;

    fn press(keys: &[Key]) -> KeyLatch {
        let mut input = KeyLatch::default();
        for key in keys {
            input.press(*key);
        }
        input
    }

    fn unlock(world: &mut World, ability: AbilityKind) {
        if let Some(control) = world
            .player_mut()
            .and_then(|p| p.behaviors.player.as_mut())
        {
            control.abilities.unlock(ability);
        }
    }

    #[test]
    fn buffered_move_waits_for_speed_delay() {
        let mut world = arena(12, 8, Vec2::new(2, 2));
        world.apply_player_input(&press(&[Key::Right]));
        assert_eq!(world.player().map(|p| p.position()), Some(Vec2::new(2, 2)));
        let idle = KeyLatch::default();
        for _ in 0..8 {
            world.apply_player_input(&idle);
        }
        assert_eq!(world.player().map(|p| p.position()), Some(Vec2::new(2, 2)));
        world.apply_player_input(&idle);
        assert_eq!(world.player().map(|p| p.position()), Some(Vec2::new(3, 2)));
        assert_eq!(world.player().map(|p| p.direction), Some(Direction::East));
    }

    #[test]
    fn blocked_move_still_turns_the_player() {
        let mut world = arena(12, 8, Vec2::new(1, 2));
        for _ in 0..10 {
            world.apply_player_input(&press(&[Key::Left]));
        }
        let player = world.player().expect("player");
        assert_eq!(player.position(), Vec2::new(1, 2));
        assert_eq!(player.direction, Direction::West);
    }

    #[test]
    fn interact_picks_up_the_facing_item() {
        let mut world = arena(12, 8, Vec2::new(2, 2));
        let item = world.spawn_item_at(
            StatBonus {
                stat: StatKey::Attack,
                value: 2,
            },
            Vec2::new(2, 3),
            false,
        );
        world.drain_events();
        world.apply_player_input(&press(&[Key::Interact]));
        assert!(world.entity(item).is_none());
        assert_eq!(world.player().map(|p| p.attack_stat()), Some(3));
        assert_eq!(
            world.drain_events(),
            vec![RuntimeEvent::ItemPicked {
                id: item,
                bonus: StatBonus {
                    stat: StatKey::Attack,
                    value: 2,
                },
            }]
        );
    }

    #[test]
    fn shoot_key_fires_in_facing_direction() {
        let mut world = arena(12, 8, Vec2::new(2, 2));
        world.apply_player_input(&press(&[Key::Shoot]));
        assert_eq!(world.projectiles().len(), 1);
        assert_eq!(world.projectiles()[0].direction, Direction::South);
    }

    #[test]
    fn locked_abilities_do_nothing() {
        let mut world = arena(12, 8, Vec2::new(2, 2));
        assert!(!world.activate_ability(AbilityKind::Heal));
        assert_eq!(world.player().map(|p| p.hp()), Some(10));
    }

    #[test]
    fn heal_adds_hp_and_starts_cooldown() {
        let mut world = arena(12, 8, Vec2::new(2, 2));
        unlock(&mut world, AbilityKind::Heal);
        assert!(world.activate_ability(AbilityKind::Heal));
        assert_eq!(world.player().map(|p| p.hp()), Some(15));
        assert!(!world.activate_ability(AbilityKind::Heal));
        for _ in 0..120 {
            world.tick_abilities();
        }
        assert!(world.activate_ability(AbilityKind::Heal));
    }

    #[test]
    fn dash_needs_a_free_landing_cell() {
        let mut world = arena(12, 8, Vec2::new(2, 1));
        unlock(&mut world, AbilityKind::Dash);
        assert!(world.activate_ability(AbilityKind::Dash));
        assert_eq!(world.player().map(|p| p.position()), Some(Vec2::new(2, 4)));

        let mut walled = arena(12, 8, Vec2::new(2, 4));
        unlock(&mut walled, AbilityKind::Dash);
        assert!(!walled.activate_ability(AbilityKind::Dash));
        assert_eq!(walled.player().map(|p| p.position()), Some(Vec2::new(2, 4)));
    }

    #[test]
    fn area_attack_only_counts_when_it_hits() {
        let mut world = arena(12, 8, Vec2::new(4, 4));
        unlock(&mut world, AbilityKind::Area);
        assert!(!world.activate_ability(AbilityKind::Area));

        let near = world.spawn_enemy_at(EnemyKind::Grunt, Vec2::new(5, 5));
        let far = world.spawn_enemy_at(EnemyKind::Grunt, Vec2::new(8, 4));
        assert!(world.activate_ability(AbilityKind::Area));
        assert!(world.entity(near).map(|e| e.dead).unwrap_or(false));
        assert!(!world.entity(far).map(|e| e.dead).unwrap_or(true));

        world.update();
        assert!(world.entity(near).is_none());
    }

    #[test]
    fn area_attack_skips_enemies_already_dead() {
        let mut world = arena(12, 8, Vec2::new(4, 4));
        unlock(&mut world, AbilityKind::Area);
        let corpse = world.spawn_enemy_at(EnemyKind::Grunt, Vec2::new(5, 4));
        if let Some(enemy) = world.entity_mut(corpse) {
            enemy.apply_damage(100);
        }

        assert!(!world.activate_ability(AbilityKind::Area));
        assert_eq!(world.entity(corpse).and_then(|e| e.last_attacker), None);
        let ready = world
            .player()
            .and_then(|p| p.behaviors.player.as_ref())
            .map(|control| control.abilities.is_ready(AbilityKind::Area));
        assert_eq!(ready, Some(true));
    }
}
