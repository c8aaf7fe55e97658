use crate::input::{InputState, Key};
use crate::types::{Direction, StatKey};

/// Two distinct mutable elements of the same slice.
pub(super) fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (left, right) = items.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = items.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

/// First pressed direction key wins: up, down, left, right.
pub(super) fn input_direction(input: &impl InputState) -> Option<Direction> {
    [
        (Key::Up, Direction::North),
        (Key::Down, Direction::South),
        (Key::Left, Direction::West),
        (Key::Right, Direction::East),
    ]
    .into_iter()
    .find(|(key, _)| input.is_pressed(*key))
    .map(|(_, dir)| dir)
}

pub(super) fn special_item_glyph(stat: StatKey) -> char {
    match stat {
        StatKey::Hp => 'H',
        StatKey::Attack => 'D',
        StatKey::Speed => 'S',
        StatKey::Range => 'R',
        StatKey::AttackSpeed => 'A',
    }
}

#[cfg(test)]
mod tests {
    use super::{input_direction, pair_mut};
    use crate::input::{Key, KeyLatch};
    use crate::types::Direction;

    #[test]
    fn pair_mut_handles_both_orders() {
        let mut values = vec![1, 2, 3];
        if let Some((a, b)) = pair_mut(&mut values, 2, 0) {
            *a += 10;
            *b += 20;
        }
        assert_eq!(values, vec![21, 2, 13]);
        assert!(pair_mut(&mut values, 1, 1).is_none());
        assert!(pair_mut(&mut values, 0, 3).is_none());
    }

    #[test]
    fn direction_keys_resolve_in_fixed_order() {
        let mut input = KeyLatch::default();
        assert_eq!(input_direction(&input), None);
        input.press(Key::Right);
        input.press(Key::Down);
        assert_eq!(input_direction(&input), Some(Direction::South));
    }
}
