use std::collections::HashSet;

use crate::session::GameSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    Shoot,
    Interact,
    Shop,
    AbilityDash,
    AbilityArea,
    AbilityHeal,
    /// Digits 1-9, used for menu choices.
    Digit(u8),
}

impl Key {
    pub fn digit_index(self) -> Option<usize> {
        match self {
            Key::Digit(d @ 1..=9) => Some(usize::from(d - 1)),
            _ => None,
        }
    }
}

pub trait InputState {
    fn is_pressed(&self, key: Key) -> bool;
    fn clear(&mut self);

    /// Runs before each step; scripted inputs read the session here.
    fn prepare(&mut self, _session: &GameSession) {}

    /// First pressed menu digit, as a zero-based index.
    fn pressed_digit(&self) -> Option<usize> {
        (1..=9u8)
            .map(Key::Digit)
            .find(|key| self.is_pressed(*key))
            .and_then(Key::digit_index)
    }
}

/// Keys stay pressed until released or cleared.
#[derive(Clone, Debug, Default)]
pub struct KeyLatch {
    pressed: HashSet<Key>,
}

impl KeyLatch {
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

impl InputState for KeyLatch {
    fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    fn clear(&mut self) {
        self.pressed.clear();
    }
}
