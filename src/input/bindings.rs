//! Key bindings and the digit-row → hotbar slot table.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::error::{GameError, GameResult};

/// Explicit `{key → slot}` table, validated against the slot count when built.
///
/// The default digit row maps `1`–`9` to slots `0`–`8` and `0` to slot `9`,
/// following the keyboard layout rather than the digit's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotbarKeyMap {
    entries: Vec<(KeyCode, usize)>,
}

impl HotbarKeyMap {
    pub const DIGIT_ROW: [(KeyCode, usize); 10] = [
        (KeyCode::Digit1, 0),
        (KeyCode::Digit2, 1),
        (KeyCode::Digit3, 2),
        (KeyCode::Digit4, 3),
        (KeyCode::Digit5, 4),
        (KeyCode::Digit6, 5),
        (KeyCode::Digit7, 6),
        (KeyCode::Digit8, 7),
        (KeyCode::Digit9, 8),
        (KeyCode::Digit0, 9),
    ];

    pub fn new(entries: Vec<(KeyCode, usize)>, slot_count: usize) -> GameResult<Self> {
        let mut seen = HashSet::new();
        for (key, slot) in &entries {
            if *slot >= slot_count {
                return Err(GameError::InvalidBinding(format!(
                    "{key:?} targets slot {slot} but the hotbar has {slot_count}"
                )));
            }
            if !seen.insert(*key) {
                return Err(GameError::InvalidBinding(format!("{key:?} bound twice")));
            }
        }
        Ok(Self { entries })
    }

    /// The digit row, trimmed to the slots that exist.
    pub fn digit_row(slot_count: usize) -> Self {
        Self {
            entries: Self::DIGIT_ROW
                .iter()
                .copied()
                .filter(|(_, slot)| *slot < slot_count)
                .collect(),
        }
    }

    pub fn slot_for(&self, key: KeyCode) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, slot)| *slot)
    }

    pub fn keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }
}

/// Action keys. Movement accepts several keys per direction.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub up: Vec<KeyCode>,
    pub down: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub pause: KeyCode,
    pub quicksave: KeyCode,
    pub drop_item: KeyCode,
    pub toggle_shop: KeyCode,
    pub toggle_quest_board: KeyCode,
    pub toggle_weather: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: vec![KeyCode::KeyW, KeyCode::ArrowUp],
            down: vec![KeyCode::KeyS, KeyCode::ArrowDown],
            left: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            right: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            pause: KeyCode::Escape,
            quicksave: KeyCode::F5,
            drop_item: KeyCode::KeyQ,
            toggle_shop: KeyCode::KeyB,
            toggle_quest_board: KeyCode::KeyJ,
            toggle_weather: KeyCode::KeyR,
        }
    }
}

impl KeyBindings {
    /// Reject any key bound to two actions, hotbar keys included.
    pub fn validate(&self, hotbar: &HotbarKeyMap) -> GameResult<()> {
        let mut seen = HashSet::new();
        let singles = [
            self.pause,
            self.quicksave,
            self.drop_item,
            self.toggle_shop,
            self.toggle_quest_board,
            self.toggle_weather,
        ];
        let all = self
            .up
            .iter()
            .chain(&self.down)
            .chain(&self.left)
            .chain(&self.right)
            .copied()
            .chain(singles)
            .chain(hotbar.keys());
        for key in all {
            if !seen.insert(key) {
                return Err(GameError::InvalidBinding(format!(
                    "{key:?} is bound to more than one action"
                )));
            }
        }
        Ok(())
    }
}
