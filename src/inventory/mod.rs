//! Hotbar: the fixed row of item slots and the selection cursor.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::shared::*;

/// Next index when scrolling down: `(i + 1) mod n`.
pub fn wrap_next(current: usize, slot_count: usize) -> usize {
    if slot_count == 0 {
        return 0;
    }
    (current % slot_count + 1) % slot_count
}

/// Next index when scrolling up: `(i - 1 + n) mod n`.
pub fn wrap_prev(current: usize, slot_count: usize) -> usize {
    if slot_count == 0 {
        return 0;
    }
    (current % slot_count + slot_count - 1) % slot_count
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotbar {
    slots: Vec<Option<ItemStack>>,
    selected: usize,
}

impl Default for Hotbar {
    fn default() -> Self {
        Self::new(DEFAULT_HOTBAR_SLOTS)
    }
}

impl Hotbar {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count.max(1)],
            selected: 0,
        }
    }

    /// The kit a new farmer starts with.
    pub fn starter(slot_count: usize) -> Self {
        let mut hotbar = Self::new(slot_count);
        for stack in [
            ItemStack::new(ItemKind::Seeds(CropKind::Parsnip), 15),
            ItemStack::new(ItemKind::Seeds(CropKind::Potato), 5),
            ItemStack::new(ItemKind::Bread, 3),
            ItemStack::new(ItemKind::FenceKit, 10),
        ] {
            hotbar.add_item(stack);
        }
        hotbar
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> GameResult<Option<&ItemStack>> {
        self.check(index)?;
        Ok(self.slots[index].as_ref())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_stack(&self) -> Option<&ItemStack> {
        self.slots.get(self.selected).and_then(|s| s.as_ref())
    }

    /// True when every slot is valid and non-empty stacks have a positive quantity.
    pub fn is_consistent(&self) -> bool {
        !self.slots.is_empty()
            && self.selected < self.slots.len()
            && self.slots.iter().flatten().all(|s| s.quantity > 0)
    }

    fn check(&self, index: usize) -> GameResult<()> {
        if index >= self.slots.len() {
            return Err(GameError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    pub fn select_slot(&mut self, index: usize) -> GameResult<()> {
        self.check(index)?;
        self.selected = index;
        Ok(())
    }

    /// Exchange two slots. Both change or neither does.
    pub fn swap(&mut self, a: usize, b: usize) -> GameResult<()> {
        self.check(a)?;
        self.check(b)?;
        if a != b {
            self.slots.swap(a, b);
        }
        Ok(())
    }

    /// Merge into compatible stacks first, then fill empty slots.
    /// Returns whatever did not fit.
    pub fn add_item(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let max_stack = stack.kind.max_stack();
        let mut remaining = stack.quantity;

        // First pass: top up existing stacks of the same kind and quality
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(s) = slot {
                if s.stacks_with(&stack) && s.quantity < max_stack {
                    let add = remaining.min(max_stack - s.quantity);
                    s.quantity += add;
                    remaining -= add;
                }
            }
        }

        // Second pass: empty slots
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add = remaining.min(max_stack);
                *slot = Some(ItemStack {
                    quantity: add,
                    ..stack
                });
                remaining -= add;
            }
        }

        (remaining > 0).then_some(ItemStack {
            quantity: remaining,
            ..stack
        })
    }

    /// Take `quantity` units out of one slot.
    pub fn remove_from_slot(&mut self, index: usize, quantity: u32) -> GameResult<ItemStack> {
        self.check(index)?;
        let available = self.slots[index].map_or(0, |s| s.quantity);
        if quantity == 0 || available < quantity {
            return Err(GameError::InsufficientQuantity {
                index,
                requested: quantity,
                available,
            });
        }
        let slot = &mut self.slots[index];
        let Some(stack) = slot.as_mut() else {
            return Err(GameError::InsufficientQuantity {
                index,
                requested: quantity,
                available,
            });
        };
        let removed = ItemStack {
            quantity,
            ..*stack
        };
        stack.quantity -= quantity;
        if stack.quantity == 0 {
            *slot = None;
        }
        Ok(removed)
    }

    /// Empty a slot entirely, returning its stack.
    pub fn take_slot(&mut self, index: usize) -> GameResult<Option<ItemStack>> {
        self.check(index)?;
        Ok(self.slots[index].take())
    }

    /// Total units of `kind` across all slots, any quality.
    pub fn count(&self, kind: ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.kind == kind)
            .map(|s| s.quantity)
            .sum()
    }

    /// Remove `quantity` units of `kind` from wherever they are. All or nothing.
    pub fn remove_kind(&mut self, kind: ItemKind, quantity: u32) -> GameResult<()> {
        let available = self.count(kind);
        if available < quantity {
            return Err(GameError::InsufficientQuantity {
                index: self.selected,
                requested: quantity,
                available,
            });
        }
        let mut remaining = quantity;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(s) = slot {
                if s.kind == kind {
                    let take = remaining.min(s.quantity);
                    s.quantity -= take;
                    remaining -= take;
                    if s.quantity == 0 {
                        *slot = None;
                    }
                }
            }
        }
        Ok(())
    }
}
