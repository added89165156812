//! Quest board: delivery requests posted over time and paid on turn-in.
//!
//! Postings are drawn from a template pool with the session RNG, so a fixed
//! seed gives a reproducible board.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::inventory::Hotbar;
use crate::player::Player;
use crate::shared::*;

/// Most quests visible on the board at once.
pub const MAX_POSTED: usize = 3;

/// Delivery templates: (item, min quantity, max quantity, base reward, title)
const DELIVER_TEMPLATES: &[(ItemKind, u32, u32, u32, &str)] = &[
    (ItemKind::Produce(CropKind::Parsnip), 3, 8, 60, "Parsnip Soup Night"),
    (ItemKind::Produce(CropKind::Potato), 2, 6, 90, "Potato Bounty"),
    (ItemKind::Produce(CropKind::Strawberry), 3, 9, 150, "Strawberry Picking"),
    (ItemKind::Produce(CropKind::Pumpkin), 1, 2, 300, "Pumpkin Order"),
    (ItemKind::Bread, 1, 3, 40, "Bakery Shortage"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: u32,
    pub title: String,
    pub item: ItemKind,
    pub quantity: u32,
    pub reward: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestBoard {
    posted: Vec<Quest>,
    active: Vec<Quest>,
    next_id: u32,
    /// Seconds since the last posting.
    #[serde(default)]
    since_post: f32,
    #[serde(default)]
    completed: u32,
}

impl QuestBoard {
    pub fn posted(&self) -> &[Quest] {
        &self.posted
    }

    pub fn active(&self) -> &[Quest] {
        &self.active
    }

    pub fn completed_count(&self) -> u32 {
        self.completed
    }

    /// Advance the posting timer. Returns the id of a newly posted quest.
    pub fn tick(&mut self, dt: f32, refresh_secs: f32, rng: &mut impl Rng) -> Option<u32> {
        self.since_post += dt.max(0.0);
        if self.since_post < refresh_secs {
            return None;
        }
        self.since_post = 0.0;
        self.post_random(rng)
    }

    /// Post one quest from the template pool, unless the board is full.
    pub fn post_random(&mut self, rng: &mut impl Rng) -> Option<u32> {
        if self.posted.len() >= MAX_POSTED {
            return None;
        }
        let (item, min, max, base, title) = DELIVER_TEMPLATES[rng.gen_range(0..DELIVER_TEMPLATES.len())];
        let quantity = rng.gen_range(min..=max);
        let reward = base + quantity * item.sell_price() + rng.gen_range(0..=40);

        self.next_id += 1;
        let id = self.next_id;
        self.posted.push(Quest {
            id,
            title: title.to_string(),
            item,
            quantity,
            reward,
        });
        Some(id)
    }

    pub fn accept(&mut self, board_open: bool, id: u32, max_active: usize) -> GameResult<()> {
        if !board_open {
            return Err(GameError::QuestBoardClosed);
        }
        let index = self
            .posted
            .iter()
            .position(|q| q.id == id)
            .ok_or(GameError::UnknownQuest(id))?;
        if self.active.len() >= max_active {
            return Err(GameError::QuestLimitReached(max_active));
        }
        let quest = self.posted.remove(index);
        self.active.push(quest);
        Ok(())
    }

    /// Deliver an active quest's items from the hotbar and collect the reward.
    pub fn turn_in(
        &mut self,
        board_open: bool,
        id: u32,
        hotbar: &mut Hotbar,
        player: &mut Player,
    ) -> GameResult<u32> {
        if !board_open {
            return Err(GameError::QuestBoardClosed);
        }
        let index = self
            .active
            .iter()
            .position(|q| q.id == id)
            .ok_or(GameError::UnknownQuest(id))?;
        let quest = &self.active[index];
        hotbar.remove_kind(quest.item, quest.quantity)?;
        let reward = quest.reward;
        player.earn(reward);
        self.active.remove(index);
        self.completed += 1;
        Ok(reward)
    }
}
