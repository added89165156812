//! General store: a fixed catalog bought and sold from the hotbar.
//!
//! Transactions only go through while the shop overlay is open. Money is
//! checked before anything moves, and items that do not fit in the hotbar
//! are never charged for.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::inventory::Hotbar;
use crate::player::Player;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopListing {
    pub kind: ItemKind,
    pub price: u32,
}

/// Completed purchase. `quantity` can be lower than requested when the hotbar filled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub kind: ItemKind,
    pub quantity: u32,
    pub cost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sale {
    pub stack: ItemStack,
    pub value: u32,
}

const CATALOG: [ItemKind; 7] = [
    ItemKind::Seeds(CropKind::Parsnip),
    ItemKind::Seeds(CropKind::Potato),
    ItemKind::Seeds(CropKind::Strawberry),
    ItemKind::Seeds(CropKind::Pumpkin),
    ItemKind::FenceKit,
    ItemKind::Bread,
    ItemKind::Salad,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shop {
    listings: Vec<ShopListing>,
}

impl Default for Shop {
    fn default() -> Self {
        let listings = CATALOG
            .iter()
            .filter_map(|&kind| kind.buy_price().map(|price| ShopListing { kind, price }))
            .collect();
        Self { listings }
    }
}

impl Shop {
    pub fn listings(&self) -> &[ShopListing] {
        &self.listings
    }

    pub fn price_of(&self, kind: ItemKind) -> Option<u32> {
        self.listings
            .iter()
            .find(|l| l.kind == kind)
            .map(|l| l.price)
    }

    pub fn buy(
        &self,
        open: bool,
        player: &mut Player,
        hotbar: &mut Hotbar,
        kind: ItemKind,
        quantity: u32,
    ) -> GameResult<Purchase> {
        if !open {
            return Err(GameError::ShopClosed);
        }
        let price = self.price_of(kind).ok_or(GameError::NotForSale(kind))?;
        let total = price.saturating_mul(quantity);
        if player.money < total {
            return Err(GameError::InsufficientFunds {
                price: total,
                money: player.money,
            });
        }
        if quantity == 0 {
            return Ok(Purchase { kind, quantity: 0, cost: 0 });
        }

        let remainder = hotbar.add_item(ItemStack::new(kind, quantity));
        let bought = quantity - remainder.map_or(0, |r| r.quantity);
        let cost = price * bought;
        // Affordability was checked against the full order, so this cannot fail.
        player.try_spend(cost);
        Ok(Purchase {
            kind,
            quantity: bought,
            cost,
        })
    }

    /// Sell `quantity` units from a hotbar slot at the quality-adjusted price.
    pub fn sell_slot(
        &self,
        open: bool,
        player: &mut Player,
        hotbar: &mut Hotbar,
        index: usize,
        quantity: u32,
    ) -> GameResult<Sale> {
        if !open {
            return Err(GameError::ShopClosed);
        }
        let stack = hotbar.remove_from_slot(index, quantity)?;
        let value = stack.sell_value();
        player.earn(value);
        Ok(Sale { stack, value })
    }
}
