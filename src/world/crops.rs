//! Crop state and growth-stage progression.

use serde::{Deserialize, Serialize};

use crate::shared::CropKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropState {
    pub kind: CropKind,
    pub stage: u8,
    /// Seconds accumulated toward the next stage.
    pub stage_elapsed: f32,
    /// Session clock (seconds) when the seed went in.
    pub planted_at: f64,
}

impl CropState {
    pub fn new(kind: CropKind, planted_at: f64) -> Self {
        Self {
            kind,
            stage: 0,
            stage_elapsed: 0.0,
            planted_at,
        }
    }

    /// Stage within range and timers finite. Used to vet loaded saves.
    pub fn is_valid(&self) -> bool {
        self.stage <= self.kind.harvest_stage()
            && self.stage_elapsed.is_finite()
            && self.stage_elapsed >= 0.0
            && self.planted_at.is_finite()
    }

    pub fn is_harvestable(&self) -> bool {
        self.stage >= self.kind.harvest_stage()
    }

    /// Fraction of the way to harvest, 0.0..=1.0.
    pub fn progress(&self) -> f32 {
        let total = self.kind.harvest_stage() as f32;
        if total == 0.0 {
            return 1.0;
        }
        let partial = self.stage_elapsed / self.kind.seconds_per_stage();
        ((self.stage as f32 + partial) / total).min(1.0)
    }

    /// Advance by `dt` seconds scaled by `rate`. Returns true if the stage changed.
    ///
    /// Stages only move forward and stop at the harvest stage; a long `dt`
    /// can cross several stages at once.
    pub fn grow(&mut self, dt: f32, rate: f32) -> bool {
        if self.is_harvestable() || dt <= 0.0 || rate <= 0.0 {
            return false;
        }
        let per_stage = self.kind.seconds_per_stage();
        let before = self.stage;
        self.stage_elapsed += dt * rate;
        while self.stage_elapsed >= per_stage && !self.is_harvestable() {
            self.stage_elapsed -= per_stage;
            self.stage += 1;
        }
        if self.is_harvestable() {
            self.stage_elapsed = 0.0;
        }
        self.stage != before
    }
}
