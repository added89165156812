//! Cosmetic weather. The toggle eases rain intensity in and out; it has no
//! gameplay effect and keeps animating while the session is paused.

use serde::{Deserialize, Serialize};

/// Intensity units per second.
const FADE_RATE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherState {
    pub raining: bool,
    /// 0.0 = clear, 1.0 = full rain.
    pub intensity: f32,
}

impl WeatherState {
    pub fn toggle(&mut self) -> bool {
        self.raining = !self.raining;
        self.raining
    }

    pub fn advance(&mut self, dt: f32) {
        let target = if self.raining { 1.0 } else { 0.0 };
        let step = FADE_RATE * dt.max(0.0);
        if self.intensity < target {
            self.intensity = (self.intensity + step).min(target);
        } else {
            self.intensity = (self.intensity - step).max(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_fades_in_and_out() {
        let mut weather = WeatherState::default();
        assert!(weather.toggle());
        weather.advance(1.0);
        assert!((weather.intensity - 0.5).abs() < f32::EPSILON);
        weather.advance(5.0);
        assert_eq!(weather.intensity, 1.0);

        assert!(!weather.toggle());
        weather.advance(10.0);
        assert_eq!(weather.intensity, 0.0);
    }
}
