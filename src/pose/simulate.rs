//! Synthetic angle stream for console sessions without a camera
//!
//! The driving angle sweeps through repetition cycles that cross both phase
//! thresholds; every other ranged angle jitters around a resting value.
//! Occasional overshoots exercise the safety escalation path, and rare
//! dropouts take the driving angle out of frame with a critical event.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use super::AngleSource;
use crate::angles::{AngleMap, AngleName};
use crate::exercise::ExerciseProfile;

/// Frames per repetition
const CYCLE_FRAMES: u64 = 60;
/// Degrees past each phase threshold reached at the top and bottom of a rep
const SWEEP_MARGIN: f64 = 10.0;
/// Per-frame dropout chance at noise 1.0
const DROPOUT_CHANCE: f64 = 0.002;

pub struct SimulatedSource {
    profile: Arc<ExerciseProfile>,
    rng: StdRng,
    /// Jitter multiplier; 0.0 produces a clean trajectory
    noise: f64,
    frame: u64,
    limit: Option<u64>,
    /// Critical events for the last frame
    critical: Vec<AngleName>,
}

impl SimulatedSource {
    pub fn new(profile: Arc<ExerciseProfile>, seed: Option<u64>, noise: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SimulatedSource {
            profile,
            rng,
            noise: noise.max(0.0),
            frame: 0,
            limit: None,
            critical: Vec::new(),
        }
    }

    /// Stop after `frames` frames
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Position within the rep, 0.0 at rest and 1.0 at the top
    fn cycle_position(frame: u64) -> f64 {
        let t = (frame % CYCLE_FRAMES) as f64 / CYCLE_FRAMES as f64;
        match t {
            t if t < 0.30 => t / 0.30,
            t if t < 0.55 => 1.0,
            t if t < 0.85 => 1.0 - (t - 0.55) / 0.30,
            _ => 0.0,
        }
    }

    fn jitter(&mut self, amplitude: f64) -> f64 {
        if self.noise == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-1.0..=1.0) * amplitude * self.noise
    }
}

impl AngleSource for SimulatedSource {
    fn next_angles(&mut self) -> Option<AngleMap<f64>> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return None;
        }
        let frame = self.frame;
        self.frame += 1;
        self.critical.clear();

        let profile = Arc::clone(&self.profile);
        let driving = profile.driving_angle();
        let mut angles = AngleMap::new();

        for (angle, range) in profile.angle_ranges.iter() {
            let value = match driving {
                Some((driving_angle, thresholds)) if driving_angle == angle => {
                    let bottom = thresholds.lower_complete - SWEEP_MARGIN;
                    let top = thresholds.raise_complete + SWEEP_MARGIN;
                    let mut value = bottom + (top - bottom) * Self::cycle_position(frame)
                        + self.jitter(3.0);
                    let spike_chance = (0.02 * self.noise).min(1.0);
                    if spike_chance > 0.0 && self.rng.gen_bool(spike_chance) {
                        value = range.max + self.rng.gen_range(5.0..45.0);
                    }
                    value
                }
                _ => range.min + (range.max - range.min) * 0.3 + self.jitter(5.0),
            };
            angles.insert(angle, value);
        }

        if let Some((driving_angle, _)) = driving {
            let dropout_chance = (DROPOUT_CHANCE * self.noise).min(1.0);
            if dropout_chance > 0.0 && self.rng.gen_bool(dropout_chance) {
                angles.remove(driving_angle);
                self.critical.push(driving_angle);
            }
        }

        Some(angles)
    }

    fn critical_events(&self) -> &[AngleName] {
        &self.critical
    }
}
