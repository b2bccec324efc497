//! Difficulty classification relative to e1RM.
//!
//! A set's intensity is its own Epley estimate divided by the lifter's e1RM.
//! Intensity maps onto fixed bands, and each band has a representative
//! intensity used to go the other way (band -> weight).

use crate::e1rm::base_e1rm;
use crate::DifficultyBand;

/// Upper intensity bound (exclusive) of each band below `Hard`
const BAND_CEILINGS: [(DifficultyBand, f64); 3] = [
    (DifficultyBand::Warmup, 0.60),
    (DifficultyBand::Easy, 0.75),
    (DifficultyBand::Normal, 0.88),
];

fn target_intensity(band: DifficultyBand) -> f64 {
    match band {
        DifficultyBand::Warmup => 0.50,
        DifficultyBand::Easy => 0.68,
        DifficultyBand::Normal => 0.82,
        DifficultyBand::Hard => 0.93,
    }
}

/// Classify `kg x reps` against an e1RM
///
/// Returns `None` when any input is non-positive.
pub fn predict_difficulty(e1rm: f64, kg: f64, reps: u32) -> Option<DifficultyBand> {
    if e1rm <= 0.0 || kg <= 0.0 || reps == 0 {
        return None;
    }

    let intensity = base_e1rm(kg, reps) / e1rm;

    let band = BAND_CEILINGS
        .iter()
        .find(|(_, ceiling)| intensity < *ceiling)
        .map(|(band, _)| *band)
        .unwrap_or(DifficultyBand::Hard);

    Some(band)
}

/// Weight that lands `reps` in `band`, rounded to the nearest 0.5 kg
///
/// Returns 0 when `e1rm` is not positive or `reps` is zero.
pub fn get_weight_for_difficulty(e1rm: f64, reps: u32, band: DifficultyBand) -> f64 {
    if e1rm <= 0.0 || reps == 0 {
        return 0.0;
    }

    let target = e1rm * target_intensity(band);
    let kg = if reps == 1 {
        target
    } else {
        target / (1.0 + f64::from(reps) / 30.0)
    };

    (kg * 2.0).round() / 2.0
}
