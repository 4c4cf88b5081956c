//! Herd immunity threshold and the vaccinated-population grid.

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

/// Cells in the population grid.
pub const GRID_CELLS: usize = 100;

/// Percentage of the population that must be immune to stop sustained spread.
#[must_use]
pub fn threshold_percent(r0: f64) -> f64 {
    if r0 <= 1.0 {
        return 0.0;
    }
    (1.0 - 1.0 / r0) * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdAssessment {
    pub threshold: f64,
    pub vaccination: f64,
    pub protected: bool,
}

impl HerdAssessment {
    #[must_use]
    pub fn new(r0: f64, vaccination: f64) -> Self {
        let threshold = threshold_percent(r0);
        Self {
            threshold,
            vaccination,
            protected: vaccination >= threshold,
        }
    }

    #[must_use]
    pub fn status(&self) -> String {
        if self.protected {
            "Herd immunity achieved!".to_owned()
        } else {
            let missing = (self.threshold - self.vaccination).ceil();
            format!("Need {missing}% more for herd immunity")
        }
    }
}

/// Which of the [`GRID_CELLS`] cells are vaccinated for a given coverage, chosen by a
/// seeded shuffle so the layout is stable for one seed.
#[must_use]
pub fn vaccinated_cells(vaccination: f64, seed: u64) -> Vec<bool> {
    let count = (vaccination.clamp(0.0, 100.0) / 100.0 * GRID_CELLS as f64).round() as usize;
    let mut order: Vec<usize> = (0..GRID_CELLS).collect();
    order.shuffle(&mut SmallRng::seed_from_u64(seed));
    let mut cells = vec![false; GRID_CELLS];
    for &idx in &order[..count] {
        cells[idx] = true;
    }
    cells
}
