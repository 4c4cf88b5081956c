//! Logistic map `x' = r x (1 - x)`: orbits, behaviour classes, and bifurcation samples.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Growth rates spanned by the bifurcation diagram.
pub const BIFURCATION_RANGE: (f64, f64) = (2.5, 4.0);

#[must_use]
pub fn iterate(r: f64, x: f64) -> f64 {
    r * x * (1.0 - x)
}

/// `x0` followed by `iterations` successive values.
#[must_use]
pub fn orbit(r: f64, x0: f64, iterations: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(iterations + 1);
    let mut x = x0;
    values.push(x);
    for _ in 0..iterations {
        x = iterate(r, x);
        values.push(x);
    }
    values
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Extinction,
    Stable,
    Period2,
    Period4,
    PeriodDoubling,
    Chaotic,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extinction => "Extinction",
            Self::Stable => "Stable",
            Self::Period2 => "Period 2",
            Self::Period4 => "Period 4",
            Self::PeriodDoubling => "Period doubling",
            Self::Chaotic => "Chaotic",
        })
    }
}

/// Classify the long-run behaviour at growth rate `r` from the tail of a 100-step orbit.
#[must_use]
pub fn classify(r: f64) -> Behavior {
    if r < 1.0 {
        return Behavior::Extinction;
    }
    let values = orbit(r, 0.5, 100);
    match distinct_values(&values[values.len() - 50..]) {
        0..=1 => Behavior::Stable,
        2 => Behavior::Period2,
        3..=4 => Behavior::Period4,
        _ if r < 3.57 => Behavior::PeriodDoubling,
        _ => Behavior::Chaotic,
    }
}

/// Values closer than this count as the same point of a cycle.
pub const CYCLE_RESOLUTION: f64 = 1e-4;

fn distinct_values(tail: &[f64]) -> usize {
    tail.iter()
        .map(|v| (v / CYCLE_RESOLUTION).round() as i64)
        .collect::<BTreeSet<_>>()
        .len()
}

/// `(r, x)` points for a bifurcation diagram with `columns` growth rates across
/// [`BIFURCATION_RANGE`], discarding `settle` transient iterations and keeping `keep`.
#[must_use]
pub fn bifurcation(columns: usize, settle: usize, keep: usize) -> Vec<(f64, f64)> {
    let (r_min, r_max) = BIFURCATION_RANGE;
    let mut points = Vec::with_capacity(columns * keep);
    for col in 0..columns {
        let r = r_min + (r_max - r_min) * col as f64 / columns.max(1) as f64;
        let mut x = 0.5;
        for _ in 0..settle {
            x = iterate(r, x);
        }
        for _ in 0..keep {
            x = iterate(r, x);
            points.push((r, x));
        }
    }
    points
}
