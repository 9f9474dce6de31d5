//! Pairwise distance matrix over a group's reference poses and the radius solver.

use crate::channels::{ChannelSelection, DistanceFamily};
use crate::metrics::{family_distance, BBoneNorms};
use crate::pose::PoseSample;
use log::debug;

/// Symmetric NxN matrix with a zero diagonal. Transient: rebuilt on every change.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Build from explicit rows. Used to seed the solver with known distances.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let size = rows.len();
        let mut m = Self::zeros(size);
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().take(size).enumerate() {
                m.values[i * size + j] = *v;
            }
        }
        m
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Nearest distinguishable neighbor of every row.
    ///
    /// Entries at or below `epsilon` (self and coincident poses) are skipped; a row with
    /// no remaining entry yields 0. Results are clamped to 1.
    pub fn radii(&self, epsilon: f64) -> Vec<f64> {
        (0..self.size)
            .map(|i| {
                self.row(i)
                    .iter()
                    .enumerate()
                    .filter(|(j, d)| *j != i && **d > epsilon)
                    .map(|(_, d)| *d)
                    .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
                    .map_or(0.0, |r| r.min(1.0))
            })
            .collect()
    }

    fn accumulate(&mut self, other: &DistanceMatrix, weight: f64) {
        for (dst, src) in self.values.iter_mut().zip(&other.values) {
            *dst += src * weight;
        }
    }
}

/// Per-family matrix over `poses`.
pub fn family_matrix(
    poses: &[PoseSample],
    family: DistanceFamily,
    selection: &ChannelSelection,
    norms: &BBoneNorms,
) -> DistanceMatrix {
    let n = poses.len();
    let mut m = DistanceMatrix::zeros(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = family_distance(&poses[i], &poses[j], family, selection, norms);
            m.values[i * n + j] = d;
            m.values[j * n + i] = d;
        }
    }
    m
}

/// Combined matrix: the arithmetic mean of every active family's matrix.
///
/// Bendy-bone norms are recomputed from `poses` on every call.
pub fn distance_matrix(poses: &[PoseSample], selection: &ChannelSelection) -> DistanceMatrix {
    let families = selection.families();
    let mut combined = DistanceMatrix::zeros(poses.len());
    if families.is_empty() {
        return combined;
    }
    let norms = BBoneNorms::from_poses(poses);
    let weight = 1.0 / families.len() as f64;
    for family in &families {
        combined.accumulate(&family_matrix(poses, *family, selection, &norms), weight);
    }
    debug!(
        "distance matrix: {} poses, {} families",
        poses.len(),
        families.len()
    );
    combined
}
