//! Dense `nunk × nprop` solution storage.
//!
//! Unknowns are mesh nodes (CG) or elements (DG); properties are the
//! scalar components of one or more PDE systems. Rows are contiguous:
//! `data[unk * nprop + col]`. DG systems lay out component `c`, mode `k`
//! at column `offset + c * rdof + k`, where `offset` separates systems
//! sharing one buffer.

use serde::{Deserialize, Serialize};

/// Row-major field storage.
///
/// Serialisable, so a checkpoint is simply the JSON (or any serde format)
/// of the field together with the per-element dof counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    nunk: usize,
    nprop: usize,
    data: Vec<f64>,
}

impl Fields {
    /// Zero-initialised storage.
    pub fn new(nunk: usize, nprop: usize) -> Self {
        Self {
            nunk,
            nprop,
            data: vec![0.0; nunk * nprop],
        }
    }

    /// Wrap existing row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != nunk * nprop`.
    pub fn from_vec(nunk: usize, nprop: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), nunk * nprop, "field data size mismatch");
        Self { nunk, nprop, data }
    }

    #[inline]
    pub fn nunk(&self) -> usize {
        self.nunk
    }

    #[inline]
    pub fn nprop(&self) -> usize {
        self.nprop
    }

    /// Value of column `offset + col` of unknown `unk`.
    #[inline]
    pub fn get(&self, unk: usize, col: usize, offset: usize) -> f64 {
        debug_assert!(unk < self.nunk && offset + col < self.nprop);
        self.data[unk * self.nprop + offset + col]
    }

    #[inline]
    pub fn get_mut(&mut self, unk: usize, col: usize, offset: usize) -> &mut f64 {
        debug_assert!(unk < self.nunk && offset + col < self.nprop);
        &mut self.data[unk * self.nprop + offset + col]
    }

    #[inline]
    pub fn set(&mut self, unk: usize, col: usize, offset: usize, value: f64) {
        *self.get_mut(unk, col, offset) = value;
    }

    /// All properties of one unknown.
    #[inline]
    pub fn row(&self, unk: usize) -> &[f64] {
        &self.data[unk * self.nprop..(unk + 1) * self.nprop]
    }

    #[inline]
    pub fn row_mut(&mut self, unk: usize) -> &mut [f64] {
        &mut self.data[unk * self.nprop..(unk + 1) * self.nprop]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Set every value.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Column `offset + col` of every unknown.
    pub fn extract(&self, col: usize, offset: usize) -> Vec<f64> {
        (0..self.nunk).map(|u| self.get(u, col, offset)).collect()
    }

    /// self += c * other.
    pub fn axpy(&mut self, c: f64, other: &Fields) {
        assert_eq!(self.nunk, other.nunk, "unknown count mismatch");
        assert_eq!(self.nprop, other.nprop, "property count mismatch");
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += c * b;
        }
    }

    /// self = a * self + b * other.
    pub fn lincomb(&mut self, a: f64, b: f64, other: &Fields) {
        assert_eq!(self.data.len(), other.data.len(), "field size mismatch");
        for (x, y) in self.data.iter_mut().zip(&other.data) {
            *x = a * *x + b * y;
        }
    }

    /// Maximum absolute value of column `offset + col`.
    pub fn max_abs(&self, col: usize, offset: usize) -> f64 {
        (0..self.nunk)
            .map(|u| self.get(u, col, offset).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_indexing() {
        let mut f = Fields::new(3, 8);
        // two systems of four columns each
        f.set(1, 2, 4, 7.0);
        assert_eq!(f.get(1, 6, 0), 7.0);
        assert_eq!(f.row(1)[6], 7.0);
        assert_eq!(f.extract(6, 0), vec![0.0, 7.0, 0.0]);
    }

    #[test]
    fn test_axpy_and_lincomb() {
        let mut a = Fields::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = Fields::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]);
        a.axpy(2.0, &b);
        assert_eq!(a.as_slice(), &[3.0, 4.0, 5.0, 6.0]);
        a.lincomb(0.5, 1.0, &b);
        assert_eq!(a.as_slice(), &[2.5, 3.0, 3.5, 4.0]);
        assert_eq!(a.max_abs(1, 0), 4.0);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let f = Fields::from_vec(2, 3, vec![0.5, -1.0, 2.0, 3.0, 4.25, 1e-3]);
        let json = serde_json::to_string(&f).unwrap();
        let back: Fields = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    #[should_panic(expected = "field data size mismatch")]
    fn test_size_mismatch_panics() {
        let _ = Fields::from_vec(2, 2, vec![0.0; 3]);
    }
}
