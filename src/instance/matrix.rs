//! Flat row-major 2D matrix, used for the distance and travel-time tables.

use bytemuck::Pod;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Matrix2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix2<T> {
    pub fn new(rows: usize, cols: usize, init: T) -> Self {
        Self {
            data: vec![init; rows * cols],
            rows,
            cols,
        }
    }

    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            debug_assert_eq!(row.len(), n_cols, "ragged matrix row");
            data.extend(row);
        }
        Self {
            data,
            rows: n_rows,
            cols: n_cols,
        }
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[row * self.cols + col]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[row * self.cols + col]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<T: Pod> PartialEq for Matrix2<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && bytemuck::cast_slice::<T, u8>(&self.data) == bytemuck::cast_slice::<T, u8>(&other.data)
    }
}

impl<T: Pod> Eq for Matrix2<T> {}

impl<T: Pod> Hash for Matrix2<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        bytemuck::cast_slice::<T, u8>(&self.data).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_roundtrip() {
        let mut m = Matrix2::new(3, 3, 0i64);
        *m.get_mut(1, 2) = 7;
        assert_eq!(*m.get(1, 2), 7);
        assert_eq!(*m.get(0, 0), 0);
    }

    #[test]
    fn from_rows_preserves_layout() {
        let m = Matrix2::from_rows(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(*m.get(0, 1), 2);
        assert_eq!(*m.get(1, 0), 3);
    }
}
