use crate::matrix::{Matrix, OwnedMatrix};

impl Matrix<'_> {
    pub fn transpose(&self) -> OwnedMatrix {
        let (n_rows, n_cols) = self.shape();

        OwnedMatrix::from_fn((n_cols, n_rows), |(y, x)| self.data()[x * n_cols + y])
    }
}
