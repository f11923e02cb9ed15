use crate::matrix::{Matrix, OwnedMatrix};

impl Matrix<'_> {
    pub fn zip_with<F>(self, other: &Matrix, operation: F) -> OwnedMatrix
    where
        F: Fn(&mut f32, f32),
    {
        assert_eq!(self.shape(), other.shape());

        let mut output = self.into_owned();

        output
            .data_mut()
            .to_mut()
            .iter_mut()
            .zip(other.data().iter())
            .for_each(|(a, b)| operation(a, *b));

        output
    }

    pub fn zip_with_row<F>(self, row: &[f32], operation: F) -> OwnedMatrix
    where
        F: Fn(&mut f32, f32),
    {
        assert_eq!(self.n_cols(), row.len());

        let mut output = self.into_owned();

        output
            .data_mut()
            .to_mut()
            .chunks_mut(row.len())
            .for_each(|chunk| {
                chunk
                    .iter_mut()
                    .zip(row.iter())
                    .for_each(|(a, b)| operation(a, *b))
            });

        output
    }
}

impl Matrix<'_> {
    pub fn subtract_matrix(self, other: &Matrix) -> OwnedMatrix {
        self.zip_with(other, |a, b| *a -= b)
    }

    pub fn add_row(self, row: &[f32]) -> OwnedMatrix {
        self.zip_with_row(row, |a, b| *a += b)
    }
}
