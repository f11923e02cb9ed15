use crate::matrix::{Matrix, OwnedMatrix};

use ndarray::ArrayView2;

impl Matrix<'_> {
    /// Multiplies `self` (`n x k`) by the transpose of `second` (`m x k`),
    /// producing `n x m`. Weights are stored as `(out_dim, in_dim)`.
    pub fn matmul(&self, second: &Matrix) -> OwnedMatrix {
        assert_eq!(self.n_cols(), second.n_cols());

        let first_matrix = ArrayView2::from_shape(self.shape(), self.data())
            .expect("shape checked on construction");
        let second_matrix = ArrayView2::from_shape(second.shape(), second.data())
            .expect("shape checked on construction");

        let result_matrix = first_matrix.dot(&second_matrix.t());

        let (result_vec, _) = result_matrix.into_raw_vec_and_offset();
        Matrix::from_vec((self.n_rows(), second.n_rows()), result_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul() {
        let first = Matrix::from_vec((2, 2), vec![0.0, 1.0, 2.0, 3.0]);
        let second = Matrix::from_vec((3, 2), vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let matmul = first.matmul(&second);
        assert_eq!(
            matmul,
            Matrix::from_vec((2, 3), vec![5.0, 7.0, 9.0, 23.0, 33.0, 43.0])
        );
    }

    #[test]
    fn test_matmul_row_vector() {
        let input = [1.0, 2.0];
        let weight = Matrix::from_vec((1, 2), vec![3.0, 4.0]);

        assert_eq!(
            Matrix::row_vector(&input).matmul(&weight),
            Matrix::from_vec((1, 1), vec![11.0])
        );
    }

    #[test]
    #[should_panic(expected = "assertion")]
    fn test_inner_dimension_mismatch() {
        let first = Matrix::from_vec((1, 2), vec![1.0, 2.0]);
        let second = Matrix::from_vec((1, 3), vec![1.0, 2.0, 3.0]);
        first.matmul(&second);
    }
}
