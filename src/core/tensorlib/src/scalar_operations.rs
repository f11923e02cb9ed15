use crate::matrix::Matrix;

impl Matrix<'_> {
    pub fn map<F>(mut self, operation: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        self.data_mut()
            .to_mut()
            .iter_mut()
            .for_each(|v| *v = operation(*v));

        self
    }

    pub fn multiply_scalar(self, value: f32) -> Self {
        self.map(|x| x * value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_scalar_borrowed() {
        let data = [1.0, -2.0];
        let mat = Matrix::from_slice((1, 2), &data);

        assert_eq!(
            mat.multiply_scalar(-0.5),
            Matrix::from_vec((1, 2), vec![-0.5, 1.0])
        );
        assert_eq!(data, [1.0, -2.0]);
    }

    #[test]
    fn test_map() {
        let mat = Matrix::from_vec((1, 3), vec![1.0, 2.0, 3.0]).map(|x| x * x);

        assert_eq!(mat, Matrix::from_vec((1, 3), vec![1.0, 4.0, 9.0]));
    }
}
