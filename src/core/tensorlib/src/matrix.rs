use std::borrow::Cow;

pub type OwnedMatrix = Matrix<'static>;

/// Dense row-major `f32` matrix that either borrows or owns its storage.
#[derive(Debug, Clone)]
pub struct Matrix<'a> {
    shape: (usize, usize),
    data: Cow<'a, [f32]>,
}

impl<'a> Matrix<'a> {
    pub fn new(shape: (usize, usize), data: Cow<'a, [f32]>) -> Self {
        assert_eq!(shape.0 * shape.1, data.len());
        Matrix { shape, data }
    }

    pub fn from_slice(shape: (usize, usize), data: &'a [f32]) -> Self {
        Self::new(shape, Cow::Borrowed(data))
    }

    /// Views a slice as a single-row matrix.
    pub fn row_vector(data: &'a [f32]) -> Self {
        Self::from_slice((1, data.len()), data)
    }

    pub fn into_owned(self) -> OwnedMatrix {
        OwnedMatrix::new(self.shape, Cow::Owned(self.data.into_owned()))
    }
}

impl OwnedMatrix {
    pub fn from_vec(shape: (usize, usize), data: Vec<f32>) -> Self {
        Self::new(shape, Cow::Owned(data))
    }

    pub fn zeros(shape: (usize, usize)) -> Self {
        Self::from_vec(shape, vec![0f32; shape.0 * shape.1])
    }

    pub fn from_fn<F>(shape: (usize, usize), mut f: F) -> Self
    where
        F: FnMut((usize, usize)) -> f32,
    {
        let data = (0..shape.0 * shape.1)
            .map(|i| f((i / shape.1, i % shape.1)))
            .collect();
        Self::from_vec(shape, data)
    }
}

impl<'a> Matrix<'a> {
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn n_rows(&self) -> usize {
        self.shape.0
    }

    pub fn n_cols(&self) -> usize {
        self.shape.1
    }

    pub fn data(&self) -> &Cow<'a, [f32]> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Cow<'a, [f32]> {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data.into_owned()
    }

    pub fn get(&self, (row, col): (usize, usize)) -> f32 {
        assert!(row < self.n_rows() && col < self.n_cols());
        self.data[row * self.n_cols() + col]
    }
}

impl PartialEq for Matrix<'_> {
    fn eq(&self, other: &Self) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        self.data() == other.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrowed_and_owned_compare_equal() {
        let data: Vec<f32> = (0..6).map(|v| v as f32).collect();
        let owned = Matrix::from_vec((3, 2), data.clone());
        let borrowed = Matrix::from_slice((3, 2), &data);

        assert_eq!(owned.shape(), (3, 2));
        assert_eq!(borrowed.n_rows(), 3);
        assert_eq!(borrowed.n_cols(), 2);
        assert_eq!(owned, borrowed);
    }

    #[test]
    fn test_from_fn() {
        let m = OwnedMatrix::from_fn((2, 3), |(y, x)| (y * 10 + x) as f32);
        assert_eq!(
            m,
            Matrix::from_vec((2, 3), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0])
        );
        assert_eq!(m.get((1, 2)), 12.0);
    }

    #[test]
    fn test_zeros_and_row_vector() {
        assert_eq!(OwnedMatrix::zeros((2, 2)).into_vec(), vec![0.0; 4]);

        let row = [1.0, 2.0, 3.0];
        assert_eq!(Matrix::row_vector(&row).shape(), (1, 3));
    }

    #[test]
    #[should_panic(expected = "assertion")]
    fn test_shape_mismatch() {
        Matrix::from_vec((2, 2), vec![1.0, 2.0, 3.0]);
    }
}
