use crate::activation::Activation;
use rand::Rng;
use tensorlib::functional::{linear, outer};
use tensorlib::matrix::{Matrix, OwnedMatrix};

/// Fully connected layer. `weights` is stored as `(neurons, inputs)`.
#[derive(Debug)]
pub struct NeuralLayer {
    weights: OwnedMatrix,
    biases: Vec<f32>,
    activation: Box<dyn Activation>,
}

/// Values produced by one layer for one input row, kept for back-propagation.
#[derive(Debug, Clone)]
pub struct LayerOutput {
    pub pre_activation: Vec<f32>,
    pub activation: Vec<f32>,
}

impl NeuralLayer {
    pub fn new<A>(neurons: usize, inputs: usize, activation: A) -> Self
    where
        A: Activation + 'static,
    {
        Self::with_rng(neurons, inputs, activation, &mut rand::thread_rng())
    }

    pub fn with_rng<A, R>(neurons: usize, inputs: usize, activation: A, rng: &mut R) -> Self
    where
        A: Activation + 'static,
        R: Rng,
    {
        Self::random(neurons, inputs, Box::new(activation), rng)
    }

    /// Uniformly initialises weights and biases in `[-1, 1)`.
    pub fn random<R>(
        neurons: usize,
        inputs: usize,
        activation: Box<dyn Activation>,
        rng: &mut R,
    ) -> Self
    where
        R: Rng,
    {
        let weights = OwnedMatrix::from_fn((neurons, inputs), |_| rng.gen_range(-1f32..1f32));
        let biases = (0..neurons).map(|_| rng.gen_range(-1f32..1f32)).collect();

        NeuralLayer {
            weights,
            biases,
            activation,
        }
    }

    pub fn from_parts(
        weights: OwnedMatrix,
        biases: Vec<f32>,
        activation: Box<dyn Activation>,
    ) -> Self {
        assert_eq!(weights.n_rows(), biases.len());

        NeuralLayer {
            weights,
            biases,
            activation,
        }
    }
}

impl NeuralLayer {
    pub fn neurons(&self) -> usize {
        self.weights.n_rows()
    }

    pub fn inputs(&self) -> usize {
        self.weights.n_cols()
    }

    pub fn weights(&self) -> &Matrix<'static> {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn activation(&self) -> &dyn Activation {
        self.activation.as_ref()
    }
}

impl NeuralLayer {
    pub fn forward(&self, x: &[f32]) -> LayerOutput {
        let pre_activation = linear(&Matrix::row_vector(x), &self.weights, &self.biases).into_vec();

        let activation = pre_activation
            .iter()
            .map(|&z| self.activation.calc(z))
            .collect();

        LayerOutput {
            pre_activation,
            activation,
        }
    }

    /// Turns `dLoss/dOutput` into `dLoss/dPreActivation` for this layer.
    pub fn delta(&self, output_gradient: &[f32], output: &LayerOutput) -> Vec<f32> {
        assert_eq!(output_gradient.len(), self.neurons());

        output_gradient
            .iter()
            .zip(output.pre_activation.iter())
            .map(|(g, &z)| g * self.activation.derivative(z))
            .collect()
    }

    /// Gradient with respect to this layer's input: `weightsᵀ · delta`.
    pub fn input_gradient(&self, delta: &[f32]) -> Vec<f32> {
        Matrix::row_vector(delta)
            .matmul(&self.weights.transpose())
            .into_vec()
    }

    pub fn apply_gradient(&mut self, delta: &[f32], input: &[f32], learning_rate: f32) {
        assert_eq!(delta.len(), self.neurons());
        assert_eq!(input.len(), self.inputs());

        let step = outer(delta, input).multiply_scalar(learning_rate);
        let weights = std::mem::replace(&mut self.weights, OwnedMatrix::zeros((0, 0)));
        self.weights = weights.subtract_matrix(&step);

        self.biases
            .iter_mut()
            .zip(delta.iter())
            .for_each(|(b, d)| *b -= learning_rate * d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{Identity, Sigmoid};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn identity_layer(weights: Vec<f32>, shape: (usize, usize), biases: Vec<f32>) -> NeuralLayer {
        NeuralLayer::from_parts(
            OwnedMatrix::from_vec(shape, weights),
            biases,
            Box::new(Identity),
        )
    }

    #[test]
    fn test_random_init_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = NeuralLayer::with_rng(7, 4, Sigmoid, &mut rng);

        assert_eq!(layer.weights().shape(), (7, 4));
        assert_eq!(layer.biases().len(), 7);
        assert!(layer
            .weights()
            .data()
            .iter()
            .chain(layer.biases())
            .all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn test_seeded_init_is_reproducible() {
        let a = NeuralLayer::with_rng(3, 2, Sigmoid, &mut StdRng::seed_from_u64(1));
        let b = NeuralLayer::with_rng(3, 2, Sigmoid, &mut StdRng::seed_from_u64(1));

        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.biases(), b.biases());
    }

    #[test]
    fn test_forward() {
        let layer = identity_layer(vec![1.0, 2.0, 3.0, 4.0], (2, 2), vec![0.0, 1.0]);
        let output = layer.forward(&[1.0, 1.0]);

        assert_eq!(output.pre_activation, vec![3.0, 8.0]);
        assert_eq!(output.activation, vec![3.0, 8.0]);
    }

    #[test]
    fn test_input_gradient() {
        let layer = identity_layer(vec![1.0, 2.0, 3.0, 4.0], (2, 2), vec![0.0, 0.0]);

        assert_eq!(layer.input_gradient(&[1.0, 1.0]), vec![4.0, 6.0]);
    }

    #[test]
    fn test_apply_gradient() {
        let mut layer = identity_layer(vec![0.0, 0.0], (1, 2), vec![0.0]);
        layer.apply_gradient(&[-2.0], &[1.0, 0.5], 0.5);

        assert_eq!(layer.weights().data().to_vec(), vec![1.0, 0.5]);
        assert_eq!(layer.biases(), &[1.0]);
    }
}
