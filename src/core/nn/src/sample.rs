/// One row of a dataset: network inputs and, for training rows, the
/// expected outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub inputs: Vec<f32>,
    pub outputs: Option<Vec<f32>>,
}

impl Sample {
    pub fn new(inputs: Vec<f32>, outputs: Vec<f32>) -> Self {
        Sample {
            inputs,
            outputs: Some(outputs),
        }
    }

    pub fn predict(inputs: Vec<f32>) -> Self {
        Sample {
            inputs,
            outputs: None,
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.outputs.is_some()
    }
}
