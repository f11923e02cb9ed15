use anyhow::{anyhow, ensure};
use bytemuck::{cast_slice, pod_collect_to_vec};
use safetensors::tensor::{TensorView, View};
use std::borrow::Cow;
use tensorlib::matrix::{Matrix, OwnedMatrix};

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Dtype {
    F32,
}

impl Dtype {
    fn to_safetensors(self) -> safetensors::Dtype {
        match self {
            Dtype::F32 => safetensors::Dtype::F32,
        }
    }

    fn from_safetensors(dtype: safetensors::Dtype) -> anyhow::Result<Self> {
        match dtype {
            safetensors::Dtype::F32 => Ok(Dtype::F32),
            other => Err(anyhow!("unsupported dtype {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedTensor {
    pub data: Vec<u8>,
    pub shape: Vec<usize>,
    pub dtype: Dtype,
}

impl OwnedTensor {
    pub fn from_f32(shape: Vec<usize>, values: &[f32]) -> Self {
        assert_eq!(shape.iter().product::<usize>(), values.len());

        OwnedTensor {
            data: cast_slice(values).to_vec(),
            shape,
            dtype: Dtype::F32,
        }
    }

    pub fn from_matrix(matrix: &Matrix) -> Self {
        let (n_rows, n_cols) = matrix.shape();
        Self::from_f32(vec![n_rows, n_cols], matrix.data())
    }

    pub fn from_view(view: &TensorView) -> anyhow::Result<Self> {
        Ok(OwnedTensor {
            data: view.data().to_vec(),
            shape: view.shape().to_vec(),
            dtype: Dtype::from_safetensors(view.dtype())?,
        })
    }
}

/// Copies the raw bytes into a properly aligned `f32` buffer; safetensors
/// payloads are not guaranteed to be 4-byte aligned.
pub fn get_f32_data(tensor: OwnedTensor) -> anyhow::Result<(Vec<f32>, Vec<usize>)> {
    ensure!(
        tensor.dtype == Dtype::F32,
        "expected f32 tensor, got {:?}",
        tensor.dtype
    );
    ensure!(
        tensor.data.len() == tensor.shape.iter().product::<usize>() * 4,
        "tensor data does not match shape {:?}",
        tensor.shape
    );

    let values: Vec<f32> = pod_collect_to_vec(&tensor.data);
    Ok((values, tensor.shape))
}

pub fn get_vector(tensor: OwnedTensor) -> anyhow::Result<Vec<f32>> {
    ensure!(
        tensor.shape.len() == 1,
        "expected rank 1 tensor, got shape {:?}",
        tensor.shape
    );

    Ok(get_f32_data(tensor)?.0)
}

pub fn get_matrix(tensor: OwnedTensor) -> anyhow::Result<OwnedMatrix> {
    ensure!(
        tensor.shape.len() == 2,
        "expected rank 2 tensor, got shape {:?}",
        tensor.shape
    );
    let shape = (tensor.shape[0], tensor.shape[1]);

    let data = get_f32_data(tensor)?.0;

    Ok(OwnedMatrix::from_vec(shape, data))
}

impl View for &OwnedTensor {
    fn dtype(&self) -> safetensors::Dtype {
        self.dtype.to_safetensors()
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn data(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.data)
    }

    fn data_len(&self) -> usize {
        self.data.len()
    }
}
