use crate::owned_tensor::{get_matrix, get_vector, OwnedTensor};
use crate::state_dict::{
    activation_key, bias_key, weight_key, StateDict, StateDictMetadata, N_LAYERS_KEY,
};
use anyhow::{anyhow, ensure, Context};
use nn::activation::activation_by_name;
use nn::layer::NeuralLayer;
use nn::network::NeuralNetwork;
use safetensors::SafeTensors;

pub trait FromStateDict: Sized {
    fn from_state_dict(state_dict: &mut StateDict, metadata: &StateDictMetadata)
        -> anyhow::Result<Self>;

    fn from_safetensors(data: &[u8]) -> anyhow::Result<Self> {
        let (mut state_dict, metadata) = read_state_dict(data)?;
        Self::from_state_dict(&mut state_dict, &metadata)
    }
}

pub fn read_state_dict(data: &[u8]) -> anyhow::Result<(StateDict, StateDictMetadata)> {
    let (_, header) = SafeTensors::read_metadata(data)
        .map_err(|err| anyhow!("failed to parse weights header: {}", err))?;
    let metadata = header.metadata().clone().unwrap_or_default();

    let tensors = SafeTensors::deserialize(data)
        .map_err(|err| anyhow!("failed to parse weights: {}", err))?;

    let state_dict = tensors
        .tensors()
        .into_iter()
        .map(|(name, view)| -> anyhow::Result<(String, OwnedTensor)> {
            Ok((name, OwnedTensor::from_view(&view)?))
        })
        .collect::<anyhow::Result<StateDict>>()?;

    Ok((state_dict, metadata))
}

fn take_tensor(state_dict: &mut StateDict, name: &str) -> anyhow::Result<OwnedTensor> {
    state_dict
        .remove(name)
        .ok_or_else(|| anyhow!("missing tensor {}", name))
}

fn layer_from_state_dict(
    state_dict: &mut StateDict,
    metadata: &StateDictMetadata,
    layer_idx: usize,
) -> anyhow::Result<NeuralLayer> {
    let weights = get_matrix(take_tensor(state_dict, &weight_key(layer_idx))?)
        .with_context(|| format!("layer {layer_idx} weight"))?;
    let biases = get_vector(take_tensor(state_dict, &bias_key(layer_idx))?)
        .with_context(|| format!("layer {layer_idx} bias"))?;

    ensure!(
        weights.n_rows() == biases.len(),
        "layer {} has {} neurons but {} biases",
        layer_idx,
        weights.n_rows(),
        biases.len()
    );

    let activation_name = metadata
        .get(&activation_key(layer_idx))
        .ok_or_else(|| anyhow!("missing activation for layer {}", layer_idx))?;
    let activation = activation_by_name(activation_name)?;

    Ok(NeuralLayer::from_parts(weights, biases, activation))
}

impl FromStateDict for NeuralNetwork {
    fn from_state_dict(
        state_dict: &mut StateDict,
        metadata: &StateDictMetadata,
    ) -> anyhow::Result<Self> {
        let n_layers: usize = metadata
            .get(N_LAYERS_KEY)
            .ok_or_else(|| anyhow!("missing {} in weights metadata", N_LAYERS_KEY))?
            .parse()
            .context("invalid layer count")?;

        let layers = (0..n_layers)
            .map(|layer_idx| layer_from_state_dict(state_dict, metadata, layer_idx))
            .collect::<anyhow::Result<Vec<_>>>()?;

        ensure!(
            state_dict.is_empty(),
            "unexpected tensors: {:?}",
            state_dict.keys().collect::<Vec<_>>()
        );

        NeuralNetwork::from_layers(layers)
    }
}
