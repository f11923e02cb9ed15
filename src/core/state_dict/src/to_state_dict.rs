use crate::owned_tensor::OwnedTensor;
use crate::state_dict::{
    activation_key, bias_key, weight_key, StateDict, StateDictMetadata, N_LAYERS_KEY,
};
use anyhow::anyhow;
use log::debug;
use nn::network::NeuralNetwork;

pub fn network_state_dict(network: &NeuralNetwork) -> (StateDict, StateDictMetadata) {
    let mut state_dict = StateDict::new();
    let mut metadata = StateDictMetadata::new();

    metadata.insert(N_LAYERS_KEY.to_string(), network.layers().len().to_string());

    for (layer_idx, layer) in network.layers().iter().enumerate() {
        state_dict.insert(
            weight_key(layer_idx),
            OwnedTensor::from_matrix(layer.weights()),
        );
        state_dict.insert(
            bias_key(layer_idx),
            OwnedTensor::from_f32(vec![layer.neurons()], layer.biases()),
        );
        metadata.insert(
            activation_key(layer_idx),
            layer.activation().name().to_string(),
        );
    }

    (state_dict, metadata)
}

pub fn to_safetensors(network: &NeuralNetwork) -> anyhow::Result<Vec<u8>> {
    let (state_dict, metadata) = network_state_dict(network);

    let bytes = safetensors::serialize(
        state_dict.iter().map(|(name, tensor)| (name.as_str(), tensor)),
        &Some(metadata),
    )
    .map_err(|err| anyhow!("failed to serialize weights: {}", err))?;

    debug!(
        "serialized {} tensors into {} bytes",
        state_dict.len(),
        bytes.len()
    );

    Ok(bytes)
}
