use crate::owned_tensor::OwnedTensor;
use std::collections::{BTreeMap, HashMap};

pub type StateDict = BTreeMap<String, OwnedTensor>;

pub type StateDictMetadata = HashMap<String, String>;

pub const N_LAYERS_KEY: &str = "n_layers";

pub fn weight_key(layer_idx: usize) -> String {
    format!("layers.{layer_idx}.weight")
}

pub fn bias_key(layer_idx: usize) -> String {
    format!("layers.{layer_idx}.bias")
}

pub fn activation_key(layer_idx: usize) -> String {
    format!("layers.{layer_idx}.activation")
}
