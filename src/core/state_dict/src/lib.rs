pub mod from_state_dict;
pub mod owned_tensor;
pub mod state_dict;
pub mod to_state_dict;

pub use from_state_dict::FromStateDict;
pub use to_state_dict::to_safetensors;
