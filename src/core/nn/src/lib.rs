pub mod activation;
pub mod functional;
pub mod layer;
pub mod network;
pub mod sample;
