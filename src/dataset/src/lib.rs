pub mod iris;
pub mod split;

pub use iris::{csv_to_dataset, parse_flowers, Flower, FlowerClass};
pub use split::train_test_split;
