pub mod binary_operations;
pub mod functional;
pub mod matmul;
pub mod matrix;
pub mod scalar_operations;
pub mod transpose;
