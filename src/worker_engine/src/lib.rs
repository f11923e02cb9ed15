pub mod handle;
pub mod protocol;
pub mod server;
