pub mod bootstrap;
pub mod paths;
pub mod source;

pub use bootstrap::{Bootstrap, WasmPayload};
pub use paths::AssetPaths;
pub use source::{AssetSource, FileSource, HttpSource};
