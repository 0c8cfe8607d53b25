pub mod loader;
pub mod manager;
mod start_load;

pub use loader::FetchError;
pub use manager::{AssetLoadResult, AssetManager, AssetPayload, AssetSlot};
