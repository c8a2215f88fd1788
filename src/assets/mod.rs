pub mod io;
pub mod loaders;
pub mod storage;

// Re-export the loader entry points and asset plumbing
pub use io::{AssetProvider, MemoryAssets};
pub use loaders::{LoaderSettings, MaterialAsset, MaterialLoader, ShaderNodeDefinitionLoader};
pub use storage::AssetStorage;
