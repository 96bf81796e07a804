//! Built-in stages and the default stage chains used to publish a site.

mod assets;
mod content;
mod general;

pub use assets::{
    AssetDestination, AssetNode, CopyAssets, MapToAssetNode, MapToAssetNodeConfig,
    default_asset_stages,
};
pub use content::{ProcessDirectories, ProcessDirectoriesConfig, default_content_stages};
pub use general::{DeleteFolder, DeleteFolderConfig};
