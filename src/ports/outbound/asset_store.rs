use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, derive(Clone, PartialEq))]
#[derive(Debug)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[cfg_attr(test, derive(Clone))]
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Error retrieving asset: {0}")]
    Io(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn fetch(&self, asset_id: &str) -> Result<Asset, AssetError>;
}
