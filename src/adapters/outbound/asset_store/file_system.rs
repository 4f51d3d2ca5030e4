use crate::ports::outbound::asset_store::{Asset, AssetError, AssetStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub struct FileSystem {
    data_dir: PathBuf,
}

impl FileSystem {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Only plain relative segments are accepted, so lookups cannot leave `data_dir`.
    fn resolve(&self, asset_id: &str) -> Option<PathBuf> {
        let relative = Path::new(asset_id);
        let mut components = relative.components().peekable();
        components.peek()?;
        if components.all(|component| matches!(component, Component::Normal(_))) {
            Some(self.data_dir.join(relative))
        } else {
            None
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl AssetStore for FileSystem {
    async fn fetch(&self, asset_id: &str) -> Result<Asset, AssetError> {
        let Some(path) = self.resolve(asset_id) else {
            return Err(AssetError::NotFound(asset_id.to_string()));
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Asset {
                bytes,
                content_type: content_type(&path),
            }),
            Err(why) if matches!(why.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                Err(AssetError::NotFound(asset_id.to_string()))
            }
            Err(why) => {
                log::warn!("Error reading asset {asset_id} - {why:?}");
                Err(AssetError::Io(why.to_string()))
            }
        }
    }
}
