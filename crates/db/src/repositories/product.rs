use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use vitrina_core::config::StoreConfig;
use vitrina_core::domain::product::ProductRecord;

use super::{ProductRepository, RepositoryError};

/// Product store backed by a single JSON array document.
///
/// Every mutation rewrites the whole document. Mutations are serialized through
/// `write_lock` so two concurrent appends in the same process cannot lose each
/// other. The new document is written to a uniquely named sibling temp file and
/// renamed over the old one, so readers never observe a half-written file.
pub struct FileProductRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileProductRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RepositoryError::Io { path: self.path.clone(), source }),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|error| {
            RepositoryError::Decode(format!(
                "`{}` is not a product list: {error}",
                self.path.display()
            ))
        })
    }

    async fn persist(&self, records: &[ProductRecord]) -> Result<(), RepositoryError> {
        let content = serde_json::to_vec_pretty(records)
            .map_err(|error| RepositoryError::Encode(error.to_string()))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_document(&path, &content))
            .await
            .map_err(|error| RepositoryError::Io {
                path: self.path.clone(),
                source: io::Error::other(error),
            })??;

        debug!(path = %self.path.display(), records = records.len(), "product store rewritten");
        Ok(())
    }
}

/// Writes `content` to a uniquely named temp file beside `path` and renames it
/// into place. Concurrent writers from other processes each get their own temp
/// file, so the document is always one complete write.
fn replace_document(path: &Path, content: &[u8]) -> Result<(), RepositoryError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    let mut staging = NamedTempFile::new_in(parent).map_err(io_error(parent))?;
    staging.write_all(content).map_err(io_error(staging.path()))?;
    staging.as_file().sync_all().map_err(io_error(staging.path()))?;
    staging.persist(path).map_err(|error| RepositoryError::Io {
        path: path.to_path_buf(),
        source: error.error,
    })?;
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RepositoryError {
    let path = path.to_path_buf();
    move |source| RepositoryError::Io { path, source }
}

#[async_trait::async_trait]
impl ProductRepository for FileProductRepository {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        self.load().await
    }

    async fn append(&self, record: ProductRecord) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.push(record);
        self.persist(&records).await
    }

    async fn remove_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let records = self.load().await?;
        let before = records.len();
        let kept: Vec<ProductRecord> =
            records.into_iter().filter(|record| !record.has_name(name)).collect();

        if kept.len() == before {
            return Ok(false);
        }

        self.persist(&kept).await?;
        Ok(true)
    }
}
