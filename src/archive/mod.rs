//! Archive fetching
//!
//! Downloads the skills bundle, trying each configured source in order
//! (zip first, then tar.gz), and unpacks it to find the `skills` directory.

mod extract;

use std::path::{Path, PathBuf};

use reqwest::Client;

pub use extract::{extract, find_skills_root, SKILLS_DIR};

use crate::config::ArchiveSource;
use crate::error::{Error, Result};

/// Downloads archives and text files with ordered fallback
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: Client,
}

impl ArchiveFetcher {
    pub fn new(client: Client) -> Self {
        ArchiveFetcher { client }
    }

    /// Download, extract into `work_dir`, and locate the skills directory
    ///
    /// A source counts as failed when its download, extraction, or skills
    /// lookup fails; the next source is tried after cleaning up. Fails with
    /// every attempted URL listed when all sources fail.
    pub async fn fetch_and_extract(&self, sources: &[ArchiveSource], work_dir: &Path) -> Result<PathBuf> {
        let mut attempted = Vec::with_capacity(sources.len());

        for (i, source) in sources.iter().enumerate() {
            let archive = work_dir.join(format!("bundle.{}", source.format.extension()));
            let out = work_dir.join(format!("extracted-{}", i));
            attempted.push(source.url.clone());

            match self.unpack(&source.url, &archive, &out).await {
                Ok(root) => {
                    tracing::debug!("Using bundle from {}", source.url);
                    return Ok(root);
                }
                Err(e) => {
                    tracing::debug!("Archive source {} failed: {}", source.url, e);
                    // Never leave a partial download behind for the next attempt
                    let _ = std::fs::remove_file(&archive);
                    let _ = std::fs::remove_dir_all(&out);
                }
            }
        }

        Err(Error::ArchiveUnreachable { attempted })
    }

    async fn unpack(&self, url: &str, archive: &Path, out: &Path) -> Result<PathBuf> {
        self.download(url, archive).await?;
        extract(archive, out)?;
        find_skills_root(out)
    }

    /// Fetch a text file from the first URL that answers successfully
    pub async fn fetch_text(&self, urls: &[String]) -> Result<String> {
        for url in urls {
            match self.get_bytes(url).await {
                Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => tracing::debug!("Text source {} failed: {}", url, e),
            }
        }
        Err(Error::ArchiveUnreachable {
            attempted: urls.to_vec(),
        })
    }

    /// Download a file from a URL
    async fn download(&self, url: &str, output_path: &Path) -> Result<()> {
        let bytes = self.get_bytes(url).await?;
        tokio::fs::write(output_path, &bytes).await?;
        Ok(())
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
