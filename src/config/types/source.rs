//! Remote source configuration
//!
//! Resolves the manifest, archive and requirements URLs from either an
//! explicit base URL or a GitLab-style host/project/branch triple.

use serde::{Deserialize, Serialize};

/// Remote source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Explicit raw-file base URL; overrides host/project/branch
    #[serde(default)]
    pub base_url: Option<String>,
    /// Git host, e.g. `https://gitlab.com`
    #[serde(default = "default_host")]
    pub host: String,
    /// Project path on the host
    #[serde(default = "default_project")]
    pub project: String,
    /// Branch to pull from
    #[serde(default = "default_branch")]
    pub branch: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: None,
            host: default_host(),
            project: default_project(),
            branch: default_branch(),
        }
    }
}

fn default_host() -> String {
    "https://gitlab.com".to_string()
}

fn default_project() -> String {
    "agent-skills/skills".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

/// Archive compression format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// File extension used for downloads of this format
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    /// Guess the format from a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }
}

/// One downloadable archive location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub url: String,
    pub format: ArchiveFormat,
}

impl SourceConfig {
    /// Base URL that raw files are served from, without a trailing slash
    pub fn raw_base(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "{}/{}/-/raw/{}",
                self.host.trim_end_matches('/'),
                self.project.trim_matches('/'),
                self.branch
            ),
        }
    }

    /// Plain-text manifest location
    pub fn manifest_url(&self) -> String {
        format!("{}/skills/manifest.txt", self.raw_base())
    }

    /// Dependency manifest location
    pub fn requirements_url(&self) -> String {
        format!("{}/requirements.txt", self.raw_base())
    }

    /// Archive candidates, preferred first
    pub fn archive_sources(&self) -> Vec<ArchiveSource> {
        [ArchiveFormat::Zip, ArchiveFormat::TarGz]
            .into_iter()
            .map(|format| ArchiveSource {
                url: self.archive_url(format),
                format,
            })
            .collect()
    }

    fn archive_url(&self, format: ArchiveFormat) -> String {
        if let Some(base) = &self.base_url {
            return format!("{}/archive.{}", base.trim_end_matches('/'), format.extension());
        }

        let project = self.project.trim_matches('/');
        let name = project.rsplit('/').next().unwrap_or(project);
        // GitLab flattens slashes in branch names for archive file names
        let branch_slug = self.branch.replace('/', "-");
        format!(
            "{}/{}/-/archive/{}/{}-{}.{}",
            self.host.trim_end_matches('/'),
            project,
            self.branch,
            name,
            branch_slug,
            format.extension()
        )
    }
}
