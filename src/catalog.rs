//! Skill catalog
//!
//! Resolves the list of installable skill identifiers from the remote
//! manifest, falling back to an embedded list whenever the manifest is
//! missing or unusable. The result is never empty.

use reqwest::Client;

use crate::error::{Error, Result};

/// Skills known at build time, used when the remote manifest is unusable
pub const FALLBACK_SKILLS: &[&str] = &[
    "board-resolver",
    "docx",
    "gabia-dev-mcp-confluence",
    "gabia-dev-mcp-elasticsearch",
    "gabia-dev-mcp-figma",
    "gabia-dev-mcp-gitlab-issues",
    "gabia-dev-mcp-gitlab-merge-requests",
    "gabia-dev-mcp-mattermost",
    "gabia-dev-mcp-memory",
    "gabia-dev-mcp-mysql",
    "gabia-dev-mcp-oracle",
    "gabia-dev-mcp-sentry",
    "hiworks-mail",
    "hiworks-memo",
    "mac-cron",
    "mcp-builder",
    "obsidian-writer",
    "pdf",
    "pptx",
    "skill-creator",
    "webapp-testing",
    "xlsx",
];

/// Where a resolved catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

/// Ordered, non-empty list of skill identifiers
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: Vec<String>,
    source: CatalogSource,
}

impl SkillCatalog {
    /// The embedded fallback catalog
    pub fn fallback() -> Self {
        SkillCatalog {
            skills: FALLBACK_SKILLS.iter().map(|s| s.to_string()).collect(),
            source: CatalogSource::Fallback,
        }
    }

    /// Fetch the remote manifest, or fall back to the embedded list
    pub async fn resolve(client: &Client, manifest_url: &str) -> Self {
        match fetch_manifest(client, manifest_url).await {
            Ok(skills) => {
                tracing::debug!("Loaded {} skills from {}", skills.len(), manifest_url);
                SkillCatalog {
                    skills,
                    source: CatalogSource::Remote,
                }
            }
            Err(e) => {
                tracing::debug!("Using built-in skill list ({})", e);
                Self::fallback()
            }
        }
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

async fn fetch_manifest(client: &Client, url: &str) -> Result<Vec<String>> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::ManifestInvalid(format!("HTTP {}", status)));
    }

    let body = response.text().await?;
    parse_manifest(&body)
}

/// Parse a plain-text manifest: one identifier per line
///
/// Blank lines and `#` comments are ignored and duplicates dropped. A body
/// that starts with an HTML document marker is rejected outright.
pub fn parse_manifest(body: &str) -> Result<Vec<String>> {
    let first = body.lines().map(str::trim).find(|l| !l.is_empty());
    if let Some(first) = first {
        if looks_like_html(first) {
            return Err(Error::ManifestInvalid("response is an HTML page".into()));
        }
    }

    let mut skills: Vec<String> = Vec::new();
    for line in body.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !skills.iter().any(|s| s == line) {
            skills.push(line.to_string());
        }
    }

    if skills.is_empty() {
        return Err(Error::ManifestInvalid("manifest is empty".into()));
    }
    Ok(skills)
}

fn looks_like_html(line: &str) -> bool {
    let lower = line.trim_start_matches('\u{feff}').to_ascii_lowercase();
    lower.starts_with("<!doctype") || lower.starts_with("<html")
}
