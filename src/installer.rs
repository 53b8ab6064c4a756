//! Skill installer
//!
//! Copies selected skill packages from an extracted bundle into one target
//! directory. A package is either a directory `<root>/<id>/` or a single
//! file `<root>/<id>.skill`; directories win when both exist.
//!
//! Every package is staged next to its destination and renamed into place,
//! so a target only ever holds a complete old copy or a complete new one.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Directory names removed from freshly copied packages
const BYTECODE_DIRS: &[&str] = &["__pycache__"];

/// File extensions removed from freshly copied packages
const BYTECODE_EXTS: &[&str] = &["pyc", "pyo"];

/// Extension of single-file packages
pub const SKILL_FILE_EXT: &str = "skill";

/// Shape of an installed package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Directory,
    File,
}

/// Outcome for one skill in one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(PackageKind),
    NotFound,
}

/// One skill's result
#[derive(Debug, Clone)]
pub struct SkillInstall {
    pub skill: String,
    pub outcome: InstallOutcome,
}

/// Results of installing a batch into one target
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub target: PathBuf,
    pub results: Vec<SkillInstall>,
}

impl InstallReport {
    /// Number of packages written
    pub fn installed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, InstallOutcome::Installed(_)))
            .count()
    }

    /// Number of requested skills missing from the bundle
    pub fn not_found(&self) -> usize {
        self.missing().count()
    }

    /// Names of requested skills missing from the bundle
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| r.outcome == InstallOutcome::NotFound)
            .map(|r| r.skill.as_str())
    }
}

/// Installs skill packages from one extracted bundle
pub struct SkillInstaller {
    package_root: PathBuf,
}

impl SkillInstaller {
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        SkillInstaller {
            package_root: package_root.into(),
        }
    }

    /// Install `skills` into `target_dir`
    ///
    /// A missing skill is recorded and skipped; I/O failures abort the
    /// batch for this target.
    pub fn install(&self, skills: &[String], target_dir: &Path) -> Result<InstallReport> {
        fs::create_dir_all(target_dir)?;

        let mut results = Vec::with_capacity(skills.len());
        for skill in skills {
            let outcome = self.install_one(skill, target_dir)?;
            match outcome {
                InstallOutcome::Installed(_) => tracing::debug!("Installed {} into {}", skill, target_dir.display()),
                InstallOutcome::NotFound => tracing::debug!("{} not present in bundle", skill),
            }
            results.push(SkillInstall {
                skill: skill.clone(),
                outcome,
            });
        }

        Ok(InstallReport {
            target: target_dir.to_path_buf(),
            results,
        })
    }

    fn install_one(&self, skill: &str, target_dir: &Path) -> Result<InstallOutcome> {
        // Identifiers are plain names; anything path-like can't be a package
        if skill.is_empty() || skill.contains(|c: char| c == '/' || c == '\\') || skill == "." || skill == ".." {
            return Ok(InstallOutcome::NotFound);
        }

        let dir_package = self.package_root.join(skill);
        if dir_package.is_dir() {
            install_directory(&dir_package, &target_dir.join(skill), target_dir, skill)?;
            return Ok(InstallOutcome::Installed(PackageKind::Directory));
        }

        let file_name = format!("{}.{}", skill, SKILL_FILE_EXT);
        let file_package = self.package_root.join(&file_name);
        if file_package.is_file() {
            install_file(&file_package, &target_dir.join(&file_name), target_dir, &file_name)?;
            return Ok(InstallOutcome::Installed(PackageKind::File));
        }

        Ok(InstallOutcome::NotFound)
    }
}

fn install_directory(src: &Path, dest: &Path, target_dir: &Path, name: &str) -> Result<()> {
    let staging = target_dir.join(format!(".{}.staging", name));
    remove_path(&staging)?;

    if let Err(e) = copy_tree(src, &staging).and_then(|_| strip_bytecode(&staging)) {
        let _ = remove_path(&staging);
        return Err(e);
    }

    remove_path(dest)?;
    fs::rename(&staging, dest)?;
    Ok(())
}

fn install_file(src: &Path, dest: &Path, target_dir: &Path, name: &str) -> Result<()> {
    let staging = target_dir.join(format!(".{}.staging", name));
    remove_path(&staging)?;
    fs::copy(src, &staging)?;

    if dest.is_dir() {
        fs::remove_dir_all(dest)?;
    }
    // rename replaces an existing file atomically
    fs::rename(&staging, dest)?;
    Ok(())
}

/// Recursively copy `src` to `dest`
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let out = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out)?;
        } else {
            fs::copy(entry.path(), &out)?;
        }
    }
    Ok(())
}

/// Remove generated Python bytecode from a copied tree
fn strip_bytecode(root: &Path) -> Result<()> {
    let mut doomed_dirs = Vec::new();
    let mut doomed_files = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        let is_cache = e.file_type().is_dir() && BYTECODE_DIRS.iter().any(|d| e.file_name() == *d);
        if is_cache {
            doomed_dirs.push(e.path().to_path_buf());
        }
        !is_cache
    });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let is_bytecode = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| BYTECODE_EXTS.contains(&ext));
        if entry.file_type().is_file() && is_bytecode {
            doomed_files.push(entry.into_path());
        }
    }

    for dir in doomed_dirs {
        fs::remove_dir_all(dir)?;
    }
    for file in doomed_files {
        fs::remove_file(file)?;
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path)?,
        Ok(_) => fs::remove_file(path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
