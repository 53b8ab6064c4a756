//! Archive extraction and package-root discovery

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::config::ArchiveFormat;
use crate::error::{Error, Result};

/// Name of the directory that holds skill packages
pub const SKILLS_DIR: &str = "skills";

/// How deep below the extraction root a `skills` directory may sit
const SKILLS_SEARCH_DEPTH: usize = 3;

/// Extract `archive` into `dest`, dispatching on its file extension
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    fs::create_dir_all(dest)?;

    match ArchiveFormat::from_file_name(name) {
        Some(ArchiveFormat::Zip) => extract_zip(archive, dest),
        Some(ArchiveFormat::TarGz) => extract_tar_gz(archive, dest),
        None => Err(Error::InvalidInput(format!(
            "unsupported archive format: {}",
            archive.display()
        ))),
    }
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Skip entries that would escape the destination
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                tracing::warn!("Skipping unsafe zip entry {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&outpath)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    // `unpack` refuses entries that point outside `dest`
    archive.unpack(dest)?;
    Ok(())
}

/// Locate the shallowest directory named `skills` under `root`
pub fn find_skills_root(root: &Path) -> Result<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(SKILLS_SEARCH_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir() && entry.file_name() == SKILLS_DIR)
        .min_by_key(|entry| entry.depth())
        .map(|entry| entry.into_path())
        .ok_or_else(|| Error::SkillsRootMissing(root.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::test_support::{write_tar_gz, write_zip};

    #[test]
    fn test_extract_zip_and_find_root() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(
            &archive,
            &[
                ("repo-main/README.md", "readme"),
                ("repo-main/skills/alpha/SKILL.md", "alpha"),
                ("repo-main/skills/beta.skill", "beta"),
            ],
        );

        let out = dir.path().join("out");
        extract(&archive, &out).unwrap();
        let root = find_skills_root(&out).unwrap();

        assert_eq!(root, out.join("repo-main").join("skills"));
        assert_eq!(fs::read_to_string(root.join("alpha/SKILL.md")).unwrap(), "alpha");
    }

    #[test]
    fn test_extract_tar_gz() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.tar.gz");
        write_tar_gz(&archive, &[("repo-main/skills/beta.skill", "beta")]);

        let out = dir.path().join("out");
        extract(&archive, &out).unwrap();

        assert!(out.join("repo-main/skills/beta.skill").is_file());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.7z");
        fs::write(&archive, b"x").unwrap();

        assert!(matches!(extract(&archive, &dir.path().join("out")), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_prefers_shallowest_skills_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/skills")).unwrap();
        fs::create_dir_all(dir.path().join("skills")).unwrap();

        assert_eq!(find_skills_root(dir.path()).unwrap(), dir.path().join("skills"));
    }

    #[test]
    fn test_too_deep_is_missing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c/skills")).unwrap();
        fs::write(dir.path().join("a/skills"), b"not a dir").unwrap();

        let err = find_skills_root(dir.path()).unwrap_err();
        assert!(matches!(err, Error::SkillsRootMissing(_)));
    }
}
