//! Archive inspection and extraction.
//!
//! Windows builds ship as zip archives, Linux builds as gzip- or
//! xz-compressed tarballs. Both contain a single top-level directory holding
//! the build.

use crate::utils::fs::ensure_dir;
use crate::utils::platform::ArchiveKind;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use lzma_rust2::XzReader;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};
use tar::Archive;
use zip::ZipArchive;

/// Names of the first `limit` entries, in archive order.
pub fn entry_names(archive_path: &Path, kind: ArchiveKind, limit: usize) -> Result<Vec<String>> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    match kind {
        ArchiveKind::Zip => {
            let archive = ZipArchive::new(file)
                .with_context(|| format!("Not a valid zip archive: {}", archive_path.display()))?;
            Ok((0..archive.len().min(limit))
                .filter_map(|i| archive.name_for_index(i).map(str::to_string))
                .collect())
        }
        ArchiveKind::TarGz | ArchiveKind::TarXz => {
            let mut archive = open_tar(file, kind);
            let mut names = Vec::with_capacity(limit);
            for entry in archive.entries().context("Failed to read tar entries")? {
                if names.len() >= limit {
                    break;
                }
                let entry = entry.context("Corrupt tar entry")?;
                // `git archive` and GNU tar in pax mode prepend a global header record.
                if entry.header().entry_type().is_pax_global_extensions() {
                    continue;
                }
                names.push(entry.path().context("Invalid tar entry path")?.to_string_lossy().into_owned());
            }
            Ok(names)
        }
    }
}

fn open_tar(file: File, kind: ArchiveKind) -> Archive<Box<dyn Read>> {
    let decoder: Box<dyn Read> = if kind == ArchiveKind::TarXz {
        Box::new(XzReader::new(file, true))
    } else {
        Box::new(GzDecoder::new(file))
    };
    Archive::new(decoder)
}

/// Name of the archive's top-level directory.
///
/// Taken from the first path segment of the second entry, since the first
/// entry is usually the bare directory record. Single-entry archives use
/// their only entry. Leading `./` segments are ignored, so the second entry
/// may itself be the directory record (`./` then `./yuzu-linux/`). Returns
/// `None` when that entry is a file at the archive root or its first
/// segment is not a plain name.
#[must_use]
pub fn top_level_dir(names: &[String]) -> Option<String> {
    let name = names.get(1).or_else(|| names.first())?;
    let is_dir_record = name.ends_with('/');

    let mut components = Path::new(name).components().filter(|c| !matches!(c, Component::CurDir));
    let first = components.next()?;
    if components.next().is_none() && !is_dir_record {
        return None;
    }

    match first {
        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Extract every entry of the archive below `dest`.
///
/// Entries that would escape `dest` are skipped.
pub fn extract(archive_path: &Path, kind: ArchiveKind, dest: &Path) -> Result<()> {
    ensure_dir(dest)?;
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    match kind {
        ArchiveKind::Zip => extract_zip(file, dest),
        ArchiveKind::TarGz | ArchiveKind::TarXz => {
            let mut archive = open_tar(file, kind);
            archive.set_preserve_permissions(true);
            archive
                .unpack(dest)
                .with_context(|| format!("Failed to extract {}", archive_path.display()))
        }
    }
}

fn extract_zip(file: File, dest: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(file).context("Not a valid zip archive")?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).with_context(|| format!("Corrupt zip entry #{i}"))?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            ensure_dir(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            ensure_dir(parent)?;
        }
        let mut outfile = File::create(&outpath)
            .with_context(|| format!("Failed to create {}", outpath.display()))?;
        std::io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract {}", outpath.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}
