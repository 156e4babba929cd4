// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Template source archives.
//!
//! The upload endpoint takes a gzipped tar of the template folder. This
//! module builds one in memory so the upload call owns plain bytes and no
//! file handle outlives the request.

use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::debug;

use crate::error::{Result, SdkError};

/// An in-memory template archive ready for upload.
#[derive(Debug, Clone)]
pub struct TemplateArchive {
    /// File name reported to the service.
    pub file_name: String,
    /// Archive bytes (gzipped tar).
    pub bytes: Vec<u8>,
}

impl TemplateArchive {
    /// Wrap already-built archive bytes.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an existing archive file. The handle is released before this
    /// returns, whether the read succeeds or fails.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SdkError::InvalidInput(format!("bad archive path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { file_name, bytes })
    }

    /// Pack a template folder into a gzipped tar archive.
    ///
    /// Paths inside the archive are relative to `dir`. VCS metadata (`.git`)
    /// is skipped.
    pub fn pack_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SdkError::InvalidInput(format!(
                "not a directory: {}",
                dir.display()
            )));
        }

        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        append_dir(&mut builder, dir, Path::new(""))?;
        let bytes = builder.into_inner()?.finish()?;

        let file_name = format!(
            "{}.tar.gz",
            dir.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("template")
        );
        debug!(file_name = %file_name, size = bytes.len(), "packed template archive");
        Ok(Self { file_name, bytes })
    }

    /// Length of the archive in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn append_dir<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    dir: &Path,
    prefix: &Path,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".git" {
            continue;
        }
        let path = entry.path();
        let archived = prefix.join(&name);
        if path.is_dir() {
            builder.append_dir(&archived, &path)?;
            append_dir(builder, &path, &archived)?;
        } else {
            builder.append_path_with_name(&path, &archived)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_directory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.tf"), "resource {}\n").unwrap();
        std::fs::create_dir(dir.path().join("modules")).unwrap();
        std::fs::write(dir.path().join("modules").join("a.tf"), "module\n").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git").join("HEAD"), "ref\n").unwrap();

        let archive = TemplateArchive::pack_directory(dir.path()).unwrap();
        assert!(!archive.is_empty());
        assert!(archive.file_name.ends_with(".tar.gz"));

        let decoder = flate2::read::GzDecoder::new(archive.bytes.as_slice());
        let mut tar = tar::Archive::new(decoder);
        let names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                entry.path().unwrap().to_string_lossy().into_owned()
            })
            .collect();
        assert!(names.iter().any(|n| n == "main.tf"));
        assert!(names.iter().any(|n| n == "modules/a.tf"));
        assert!(!names.iter().any(|n| n.starts_with(".git")));
    }

    #[test]
    fn test_pack_directory_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.tf");
        std::fs::write(&file, "x").unwrap();
        let err = TemplateArchive::pack_directory(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let err = TemplateArchive::from_file("/nonexistent/archive.tar.gz")
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Io(_)));
    }

    #[tokio::test]
    async fn test_from_file_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.tar.gz");
        std::fs::write(&path, b"archive-bytes").unwrap();

        let archive = TemplateArchive::from_file(&path).await.unwrap();
        assert_eq!(archive.file_name, "src.tar.gz");
        assert_eq!(archive.bytes, b"archive-bytes");
    }
}
