//! Bundle loading
//!
//! Two ways into an [`AssetStore`]: a packed zip bundle or an unpacked
//! directory tree. Either way every entry is decoded up front and any
//! transport or decode failure fails the whole load.

use std::io::{Cursor, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, info};
use walkdir::WalkDir;

use super::{AssetStore, ImageAsset, Resource, ResourceMeta};
use crate::error::{RackError, Result};

/// Junk that zip tools like to add and that must never become a resource
fn is_junk(path: &str) -> bool {
    path.starts_with("__MACOSX")
        || path.starts_with(".idea")
        || path.ends_with(".DS_Store")
        || path.ends_with('/')
}

fn decode_resource(meta: ResourceMeta, bytes: Vec<u8>) -> Result<Resource> {
    if meta.path.ends_with(".png") {
        Ok(Resource::Image(ImageAsset::decode(meta, bytes)?))
    } else {
        let content = String::from_utf8(bytes).map_err(|_| RackError::InvalidBundle {
            reason: format!("'{}' is not valid UTF-8", meta.path),
        })?;
        Ok(Resource::Text { meta, content })
    }
}

fn zip_datetime(dt: zip::DateTime) -> Option<NaiveDateTime> {
    chrono::NaiveDate::from_ymd_opt(dt.year() as i32, dt.month() as u32, dt.day() as u32)?
        .and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)
}

impl AssetStore {
    /// Loads a packed bundle from disk
    pub async fn load_zip(path: &Path) -> Result<Self> {
        info!("Loading template bundle: {}", path.display());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RackError::Transport {
                detail: format!("cannot read bundle '{}'", path.display()),
                source: Some(e),
            })?;
        Self::from_zip_bytes(&bytes)
    }

    /// Parses bundle bytes already in memory
    pub fn from_zip_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| RackError::InvalidBundle {
                reason: format!("not a zip bundle: {}", e),
            })?;

        let mut resources = Vec::new();
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() || is_junk(file.name()) {
                continue;
            }
            let meta = ResourceMeta {
                path: file.name().to_string(),
                modified: zip_datetime(file.last_modified()),
                unix_mode: file.unix_mode(),
            };
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)?;
            debug!("Loaded bundle entry: {} ({} bytes)", meta.path, content.len());
            resources.push(decode_resource(meta, content)?);
        }

        info!("Bundle loaded: {} resources", resources.len());
        Self::new(resources)
    }

    /// Loads an unpacked bundle directory. Entry paths are relative to the
    /// root with forward slashes, so the two load paths index identically.
    pub async fn load_dir(root: &Path) -> Result<Self> {
        info!("Loading template bundle directory: {}", root.display());

        let mut resources = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| RackError::Transport {
                detail: format!("cannot walk bundle dir '{}': {}", root.display(), e),
                source: e.into_io_error(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| RackError::InvalidBundle {
                    reason: format!("entry outside bundle root: {}", entry.path().display()),
                })?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            if is_junk(&rel) {
                continue;
            }

            let fs_meta = entry.metadata().map_err(|e| RackError::Transport {
                detail: format!("cannot stat '{}': {}", entry.path().display(), e),
                source: e.into_io_error(),
            })?;
            let modified = fs_meta
                .modified()
                .ok()
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).naive_utc());

            #[cfg(unix)]
            let unix_mode = {
                use std::os::unix::fs::PermissionsExt;
                Some(fs_meta.permissions().mode() & 0o777)
            };
            #[cfg(not(unix))]
            let unix_mode = None;

            let meta = ResourceMeta {
                path: rel,
                modified,
                unix_mode,
            };
            let content = tokio::fs::read(entry.path()).await?;
            resources.push(decode_resource(meta, content)?);
        }

        info!("Bundle loaded: {} resources", resources.len());
        Self::new(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AUDIO_SOCKET_IMAGE, PLACEHOLDER_IMAGE, TAPE_HORIZONTAL_IMAGE};
    use image::RgbaImage;
    use std::io::Write;
    use zip::write::FileOptions;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn test_bundle() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        for path in [AUDIO_SOCKET_IMAGE, PLACEHOLDER_IMAGE, TAPE_HORIZONTAL_IMAGE] {
            writer.start_file(path, options).unwrap();
            writer.write_all(&png_bytes()).unwrap();
        }
        writer
            .start_file("skeletons/common/info.lua", options)
            .unwrap();
        writer.write_all(b"name = \"[-info-long_name-]\"\n").unwrap();
        writer
            .start_file("__MACOSX/skeletons/common/info.lua", options)
            .unwrap();
        writer.write_all(b"junk").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_zip_bundle_round_trip() {
        let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();
        // three images plus one text file; the __MACOSX entry is dropped
        assert_eq!(store.resources().len(), 4);
        assert!(store
            .resources()
            .iter()
            .any(|r| r.path() == "skeletons/common/info.lua"));
    }

    #[test]
    fn test_garbage_is_not_a_bundle() {
        let err = AssetStore::from_zip_bytes(b"definitely not a zip").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BUNDLE");
    }

    #[test]
    fn test_junk_paths() {
        assert!(is_junk("__MACOSX/foo.lua"));
        assert!(is_junk(".idea/workspace.xml"));
        assert!(is_junk("skeletons/.DS_Store"));
        assert!(is_junk("skeletons/common/"));
        assert!(!is_junk("skeletons/common/info.lua"));
    }

    #[tokio::test]
    async fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images/BuiltIn");
        std::fs::create_dir_all(&images).unwrap();
        for name in [
            "Cable_Attachment_Audio_01_1frames.png",
            "Placeholder.png",
            "Tape_Horizontal_1frames.png",
        ] {
            std::fs::write(images.join(name), png_bytes()).unwrap();
        }
        let skeletons = dir.path().join("skeletons/common");
        std::fs::create_dir_all(&skeletons).unwrap();
        std::fs::write(skeletons.join("motherboard_def.lua"), "-- [-motherboard_def-properties-]").unwrap();

        let store = AssetStore::load_dir(dir.path()).await.unwrap();
        assert_eq!(store.resources().len(), 4);
        assert!(store
            .find_image("images/BuiltIn/Placeholder.png")
            .is_some());
    }

    #[tokio::test]
    async fn test_missing_bundle_is_transport_error() {
        let err = AssetStore::load_zip(Path::new("/nonexistent/bundle.zip"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }
}
