//! Archive assembly
//!
//! Merges the composited panel rasters, the unique property images and the
//! token-processed template resources into one deterministic zip. Every
//! per-entry content resolution (raster encode, token substitution) runs as
//! its own future and the set is joined all-or-nothing: one failure fails the
//! whole generation and no partial archive is ever observable.

use std::io::{Cursor, Write};

use chrono::NaiveDateTime;
use futures::future::try_join_all;
use futures::FutureExt;
use log::{debug, info};
use zip::write::FileOptions;

use crate::assets::{AssetStore, Resource};
use crate::error::{RackError, Result};
use crate::model::Device;
use crate::render::{geometry, PanelRenderer};
use crate::tokens::{generate_tokens, TokenTable};

/// Applied to every entry whose originating resource carries no date (and to
/// dates the zip format cannot represent). A fixed instant, never wall-clock,
/// so identical inputs produce byte-identical archives.
pub fn fallback_timestamp() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
        .expect("valid constant date")
        .and_hms_opt(0, 0, 0)
        .expect("valid constant time")
}

/// Content of one archive entry
#[derive(Debug, Clone)]
pub enum EntryContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Text(text) => text.as_bytes(),
            EntryContent::Bytes(bytes) => bytes,
        }
    }
}

/// One resolved archive entry: archive-relative path (forward slashes) plus
/// the metadata propagated from its originating resource
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: EntryContent,
    pub modified: Option<NaiveDateTime>,
    pub unix_mode: Option<u32>,
}

/// The finished archive
#[derive(Debug)]
pub struct Archive {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Name of the folder everything nests under inside the zip
pub fn archive_root(device: &Device) -> String {
    format!("{}-plugin", device.info.product_id)
}

fn encode_png(image: &image::RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(
        &mut Cursor::new(&mut bytes),
        image::ImageOutputFormat::Png,
    )?;
    Ok(bytes)
}

/// Builds the ordered file tree: panel rasters, then unique property images,
/// then template resources with the device-type prefix overriding the common
/// one per relative path.
pub async fn build_file_tree(device: &Device, store: &AssetStore) -> Result<Vec<ArchiveEntry>> {
    let tokens = generate_tokens(device);
    let renderer = PanelRenderer::new(device, store);

    let mut pending: Vec<futures::future::LocalBoxFuture<'_, Result<ArchiveEntry>>> = Vec::new();

    // composited panel rasters, available-panel order
    for &panel in device.available_panels() {
        let renderer = &renderer;
        pending.push(
            async move {
                let raster = renderer.render(panel)?;
                Ok(ArchiveEntry {
                    path: format!("GUI2D/{}.png", geometry::panel_image_key(panel)),
                    content: EntryContent::Bytes(encode_png(&raster)?),
                    modified: None,
                    unix_mode: None,
                })
            }
            .boxed_local(),
        );
    }

    // property images, first-reference order, deduplicated by key
    for key in device.property_image_keys() {
        let key = key.to_string();
        pending.push(
            async move {
                let asset = store
                    .find_image_by_key(&key)
                    .ok_or_else(|| RackError::AssetNotFound {
                        path: format!("{}.png", key),
                    })?;
                Ok(ArchiveEntry {
                    path: format!("GUI2D/{}.png", key),
                    content: EntryContent::Bytes(asset.bytes.clone()),
                    modified: asset.meta.modified,
                    unix_mode: asset.meta.unix_mode,
                })
            }
            .boxed_local(),
        );
    }

    // template resources; type-specific prefix wins per relative path
    let prefixes = [
        format!("skeletons/{}/", device.info.device_type),
        "skeletons/common/".to_string(),
    ];
    let mut seen: Vec<String> = Vec::new();
    for prefix in &prefixes {
        for resource in store.resources() {
            let rel = match resource.path().strip_prefix(prefix.as_str()) {
                Some(rel) if !rel.is_empty() => rel.to_string(),
                _ => continue,
            };
            if seen.contains(&rel) {
                continue;
            }
            seen.push(rel.clone());

            let tokens = &tokens;
            pending.push(
                async move {
                    Ok(ArchiveEntry {
                        path: rel,
                        content: resolve_template(resource, tokens),
                        modified: resource.meta().modified,
                        unix_mode: resource.meta().unix_mode,
                    })
                }
                .boxed_local(),
            );
        }
    }

    let tree = try_join_all(pending).await?;
    debug!("File tree resolved: {} entries", tree.len());
    Ok(tree)
}

/// Text templates are token-substituted; images are copied byte-for-byte
fn resolve_template(resource: &Resource, tokens: &TokenTable) -> EntryContent {
    match resource {
        Resource::Text { content, .. } => EntryContent::Text(tokens.substitute(content)),
        Resource::Image(img) => EntryContent::Bytes(img.bytes.clone()),
    }
}

fn zip_timestamp(modified: Option<NaiveDateTime>) -> zip::DateTime {
    use chrono::{Datelike, Timelike};
    let to_zip = |t: NaiveDateTime| {
        zip::DateTime::from_date_and_time(
            t.year() as u16,
            t.month() as u8,
            t.day() as u8,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
        )
        .ok()
    };
    // resource dates before the zip epoch (1980) fall back too
    modified
        .and_then(to_zip)
        .or_else(|| to_zip(fallback_timestamp()))
        .unwrap_or_default()
}

/// Serializes the resolved tree under `{root}/`, preserving per-entry
/// metadata. Entries are written in tree order.
pub fn write_zip(root: &str, tree: &[ArchiveEntry]) -> Result<Archive> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

    for entry in tree {
        let mut options = FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip_timestamp(entry.modified));
        if let Some(mode) = entry.unix_mode {
            options = options.unix_permissions(mode);
        }
        writer.start_file(format!("{}/{}", root, entry.path), options)?;
        writer.write_all(entry.content.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    info!("Archive assembled: {} entries, {} bytes", tree.len(), bytes.len());
    Ok(Archive {
        filename: format!("{}.zip", root),
        bytes,
    })
}

/// End to end: file tree plus serialization
pub async fn generate_archive(device: &Device, store: &AssetStore) -> Result<Archive> {
    let tree = build_file_tree(device, store).await?;
    write_zip(&archive_root(device), &tree)
}
