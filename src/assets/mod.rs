//! Asset store
//!
//! Loads and indexes the template bundle: every entry becomes a text or image
//! resource carrying its archive metadata (path, mtime, unix permissions),
//! which is propagated verbatim into the generated archive. The store is
//! loaded once and read-only afterwards.

mod load;

use chrono::NaiveDateTime;
use image::RgbaImage;

use crate::error::{RackError, Result};

/// Bundle path of the audio-socket cable image (required)
pub const AUDIO_SOCKET_IMAGE: &str = "images/BuiltIn/Cable_Attachment_Audio_01_1frames.png";
/// Bundle path of the placeholder image (required)
pub const PLACEHOLDER_IMAGE: &str = "images/BuiltIn/Placeholder.png";
/// Bundle path of the horizontal tape image (required)
pub const TAPE_HORIZONTAL_IMAGE: &str = "images/BuiltIn/Tape_Horizontal_1frames.png";

/// Archive metadata of a loaded bundle entry
#[derive(Debug, Clone)]
pub struct ResourceMeta {
    /// Bundle-relative path, forward slashes
    pub path: String,
    pub modified: Option<NaiveDateTime>,
    pub unix_mode: Option<u32>,
}

/// A decoded image entry. Keeps both the raster (for compositing) and the
/// original encoded bytes (copied untouched into the archive).
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub meta: ResourceMeta,
    /// File stem without the `.png` suffix; how widgets reference the image
    pub key: String,
    pub image: RgbaImage,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    /// Decodes a PNG bundle entry. A decode failure fails the whole load.
    pub fn decode(meta: ResourceMeta, bytes: Vec<u8>) -> Result<Self> {
        let image = image::load_from_memory(&bytes)
            .map_err(|e| RackError::InvalidBundle {
                reason: format!("cannot decode image '{}': {}", meta.path, e),
            })?
            .to_rgba8();
        let key = meta
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&meta.path)
            .trim_end_matches(".png")
            .to_string();
        Ok(Self {
            meta,
            key,
            image,
            bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// One loaded bundle entry
#[derive(Debug, Clone)]
pub enum Resource {
    Text { meta: ResourceMeta, content: String },
    Image(ImageAsset),
}

impl Resource {
    pub fn meta(&self) -> &ResourceMeta {
        match self {
            Resource::Text { meta, .. } => meta,
            Resource::Image(img) => &img.meta,
        }
    }

    pub fn path(&self) -> &str {
        &self.meta().path
    }
}

/// Indexed, immutable view of the loaded bundle
#[derive(Debug)]
pub struct AssetStore {
    resources: Vec<Resource>,
}

impl AssetStore {
    /// Wraps loaded resources, verifying the required built-in images are
    /// present. They are defaults the model construction depends on, so a
    /// missing one is fatal at load time rather than later.
    pub fn new(resources: Vec<Resource>) -> Result<Self> {
        let store = Self { resources };
        for path in [AUDIO_SOCKET_IMAGE, PLACEHOLDER_IMAGE, TAPE_HORIZONTAL_IMAGE] {
            store.image(path)?;
        }
        Ok(store)
    }

    /// All resources, in bundle order
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn find_image(&self, path: &str) -> Option<&ImageAsset> {
        self.resources.iter().find_map(|r| match r {
            Resource::Image(img) if img.meta.path == path => Some(img),
            _ => None,
        })
    }

    /// First image whose key matches (keys are unique in practice)
    pub fn find_image_by_key(&self, key: &str) -> Option<&ImageAsset> {
        self.resources.iter().find_map(|r| match r {
            Resource::Image(img) if img.key == key => Some(img),
            _ => None,
        })
    }

    pub fn image(&self, path: &str) -> Result<&ImageAsset> {
        self.find_image(path).ok_or_else(|| RackError::AssetNotFound {
            path: path.to_string(),
        })
    }

    /// The audio socket cable image (presence checked at load)
    pub fn audio_socket_image(&self) -> &ImageAsset {
        self.find_image(AUDIO_SOCKET_IMAGE)
            .unwrap_or_else(|| unreachable!("checked in AssetStore::new"))
    }

    /// The placeholder image (presence checked at load)
    pub fn placeholder_image(&self) -> &ImageAsset {
        self.find_image(PLACEHOLDER_IMAGE)
            .unwrap_or_else(|| unreachable!("checked in AssetStore::new"))
    }

    /// The horizontal tape image (presence checked at load)
    pub fn tape_image(&self) -> &ImageAsset {
        self.find_image(TAPE_HORIZONTAL_IMAGE)
            .unwrap_or_else(|| unreachable!("checked in AssetStore::new"))
    }
}
