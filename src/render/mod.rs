//! Panel rendering
//!
//! Rasterizes one panel: opaque plate between the rails, device metadata
//! text, then every widget registered for the panel composited in property
//! registration order (later registrations draw on top). Rendering is a pure
//! function of the model and the store - two calls yield identical pixels.

pub mod geometry;
pub mod text;

use image::{imageops, Rgba, RgbaImage};
use log::debug;

use crate::assets::AssetStore;
use crate::error::{RackError, Result};
use crate::model::{Device, Panel};
pub use geometry::Geometry;

/// Plate colors and text styling
#[derive(Debug, Clone)]
pub struct Theme {
    pub front_plate: Rgba<u8>,
    pub back_plate: Rgba<u8>,
    pub text_color: Rgba<u8>,
    /// Integer scale applied to the 8x8 glyphs
    pub text_scale: u32,
    /// Overlay `long_name | manufacturer | version` near the bottom edge
    pub show_metadata: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            front_plate: Rgba([0x99, 0x99, 0x99, 0xff]),
            back_plate: Rgba([0x55, 0x55, 0x55, 0xff]),
            text_color: Rgba([0xff, 0xff, 0xff, 0xff]),
            text_scale: 6,
            show_metadata: true,
        }
    }
}

/// Rasterizes panels of one device against one asset store snapshot
pub struct PanelRenderer<'a> {
    device: &'a Device,
    store: &'a AssetStore,
    theme: Theme,
}

impl<'a> PanelRenderer<'a> {
    pub fn new(device: &'a Device, store: &'a AssetStore) -> Self {
        Self::with_theme(device, store, Theme::default())
    }

    pub fn with_theme(device: &'a Device, store: &'a AssetStore, theme: Theme) -> Self {
        Self {
            device,
            store,
            theme,
        }
    }

    /// Renders the composited panel: plate, metadata text, widgets
    pub fn render(&self, panel: Panel) -> Result<RgbaImage> {
        let mut canvas = self.render_plate(panel);

        for prop in self.device.properties() {
            for widget in prop.widgets_for(panel) {
                let asset = self.store.find_image_by_key(&widget.image_key).ok_or_else(|| {
                    RackError::Render {
                        reason: format!(
                            "widget '{}' references unknown image '{}'",
                            widget.node_name, widget.image_key
                        ),
                    }
                })?;

                // source rect: full width, first frame of the sprite sheet
                let frames = widget.frames.max(1);
                let frame_height = (asset.height() / frames).max(1);
                let frame =
                    imageops::crop_imm(&asset.image, 0, 0, asset.width(), frame_height).to_image();
                imageops::overlay(
                    &mut canvas,
                    &frame,
                    widget.offset.0 as i64,
                    widget.offset.1 as i64,
                );
            }
        }

        debug!(
            "Rendered panel {} ({}x{})",
            panel,
            canvas.width(),
            canvas.height()
        );
        Ok(canvas)
    }

    /// The bare panel background: transparent rails, opaque plate, metadata
    fn render_plate(&self, panel: Panel) -> RgbaImage {
        let geometry = Geometry::of(&self.device.info);
        let width = geometry.width();
        let height = geometry.height(panel);
        let mut canvas = RgbaImage::new(width, height);

        let rail = geometry.rail_width(panel);
        let plate = if panel.is_front() {
            self.theme.front_plate
        } else {
            self.theme.back_plate
        };
        for y in 0..height {
            for x in rail..width - rail {
                canvas.put_pixel(x, y, plate);
            }
        }

        if self.theme.show_metadata {
            let info = &self.device.info;
            let line = format!("{} | {} | {}", info.long_name, info.manufacturer, info.version);
            let scale = self.theme.text_scale;
            let x = (width as i32 - text::text_width(&line, scale) as i32) / 2;
            let y = height as i32 - text::text_height(scale) as i32 - 5;
            text::draw_text(&mut canvas, &line, x, y, scale, self.theme.text_color);
        }

        canvas
    }
}
