//! Panel geometry
//!
//! Resolution and rail constants mandated by the target SDK. All sizes are
//! hi-res pixels; the width is fixed, the height depends on the device size
//! in rack units and on whether the panel is folded.

use crate::model::{DeviceInfo, DeviceType, Panel};

/// Margin (pixels) that must stay empty on every edge
pub const EMPTY_MARGIN: i32 = 25;
/// Fixed panel width
pub const WIDTH: u32 = 3770;
/// Unfolded panel height per rack unit
pub const HEIGHT_1U: u32 = 345;
/// Rail width on the back panel
pub const BACK_RAIL: u32 = 155;
/// Rail width on the back panel of a note player
pub const NOTE_PLAYER_BACK_RAIL: u32 = 295;
/// Rail width on the front panel of a note player
pub const NOTE_PLAYER_FRONT_RAIL: u32 = 90;
/// Height of the folded panels
pub const FOLDED_HEIGHT: u32 = 150;

/// Per-device geometry table
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    device_type: DeviceType,
    size_in_u: u32,
}

impl Geometry {
    pub fn of(info: &DeviceInfo) -> Self {
        Self {
            device_type: info.device_type,
            size_in_u: info.size_in_u,
        }
    }

    /// Fixed and panel-independent
    pub fn width(self) -> u32 {
        WIDTH
    }

    pub fn height(self, panel: Panel) -> u32 {
        if panel.is_folded() {
            FOLDED_HEIGHT
        } else {
            HEIGHT_1U * self.size_in_u
        }
    }

    /// Width of the rail area on each side of the panel. Drawing on it is
    /// either hidden behind the rack rails or, for note players, discarded.
    pub fn rail_width(self, panel: Panel) -> u32 {
        match panel {
            Panel::Front => match self.device_type {
                DeviceType::NotePlayer => NOTE_PLAYER_FRONT_RAIL,
                _ => 0,
            },
            Panel::Back => match self.device_type {
                DeviceType::NotePlayer => NOTE_PLAYER_BACK_RAIL,
                _ => BACK_RAIL,
            },
            // note players are never folded
            Panel::FoldedBack => BACK_RAIL,
            Panel::FoldedFront => 0,
        }
    }

    /// Top-left corner where it is safe to draw, accounting for the empty
    /// margin and the panel's rail
    pub fn safe_top_left(self, panel: Panel) -> (i32, i32) {
        (EMPTY_MARGIN + self.rail_width(panel) as i32, EMPTY_MARGIN)
    }
}

/// The image key of a panel background, used in the placement and binding
/// artifacts and as the raster file stem
pub fn panel_image_key(panel: Panel) -> String {
    format!("Panel_{}", panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceInfo;

    fn geometry(device_type: DeviceType, size_in_u: u32) -> Geometry {
        Geometry::of(&DeviceInfo {
            long_name: "T".into(),
            medium_name: "T".into(),
            short_name: "T".into(),
            manufacturer: "acme".into(),
            product_id: "com.acme.T".into(),
            version: "1.0.0".into(),
            device_type,
            size_in_u,
        })
    }

    #[test]
    fn test_height_scales_with_units_unless_folded() {
        let g = geometry(DeviceType::StudioFx, 3);
        assert_eq!(g.height(Panel::Front), 3 * HEIGHT_1U);
        assert_eq!(g.height(Panel::Back), 3 * HEIGHT_1U);
        assert_eq!(g.height(Panel::FoldedFront), FOLDED_HEIGHT);
        assert_eq!(g.height(Panel::FoldedBack), FOLDED_HEIGHT);
    }

    #[test]
    fn test_rail_widths() {
        let fx = geometry(DeviceType::StudioFx, 1);
        assert_eq!(fx.rail_width(Panel::Front), 0);
        assert_eq!(fx.rail_width(Panel::Back), BACK_RAIL);
        assert_eq!(fx.rail_width(Panel::FoldedBack), BACK_RAIL);

        let player = geometry(DeviceType::NotePlayer, 1);
        assert_eq!(player.rail_width(Panel::Front), NOTE_PLAYER_FRONT_RAIL);
        assert_eq!(player.rail_width(Panel::Back), NOTE_PLAYER_BACK_RAIL);
    }

    #[test]
    fn test_safe_top_left_accounts_for_rail() {
        let g = geometry(DeviceType::StudioFx, 1);
        assert_eq!(g.safe_top_left(Panel::Front), (EMPTY_MARGIN, EMPTY_MARGIN));
        assert_eq!(
            g.safe_top_left(Panel::Back),
            (EMPTY_MARGIN + BACK_RAIL as i32, EMPTY_MARGIN)
        );
    }

    #[test]
    fn test_panel_image_key() {
        assert_eq!(panel_image_key(Panel::FoldedBack), "Panel_folded_back");
    }
}
