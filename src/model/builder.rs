//! Device construction
//!
//! Turns the flat form map into a fully-populated device: info fields with
//! documented fallbacks, then the type-driven default topology (sockets,
//! routing) plus the built-in device-name plate and placeholder.

use std::collections::HashMap;

use log::info;

use crate::assets::AssetStore;
use crate::error::Result;
use crate::model::{
    AudioStereoPair, BuiltInKind, BuiltInProperty, Device, DeviceInfo, DeviceType, PairPaths,
    Panel, Property, RoutingRule, SocketDirection,
};
use crate::model::property::AudioSocket;
use crate::render::geometry::{Geometry, EMPTY_MARGIN};

/// Spacing between a socket and the panel center line, and between the plate
/// and the safe corner
const PLACEMENT_MARGIN: i32 = 10;

impl DeviceInfo {
    /// Builds the info from the form map. Missing fields fall back to the
    /// blank-plugin defaults; a missing `device_type` means `studio_fx`, but
    /// a present-and-unknown one is an error (a silently wrong type would
    /// change the socket topology). Height falls back to 1 for missing,
    /// unparsable or non-positive input.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let field = |key: &str, default: &str| {
            params
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let device_type = match params.get("device_type") {
            Some(raw) => raw.parse::<DeviceType>()?,
            None => DeviceType::StudioFx,
        };

        let size_in_u = params
            .get("device_height_ru")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|&units| units > 0)
            .unwrap_or(1);

        Ok(Self {
            long_name: field("long_name", "Blank Plugin"),
            medium_name: field("medium_name", "Blank Plugin"),
            short_name: field("short_name", "Blank"),
            manufacturer: field("manufacturer", "acme"),
            product_id: field("product_id", "com.acme.Blank"),
            version: field("version", "1.0.0d1"),
            device_type,
            size_in_u,
        })
    }
}

/// Builds devices against one asset store (socket, tape and placeholder
/// placements need the built-in image dimensions)
pub struct DeviceBuilder<'a> {
    store: &'a AssetStore,
}

impl<'a> DeviceBuilder<'a> {
    pub fn new(store: &'a AssetStore) -> Self {
        Self { store }
    }

    /// Builds the device from the raw form map
    pub fn build(&self, params: &HashMap<String, String>) -> Result<Device> {
        self.build_from_info(DeviceInfo::from_params(params)?)
    }

    /// Builds the device from already-resolved info
    pub fn build_from_info(&self, info: DeviceInfo) -> Result<Device> {
        let mut device = Device::new(info);
        let geometry = Geometry::of(&device.info);

        self.add_device_name(&mut device, geometry);
        self.add_placeholder(&mut device, geometry);

        let socket = self.store.audio_socket_image();
        let (sw, sh) = (socket.width() as i32, socket.height() as i32);
        let key = socket.key.as_str();

        let cx = geometry.width() as i32 / 2;
        let cy = geometry.height(Panel::Back) as i32 / 2;
        let m = PLACEMENT_MARGIN;

        match device.info.device_type {
            // Effect: stereo in / stereo out around the back panel center
            DeviceType::StudioFx | DeviceType::CreativeFx => {
                let input = AudioStereoPair::new(
                    AudioSocket::new(
                        "MainInLeft",
                        SocketDirection::Input,
                        (cx - m - sw, cy - m - sh),
                        key,
                    ),
                    AudioSocket::new("MainInRight", SocketDirection::Input, (cx + m, cy - m - sh), key),
                )?;
                let output = AudioStereoPair::new(
                    AudioSocket::new(
                        "MainOutLeft",
                        SocketDirection::Output,
                        (cx - m - sw, cy + m),
                        key,
                    ),
                    AudioSocket::new("MainOutRight", SocketDirection::Output, (cx + m, cy + m), key),
                )?;

                let rules = [
                    RoutingRule::effect_hint(&input, &output),
                    RoutingRule::target(&input),
                    RoutingRule::target(&output),
                    RoutingRule::AutoBypass {
                        input: PairPaths::of(&input),
                        output: PairPaths::of(&output),
                    },
                ];
                // pairs first so their implicit stereo-pair rules lead the list
                device.add_property(Property::StereoPair(input));
                device.add_property(Property::StereoPair(output));
                for rule in rules {
                    device.add_routing(rule);
                }
            }

            // Instrument: stereo out only, re-centered for the missing input row
            DeviceType::Instrument => {
                let output = AudioStereoPair::new(
                    AudioSocket::new(
                        "MainOutLeft",
                        SocketDirection::Output,
                        (cx - m - sw, cy + m - sh / 2),
                        key,
                    ),
                    AudioSocket::new(
                        "MainOutRight",
                        SocketDirection::Output,
                        (cx + m, cy + m - sh / 2),
                        key,
                    ),
                )?;

                let rules = [
                    RoutingRule::InstrumentHint {
                        output: PairPaths::of(&output),
                    },
                    RoutingRule::target(&output),
                ];
                device.add_property(Property::StereoPair(output));
                for rule in rules {
                    device.add_routing(rule);
                }
            }

            // Helper / note player: no sockets, no routing
            DeviceType::Helper | DeviceType::NotePlayer => {}
        }

        info!(
            "Built {} device '{}': {} properties, {} routing rules",
            device.info.device_type,
            device.info.long_name,
            device.properties().len(),
            device.routing().len()
        );
        Ok(device)
    }

    /// The device-name tape, top-left safe corner of every available panel
    fn add_device_name(&self, device: &mut Device, geometry: Geometry) {
        let tape = self.store.tape_image();
        let mut prop = BuiltInProperty::new("DeviceName");
        for &panel in device.available_panels() {
            let (x, y) = geometry.safe_top_left(panel);
            prop.add_widget(
                panel,
                BuiltInKind::DeviceName,
                (x + PLACEMENT_MARGIN, y + PLACEMENT_MARGIN),
                &tape.key,
            );
        }
        device.add_property(Property::BuiltIn(prop));
    }

    /// The placeholder, bottom-right safe corner of the back panel
    fn add_placeholder(&self, device: &mut Device, geometry: Geometry) {
        let img = self.store.placeholder_image();
        let mut prop = BuiltInProperty::new("Placeholder");
        prop.add_widget(
            Panel::Back,
            BuiltInKind::Placeholder,
            (
                geometry.width() as i32 - img.width() as i32 - EMPTY_MARGIN,
                geometry.height(Panel::Back) as i32 - img.height() as i32 - EMPTY_MARGIN,
            ),
            &img.key,
        );
        device.add_property(Property::BuiltIn(prop));
    }
}
