//! Token engine
//!
//! Walks the device model once and builds a flat token table; static template
//! text is processed by literal, single-pass substitution of `[-key-]`
//! placeholders. Setting a token twice keeps the first value, and spliced-in
//! text is never rescanned, so substitution cannot cascade.

use std::collections::HashMap;

use crate::model::{Device, DeviceType};
use crate::render::geometry::panel_image_key;

/// Flat token name -> substitution text mapping
#[derive(Debug, Default)]
pub struct TokenTable {
    entries: HashMap<String, String>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// First definition wins; a later `set` for the same key is a no-op
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.entry(key.to_string()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces every known `[-key-]` occurrence in one left-to-right pass.
    /// Unknown tokens stay verbatim; an unterminated opener is copied
    /// literally to the end.
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("[-") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("-]") {
                Some(end) => {
                    let key = &after[..end];
                    match self.entries.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("[-");
                            out.push_str(key);
                            out.push_str("-]");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn join_non_empty(fragments: impl Iterator<Item = String>, separator: &str) -> String {
    fragments
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Builds the complete token table for a device. Pure: the same model always
/// produces the same table.
pub fn generate_tokens(device: &Device) -> TokenTable {
    let mut tokens = TokenTable::new();
    let info = &device.info;

    tokens.set("re_sdk_version", "4.3.0");

    // CMakeLists.txt
    tokens.set("cmake_project_name", info.project_name());
    tokens.set("cmake_re_cpp_src_dir", "\"${RE_PROJECT_ROOT_DIR}/src/cpp\"");
    tokens.set(
        "cmake_re_sources_cpp",
        [
            "${RE_CPP_SRC_DIR}/Device.h",
            "${RE_CPP_SRC_DIR}/Device.cpp",
            "${RE_CPP_SRC_DIR}/JukeboxExports.cpp",
        ]
        .iter()
        .map(|src| format!("    \"{}\"", src))
        .collect::<Vec<_>>()
        .join("\n"),
    );

    let image_keys = device
        .available_panels()
        .iter()
        .map(|&panel| panel_image_key(panel))
        .chain(device.property_image_keys().into_iter().map(String::from));
    tokens.set(
        "cmake_re_sources_2d",
        image_keys
            .map(|key| format!("    \"${{RE_2D_SRC_DIR}}/{}.png\"", key))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    // options.cmake
    tokens.set("options_re_mock_support_for_audio_file", "OFF");
    tokens.set("options_extras", "");

    // info.lua
    tokens.set("info-long_name", &info.long_name);
    tokens.set("info-medium_name", &info.medium_name);
    tokens.set("info-short_name", &info.short_name);
    tokens.set("info-product_id", &info.product_id);
    tokens.set("info-manufacturer", &info.manufacturer);
    tokens.set("info-version_number", &info.version);
    tokens.set("info-device_type", info.device_type.to_string());
    let accepts_notes = (info.device_type == DeviceType::Instrument).to_string();
    tokens.set("info-accepts_notes", &accepts_notes);
    tokens.set("info-auto_create_track", &accepts_notes);
    tokens.set("info-auto_create_note_lane", &accepts_notes);
    tokens.set("info-device_height_ru", info.size_in_u.to_string());

    // motherboard_def.lua
    tokens.set(
        "motherboard_def-properties",
        join_non_empty(device.properties().iter().map(|p| p.motherboard()), "\n\n"),
    );
    tokens.set(
        "motherboard_def-auto_routing",
        join_non_empty(device.routing().iter().map(|r| r.motherboard()), "\n\n"),
    );

    // realtime_controller.lua
    tokens.set(
        "realtime_controller-rt_input_setup",
        device
            .properties()
            .iter()
            .flat_map(|p| p.rt_input_setup())
            .map(|path| format!("    \"{}\"", path))
            .collect::<Vec<_>>()
            .join(",\n"),
    );

    // Resources/English/texts.lua
    tokens.set(
        "texts-text_resources",
        device
            .properties()
            .iter()
            .flat_map(|p| p.text_resources())
            .map(|(key, value)| format!("    [\"{}\"] = \"{}\"", key, value))
            .collect::<Vec<_>>()
            .join(",\n"),
    );

    // per-panel placement and binding blocks; every available panel gets its
    // tokens even when no property touches it, so empty layout files still
    // parse on the SDK side
    for &panel in device.available_panels() {
        tokens.set(&format!("device2D-{}_bg", panel), panel_image_key(panel));
        tokens.set(
            &format!("device2D-{}", panel),
            join_non_empty(device.properties().iter().map(|p| p.device2d(panel)), "\n"),
        );
        tokens.set(
            &format!("hdgui2D-{}_widgets", panel),
            join_non_empty(device.properties().iter().map(|p| p.hdgui2d(panel)), "\n\n"),
        );
    }

    // C++ test skeleton
    tokens.set("test_class_name", "Device");
    tokens.set("test_includes", "#include <Device.h>");
    tokens.set("tester_device_type", info.device_type.tester_class());

    // README.md
    tokens.set("generator-version", env!("CARGO_PKG_VERSION"));
    tokens.set("reason-browser-section", info.device_type.browser_section());

    tokens
}
