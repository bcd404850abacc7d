//! Pipeline Tests
//!
//! End-to-end archive generation against a synthesized template bundle:
//! content, metadata propagation, override precedence and reproducibility.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use pretty_assertions::assert_eq;
use rackgen::archive::{build_file_tree, generate_archive};
use rackgen::assets::{AssetStore, AUDIO_SOCKET_IMAGE, PLACEHOLDER_IMAGE, TAPE_HORIZONTAL_IMAGE};
use rackgen::model::DeviceBuilder;
use zip::write::FileOptions;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 60, 30, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    bytes
}

const INFO_LUA: &str = r#"format_version = "1.0"
long_name = "[-info-long_name-]"
product_id = "[-info-product_id-]"
manufacturer = "[-info-manufacturer-]"
version_number = "[-info-version_number-]"
device_type = "[-info-device_type-]"
accepts_notes = [-info-accepts_notes-]
device_height_ru = [-info-device_height_ru-]
"#;

const MOTHERBOARD_LUA: &str = r#"format_version = "3.0"

[-motherboard_def-properties-]

-- auto routing
[-motherboard_def-auto_routing-]
"#;

const DEVICE_2D_LUA: &str = r#"format_version = "2.0"

front = {}
back = {}

front["[-device2D-front_bg-]"] = { { path = "[-device2D-front_bg-]" } }
[-device2D-front-]

back["[-device2D-back_bg-]"] = { { path = "[-device2D-back_bg-]" } }
[-device2D-back-]
"#;

const HDGUI_2D_LUA: &str = r#"format_version = "2.0"

front_widgets = {}
[-hdgui2D-front_widgets-]

back_widgets = {}
[-hdgui2D-back_widgets-]
"#;

const TEXTS_LUA: &str = r#"texts = {
[-texts-text_resources-]
}
"#;

/// A bundle with the built-in images, the common skeleton and one
/// type-specific override. `info.lua` carries a known mtime so metadata
/// propagation is observable.
fn test_bundle() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let plain = FileOptions::default();

    for path in [AUDIO_SOCKET_IMAGE, PLACEHOLDER_IMAGE, TAPE_HORIZONTAL_IMAGE] {
        writer.start_file(path, plain).unwrap();
        writer.write_all(&png_bytes(90, 90)).unwrap();
    }

    let stamped = FileOptions::default()
        .last_modified_time(zip::DateTime::from_date_and_time(2021, 6, 1, 12, 0, 0).unwrap())
        .unix_permissions(0o644);
    writer
        .start_file("skeletons/common/info.lua", stamped)
        .unwrap();
    writer.write_all(INFO_LUA.as_bytes()).unwrap();

    let texts = [
        ("skeletons/common/motherboard_def.lua", MOTHERBOARD_LUA),
        ("skeletons/common/GUI2D/device_2D.lua", DEVICE_2D_LUA),
        ("skeletons/common/GUI2D/hdgui_2D.lua", HDGUI_2D_LUA),
        ("skeletons/common/Resources/English/texts.lua", TEXTS_LUA),
        ("skeletons/common/README.md", "common readme\n"),
        ("skeletons/studio_fx/README.md", "studio_fx readme\n"),
    ];
    for (path, content) in texts {
        writer.start_file(path, plain).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

fn acme_params() -> HashMap<String, String> {
    let mut params = HashMap::new();
    params.insert("long_name".to_string(), "Acme Comp".to_string());
    params.insert("medium_name".to_string(), "Acme Comp".to_string());
    params.insert("short_name".to_string(), "Comp".to_string());
    params.insert("manufacturer".to_string(), "Acme".to_string());
    params.insert("product_id".to_string(), "com.acme.comp".to_string());
    params.insert("version".to_string(), "1.0.0".to_string());
    params.insert("device_type".to_string(), "studio_fx".to_string());
    params.insert("device_height_ru".to_string(), "1".to_string());
    params
}

fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    archive.file_names().map(String::from).collect()
}

#[tokio::test]
async fn test_acme_comp_end_to_end() {
    let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();
    let device = DeviceBuilder::new(&store).build(&acme_params()).unwrap();
    let archive = generate_archive(&device, &store).await.unwrap();

    assert_eq!(archive.filename, "com.acme.comp-plugin.zip");

    let names = entry_names(&archive.bytes);
    let root = "com.acme.comp-plugin";
    for required in [
        "info.lua",
        "motherboard_def.lua",
        "GUI2D/device_2D.lua",
        "GUI2D/hdgui_2D.lua",
        "Resources/English/texts.lua",
        "GUI2D/Panel_front.png",
        "GUI2D/Panel_back.png",
        "GUI2D/Panel_folded_front.png",
        "GUI2D/Panel_folded_back.png",
        "GUI2D/Cable_Attachment_Audio_01_1frames.png",
        "GUI2D/Tape_Horizontal_1frames.png",
        "GUI2D/Placeholder.png",
    ] {
        let full = format!("{}/{}", root, required);
        assert!(names.contains(&full), "archive missing {}", full);
    }

    let info = read_entry(&archive.bytes, &format!("{}/info.lua", root));
    assert!(info.contains("long_name = \"Acme Comp\""));
    assert!(info.contains("product_id = \"com.acme.comp\""));
    assert!(info.contains("accepts_notes = false"));

    let motherboard = read_entry(&archive.bytes, &format!("{}/motherboard_def.lua", root));
    assert!(motherboard.contains("audio_inputs[\"MainInLeft\"]"));
    assert!(motherboard.contains("audio_outputs[\"MainOutRight\"]"));
    assert!(motherboard.contains("jbox.add_stereo_audio_routing_pair"));

    let device_2d = read_entry(&archive.bytes, &format!("{}/GUI2D/device_2D.lua", root));
    assert!(device_2d.contains("back[\"MainInLeft\"]"));
    assert!(device_2d.contains("back[\"Panel_back\"]"));

    let hdgui = read_entry(&archive.bytes, &format!("{}/GUI2D/hdgui_2D.lua", root));
    assert!(hdgui.contains("jbox.audio_input_socket"));
    assert!(hdgui.contains("socket = \"/audio_inputs/MainInLeft\""));
    assert!(hdgui.contains("jbox.device_name"));

    let texts = read_entry(&archive.bytes, &format!("{}/Resources/English/texts.lua", root));
    assert!(texts.contains("[\"MainInLeft ui_name\"] = \"TBD [MainInLeft ui_name]\""));
}

#[tokio::test]
async fn test_type_specific_skeleton_overrides_common() {
    let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();

    let device = DeviceBuilder::new(&store).build(&acme_params()).unwrap();
    let archive = generate_archive(&device, &store).await.unwrap();
    let readme = read_entry(&archive.bytes, "com.acme.comp-plugin/README.md");
    assert_eq!(readme, "studio_fx readme\n");

    // a helper has no type-specific skeleton; the common file applies
    let mut params = acme_params();
    params.insert("device_type".to_string(), "helper".to_string());
    let device = DeviceBuilder::new(&store).build(&params).unwrap();
    let archive = generate_archive(&device, &store).await.unwrap();
    let readme = read_entry(&archive.bytes, "com.acme.comp-plugin/README.md");
    assert_eq!(readme, "common readme\n");
}

#[tokio::test]
async fn test_archive_is_reproducible() {
    let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();
    let device = DeviceBuilder::new(&store).build(&acme_params()).unwrap();

    let first = generate_archive(&device, &store).await.unwrap();
    let second = generate_archive(&device, &store).await.unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[tokio::test]
async fn test_metadata_propagation_and_fallback() {
    let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();
    let device = DeviceBuilder::new(&store).build(&acme_params()).unwrap();
    let archive = generate_archive(&device, &store).await.unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();

    // info.lua carries its bundle mtime and permissions
    let info = zip.by_name("com.acme.comp-plugin/info.lua").unwrap();
    let mtime = info.last_modified();
    assert_eq!((mtime.year(), mtime.month(), mtime.day()), (2021, 6, 1));
    assert_eq!(info.unix_mode().map(|m| m & 0o777), Some(0o644));
    drop(info);

    // generated rasters have no originating resource; fixed fallback applies
    let raster = zip.by_name("com.acme.comp-plugin/GUI2D/Panel_front.png").unwrap();
    assert_eq!(raster.last_modified().year(), 2020);
}

#[tokio::test]
async fn test_helper_tree_has_no_socket_images() {
    let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();
    let mut params = acme_params();
    params.insert("device_type".to_string(), "helper".to_string());
    let device = DeviceBuilder::new(&store).build(&params).unwrap();

    let tree = build_file_tree(&device, &store).await.unwrap();
    let paths: Vec<_> = tree.iter().map(|e| e.path.as_str()).collect();

    assert!(paths.contains(&"GUI2D/Tape_Horizontal_1frames.png"));
    assert!(paths.contains(&"GUI2D/Placeholder.png"));
    assert!(!paths.contains(&"GUI2D/Cable_Attachment_Audio_01_1frames.png"));

    // rasters lead the tree, in available-panel order
    assert_eq!(paths[0], "GUI2D/Panel_front.png");
    assert_eq!(paths[1], "GUI2D/Panel_back.png");
}

#[tokio::test]
async fn test_note_player_archive_has_two_rasters() {
    let store = AssetStore::from_zip_bytes(&test_bundle()).unwrap();
    let mut params = acme_params();
    params.insert("device_type".to_string(), "note_player".to_string());
    let device = DeviceBuilder::new(&store).build(&params).unwrap();
    let archive = generate_archive(&device, &store).await.unwrap();

    let names = entry_names(&archive.bytes);
    let rasters: Vec<_> = names
        .iter()
        .filter(|n| n.contains("GUI2D/Panel_"))
        .collect();
    assert_eq!(rasters.len(), 2);
}
