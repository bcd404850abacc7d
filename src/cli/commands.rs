//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::collections::HashMap;
use std::path::Path;

use log::info;

use crate::archive::generate_archive;
use crate::assets::AssetStore;
use crate::error::Result;
use crate::model::{Device, DeviceBuilder, Panel};
use crate::render::{geometry, PanelRenderer};

/// Loads the template bundle from either a packed zip or a directory
async fn load_store(bundle: &Path) -> Result<AssetStore> {
    if bundle.is_dir() {
        AssetStore::load_dir(bundle).await
    } else {
        AssetStore::load_zip(bundle).await
    }
}

/// Reads the flat form map from a JSON file. Unknown keys are ignored by the
/// device builder.
fn read_params(path: &Path) -> Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

async fn load_device(bundle: &Path, device_json: &Path) -> Result<(AssetStore, Device)> {
    let store = load_store(bundle).await?;
    let params = read_params(device_json)?;
    let device = DeviceBuilder::new(&store).build(&params)?;
    Ok((store, device))
}

/// Generate the plugin archive.
pub async fn generate(bundle: &Path, device_json: &Path, out: &Path) -> Result<()> {
    info!("Generating archive from {}", device_json.display());

    let (store, device) = load_device(bundle, device_json).await?;
    let archive = generate_archive(&device, &store).await?;

    tokio::fs::create_dir_all(out).await?;
    let path = out.join(&archive.filename);
    tokio::fs::write(&path, &archive.bytes).await?;

    println!("Device: {} ({})", device.info.long_name, device.info.device_type);
    println!(
        "Properties: {} | Routing rules: {}",
        device.properties().len(),
        device.routing().len()
    );
    println!("Archive written: {}", path.display());

    Ok(())
}

/// Render composited panel previews.
pub async fn preview(
    bundle: &Path,
    device_json: &Path,
    out: &Path,
    panel: Option<&str>,
) -> Result<()> {
    info!("Rendering panel previews from {}", device_json.display());

    let (store, device) = load_device(bundle, device_json).await?;
    let renderer = PanelRenderer::new(&device, &store);

    let panels: Vec<Panel> = match panel {
        Some(name) => vec![name.parse()?],
        None => device.available_panels().to_vec(),
    };

    tokio::fs::create_dir_all(out).await?;
    for panel in panels {
        let raster = renderer.render(panel)?;
        let path = out.join(format!("{}.png", geometry::panel_image_key(panel)));
        raster
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(crate::RackError::from)?;
        println!(
            "Preview written: {} ({}x{})",
            path.display(),
            raster.width(),
            raster.height()
        );
    }

    Ok(())
}
