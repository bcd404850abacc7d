//! CLI Module
//!
//! Command-line interface for the rackgen pipeline.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rackgen - declarative rack-device generator
#[derive(Parser, Debug)]
#[command(name = "rackgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the plugin archive from a device description
    #[command(name = "generate")]
    Generate {
        /// Template bundle: a zip file or an unpacked directory
        #[arg(short, long)]
        bundle: PathBuf,

        /// Device description: a flat JSON object of form fields
        #[arg(short, long)]
        device: PathBuf,

        /// Directory the archive is written into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Render composited panel previews as PNG files
    #[command(name = "preview")]
    Preview {
        /// Template bundle: a zip file or an unpacked directory
        #[arg(short, long)]
        bundle: PathBuf,

        /// Device description: a flat JSON object of form fields
        #[arg(short, long)]
        device: PathBuf,

        /// Directory the previews are written into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Render a single panel (front, back, folded_front, folded_back)
        /// instead of all available ones
        #[arg(short, long)]
        panel: Option<String>,
    },
}
