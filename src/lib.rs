//! Rackgen - Declarative Rack-Device Generator
//!
//! Rackgen compiles a single declarative device model into a set of
//! mutually-consistent build artifacts for a rack-device plugin project:
//!
//! 1. Device model - properties (audio sockets, stereo pairs, built-ins),
//!    per-panel widgets and auto-routing rules, built from a flat form map
//! 2. Generated artifacts - motherboard definition, 2D placement, widget
//!    binding, localization table and realtime-input list, produced by a
//!    token engine walking the model once
//! 3. Panel rasters - deterministic composited images of each panel
//! 4. Archive - a reproducible zip merging everything with the static
//!    skeleton files of the template bundle
//!
//! # Architecture
//!
//! AssetStore -> device builder -> {PanelRenderer, token engine} ->
//! archive assembler. The model and the store are immutable once built;
//! every generated artifact is a pure function of the two.

pub mod archive;
pub mod assets;
pub mod cli;
pub mod error;
pub mod model;
pub mod render;
pub mod tokens;

pub use error::{RackError, Result};
