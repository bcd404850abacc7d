//! Device model
//!
//! The entity graph describing one rack device: its identifying `DeviceInfo`,
//! an ordered collection of properties (audio sockets, stereo pairs,
//! built-ins) and an ordered collection of auto-routing rules. The model is
//! built once per request and never mutated afterwards; renderers and the
//! token engine only read it.

pub mod builder;
pub mod property;
pub mod routing;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RackError, Result};
pub use builder::DeviceBuilder;
pub use property::{
    AudioStereoPair, BuiltInKind, BuiltInProperty, Property, SocketDirection, Widget, WidgetKind,
};
pub use routing::{EffectRoutingKind, PairPaths, RoutingRule, SignalType};

/// One of the physical faces of the device. Note players only have the two
/// unfolded panels; every other device type has all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Front,
    Back,
    FoldedFront,
    FoldedBack,
}

impl Panel {
    pub const ALL: [Panel; 4] = [
        Panel::Front,
        Panel::Back,
        Panel::FoldedFront,
        Panel::FoldedBack,
    ];

    pub fn is_front(self) -> bool {
        matches!(self, Panel::Front | Panel::FoldedFront)
    }

    pub fn is_folded(self) -> bool {
        matches!(self, Panel::FoldedFront | Panel::FoldedBack)
    }
}

impl fmt::Display for Panel {
    /// Lower-snake name, as used in token keys and generated lua
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Panel::Front => "front",
            Panel::Back => "back",
            Panel::FoldedFront => "folded_front",
            Panel::FoldedBack => "folded_back",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Panel {
    type Err = RackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "front" => Ok(Panel::Front),
            "back" => Ok(Panel::Back),
            "folded_front" => Ok(Panel::FoldedFront),
            "folded_back" => Ok(Panel::FoldedBack),
            other => Err(RackError::Configuration {
                reason: format!("unknown panel '{}'", other),
            }),
        }
    }
}

/// The type of the device. Determines the default socket topology and which
/// geometry constants (rail widths, available panels) apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Instrument,
    CreativeFx,
    StudioFx,
    Helper,
    NotePlayer,
}

impl DeviceType {
    /// Class name of the device tester in the generated C++ test file
    pub fn tester_class(self) -> &'static str {
        match self {
            DeviceType::Instrument => "InstrumentTester",
            DeviceType::CreativeFx => "CreativeEffectTester",
            DeviceType::StudioFx => "StudioEffectTester",
            DeviceType::Helper => "HelperTester",
            DeviceType::NotePlayer => "NotePlayerTester",
        }
    }

    /// Section of the host browser the device appears under
    pub fn browser_section(self) -> &'static str {
        match self {
            DeviceType::Instrument => "Instruments",
            DeviceType::CreativeFx | DeviceType::StudioFx => "Effects",
            DeviceType::Helper => "Utilities",
            DeviceType::NotePlayer => "Players",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::Instrument => "instrument",
            DeviceType::CreativeFx => "creative_fx",
            DeviceType::StudioFx => "studio_fx",
            DeviceType::Helper => "helper",
            DeviceType::NotePlayer => "note_player",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DeviceType {
    type Err = RackError;

    /// A present-but-unknown type string is a loud error: silently coercing
    /// it would change the socket topology behind the user's back.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "instrument" => Ok(DeviceType::Instrument),
            "creative_fx" => Ok(DeviceType::CreativeFx),
            "studio_fx" => Ok(DeviceType::StudioFx),
            "helper" => Ok(DeviceType::Helper),
            "note_player" => Ok(DeviceType::NotePlayer),
            other => Err(RackError::Configuration {
                reason: format!("unknown device_type '{}'", other),
            }),
        }
    }
}

/// Everything identifying the device. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub long_name: String,
    pub medium_name: String,
    pub short_name: String,
    pub manufacturer: String,
    pub product_id: String,
    pub version: String,
    pub device_type: DeviceType,
    /// Height in rack units (positive)
    pub size_in_u: u32,
}

impl DeviceInfo {
    /// The last `.`-segment of the product id, used as the cmake project name
    pub fn project_name(&self) -> &str {
        self.product_id.rsplit('.').next().unwrap_or("Blank")
    }
}

/// The device aggregate: info plus append-only, ordered property and routing
/// collections. Registration order is significant - it is the render order
/// and the emission order of every generated artifact.
#[derive(Debug)]
pub struct Device {
    pub info: DeviceInfo,
    properties: Vec<Property>,
    routing: Vec<RoutingRule>,
}

impl Device {
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            properties: Vec::new(),
            routing: Vec::new(),
        }
    }

    /// Panels available for this device. Note players have no folded panels.
    pub fn available_panels(&self) -> &'static [Panel] {
        match self.info.device_type {
            DeviceType::NotePlayer => &[Panel::Front, Panel::Back],
            _ => &Panel::ALL,
        }
    }

    /// Adds a property. A stereo pair implicitly registers its
    /// `StereoPair` routing rule - the host wires both cables when one is
    /// connected, so a pair without the rule is an invalid model.
    pub fn add_property(&mut self, prop: Property) {
        if let Property::StereoPair(pair) = &prop {
            self.routing.push(RoutingRule::StereoPair {
                pair: PairPaths::of(pair),
            });
        }
        self.properties.push(prop);
    }

    pub fn add_routing(&mut self, rule: RoutingRule) {
        self.routing.push(rule);
    }

    /// Properties in registration order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Routing rules in registration order
    pub fn routing(&self) -> &[RoutingRule] {
        &self.routing
    }

    /// All unique image keys referenced by property widgets, in
    /// first-reference order (a shared asset like the tape is listed once)
    pub fn property_image_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for prop in &self.properties {
            for widget in prop.widgets() {
                if !keys.contains(&widget.image_key.as_str()) {
                    keys.push(&widget.image_key);
                }
            }
        }
        keys
    }
}
