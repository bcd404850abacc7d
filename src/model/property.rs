//! Properties and widgets
//!
//! A property is a named, addressable feature of the device. The variants are
//! closed: audio sockets, stereo pairs composed of two sockets, and the two
//! built-ins (device-name plate, placeholder). Each property knows how to
//! emit its own fragments for every generated artifact, so the token engine
//! only concatenates.
//!
//! A widget is the per-panel visual placement of a property: pixel offset,
//! image key and frame count. Its node name is the join key between the 2D
//! placement artifact (which declares the node) and the widget binding
//! artifact (which references it); both sides derive it from the same place
//! here, so they can never disagree.

use std::fmt;

use crate::error::{RackError, Result};
use crate::model::Panel;

/// An audio socket is either an input or an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketDirection {
    Input,
    Output,
}

impl fmt::Display for SocketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocketDirection::Input => "input",
            SocketDirection::Output => "output",
        };
        write!(f, "{}", name)
    }
}

/// What a widget represents, which decides the `jbox` widget call emitted in
/// the binding artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    AudioSocket(SocketDirection),
    DeviceName,
    Placeholder,
}

/// Per-panel visual placement of a property
#[derive(Debug, Clone)]
pub struct Widget {
    pub panel: Panel,
    /// Join key shared by the placement and binding artifacts
    pub node_name: String,
    pub offset: (i32, i32),
    pub image_key: String,
    /// Sprite-sheet frame count; 1 for plain images
    pub frames: u32,
    pub kind: WidgetKind,
}

impl Widget {
    /// The node declaration for the 2D placement artifact, e.g.
    /// `back["MainInLeft"] = { offset = { 100, 200 }, { path = "Cable..." } }`
    pub fn device2d(&self) -> String {
        let offset = if self.offset != (0, 0) {
            format!("offset = {{ {}, {} }}, ", self.offset.0, self.offset.1)
        } else {
            String::new()
        };
        let frames = if self.frames > 1 {
            format!(", frames={} ", self.frames)
        } else {
            String::new()
        };
        format!(
            r#"{}["{}"] = {{ {}{{ path = "{}" {}}} }}"#,
            self.panel, self.node_name, offset, self.image_key, frames
        )
    }
}

/// A mono audio socket, always placed on the back panel
#[derive(Debug, Clone)]
pub struct AudioSocket {
    pub name: String,
    pub direction: SocketDirection,
    widget: Widget,
}

impl AudioSocket {
    pub fn new(name: &str, direction: SocketDirection, offset: (i32, i32), image_key: &str) -> Self {
        Self {
            name: name.to_string(),
            direction,
            widget: Widget {
                panel: Panel::Back,
                node_name: name.to_string(),
                offset,
                image_key: image_key.to_string(),
                frames: 1,
                kind: WidgetKind::AudioSocket(direction),
            },
        }
    }

    /// The unique addressable path, e.g. `/audio_inputs/MainInLeft`
    pub fn path(&self) -> String {
        format!("/audio_{}s/{}", self.direction, self.name)
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    fn motherboard(&self) -> String {
        format!(
            "audio_{dir}s[\"{name}\"] = jbox.audio_{dir} {{\n  ui_name = jbox.ui_text(\"{name} ui_name\")\n}}",
            dir = self.direction,
            name = self.name
        )
    }

    fn hdgui2d(&self) -> String {
        format!(
            "--- {name} | audio {dir} socket\n\
             {panel}_widgets[#{panel}_widgets + 1] = jbox.audio_{dir}_socket {{\n  \
             graphics = {{\n    node = \"{node}\",\n  }},\n  socket = \"{path}\"\n}}",
            name = self.name,
            dir = self.direction,
            panel = self.widget.panel,
            node = self.widget.node_name,
            path = self.path()
        )
    }

    fn text_resources(&self) -> Vec<(String, String)> {
        vec![(
            format!("{} ui_name", self.name),
            format!("TBD [{} ui_name]", self.name),
        )]
    }
}

/// Two sockets of matching direction treated as one left/right unit. The unit
/// auto-routing rules operate on.
#[derive(Debug, Clone)]
pub struct AudioStereoPair {
    pub left: AudioSocket,
    pub right: AudioSocket,
}

impl AudioStereoPair {
    /// Both sockets must face the same direction
    pub fn new(left: AudioSocket, right: AudioSocket) -> Result<Self> {
        if left.direction != right.direction {
            return Err(RackError::Configuration {
                reason: format!(
                    "stereo pair {}/{} mixes directions {} and {}",
                    left.name, right.name, left.direction, right.direction
                ),
            });
        }
        Ok(Self { left, right })
    }
}

/// Which built-in a widget stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInKind {
    DeviceName,
    Placeholder,
}

/// The two host-provided properties. They have no motherboard declaration and
/// no text resources; they only place widgets.
#[derive(Debug, Clone)]
pub struct BuiltInProperty {
    pub name: String,
    widgets: Vec<Widget>,
}

impl BuiltInProperty {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            widgets: Vec::new(),
        }
    }

    /// Places a widget on a panel. The first widget on a given panel is named
    /// after the property; further widgets on the same panel get an
    /// incrementing `{name}_{n}` suffix. No built-in construction path places
    /// two widgets on one panel today, so the suffix is a guard, not a
    /// feature in use.
    pub fn add_widget(&mut self, panel: Panel, kind: BuiltInKind, offset: (i32, i32), image_key: &str) {
        let on_panel = self.widgets.iter().filter(|w| w.panel == panel).count();
        let node_name = if on_panel == 0 {
            self.name.clone()
        } else {
            format!("{}_{}", self.name, on_panel)
        };
        self.widgets.push(Widget {
            panel,
            node_name,
            offset,
            image_key: image_key.to_string(),
            frames: 1,
            kind: match kind {
                BuiltInKind::DeviceName => WidgetKind::DeviceName,
                BuiltInKind::Placeholder => WidgetKind::Placeholder,
            },
        });
    }

    fn hdgui2d_widget(widget: &Widget) -> String {
        let (comment, call) = match widget.kind {
            WidgetKind::DeviceName => ("-- device name / tape", "jbox.device_name"),
            WidgetKind::Placeholder => ("-- placeholder", "jbox.placeholder"),
            // add_widget only accepts the two built-in kinds
            WidgetKind::AudioSocket(_) => return String::new(),
        };
        format!(
            "{comment}\n{panel}_widgets[#{panel}_widgets + 1] = {call} {{\n  \
             graphics = {{\n    node = \"{node}\",\n  }}\n}}",
            comment = comment,
            panel = widget.panel,
            call = call,
            node = widget.node_name
        )
    }
}

/// The closed property variant set, dispatched by tag
#[derive(Debug, Clone)]
pub enum Property {
    Socket(AudioSocket),
    StereoPair(AudioStereoPair),
    BuiltIn(BuiltInProperty),
}

impl Property {
    /// Property name (unique within a device)
    pub fn name(&self) -> &str {
        match self {
            Property::Socket(s) => &s.name,
            Property::StereoPair(p) => &p.left.name,
            Property::BuiltIn(b) => &b.name,
        }
    }

    /// Declaration block for the motherboard artifact; empty for built-ins
    pub fn motherboard(&self) -> String {
        match self {
            Property::Socket(s) => s.motherboard(),
            Property::StereoPair(p) => format!(
                "{rule}\n-- stereo pair {left} / {right}\n{rule}\n{lm}\n{rm}",
                rule = "-".repeat(74),
                left = p.left.name,
                right = p.right.name,
                lm = p.left.motherboard(),
                rm = p.right.motherboard()
            ),
            Property::BuiltIn(_) => String::new(),
        }
    }

    /// Node declarations for the 2D placement artifact on the given panel;
    /// empty when the property has no widget there
    pub fn device2d(&self, panel: Panel) -> String {
        self.widgets_for(panel)
            .map(|w| w.device2d())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Widget calls for the binding artifact on the given panel
    pub fn hdgui2d(&self, panel: Panel) -> String {
        match self {
            Property::Socket(s) if panel == Panel::Back => s.hdgui2d(),
            Property::Socket(_) => String::new(),
            Property::StereoPair(p) if panel == Panel::Back => {
                format!("{}\n{}", p.left.hdgui2d(), p.right.hdgui2d())
            }
            Property::StereoPair(_) => String::new(),
            Property::BuiltIn(b) => b
                .widgets
                .iter()
                .filter(|w| w.panel == panel)
                .map(BuiltInProperty::hdgui2d_widget)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Paths the realtime controller wants change notifications for
    pub fn rt_input_setup(&self) -> Vec<String> {
        match self {
            Property::Socket(s) => vec![format!("{}/connected", s.path())],
            Property::StereoPair(p) => vec![
                format!("{}/connected", p.left.path()),
                format!("{}/connected", p.right.path()),
            ],
            Property::BuiltIn(_) => Vec::new(),
        }
    }

    /// Key/value pairs for the localization table
    pub fn text_resources(&self) -> Vec<(String, String)> {
        match self {
            Property::Socket(s) => s.text_resources(),
            Property::StereoPair(p) => {
                let mut out = p.left.text_resources();
                out.extend(p.right.text_resources());
                out
            }
            Property::BuiltIn(_) => Vec::new(),
        }
    }

    /// Every widget owned by this property, in registration order
    pub fn widgets(&self) -> Vec<&Widget> {
        match self {
            Property::Socket(s) => vec![s.widget()],
            Property::StereoPair(p) => vec![p.left.widget(), p.right.widget()],
            Property::BuiltIn(b) => b.widgets.iter().collect(),
        }
    }

    /// Widgets placed on the given panel
    pub fn widgets_for(&self, panel: Panel) -> impl Iterator<Item = &Widget> + '_ {
        self.widgets().into_iter().filter(move |w| w.panel == panel)
    }
}
