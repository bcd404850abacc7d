//! Auto-routing rules
//!
//! Pure descriptors telling the host SDK how to wire stereo pairs together.
//! A rule only holds socket paths; it never reaches back into the model.

use std::fmt;

use crate::model::property::AudioStereoPair;

/// The left/right socket paths of one stereo pair, as referenced by rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPaths {
    pub left: String,
    pub right: String,
}

impl PairPaths {
    pub fn of(pair: &AudioStereoPair) -> Self {
        Self {
            left: pair.left.path(),
            right: pair.right.path(),
        }
    }
}

/// Hint flavor for `add_stereo_effect_routing_hint`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectRoutingKind {
    TrueStereo,
    MixingStereo,
    Spreading,
}

impl fmt::Display for EffectRoutingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectRoutingKind::TrueStereo => "true_stereo",
            EffectRoutingKind::MixingStereo => "mixing_stereo",
            EffectRoutingKind::Spreading => "spreading",
        };
        write!(f, "{}", name)
    }
}

/// Signal type for `add_stereo_audio_routing_target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    Normal,
    Send,
    Return,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalType::Normal => "normal",
            SignalType::Send => "send",
            SignalType::Return => "return",
        };
        write!(f, "{}", name)
    }
}

/// One auto-routing declaration for the motherboard artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingRule {
    /// `jbox.add_stereo_audio_routing_pair` - the host wires both cables of
    /// the pair when one is connected. Registered implicitly for every pair.
    StereoPair { pair: PairPaths },

    /// `jbox.add_stereo_effect_routing_hint`
    EffectHint {
        kind: EffectRoutingKind,
        input: PairPaths,
        output: PairPaths,
    },

    /// `jbox.set_effect_auto_bypass_routing`
    AutoBypass { input: PairPaths, output: PairPaths },

    /// `jbox.add_stereo_instrument_routing_hint`
    InstrumentHint { output: PairPaths },

    /// `jbox.add_stereo_audio_routing_target`
    Target {
        pair: PairPaths,
        signal: SignalType,
        auto_route: bool,
    },
}

impl RoutingRule {
    /// Convenience constructor with the default hint flavor
    pub fn effect_hint(input: &AudioStereoPair, output: &AudioStereoPair) -> Self {
        RoutingRule::EffectHint {
            kind: EffectRoutingKind::TrueStereo,
            input: PairPaths::of(input),
            output: PairPaths::of(output),
        }
    }

    /// Convenience constructor with the default signal type
    pub fn target(pair: &AudioStereoPair) -> Self {
        RoutingRule::Target {
            pair: PairPaths::of(pair),
            signal: SignalType::Normal,
            auto_route: true,
        }
    }

    /// The routing declaration for the motherboard artifact
    pub fn motherboard(&self) -> String {
        match self {
            RoutingRule::StereoPair { pair } => format!(
                "jbox.add_stereo_audio_routing_pair {{\n  left = \"{}\",\n  right = \"{}\",\n}}",
                pair.left, pair.right
            ),
            RoutingRule::EffectHint { kind, input, output } => format!(
                "jbox.add_stereo_effect_routing_hint {{\n  type = \"{}\",\n  \
                 left_input = \"{}\",\n  right_input = \"{}\",\n  \
                 left_output = \"{}\",\n  right_output = \"{}\"\n}}",
                kind, input.left, input.right, output.left, output.right
            ),
            RoutingRule::AutoBypass { input, output } => format!(
                "jbox.set_effect_auto_bypass_routing {{\n  {{\n    \"{}\",\n    \"{}\"\n  }},\n  \
                 {{\n    \"{}\",\n    \"{}\"\n  }}\n}}",
                input.left, output.left, input.right, output.right
            ),
            RoutingRule::InstrumentHint { output } => format!(
                "jbox.add_stereo_instrument_routing_hint {{\n  \
                 left_output = \"{}\",\n  right_output = \"{}\"\n}}",
                output.left, output.right
            ),
            RoutingRule::Target {
                pair,
                signal,
                auto_route,
            } => format!(
                "jbox.add_stereo_audio_routing_target {{\n  signal_type = \"{}\",\n  \
                 left = \"{}\",\n  right = \"{}\",\n  auto_route_enable = {}\n}}",
                signal, pair.left, pair.right, auto_route
            ),
        }
    }
}
