//! Typed commands produced by the control surface.
//!
//! Every DOM control maps to one `Command`; the web layer forwards
//! `(control id, value)` pairs and never touches the store directly.

use crate::core::assets::ModelId;
use crate::core::emitter::{DistanceModel, EmitterId};
use crate::core::error::ControlError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SetVolume { id: EmitterId, volume: f32 },
    /// Compact blue volume slider outside the settings panel.
    SetExternalBlueVolume(f32),
    SetReferenceDistance(f32),
    SetRolloff(f32),
    SetDistanceModel(DistanceModel),
    SetModelScale { id: ModelId, scale: f32 },
    SetVisualizers(bool),
    ToggleVisualizers,
    ToggleSettingsPanel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    Slider,
    Select,
    Checkbox,
    Button,
}

impl ControlKind {
    /// DOM event the control reports through.
    pub fn event(self) -> &'static str {
        match self {
            ControlKind::Slider => "input",
            ControlKind::Select | ControlKind::Checkbox => "change",
            ControlKind::Button => "click",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlSpec {
    pub id: &'static str,
    pub kind: ControlKind,
}

const fn spec(id: &'static str, kind: ControlKind) -> ControlSpec {
    ControlSpec { id, kind }
}

pub const CONTROLS: &[ControlSpec] = &[
    spec("red-volume", ControlKind::Slider),
    spec("blue-volume", ControlKind::Slider),
    spec("ref-distance", ControlKind::Slider),
    spec("rolloff", ControlKind::Slider),
    spec("distance-model", ControlKind::Select),
    spec("model-scale", ControlKind::Slider),
    spec("model2-scale", ControlKind::Slider),
    spec("visualizer-toggle", ControlKind::Checkbox),
    spec("external-visualizer-toggle", ControlKind::Button),
    spec("external-blue-volume", ControlKind::Slider),
    spec("toggle-settings", ControlKind::Button),
];

fn number(control: &str, value: &str) -> Result<f32, ControlError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ControlError::NotANumber {
            control: control.to_string(),
            value: value.to_string(),
        })
}

impl Command {
    /// Translate a raw control event. Checkboxes report `"true"`/`"false"`,
    /// buttons ignore `value`.
    pub fn from_input(control: &str, value: &str) -> Result<Command, ControlError> {
        let cmd = match control {
            "red-volume" => Command::SetVolume {
                id: EmitterId::Red,
                volume: number(control, value)?,
            },
            "blue-volume" => Command::SetVolume {
                id: EmitterId::Blue,
                volume: number(control, value)?,
            },
            "external-blue-volume" => Command::SetExternalBlueVolume(number(control, value)?),
            "ref-distance" => Command::SetReferenceDistance(number(control, value)?),
            "rolloff" => Command::SetRolloff(number(control, value)?),
            "distance-model" => Command::SetDistanceModel(value.parse()?),
            "model-scale" => Command::SetModelScale {
                id: ModelId::A,
                scale: number(control, value)?,
            },
            "model2-scale" => Command::SetModelScale {
                id: ModelId::B,
                scale: number(control, value)?,
            },
            "visualizer-toggle" => Command::SetVisualizers(value == "true"),
            "external-visualizer-toggle" => Command::ToggleVisualizers,
            "toggle-settings" => Command::ToggleSettingsPanel,
            other => return Err(ControlError::UnknownControl(other.to_string())),
        };
        Ok(cmd)
    }
}

/// Slider label with one decimal place.
///
/// Rounds the decimal value the slider sent (the shortest representation of
/// `v`) rather than the nearest `f32`, with exact ties away from zero, so
/// 0.15 reads "0.1" and 0.25 reads "0.3" as in the page's own formatting.
pub fn one_decimal(v: f32) -> String {
    let x: f64 = v.to_string().parse().unwrap_or(f64::from(v));
    let twentieths = x * 20.0;
    let exact_tie = x.mul_add(20.0, -twentieths) == 0.0
        && twentieths.fract() == 0.0
        && twentieths.rem_euclid(2.0) == 1.0;
    if exact_tie {
        let tenths = (x * 10.0 + 0.5f64.copysign(x)).trunc();
        format!("{:.1}", tenths / 10.0)
    } else {
        format!("{x:.1}")
    }
}

/// Slider label showing the value as parsed, without rounding.
#[inline]
pub fn verbatim(v: f32) -> String {
    v.to_string()
}
