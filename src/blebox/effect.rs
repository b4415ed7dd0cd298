use serde::{Deserialize, Serialize};

/// Lighting animations built into the wLightBox firmware.
///
/// The discriminant is the `effectID` the device uses on the wire, so the
/// order of the variants must match the firmware table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Effect {
    #[default]
    #[serde(rename = "BRAK")]
    None = 0,
    #[serde(rename = "ŚCIEMNIANIE")]
    Fade = 1,
    #[serde(rename = "RGB")]
    Rgb = 2,
    #[serde(rename = "POLICJA")]
    Police = 3,
    #[serde(rename = "RELAKS")]
    Relax = 4,
    #[serde(rename = "STROBOSKOP")]
    Strobe = 5,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::None,
        Effect::Fade,
        Effect::Rgb,
        Effect::Police,
        Effect::Relax,
        Effect::Strobe,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::None => "BRAK",
            Effect::Fade => "ŚCIEMNIANIE",
            Effect::Rgb => "RGB",
            Effect::Police => "POLICJA",
            Effect::Relax => "RELAKS",
            Effect::Strobe => "STROBOSKOP",
        }
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|e| e.name().to_string()).collect()
    }
}
