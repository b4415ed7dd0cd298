use std::{fmt, str::FromStr};

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// Hue in degrees (0-360) and saturation in percent (0-100).
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct HsColor {
    pub hue: f32,
    pub saturation: f32,
}

impl HsColor {
    pub fn new(hue: f32, saturation: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation: saturation.clamp(0.0, 100.0),
        }
    }
}

/// Splits an RGB triplet into its hue/saturation and a 0-255 brightness
/// taken from the HSV value channel.
pub fn rgb_to_hsb(red: u8, green: u8, blue: u8) -> (HsColor, u8) {
    let rgb: Srgb<f32> = Srgb::new(red, green, blue).into_format();
    let hsv: Hsv = Hsv::from_color(rgb);

    let hs = HsColor::new(hsv.hue.into_positive_degrees(), hsv.saturation * 100.0);
    let brightness = (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8;

    (hs, brightness)
}

pub fn hsb_to_rgb(hs: HsColor, brightness: u8) -> (u8, u8, u8) {
    let hsv: Hsv = Hsv::new(hs.hue, hs.saturation / 100.0, brightness as f32 / 255.0);
    let rgb: Srgb<u8> = Srgb::<f32>::from_color(hsv).into_format();

    (rgb.red, rgb.green, rgb.blue)
}

/// The `RRGGBBWW` color string spoken by the wLightBox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RgbwColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl RgbwColor {
    /// `00000000`, which the device treats as off.
    pub const OFF: RgbwColor = RgbwColor {
        red: 0,
        green: 0,
        blue: 0,
        white: 0,
    };

    pub fn new(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    pub fn from_hsb(hs: HsColor, brightness: u8, white: u8) -> Self {
        let (red, green, blue) = hsb_to_rgb(hs, brightness);
        Self::new(red, green, blue, white)
    }

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }

    pub fn hsb(&self) -> (HsColor, u8) {
        rgb_to_hsb(self.red, self.green, self.blue)
    }
}

impl fmt::Display for RgbwColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.white
        )
    }
}

impl FromStr for RgbwColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("expected 8 hex digits, got {s:?}"));
        }

        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string());

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?))
    }
}
