use log::warn;
use serde::{Deserialize, Serialize};

use super::{
    color::{HsColor, RgbwColor},
    device::{Capabilities, TurnOn},
    effect::Effect,
    error::DeviceError,
    rest::rgbw::{get_light_state, set_rgbw, RgbwData},
};
use crate::protocols::http::{DeviceEndpoint, HttpClient};

pub const DEFAULT_NAME: &str = "Blebox wLightBox";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Rgbw,
    Rgb,
    Mono,
}

impl TryFrom<u8> for ColorMode {
    type Error = DeviceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ColorMode::Rgbw),
            2 => Ok(ColorMode::Rgb),
            3 => Ok(ColorMode::Mono),
            other => Err(DeviceError::unexpected(format!(
                "unsupported color mode {other}"
            ))),
        }
    }
}

impl ColorMode {
    pub fn capabilities(self) -> Capabilities {
        match self {
            ColorMode::Mono => Capabilities {
                brightness: true,
                ..Default::default()
            },
            ColorMode::Rgb => Capabilities {
                brightness: true,
                color: true,
                effect: true,
                white: false,
            },
            ColorMode::Rgbw => Capabilities {
                brightness: true,
                color: true,
                effect: true,
                white: true,
            },
        }
    }

    /// Forces the channels this mode does not drive.
    fn constrain(self, state: &mut RgbwState) {
        match self {
            ColorMode::Rgbw => {}
            ColorMode::Rgb => state.white = 0,
            ColorMode::Mono => {
                state.white = state.brightness;
                state.hs_color = HsColor::default();
            }
        }
    }
}

/// Light state as last reported by the device. The color fields are kept
/// while the light is off so that turning it on restores them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbwState {
    pub is_on: bool,
    pub hs_color: HsColor,
    pub brightness: u8,
    pub white: u8,
    pub effect: Effect,
}

impl Default for RgbwState {
    fn default() -> Self {
        Self {
            is_on: false,
            hs_color: HsColor::default(),
            brightness: 255,
            white: 0,
            effect: Effect::None,
        }
    }
}

pub struct WLightBox {
    client: HttpClient,
    endpoint: DeviceEndpoint,
    name: Option<String>,
    color_mode: Option<ColorMode>,
    state: RgbwState,
    available: bool,
}

impl WLightBox {
    pub fn new(client: HttpClient, endpoint: DeviceEndpoint, name: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            name,
            color_mode: None,
            state: RgbwState::default(),
            available: false,
        }
    }

    pub async fn initialize(&mut self) -> Result<RgbwState, DeviceError> {
        let result = get_light_state(&self.client, &self.endpoint).await;

        if self.name.is_none() {
            if let Ok(response) = &result {
                self.name = Some(response.device.device_name.clone());
            }
        }

        self.apply(result.map(|response| response.rgbw))
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn state(&self) -> RgbwState {
        self.state
    }

    /// The mode read on the first successful poll; RGBW until then.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode.unwrap_or_default()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.color_mode().capabilities()
    }

    pub async fn update(&mut self) -> Result<RgbwState, DeviceError> {
        let result = get_light_state(&self.client, &self.endpoint).await;
        self.apply(result.map(|response| response.rgbw))
    }

    /// Merges the supplied fields over the cached state, applies the color
    /// mode constraints and sends the result.
    pub async fn turn_on(&mut self, command: TurnOn) -> Result<RgbwState, DeviceError> {
        let mut desired = self.state;

        if let Some(hs_color) = command.hs_color {
            desired.hs_color = hs_color;
        }
        if let Some(brightness) = command.brightness {
            desired.brightness = brightness;
        }
        if let Some(white) = command.white {
            desired.white = white;
        }
        if let Some(effect) = command.effect {
            desired.effect = effect;
        }

        self.color_mode().constrain(&mut desired);
        self.state = desired;

        let color = RgbwColor::from_hsb(desired.hs_color, desired.brightness, desired.white);
        let result = set_rgbw(
            &self.client,
            &self.endpoint,
            &color.to_string(),
            desired.effect.id(),
        )
        .await;

        self.apply(result)
    }

    /// Sends the all-zero color. The cached effect is left untouched.
    pub async fn turn_off(&mut self) -> Result<RgbwState, DeviceError> {
        let result = set_rgbw(
            &self.client,
            &self.endpoint,
            &RgbwColor::OFF.to_string(),
            Effect::None.id(),
        )
        .await;

        self.apply(result)
    }

    fn apply(&mut self, result: Result<RgbwData, DeviceError>) -> Result<RgbwState, DeviceError> {
        match result.and_then(|data| self.read(&data)) {
            Ok(state) => {
                self.available = true;
                self.state = state;
                Ok(state)
            }
            Err(e) => {
                self.available = false;
                self.state.is_on = false;
                Err(e)
            }
        }
    }

    fn read(&mut self, data: &RgbwData) -> Result<RgbwState, DeviceError> {
        let color_mode = ColorMode::try_from(data.color_mode)?;
        match self.color_mode {
            None => self.color_mode = Some(color_mode),
            Some(known) if known != color_mode => warn!(
                "{}: device reports color mode {:?}, keeping {:?}",
                self.endpoint.host(),
                color_mode,
                known
            ),
            Some(_) => {}
        }

        let color: RgbwColor = data
            .desired_color
            .parse()
            .map_err(DeviceError::UnexpectedResponse)?;

        if color.is_off() {
            return Ok(RgbwState {
                is_on: false,
                ..self.state
            });
        }

        let effect = Effect::from_id(data.effect_id).ok_or_else(|| {
            DeviceError::unexpected(format!("unknown effect id {}", data.effect_id))
        })?;
        let (hs_color, brightness) = color.hsb();

        Ok(RgbwState {
            is_on: true,
            hs_color,
            brightness,
            white: color.white,
            effect,
        })
    }
}
