use log::warn;

use super::{
    error::DeviceError,
    rest::{
        device::get_device_info,
        dimmer::{get_dimmer_state, set_dimmer_brightness, DimmerData},
    },
};
use crate::protocols::http::{DeviceEndpoint, HttpClient};

pub const DEFAULT_NAME: &str = "Blebox dimmerBox";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimmerState {
    pub is_on: bool,
    /// Last non-zero brightness reported by the device. Kept while the
    /// dimmer is off so that turning it back on restores it.
    pub brightness: u8,
}

impl Default for DimmerState {
    fn default() -> Self {
        Self {
            is_on: false,
            brightness: 255,
        }
    }
}

pub struct DimmerBox {
    client: HttpClient,
    endpoint: DeviceEndpoint,
    name: Option<String>,
    state: DimmerState,
    available: bool,
}

impl DimmerBox {
    pub fn new(client: HttpClient, endpoint: DeviceEndpoint, name: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            name,
            state: DimmerState::default(),
            available: false,
        }
    }

    /// Resolves the display name from the device when none was configured,
    /// then fetches the current dimmer state.
    pub async fn initialize(&mut self) -> Result<DimmerState, DeviceError> {
        if self.name.is_none() {
            match get_device_info(&self.client, &self.endpoint).await {
                Ok(info) => self.name = Some(info.device_name),
                Err(e) => warn!(
                    "{}: could not read device info, using default name: {}",
                    self.endpoint.host(),
                    e
                ),
            }
        }

        self.update().await
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn state(&self) -> DimmerState {
        self.state
    }

    pub async fn update(&mut self) -> Result<DimmerState, DeviceError> {
        let result = get_dimmer_state(&self.client, &self.endpoint).await;
        self.apply(result)
    }

    /// Sends `brightness`, or the last known brightness when `None`.
    /// A brightness of 0 switches the dimmer off.
    pub async fn turn_on(&mut self, brightness: Option<u8>) -> Result<DimmerState, DeviceError> {
        let brightness = brightness.unwrap_or(self.state.brightness);
        let result = set_dimmer_brightness(&self.client, &self.endpoint, brightness).await;
        self.apply(result)
    }

    pub async fn turn_off(&mut self) -> Result<DimmerState, DeviceError> {
        let result = set_dimmer_brightness(&self.client, &self.endpoint, 0).await;
        self.apply(result)
    }

    fn apply(
        &mut self,
        result: Result<DimmerData, DeviceError>,
    ) -> Result<DimmerState, DeviceError> {
        match result {
            Ok(data) => {
                self.available = true;
                self.state = match data.desired_brightness {
                    0 => DimmerState {
                        is_on: false,
                        brightness: self.state.brightness,
                    },
                    brightness => DimmerState {
                        is_on: true,
                        brightness,
                    },
                };
                Ok(self.state)
            }
            Err(e) => {
                self.available = false;
                self.state.is_on = false;
                Err(e)
            }
        }
    }
}
