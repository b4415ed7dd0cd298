use std::{collections::HashSet, time::Duration};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;

use crate::protocols::http::{DeviceEndpoint, DEFAULT_TIMEOUT};

#[derive(Clone, Copy, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    DimmerBox,
    WLightBox,
    SwitchBox,
}

#[derive(Clone, Deserialize, Debug)]
pub struct DeviceSettings {
    pub platform: Platform,
    pub host: String,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Relay index on a switchBoxD.
    #[serde(default)]
    pub relay: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Skips probing the device when set, e.g. `switchBoxD`.
    #[serde(rename = "type")]
    pub device_type: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl DeviceSettings {
    /// Id used in MQTT topics. Derived from the host (and relay) unless set.
    pub fn id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }

        let host = self.host.replace(['.', ':'], "_");
        match (self.platform, self.relay) {
            (Platform::SwitchBox, relay) if relay > 0 => format!("{host}_relay{relay}"),
            _ => host,
        }
    }

    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.host.clone(), Duration::from_secs(self.timeout))
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct MqttSettings {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub state_topic: String,
    pub set_topic: String,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Settings {
    pub mqtt: MqttSettings,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default)]
    pub devices: Vec<DeviceSettings>,
}

fn default_poll_interval() -> u64 {
    30
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.poll_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "poll_interval_seconds must be positive".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for device in &self.devices {
            if device.timeout == 0 {
                return Err(ConfigError::Message(format!(
                    "device {}: timeout must be positive",
                    device.host
                )));
            }

            if !ids.insert(device.id()) {
                return Err(ConfigError::Message(format!(
                    "duplicate device id {}",
                    device.id()
                )));
            }
        }

        Ok(self)
    }
}

fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    builder.build()?.try_deserialize::<Settings>()?.validate()
}

pub fn read_settings() -> Result<Settings, ConfigError> {
    build_settings(config::Config::builder().add_source(config::File::with_name("Settings")))
}
