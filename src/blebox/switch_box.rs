use super::{
    error::DeviceError,
    rest::{
        device::get_device_info,
        relay::{get_relay, get_single_relay, set_relay, set_single_relay, RelayData},
    },
};
use crate::protocols::http::{DeviceEndpoint, HttpClient};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayState {
    pub is_on: bool,
    pub relay: usize,
    pub name: Option<String>,
}

impl From<RelayData> for RelayState {
    fn from(data: RelayData) -> Self {
        Self {
            is_on: data.state != 0,
            relay: data.relay,
            name: data.name,
        }
    }
}

fn relay_state(on: bool) -> u8 {
    on as u8
}

fn display_name(configured: Option<String>, state: Option<&RelayState>, default: &str) -> String {
    configured
        .or_else(|| state.and_then(|s| s.name.clone()))
        .unwrap_or_else(|| default.to_string())
}

/// Single-relay switchBox. Its relay endpoints carry no name, so the device
/// name is read once from the device info endpoint and reused afterwards.
pub struct SwitchBox {
    client: HttpClient,
    endpoint: DeviceEndpoint,
    name: String,
    device_name: Option<String>,
    state: Option<RelayState>,
}

impl SwitchBox {
    pub const TYPE: &'static str = "switchBox";

    pub fn new(client: HttpClient, endpoint: DeviceEndpoint) -> Self {
        Self {
            client,
            endpoint,
            name: format!("Blebox {}", Self::TYPE),
            device_name: None,
            state: None,
        }
    }

    /// Uses the configured name, or the one reported by the first poll.
    pub async fn initialize(&mut self, name: Option<String>) -> Result<(), DeviceError> {
        let result = self.update().await.map(|_| ());
        self.name = display_name(name, self.state.as_ref(), &self.name);
        result
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn available(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&RelayState> {
        self.state.as_ref()
    }

    pub async fn update(&mut self) -> Result<RelayState, DeviceError> {
        let result = self.fetch().await;
        self.apply(result)
    }

    pub async fn turn_on(&mut self) -> Result<RelayState, DeviceError> {
        self.set(true).await
    }

    pub async fn turn_off(&mut self) -> Result<RelayState, DeviceError> {
        self.set(false).await
    }

    async fn device_name(&mut self) -> Result<String, DeviceError> {
        if let Some(device_name) = &self.device_name {
            return Ok(device_name.clone());
        }

        let info = get_device_info(&self.client, &self.endpoint).await?;
        self.device_name = Some(info.device_name.clone());

        Ok(info.device_name)
    }

    async fn fetch(&mut self) -> Result<RelayData, DeviceError> {
        let device_name = self.device_name().await?;
        let mut relay = get_single_relay(&self.client, &self.endpoint).await?;
        relay.name = Some(device_name);

        Ok(relay)
    }

    async fn set(&mut self, on: bool) -> Result<RelayState, DeviceError> {
        let result = set_single_relay(&self.client, &self.endpoint, relay_state(on))
            .await
            .map(|mut relay| {
                relay.name = self.device_name.clone();
                relay
            });

        self.apply(result)
    }

    fn apply(&mut self, result: Result<RelayData, DeviceError>) -> Result<RelayState, DeviceError> {
        let result = result.map(RelayState::from);
        self.state = result.as_ref().ok().cloned();
        result
    }
}

/// Multi-relay switchBoxD; each entity drives one relay.
pub struct SwitchBoxD {
    client: HttpClient,
    endpoint: DeviceEndpoint,
    relay: usize,
    name: String,
    state: Option<RelayState>,
}

impl SwitchBoxD {
    pub const TYPE: &'static str = "switchBoxD";

    pub fn new(client: HttpClient, endpoint: DeviceEndpoint, relay: usize) -> Self {
        Self {
            client,
            endpoint,
            relay,
            name: format!("Blebox {}", Self::TYPE),
            state: None,
        }
    }

    pub async fn initialize(&mut self, name: Option<String>) -> Result<(), DeviceError> {
        let result = self.update().await.map(|_| ());
        self.name = display_name(name, self.state.as_ref(), &self.name);
        result
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relay(&self) -> usize {
        self.relay
    }

    pub fn available(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&RelayState> {
        self.state.as_ref()
    }

    pub async fn update(&mut self) -> Result<RelayState, DeviceError> {
        let result = get_relay(&self.client, &self.endpoint, self.relay).await;
        self.apply(result)
    }

    pub async fn turn_on(&mut self) -> Result<RelayState, DeviceError> {
        let result = set_relay(&self.client, &self.endpoint, self.relay, relay_state(true)).await;
        self.apply(result)
    }

    pub async fn turn_off(&mut self) -> Result<RelayState, DeviceError> {
        let result = set_relay(&self.client, &self.endpoint, self.relay, relay_state(false)).await;
        self.apply(result)
    }

    fn apply(&mut self, result: Result<RelayData, DeviceError>) -> Result<RelayState, DeviceError> {
        let result = result.map(RelayState::from);
        self.state = result.as_ref().ok().cloned();
        result
    }
}
