use serde::{Deserialize, Serialize};

use super::{
    color::HsColor,
    dimmer_box::DimmerBox,
    effect::Effect,
    error::{DeviceError, SetupError},
    rest::device::get_device_info,
    switch_box::{SwitchBox, SwitchBoxD},
    wlight_box::WLightBox,
};
use crate::{
    protocols::http::{DeviceEndpoint, HttpClient},
    settings::{DeviceSettings, Platform},
};

/// What an entity lets the user control besides on/off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Capabilities {
    pub brightness: bool,
    pub color: bool,
    pub white: bool,
    pub effect: bool,
}

/// Fields of a turn-on command. Unset fields keep their cached value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TurnOn {
    pub hs_color: Option<HsColor>,
    pub brightness: Option<u8>,
    pub white: Option<u8>,
    pub effect: Option<Effect>,
}

pub enum BleboxDevice {
    Dimmer(DimmerBox),
    Light(WLightBox),
    SingleRelaySwitch(SwitchBox),
    MultiRelaySwitch(SwitchBoxD),
}

impl BleboxDevice {
    pub fn name(&self) -> &str {
        match self {
            BleboxDevice::Dimmer(d) => d.name(),
            BleboxDevice::Light(l) => l.name(),
            BleboxDevice::SingleRelaySwitch(s) => s.name(),
            BleboxDevice::MultiRelaySwitch(s) => s.name(),
        }
    }

    pub fn available(&self) -> bool {
        match self {
            BleboxDevice::Dimmer(d) => d.available(),
            BleboxDevice::Light(l) => l.available(),
            BleboxDevice::SingleRelaySwitch(s) => s.available(),
            BleboxDevice::MultiRelaySwitch(s) => s.available(),
        }
    }

    /// `None` when the state is unknown.
    pub fn is_on(&self) -> Option<bool> {
        if !self.available() {
            return None;
        }

        match self {
            BleboxDevice::Dimmer(d) => Some(d.state().is_on),
            BleboxDevice::Light(l) => Some(l.state().is_on),
            BleboxDevice::SingleRelaySwitch(s) => s.state().map(|s| s.is_on),
            BleboxDevice::MultiRelaySwitch(s) => s.state().map(|s| s.is_on),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            BleboxDevice::Dimmer(_) => Capabilities {
                brightness: true,
                ..Default::default()
            },
            BleboxDevice::Light(l) => l.capabilities(),
            BleboxDevice::SingleRelaySwitch(_) | BleboxDevice::MultiRelaySwitch(_) => {
                Capabilities::default()
            }
        }
    }

    pub async fn update(&mut self) -> Result<(), DeviceError> {
        match self {
            BleboxDevice::Dimmer(d) => d.update().await.map(|_| ()),
            BleboxDevice::Light(l) => l.update().await.map(|_| ()),
            BleboxDevice::SingleRelaySwitch(s) => s.update().await.map(|_| ()),
            BleboxDevice::MultiRelaySwitch(s) => s.update().await.map(|_| ()),
        }
    }

    /// Switches have nothing to adjust, so they ignore the command fields.
    pub async fn turn_on(&mut self, command: TurnOn) -> Result<(), DeviceError> {
        match self {
            BleboxDevice::Dimmer(d) => d.turn_on(command.brightness).await.map(|_| ()),
            BleboxDevice::Light(l) => l.turn_on(command).await.map(|_| ()),
            BleboxDevice::SingleRelaySwitch(s) => s.turn_on().await.map(|_| ()),
            BleboxDevice::MultiRelaySwitch(s) => s.turn_on().await.map(|_| ()),
        }
    }

    pub async fn turn_off(&mut self) -> Result<(), DeviceError> {
        match self {
            BleboxDevice::Dimmer(d) => d.turn_off().await.map(|_| ()),
            BleboxDevice::Light(l) => l.turn_off().await.map(|_| ()),
            BleboxDevice::SingleRelaySwitch(s) => s.turn_off().await.map(|_| ()),
            BleboxDevice::MultiRelaySwitch(s) => s.turn_off().await.map(|_| ()),
        }
    }
}

/// The configured switch type, or the one the device reports about itself.
pub async fn resolve_switch_type(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    configured: Option<&str>,
) -> Result<String, SetupError> {
    if let Some(device_type) = configured {
        return Ok(device_type.to_string());
    }

    let info = get_device_info(client, endpoint)
        .await
        .map_err(|source| SetupError::TypeProbe {
            host: endpoint.host().to_string(),
            source,
        })?;

    Ok(info.device_type)
}

/// Builds the adapter for one configured device and runs its first poll.
///
/// Dimmers and lights are registered even when that poll fails; they simply
/// start out unavailable. Switches need the device type, so an unreachable
/// or unknown switch is a setup error.
pub async fn setup_device(
    client: &HttpClient,
    settings: &DeviceSettings,
) -> Result<BleboxDevice, SetupError> {
    let endpoint = settings.endpoint();

    let (device, result) = match settings.platform {
        Platform::DimmerBox => {
            let mut dimmer = DimmerBox::new(client.clone(), endpoint, settings.name.clone());
            let result = dimmer.initialize().await.map(|_| ());
            (BleboxDevice::Dimmer(dimmer), result)
        }
        Platform::WLightBox => {
            let mut light = WLightBox::new(client.clone(), endpoint, settings.name.clone());
            let result = light.initialize().await.map(|_| ());
            (BleboxDevice::Light(light), result)
        }
        Platform::SwitchBox => {
            let device_type =
                resolve_switch_type(client, &endpoint, settings.device_type.as_deref()).await?;

            match device_type.as_str() {
                SwitchBox::TYPE => {
                    let mut switch = SwitchBox::new(client.clone(), endpoint);
                    let result = switch.initialize(settings.name.clone()).await;
                    (BleboxDevice::SingleRelaySwitch(switch), result)
                }
                SwitchBoxD::TYPE => {
                    let mut switch = SwitchBoxD::new(client.clone(), endpoint, settings.relay);
                    let result = switch.initialize(settings.name.clone()).await;
                    (BleboxDevice::MultiRelaySwitch(switch), result)
                }
                _ => {
                    return Err(SetupError::UnknownType {
                        host: settings.host.clone(),
                        device_type: device_type.clone(),
                    })
                }
            }
        }
    };

    if let Err(e) = result {
        log::warn!("{} ({}): device unavailable: {}", device.name(), settings.host, e);
    }

    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocols::http::{mk_http_client, DEFAULT_TIMEOUT},
        testing::{unused_host, MockBlebox},
    };
    use hyper::Method;

    fn settings(platform: Platform, host: String) -> DeviceSettings {
        DeviceSettings {
            platform,
            host,
            id: None,
            name: None,
            relay: 0,
            timeout: DEFAULT_TIMEOUT.as_secs(),
            device_type: None,
        }
    }

    #[tokio::test]
    async fn probes_single_relay_switch() {
        let mock = MockBlebox::switch_box("Pump", false).await;

        let device = setup_device(&mk_http_client(), &settings(Platform::SwitchBox, mock.host()))
            .await
            .unwrap();

        assert!(matches!(device, BleboxDevice::SingleRelaySwitch(_)));
        assert_eq!(device.name(), "Pump");
        assert_eq!(device.is_on(), Some(false));
        assert_eq!(device.capabilities(), Capabilities::default());
    }

    #[tokio::test]
    async fn probes_multi_relay_switch() {
        let mock = MockBlebox::switch_box_d("Hall", &[("Left", false), ("Right", true)]).await;
        let mut settings = settings(Platform::SwitchBox, mock.host());
        settings.relay = 1;

        let device = setup_device(&mk_http_client(), &settings).await.unwrap();

        assert!(matches!(device, BleboxDevice::MultiRelaySwitch(_)));
        assert_eq!(device.name(), "Right");
        assert_eq!(device.is_on(), Some(true));
    }

    #[tokio::test]
    async fn configured_type_skips_probe() {
        let mock = MockBlebox::switch_box_d("Hall", &[("Left", false)]).await;
        let mut settings = settings(Platform::SwitchBox, mock.host());
        settings.device_type = Some("switchBoxD".to_string());

        let device = setup_device(&mk_http_client(), &settings).await.unwrap();

        assert!(matches!(device, BleboxDevice::MultiRelaySwitch(_)));
        assert_eq!(mock.count(Method::GET, "/api/device/state"), 0);
    }

    #[tokio::test]
    async fn unknown_type_is_a_setup_error() {
        let mock = MockBlebox::with_type("switchBoxZ", "Mystery").await;

        let err = setup_device(&mk_http_client(), &settings(Platform::SwitchBox, mock.host()))
            .await
            .err()
            .unwrap();

        assert!(matches!(
            err,
            SetupError::UnknownType { ref device_type, .. } if device_type == "switchBoxZ"
        ));
        assert_eq!(mock.count(Method::GET, "/api/relay/state"), 0);
    }

    #[tokio::test]
    async fn unreachable_switch_is_a_setup_error() {
        let err = setup_device(&mk_http_client(), &settings(Platform::SwitchBox, unused_host()))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, SetupError::TypeProbe { .. }));
    }

    #[tokio::test]
    async fn unreachable_dimmer_is_registered_unavailable() {
        let device = setup_device(&mk_http_client(), &settings(Platform::DimmerBox, unused_host()))
            .await
            .unwrap();

        assert!(!device.available());
        assert_eq!(device.is_on(), None);
        assert_eq!(device.name(), "Blebox dimmerBox");
    }

    #[tokio::test]
    async fn switch_ignores_light_fields() {
        let mock = MockBlebox::switch_box("Pump", false).await;
        let mut device =
            setup_device(&mk_http_client(), &settings(Platform::SwitchBox, mock.host()))
                .await
                .unwrap();

        device
            .turn_on(TurnOn {
                brightness: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(device.is_on(), Some(true));
        assert_eq!(mock.relay(0), 1);
    }

    #[tokio::test]
    async fn dispatches_light_commands() {
        let mock = MockBlebox::wlight_box("Strip", 1, "00000000", 0).await;
        let mut device =
            setup_device(&mk_http_client(), &settings(Platform::WLightBox, mock.host()))
                .await
                .unwrap();
        assert_eq!(device.is_on(), Some(false));

        device
            .turn_on(TurnOn {
                brightness: Some(128),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(device.is_on(), Some(true));

        device.turn_off().await.unwrap();
        assert_eq!(device.is_on(), Some(false));
        assert!(device.capabilities().white);
    }
}
