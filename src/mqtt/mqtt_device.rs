use color_eyre::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    blebox::{
        color::HsColor,
        device::{BleboxDevice, Capabilities, TurnOn},
        effect::Effect,
    },
    protocols::mqtt::MqttClient,
    settings::Settings,
};

/// Entity state as published to MQTT. Set commands use the same shape with
/// only the fields to change.
#[derive(Builder, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct MqttDevice {
    pub id: String,
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HsColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    TurnOn(TurnOn),
    TurnOff,
}

impl From<&MqttDevice> for Command {
    fn from(mqtt_device: &MqttDevice) -> Self {
        match mqtt_device.power {
            Some(false) => Command::TurnOff,
            _ => Command::TurnOn(TurnOn {
                hs_color: mqtt_device
                    .color
                    .map(|color| HsColor::new(color.hue, color.saturation)),
                brightness: mqtt_device.brightness,
                white: mqtt_device.white,
                effect: mqtt_device.effect,
            }),
        }
    }
}

pub fn to_mqtt_device(id: &str, device: &BleboxDevice) -> Result<MqttDevice> {
    let capabilities = device.capabilities();

    let mut builder = MqttDeviceBuilder::default();
    builder
        .id(id)
        .name(device.name())
        .available(device.available())
        .capabilities(capabilities);

    if let Some(power) = device.is_on() {
        builder.power(power);
    }

    match device {
        BleboxDevice::Dimmer(dimmer) => {
            builder.brightness(dimmer.state().brightness);
        }
        BleboxDevice::Light(light) => {
            let state = light.state();
            builder.brightness(state.brightness);

            if capabilities.color {
                builder.color(state.hs_color);
            }
            if capabilities.white {
                builder.white(state.white);
            }
            if capabilities.effect {
                builder.effect(state.effect).effect_list(Effect::names());
            }
        }
        BleboxDevice::SingleRelaySwitch(_) => {
            builder.relay(0usize);
        }
        BleboxDevice::MultiRelaySwitch(switch) => {
            builder.relay(switch.relay());
        }
    }

    Ok(builder.build()?)
}

pub async fn publish_mqtt_device(
    mqtt_client: &MqttClient,
    settings: &Settings,
    mqtt_device: &MqttDevice,
) -> Result<()> {
    let topic = settings.mqtt.state_topic.replace("{id}", &mqtt_device.id);

    let json = serde_json::to_string(&mqtt_device)?;

    mqtt_client
        .client
        .publish(topic, rumqttc::QoS::AtLeastOnce, true, json)
        .await?;

    Ok(())
}
