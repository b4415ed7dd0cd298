use color_eyre::Result;
use eyre::eyre;
use log::{debug, warn};
use rumqttc::QoS;

use crate::{
    blebox::registry::DeviceRegistry,
    mqtt::mqtt_device::{publish_mqtt_device, to_mqtt_device, Command, MqttDevice},
    protocols::mqtt::MqttClient,
    settings::Settings,
};

/// Extracts the device id from `topic` given a template containing `{id}`.
pub fn topic_id<'a>(template: &str, topic: &'a str) -> Option<&'a str> {
    let (prefix, suffix) = template.split_once("{id}")?;
    let id = topic.strip_prefix(prefix)?.strip_suffix(suffix)?;

    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id)
    }
}

pub async fn handle_incoming_mqtt_event(
    event: rumqttc::Event,
    mqtt_client: &MqttClient,
    settings: &Settings,
) -> Result<()> {
    match event {
        rumqttc::Event::Incoming(rumqttc::Packet::ConnAck(_)) => {
            mqtt_client
                .client
                .subscribe(
                    settings.mqtt.set_topic.replace("{id}", "+"),
                    QoS::AtMostOnce,
                )
                .await?;
        }
        rumqttc::Event::Incoming(rumqttc::Packet::Publish(msg)) => {
            let id = topic_id(&settings.mqtt.set_topic, &msg.topic)
                .ok_or_else(|| eyre!("Unexpected topic {}", msg.topic))?
                .to_string();
            let device: MqttDevice = serde_json::from_slice(&msg.payload)?;

            // Push device update to the unhandled messages
            // queue, removing any existing unhandled messages
            // for the same device.
            let mut unhandled_messages = mqtt_client.unhandled_messages.write().await;
            unhandled_messages.retain(|(pending, _)| pending != &id);
            unhandled_messages.push_back((id, device));

            mqtt_client.notify.notify_one();
        }
        _ => {}
    }

    Ok(())
}

pub fn start_mqtt_events_loop(
    mqtt_client: &MqttClient,
    settings: &Settings,
    registry: &DeviceRegistry,
) {
    let mqtt_client = mqtt_client.clone();
    let settings = settings.clone();
    let registry = registry.clone();

    tokio::spawn(async move {
        loop {
            let next_message = {
                let mut unhandled_messages = mqtt_client.unhandled_messages.write().await;
                unhandled_messages.pop_front()
            };

            match next_message {
                Some((id, message)) => {
                    let result =
                        process_next_mqtt_message(&id, &message, &registry, &mqtt_client, &settings)
                            .await;

                    if let Err(e) = result {
                        warn!("Error while processing MQTT message for {}: {:?}", id, e);
                    }
                }
                None => {
                    // Wait until we get notified that there are new messages.
                    mqtt_client.notify.notified().await;
                }
            }
        }
    });
}

async fn process_next_mqtt_message(
    id: &str,
    message: &MqttDevice,
    registry: &DeviceRegistry,
    mqtt_client: &MqttClient,
    settings: &Settings,
) -> Result<()> {
    let device = registry
        .get(id)
        .ok_or_else(|| eyre!("No such device: {}", id))?;

    let command = Command::from(message);
    debug!("{}: {:?}", id, command);

    let mqtt_device = {
        let mut device = device.lock().await;

        let result = match command {
            Command::TurnOn(turn_on) => device.turn_on(turn_on).await,
            Command::TurnOff => device.turn_off().await,
        };

        if let Err(e) = result {
            warn!("{} ({}): command failed: {}", device.name(), id, e);
        }

        to_mqtt_device(id, &device)?
    };

    publish_mqtt_device(mqtt_client, settings, &mqtt_device).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_topic() {
        let template = "home/blebox/{id}/set";

        assert_eq!(topic_id(template, "home/blebox/desk/set"), Some("desk"));
        assert_eq!(topic_id(template, "home/blebox/desk"), None);
        assert_eq!(topic_id(template, "home/blebox//set"), None);
        assert_eq!(topic_id(template, "home/blebox/a/b/set"), None);
        assert_eq!(topic_id("blebox/{id}", "blebox/hall_relay1"), Some("hall_relay1"));
        assert_eq!(topic_id("blebox/set", "blebox/set"), None);
    }
}
