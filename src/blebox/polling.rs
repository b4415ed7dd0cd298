use std::time::Duration;

use color_eyre::Result;
use log::warn;

use super::registry::DeviceRegistry;
use crate::{
    mqtt::mqtt_device::{publish_mqtt_device, to_mqtt_device, MqttDevice},
    protocols::mqtt::MqttClient,
    settings::Settings,
};

/// Polls one device and returns the snapshot to publish. A failed poll is
/// logged and yields an unavailable snapshot.
pub async fn poll_device(registry: &DeviceRegistry, id: &str) -> Result<Option<MqttDevice>> {
    let Some(device) = registry.get(id) else {
        return Ok(None);
    };

    let mut device = device.lock().await;

    if let Err(e) = device.update().await {
        if e.is_transport() {
            warn!("{} ({}): device unreachable: {}", device.name(), id, e);
        } else {
            warn!("{} ({}): poll failed: {}", device.name(), id, e);
        }
    }

    Ok(Some(to_mqtt_device(id, &device)?))
}

/// Spawns one polling task per registered device, each publishing the
/// device state to MQTT after every poll.
pub fn start_device_poll_loops(
    settings: &Settings,
    registry: &DeviceRegistry,
    mqtt_client: &MqttClient,
) {
    for (id, _) in registry.iter() {
        let id = id.clone();
        let settings = settings.clone();
        let registry = registry.clone();
        let mqtt_client = mqtt_client.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.poll_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let result = match poll_device(&registry, &id).await {
                    Ok(Some(mqtt_device)) => {
                        publish_mqtt_device(&mqtt_client, &settings, &mqtt_device).await
                    }
                    Ok(None) => Ok(()),
                    Err(e) => Err(e),
                };

                if let Err(e) = result {
                    warn!("{:?}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
    }
}
