use std::{collections::VecDeque, sync::Arc, time::Duration};

use color_eyre::Result;
use log::warn;
use rumqttc::{AsyncClient, MqttOptions};
use tokio::{
    sync::{Notify, RwLock},
    task,
};

use crate::{
    mqtt::{events::handle_incoming_mqtt_event, mqtt_device::MqttDevice},
    settings::Settings,
};

/// Set commands waiting to be applied, keyed by device id.
pub type UnhandledMessages = Arc<RwLock<VecDeque<(String, MqttDevice)>>>;

#[derive(Clone)]
pub struct MqttClient {
    pub client: AsyncClient,
    pub unhandled_messages: UnhandledMessages,
    pub notify: Arc<Notify>,
}

pub fn mk_mqtt_client(settings: &Settings) -> Result<MqttClient> {
    let mut options = MqttOptions::new(
        settings.mqtt.id.clone(),
        settings.mqtt.host.clone(),
        settings.mqtt.port,
    );
    options.set_keep_alive(Duration::from_secs(5));
    let (client, mut eventloop) = AsyncClient::new(options, 10);

    let mqtt_client = MqttClient {
        client,
        unhandled_messages: Default::default(),
        notify: Arc::new(Notify::new()),
    };

    {
        let mqtt_client = mqtt_client.clone();
        let settings = settings.clone();

        task::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(event) => {
                        let result = handle_incoming_mqtt_event(event, &mqtt_client, &settings).await;

                        if let Err(e) = result {
                            warn!("Error while handling MQTT event: {:?}", e);
                        }
                    }
                    Err(e) => {
                        warn!("MQTT connection error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });
    }

    Ok(mqtt_client)
}
