use serde::{Deserialize, Serialize};

use crate::{
    blebox::error::DeviceError,
    protocols::http::{mk_get_request, mk_post_request, DeviceEndpoint, HttpClient},
};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RelayData {
    pub relay: usize,
    pub state: u8,
    pub name: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
struct RelaySetData {
    relay: usize,
    state: u8,
}

#[derive(Deserialize, Debug, Clone)]
struct RelaysResponse {
    relays: Vec<RelayData>,
}

#[derive(Serialize, Debug, Clone)]
struct RelaysRequest {
    relays: Vec<RelaySetData>,
}

fn pick(relays: Vec<RelayData>, relay: usize) -> Result<RelayData, DeviceError> {
    let count = relays.len();

    relays.into_iter().nth(relay).ok_or_else(|| {
        DeviceError::unexpected(format!(
            "relay {relay} out of range, device reports {count} relay(s)"
        ))
    })
}

/// Relay 0 of a switchBox, whose relay endpoints speak a bare JSON array.
pub async fn get_single_relay(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
) -> Result<RelayData, DeviceError> {
    let response: Vec<RelayData> = mk_get_request(client, endpoint, "/api/relay/state").await?;

    pick(response, 0)
}

pub async fn set_single_relay(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    state: u8,
) -> Result<RelayData, DeviceError> {
    let body = vec![RelaySetData { relay: 0, state }];

    let response: Vec<RelayData> =
        mk_post_request(client, endpoint, "/api/relay/set", &body).await?;

    pick(response, 0)
}

/// One relay of a switchBoxD, addressed by its position in `relays`.
pub async fn get_relay(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    relay: usize,
) -> Result<RelayData, DeviceError> {
    let response: RelaysResponse = mk_get_request(client, endpoint, "/api/relay/state").await?;

    pick(response.relays, relay)
}

pub async fn set_relay(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    relay: usize,
    state: u8,
) -> Result<RelayData, DeviceError> {
    let body = RelaysRequest {
        relays: vec![RelaySetData { relay, state }],
    };

    let response: RelaysResponse =
        mk_post_request(client, endpoint, "/api/relay/set", &body).await?;

    pick(response.relays, relay)
}
