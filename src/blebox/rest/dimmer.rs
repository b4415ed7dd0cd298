use serde::{Deserialize, Serialize};

use crate::{
    blebox::error::DeviceError,
    protocols::http::{mk_get_request, mk_post_request, DeviceEndpoint, HttpClient},
};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimmerData {
    pub desired_brightness: u8,
}

#[derive(Deserialize, Debug, Clone)]
struct DimmerResponse {
    dimmer: DimmerData,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct DimmerSetData {
    desired_brightness: u8,
}

#[derive(Serialize, Debug, Clone)]
struct DimmerRequest {
    dimmer: DimmerSetData,
}

pub async fn get_dimmer_state(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
) -> Result<DimmerData, DeviceError> {
    let response: DimmerResponse = mk_get_request(client, endpoint, "/api/dimmer/state").await?;

    Ok(response.dimmer)
}

pub async fn set_dimmer_brightness(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    brightness: u8,
) -> Result<DimmerData, DeviceError> {
    let body = DimmerRequest {
        dimmer: DimmerSetData {
            desired_brightness: brightness,
        },
    };

    let response: DimmerResponse =
        mk_post_request(client, endpoint, "/api/dimmer/set", &body).await?;

    Ok(response.dimmer)
}
