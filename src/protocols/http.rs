use std::time::Duration;

use hyper::{body::Bytes, Body, Method, Request, Uri};
use serde::{Deserialize, Serialize};

use crate::blebox::error::DeviceError;

pub type HttpClient = hyper::Client<hyper::client::HttpConnector>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn mk_http_client() -> HttpClient {
    hyper::Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .build_http()
}

/// Network location of a single device and the deadline applied to every
/// request sent to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceEndpoint {
    host: String,
    timeout: Duration,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn uri(&self, path: &str) -> Result<Uri, DeviceError> {
        let url = format!("http://{}{}", self.host, path);

        url.parse()
            .map_err(|err| DeviceError::InvalidUri { url, err })
    }
}

async fn send(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    request: Request<Body>,
) -> Result<Bytes, DeviceError> {
    let exchange = async {
        let result = client.request(request).await?;

        let status = result.status();
        if !status.is_success() {
            return Err(DeviceError::Status(status));
        }

        Ok::<Bytes, DeviceError>(hyper::body::to_bytes(result.into_body()).await?)
    };

    tokio::time::timeout(endpoint.timeout(), exchange)
        .await
        .map_err(|_| DeviceError::Timeout(endpoint.timeout()))?
}

fn decode<T: for<'a> Deserialize<'a>>(body_bytes: &[u8]) -> Result<T, DeviceError> {
    let de = &mut serde_json::Deserializer::from_slice(body_bytes);
    let response: T = serde_path_to_error::deserialize(de)?;

    Ok(response)
}

pub async fn mk_get_request<T: for<'a> Deserialize<'a>>(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    path: &str,
) -> Result<T, DeviceError> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(endpoint.uri(path)?)
        .body(Body::empty())?;

    let body_bytes = send(client, endpoint, request).await?;

    decode(&body_bytes)
}

pub async fn mk_post_request<RequestBody, ResponseBody>(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    path: &str,
    body: &RequestBody,
) -> Result<ResponseBody, DeviceError>
where
    RequestBody: Serialize,
    ResponseBody: for<'a> Deserialize<'a>,
{
    let body = serde_json::to_string(body).map_err(DeviceError::Encode)?;
    log::debug!("POST http://{}{} {}", endpoint.host, path, body);

    let request = Request::builder()
        .method(Method::POST)
        .uri(endpoint.uri(path)?)
        .header("content-type", "application/json")
        .body(body.into())?;

    let body_bytes = send(client, endpoint, request).await?;

    decode(&body_bytes)
}
