use crate::client::Client as RadarClient;
use crate::error::RadarError;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;

pub struct Httpc;

impl Httpc {
    fn attach_request_info(
        builder: reqwest::RequestBuilder,
        client: &RadarClient,
    ) -> reqwest::RequestBuilder {
        builder
            .header(ACCEPT, "application/json")
            .timeout(client.timeout)
    }

    pub async fn get(
        client: &RadarClient,
        url: &str,
        query_params: Option<Vec<(&str, String)>>,
    ) -> Result<Response, RadarError> {
        let http = ReqwestClient::new();
        let mut request = http.get(url);
        request = Self::attach_request_info(request, client);

        if let Some(pairs) = query_params {
            request = request.query(&pairs);
        }

        debug!("GET {}", url);
        let resp = request
            .send()
            .await
            .map_err(|e| RadarError::from_transport(url, e))?;
        Ok(resp)
    }

    /// Read the body and decode it, keeping the JSON path of any mismatch.
    pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RadarError> {
        let url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| RadarError::from_transport(&url, e))?;
        decode_str(&text)
    }
}

pub fn decode_str<T: DeserializeOwned>(text: &str) -> Result<T, RadarError> {
    let mut de = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut de).map_err(|e| RadarError::decode(e, text))
}

pub fn decode_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, RadarError> {
    let snippet = value.to_string();
    serde_path_to_error::deserialize(value).map_err(|e| RadarError::decode(e, &snippet))
}
