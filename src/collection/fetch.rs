use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use tracing::{instrument, warn};

use super::query::{search_target, SearchParameters};
use crate::api::model::PageRequest;
use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::error::FetchError;

/// Fetches one page of `path`. Without parameters the bare path is requested.
#[instrument(skip_all, fields(path = %path))]
pub async fn search<T, C>(
    transport: &C,
    path: &str,
    params: Option<&SearchParameters>,
) -> Result<PageRequest<T>, FetchError>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
{
    let target = match params {
        Some(params) => search_target(path, params),
        None => path.to_string(),
    };
    let page: PageRequest<T> = fetch_json(transport, target, Shape::Object).await?;
    if (page.data.len() as u64) > page.total {
        warn!(
            path,
            total = page.total,
            returned = page.data.len(),
            "page holds more items than the reported total"
        );
    }
    Ok(page)
}

/// Unpaginated listing: `GET path` answering a JSON array.
#[instrument(skip_all, fields(path = %path))]
pub async fn get_all<T, C>(transport: &C, path: &str) -> Result<Vec<T>, FetchError>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
{
    fetch_json(transport, path.to_string(), Shape::Any).await
}

/// `GET path/id`.
#[instrument(skip_all, fields(path = %path, id = %id))]
pub async fn get_by_id<T, C, I>(transport: &C, path: &str, id: I) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
    I: Display,
{
    let target = format!("{}/{}", path.trim_end_matches('/'), id);
    fetch_json(transport, target, Shape::Object).await
}

/// `GET path` answering a single entity.
pub async fn get_one<T, C>(transport: &C, path: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
{
    fetch_json(transport, path.to_string(), Shape::Object).await
}

/// JSON shape a payload must have before it is decoded.
///
/// serde lets a struct be filled positionally from an array, so envelopes
/// and entities are checked to be objects first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Any,
    Object,
}

async fn fetch_json<T, C>(transport: &C, target: String, shape: Shape) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
{
    let response = transport.send(ApiRequest::get(target.clone())).await?;
    decode_response(target, response, shape)
}

pub(crate) fn decode_response<T: DeserializeOwned>(
    target: String,
    response: ApiResponse,
    shape: Shape,
) -> Result<T, FetchError> {
    if !response.is_success() {
        warn!(path = %target, status = %response.status, "fetch failed");
        return Err(FetchError::Status {
            path: target,
            status: response.status,
        });
    }
    match decode_shaped(&response.body, shape) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            warn!(path = %target, "fetch returned an empty payload");
            Err(FetchError::Empty { path: target })
        }
        Err(source) => {
            warn!(path = %target, error = %source, "failed to decode fetched payload");
            Err(FetchError::Decode {
                path: target,
                source,
            })
        }
    }
}

/// `Ok(None)` for a blank body or a JSON `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<Option<T>, serde_json::Error> {
    decode_shaped(body, Shape::Any)
}

pub(crate) fn decode_shaped<T: DeserializeOwned>(
    body: &str,
    shape: Shape,
) -> Result<Option<T>, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Ok(None);
    }
    if shape == Shape::Object && !value.is_object() {
        return Err(serde::de::Error::custom(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map(Some)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
