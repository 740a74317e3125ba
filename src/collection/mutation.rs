use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, warn};

use super::fetch::decode_body;
use crate::api::model::{ErrorMessage, RequestResponse};
use crate::api::{ApiRequest, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Patch,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update(UpdateMethod),
}

impl Mutation {
    pub fn method(&self) -> Method {
        match self {
            Mutation::Create => Method::POST,
            Mutation::Update(UpdateMethod::Patch) => Method::PATCH,
            Mutation::Update(UpdateMethod::Put) => Method::PUT,
        }
    }

    /// Failure shown when the backend gives neither a usable result nor a
    /// usable error message.
    pub fn default_failure(&self, path: &str) -> ErrorMessage {
        match self {
            Mutation::Create => {
                ErrorMessage::new(format!("Erreur lors de la création avec l'URL {}", path))
            }
            Mutation::Update(_) => {
                ErrorMessage::new(format!("Erreur lors de la modification avec l'URL {}", path))
            }
        }
    }
}

/// Sends a create or update and folds the answer into a [`RequestResponse`].
///
/// A create always carries a body (`{}` when none is given); an update without
/// body is sent bodyless. Only transport failures are returned as `Err`.
#[instrument(skip_all, fields(path = %path, method = ?mutation))]
pub async fn mutate<T, B, C>(
    transport: &C,
    mutation: Mutation,
    path: &str,
    body: Option<&B>,
) -> Result<RequestResponse<T>>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
    C: Transport + ?Sized,
{
    let payload = match body {
        Some(body) => Some(serde_json::to_value(body).context("failed to serialize request body")?),
        None if mutation == Mutation::Create => Some(Value::Object(Default::default())),
        None => None,
    };
    let response = transport
        .send(ApiRequest::with_body(mutation.method(), path, payload))
        .await?;

    if response.is_success() {
        match decode_body::<T>(&response.body) {
            Ok(Some(value)) => return Ok(RequestResponse::Success(value)),
            Ok(None) => warn!(path, status = %response.status, "mutation succeeded without a payload"),
            Err(err) => warn!(path, error = %err, "unexpected mutation payload"),
        }
    } else {
        match decode_body::<ErrorMessage>(&response.body) {
            Ok(Some(error)) if !error.message.trim().is_empty() => {
                return Ok(RequestResponse::Failure(error));
            }
            Ok(_) => warn!(path, status = %response.status, "mutation failed without an error message"),
            Err(err) => {
                warn!(path, status = %response.status, error = %err, "unreadable mutation error body")
            }
        }
    }
    Ok(RequestResponse::Failure(mutation.default_failure(path)))
}

pub async fn create<T, B, C>(transport: &C, path: &str, body: &B) -> Result<RequestResponse<T>>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
    C: Transport + ?Sized,
{
    mutate(transport, Mutation::Create, path, Some(body)).await
}

pub async fn update<T, B, C>(
    transport: &C,
    method: UpdateMethod,
    path: &str,
    body: Option<&B>,
) -> Result<RequestResponse<T>>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
    C: Transport + ?Sized,
{
    mutate(transport, Mutation::Update(method), path, body).await
}
