//! Request extractors for caller identity, network origin and JSON bodies.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::domain::entitlement::{EntitlementError, OriginAddress};
use crate::domain::foundation::ClientId;

use super::error::ApiError;

/// Header carrying the opaque device identifier.
pub const CLIENT_ID_HEADER: &str = "x-xaveco-client-id";

/// Header carrying the operator token for manual upgrades.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Reads and validates the client id header, if present and non-blank.
pub fn client_id_from_headers(headers: &HeaderMap) -> Option<Result<ClientId, EntitlementError>> {
    let raw = headers.get(CLIENT_ID_HEADER)?.to_str().ok()?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(ClientId::new(raw).map_err(EntitlementError::from))
}

/// Client id for routes where absence is a malformed request (400).
#[derive(Debug, Clone)]
pub struct ClientIdHeader(pub ClientId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientIdHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match client_id_from_headers(&parts.headers) {
            Some(Ok(id)) => Ok(Self(id)),
            Some(Err(e)) => Err(ApiError(e)),
            None => Err(ApiError(EntitlementError::MissingClientId)),
        }
    }
}

/// Client id for billing routes where absence means unauthenticated (401).
#[derive(Debug, Clone)]
pub struct AuthenticatedClient(pub ClientId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedClient
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match client_id_from_headers(&parts.headers) {
            Some(Ok(id)) => Ok(Self(id)),
            _ => Err(ApiError(EntitlementError::Unauthorized)),
        }
    }
}

/// Network origin: first `X-Forwarded-For` hop, then `X-Real-IP`.
#[derive(Debug, Clone)]
pub struct OriginIp(pub OriginAddress);

impl OriginIp {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        match forwarded.or_else(real_ip) {
            Some(addr) => Self(OriginAddress::new(addr)),
            None => Self(OriginAddress::unknown()),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for OriginIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// JSON Bodies
// ════════════════════════════════════════════════════════════════════════════════

/// Required JSON body. Every rejection becomes a 400 `invalid_body` whose
/// message never carries parser output.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// JSON body that may be omitted. An empty body yields `T::default()`;
/// anything else must be well-formed JSON.
#[derive(Debug, Clone)]
pub struct OptionalJsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json_content = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(status = %rejection.status(), "Request body could not be read");
            invalid_body("Request body could not be read")
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        if !json_content {
            return Err(invalid_body(MISSING_CONTENT_TYPE));
        }

        Json::<T>::from_bytes(&bytes)
            .map(|Json(value)| Self(value))
            .map_err(json_rejection)
    }
}

const MISSING_CONTENT_TYPE: &str = "Expected a JSON body with Content-Type: application/json";

fn invalid_body(message: &str) -> ApiError {
    ApiError(EntitlementError::invalid_parameter("invalid_body", message))
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!(
        status = %rejection.status(),
        detail = %rejection.body_text(),
        "JSON body rejected"
    );

    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => MISSING_CONTENT_TYPE,
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "Request body has unexpected field types",
        _ => "Request body could not be read",
    };
    invalid_body(message)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(mime) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = mime.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
