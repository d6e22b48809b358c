//! HTTP adapter - axum routes, DTOs, extractors and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, WebhookApiError};
pub use extractors::{AuthenticatedClient, ClientIdHeader, OriginIp, CLIENT_ID_HEADER};
pub use routes::{api_routes, app_router};
pub use state::AppState;
