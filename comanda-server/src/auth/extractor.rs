//! Waiter principal
//!
//! Identity is terminated upstream; the gateway forwards the
//! authenticated waiter in `x-waiter-id` / `x-waiter-name` headers.
//! Requests without both headers are rejected before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::utils::AppError;

pub const WAITER_ID_HEADER: &str = "x-waiter-id";
pub const WAITER_NAME_HEADER: &str = "x-waiter-name";

#[derive(Debug, Clone)]
pub struct Waiter {
    pub id: i64,
    pub name: String,
}

impl<S> FromRequestParts<S> for Waiter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(WAITER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or(AppError::Unauthorized)?;

        let name = parts
            .headers
            .get(WAITER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        Ok(Waiter { id, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<Waiter, AppError> {
        let (mut parts, _) = req.into_parts();
        Waiter::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_waiter_from_headers() {
        let req = Request::builder()
            .header(WAITER_ID_HEADER, "7")
            .header(WAITER_NAME_HEADER, "Ana")
            .body(())
            .unwrap();

        let waiter = extract(req).await.unwrap();
        assert_eq!(waiter.id, 7);
        assert_eq!(waiter.name, "Ana");
    }

    #[tokio::test]
    async fn missing_or_malformed_headers_are_unauthorized() {
        let req = Request::builder().body(()).unwrap();
        assert!(matches!(extract(req).await, Err(AppError::Unauthorized)));

        let req = Request::builder()
            .header(WAITER_ID_HEADER, "not-a-number")
            .header(WAITER_NAME_HEADER, "Ana")
            .body(())
            .unwrap();
        assert!(matches!(extract(req).await, Err(AppError::Unauthorized)));
    }
}
