use axum::{extract::Request, middleware::Next, response::Response};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::AppError;

pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Crea un rate limiter globale; `None` se il limite è 0 (disabilitato)
pub fn create_rate_limiter(requests_per_minute: u32) -> Option<SharedRateLimiter> {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute)?);
    Some(Arc::new(RateLimiter::direct(quota)))
}

/// Middleware per rate limiting
pub async fn rate_limit_middleware(
    limiter: SharedRateLimiter,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit superato su {}", request.uri().path());
            Err(AppError::RateLimited(
                "Too many requests, try again shortly".to_string(),
            ))
        }
    }
}
