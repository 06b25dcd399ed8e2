use axum::Router;

use crate::{error::ApiResult, state::AppState};

pub mod crud;
pub mod movie;
mod paging;
pub mod project;
pub mod route;

pub use paging::Paging;

/// Router with all resource routes
pub fn api_router() -> ApiResult<Router<AppState>> {
    Ok(Router::new()
        .merge(project::route().router()?)
        .merge(movie::route().router()?))
}
