use std::{collections::HashMap, fmt::Display, sync::Arc};

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, OriginalUri, Path, Query, Request, State},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Json, Router,
};
use http::StatusCode;
use scaffold_dal::Entity;
use scaffold_types::Document;
use serde_json::{Map, Value};
use tracing::{debug, error};

use super::{
    crud::{CrudController, CrudMethod, CrudParams},
    paging::Paging,
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    fn filter(self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Delete => MethodFilter::DELETE,
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Binding of controller operation to HTTP method and path
#[derive(Debug, Clone, Copy)]
pub struct RouteMethod {
    pub method: CrudMethod,
    pub http_method: HttpMethod,
    pub path: &'static str,
    pub success_status: StatusCode,
}

pub const CRUD_ROUTE_METHODS: &[RouteMethod] = &[
    RouteMethod {
        method: CrudMethod::FindAll,
        http_method: HttpMethod::Get,
        path: "/",
        success_status: StatusCode::OK,
    },
    RouteMethod {
        method: CrudMethod::FindByPk,
        http_method: HttpMethod::Get,
        path: "/{id}",
        success_status: StatusCode::OK,
    },
    RouteMethod {
        method: CrudMethod::Save,
        http_method: HttpMethod::Patch,
        path: "/{id}",
        success_status: StatusCode::OK,
    },
    RouteMethod {
        method: CrudMethod::Create,
        http_method: HttpMethod::Post,
        path: "/",
        success_status: StatusCode::CREATED,
    },
    RouteMethod {
        method: CrudMethod::Remove,
        http_method: HttpMethod::Delete,
        path: "/{id}",
        success_status: StatusCode::OK,
    },
];

/// Resource route, all [`CRUD_ROUTE_METHODS`] mounted on `/api/<name>`
pub struct CrudRoute<T> {
    name: String,
    controller: Arc<CrudController<T>>,
}

impl<T: Entity> CrudRoute<T> {
    pub fn new(name: impl Into<String>, controller: CrudController<T>) -> Self {
        CrudRoute {
            name: name.into(),
            controller: Arc::new(controller),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mount_path(&self) -> String {
        format!("/api/{}", self.name)
    }

    /// Fails if controller misses an operation required by route table
    pub fn router(&self) -> ApiResult<Router<AppState>> {
        let mount_path = self.mount_path();
        let mut router = Router::new();
        for route in CRUD_ROUTE_METHODS {
            if !self.controller.implements(route.method) {
                return Err(ApiError::NotImplemented(format!(
                    "{} does not implement {}, required by [{}] {}",
                    self.name, route.method, route.http_method, route.path
                )));
            }
            let paths = if route.path == "/" {
                vec![mount_path.clone(), format!("{mount_path}/")]
            } else {
                vec![format!("{mount_path}{}", route.path)]
            };
            for path in paths {
                let controller = self.controller.clone();
                let route = *route;
                router = router.route(
                    &path,
                    on(
                        route.http_method.filter(),
                        move |State(state): State<AppState>, request: CrudRequest| async move {
                            handle_request(controller, route, state, request).await
                        },
                    ),
                );
                debug!("Created route [{}] {}", route.http_method, path);
            }
        }
        Ok(router)
    }
}

/// Runs controller operation in a transaction, commits only on success
async fn handle_request<T: Entity>(
    controller: Arc<CrudController<T>>,
    route: RouteMethod,
    state: AppState,
    request: CrudRequest,
) -> ApiResult<Response> {
    let CrudRequest { self_link, params } = request;
    let max_items = state.config().max_request_items;
    let mut transaction = state.pool().begin().await?;
    let result = controller
        .invoke(route.method, &mut transaction, params, max_items)
        .await;
    match result {
        Ok(data) => {
            transaction.commit().await?;
            Ok((route.success_status, Json(Document::new(self_link, data))).into_response())
        }
        Err(e) => {
            if let Err(rollback_error) = transaction.rollback().await {
                error!("Failed to rollback transaction: {rollback_error}");
            }
            Err(e)
        }
    }
}

/// Everything CRUD operation needs from HTTP request
pub struct CrudRequest {
    pub self_link: String,
    pub params: CrudParams,
}

impl FromRequest<AppState> for CrudRequest {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let self_link = state
            .build_url(path_and_query)
            .map_err(|e| ApiError::Internal(format!("Cannot build self link: {e}")))?
            .to_string();

        let id = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .ok()
            .and_then(|Path(mut params)| params.remove("id"));
        let Query(paging) = Query::<Paging>::from_request_parts(&mut parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let body = parse_body(&bytes)?;

        Ok(CrudRequest {
            self_link,
            params: CrudParams { id, paging, body },
        })
    }
}

/// Empty body is accepted, otherwise it must be a JSON object
fn parse_body(bytes: &[u8]) -> ApiResult<Option<Map<String, Value>>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::BadRequest(format!("Invalid JSON body: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::body::Body;
    use scaffold_dal::project::ProjectAttributes;
    use serde_json::json;
    use tower::ServiceExt as _;

    async fn test_state() -> AppState {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        scaffold_dal::run_migrations(&pool).await.unwrap();
        AppState::new(
            AppConfig {
                base_url: "http://localhost:3000".parse().unwrap(),
                max_request_items: 1000,
            },
            pool,
        )
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(None, parse_body(b"").unwrap());
        assert_eq!(None, parse_body(b" \n").unwrap());
        let map = parse_body(br#"{"name": "x"}"#).unwrap().unwrap();
        assert_eq!(Some(&json!("x")), map.get("name"));
        assert!(matches!(parse_body(b"[1]"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_body(b"{"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_read_only_controller_cannot_be_routed() {
        let route = CrudRoute::new(
            "ProjectRoute",
            CrudController::<ProjectAttributes>::read_only(),
        );
        let err = route.router().err().expect("router should fail");
        assert_eq!(StatusCode::NOT_IMPLEMENTED, err.status_code());
    }

    #[test]
    fn test_custom_name() {
        let route = CrudRoute::new("ProjectRoute", CrudController::<ProjectAttributes>::new())
            .with_name("Projects");
        assert_eq!("/api/Projects", route.mount_path());
    }

    #[tokio::test]
    async fn test_listing_with_trailing_slash() {
        let state = test_state().await;
        let route = CrudRoute::new("ProjectRoute", CrudController::<ProjectAttributes>::new());
        let app = route.router().unwrap().with_state(state);

        let response = app
            .clone()
            .oneshot(
                http::Request::get("/api/ProjectRoute/?page=0&pageSize=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json!({
                "links": {"self": "http://localhost:3000/api/ProjectRoute/?page=0&pageSize=5"},
                "data": []
            }),
            doc
        );

        let response = app
            .oneshot(
                http::Request::delete("/api/ProjectRoute/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }
}
