use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;
use crate::system::auth::middleware::require_auth;
use crate::system::middleware::request_logger::request_logger;
use crate::{api, handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let protected = |router: Router<AppState>| {
        router.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
    };

    let customers = protected(
        Router::new()
            .route(
                "/",
                get(handlers::a001_customer::list).post(handlers::a001_customer::create),
            )
            .route("/testdata", post(handlers::a001_customer::insert_test_data))
            .route(
                "/identification/:identification",
                get(handlers::a001_customer::get_by_identification),
            )
            .route(
                "/:id",
                get(handlers::a001_customer::get_by_id)
                    .put(handlers::a001_customer::update)
                    .delete(handlers::a001_customer::soft_delete),
            )
            .route(
                "/:id/soft-delete",
                patch(handlers::a001_customer::soft_delete),
            )
            .route("/:id/restore", patch(handlers::a001_customer::restore)),
    );

    let companies = protected(
        Router::new()
            .route(
                "/",
                get(handlers::a002_company::list).post(handlers::a002_company::create),
            )
            .route("/testdata", post(handlers::a002_company::insert_test_data))
            .route(
                "/identification/:identification",
                get(handlers::a002_company::get_by_identification),
            )
            .route(
                "/:id",
                get(handlers::a002_company::get_by_id)
                    .put(handlers::a002_company::update)
                    .delete(handlers::a002_company::soft_delete),
            )
            .route(
                "/:id/soft-delete",
                patch(handlers::a002_company::soft_delete),
            )
            .route("/:id/restore", patch(handlers::a002_company::restore)),
    );

    let reports = Router::new()
        .merge(protected(
            Router::new()
                .route("/customers", get(handlers::reports::customers))
                .route("/companies", get(handlers::reports::companies))
                .route("/dashboard", get(handlers::reports::dashboard)),
        ))
        .route("/health", get(handlers::reports::health));

    let graphql = post(api::graphql::graphql_handler)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .get(api::graphql::graphiql);

    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        // ========================================
        // HEALTH (PUBLIC)
        // ========================================
        .route("/", get(handlers::health::health))
        .route("/health", get(handlers::health::health))
        .route("/api/auth/token", post(system::handlers::auth::issue_token))
        // ========================================
        // PROTECTED
        // ========================================
        .nest("/api/customers", customers)
        .nest("/api/companies", companies)
        .nest("/api/reports", reports)
        .route("/graphql", graphql)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::{Config, StorageBackend};
    use crate::shared::data::Repositories;
    use crate::system::auth::jwt::tests::{hs256_settings, token_with_roles};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(config: Config) -> Router {
        let state = AppState::new(config, Repositories::in_memory()).unwrap();
        configure_routes(state)
    }

    fn open_app() -> Router {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.default_page_size = 10;
        config.auth.enabled = false;
        app_with(config)
    }

    fn secured_app() -> Router {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.default_page_size = 10;
        config.auth = hs256_settings();
        app_with(config)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }

    fn customer_body() -> Value {
        json!({
            "identification": "12345678901",
            "name": "John",
            "lastname": "Doe",
            "dateBorn": "1990-05-15",
            "gender": "male",
            "status": "active"
        })
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let response = open_app().oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["service"], "partner-hub-bff");
        assert_eq!(body["storageBackend"], "memory");
    }

    #[tokio::test]
    async fn test_customer_lifecycle_over_rest() {
        let app = open_app();

        let created = app
            .clone()
            .oneshot(json_request("POST", "/api/customers", customer_body()))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        let id = created["id"].as_str().unwrap().to_string();

        let duplicate = app
            .clone()
            .oneshot(json_request("POST", "/api/customers", customer_body()))
            .await
            .unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(duplicate).await["error"], "CONFLICT");

        let by_identification = app
            .clone()
            .oneshot(empty_request(
                "GET",
                "/api/customers/identification/12345678901",
            ))
            .await
            .unwrap();
        assert_eq!(by_identification.status(), StatusCode::OK);

        let updated = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/customers/{}", id),
                json!({ "name": "Johnny" }),
            ))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(body_json(updated).await["name"], "Johnny");

        let deleted = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/api/customers/{}", id)))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/customers/{}", id)))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let restored = app
            .clone()
            .oneshot(empty_request(
                "PATCH",
                &format!("/api/customers/{}/restore", id),
            ))
            .await
            .unwrap();
        assert_eq!(restored.status(), StatusCode::OK);
        let restored = body_json(restored).await;
        assert_eq!(restored["status"], "active");
        assert!(restored.get("deletedAt").is_none());
    }

    #[tokio::test]
    async fn test_validation_and_pagination_errors() {
        let app = open_app();

        let mut blank = customer_body();
        blank["name"] = json!("   ");
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/customers", blank))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/companies?limit=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/companies/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_body() {
        let app = open_app();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/customers?status=archived"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["message"].is_string());

        let truncated = Request::builder()
            .method("POST")
            .uri("/api/companies")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"identification": "9001"#))
            .unwrap();
        let response = app.clone().oneshot(truncated).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");

        let untyped = Request::builder()
            .method("PUT")
            .uri(format!("/api/customers/{}", uuid::Uuid::new_v4()))
            .body(Body::from(r#"{"name":"Johnny"}"#))
            .unwrap();
        let response = app.clone().oneshot(untyped).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_company_testdata_and_listing() {
        let app = open_app();
        let seeded = app
            .clone()
            .oneshot(empty_request("POST", "/api/companies/testdata"))
            .await
            .unwrap();
        assert_eq!(seeded.status(), StatusCode::OK);
        assert_eq!(body_json(seeded).await["inserted"], 3);

        let page = app
            .clone()
            .oneshot(empty_request("GET", "/api/companies?limit=2"))
            .await
            .unwrap();
        let page = body_json(page).await;
        assert_eq!(page["count"], 2);
        assert!(page["nextCursor"].is_string());
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = secured_app();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/customers"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/reports/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/graphql"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/graphql", json!({ "query": "{ health { status } }" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_report_roles() {
        let app = secured_app();

        let mut request = empty_request("GET", "/api/reports/dashboard");
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token_with_roles(&["manager"]))
                .parse()
                .unwrap(),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["totalCustomers"], 0);

        let mut request = empty_request("GET", "/api/reports/customers");
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token_with_roles(&["manager"]))
                .parse()
                .unwrap(),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let mut request = empty_request("GET", "/api/reports/customers?dateFrom=2024-01-01");
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token_with_roles(&["analyst"]))
                .parse()
                .unwrap(),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["dateRange"]["from"], "2024-01-01");
    }

    #[tokio::test]
    async fn test_token_endpoint_requires_parameters() {
        let response = open_app()
            .oneshot(json_request("POST", "/api/auth/token", json!({ "clientId": "abc" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("domain"));
    }
}
