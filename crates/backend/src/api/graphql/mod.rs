pub mod company;
pub mod customer;
pub mod health;
pub mod schema;
pub mod types;

use async_graphql::http::GraphiQLSource;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};

use crate::state::AppState;
use crate::system::auth::extractor::CurrentUser;

pub use schema::{build_schema, AppSchema};

/// POST /graphql
pub async fn graphql_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request.data(user)).await)
}

/// GET /graphql
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
