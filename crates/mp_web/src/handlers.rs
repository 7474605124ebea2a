use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use mp_core::MarketOverview;
use tracing::{error, info, warn};
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub queries: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewParams {
    pub query: Option<String>,
}

/// Envelope shared by every non-listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            response: None,
        }
    }

    pub fn answer(response: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: None,
            response: Some(response.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            response: None,
        }
    }
}

fn rejected(rejection: JsonRejection) -> Json<StatusResponse> {
    warn!("Rejected request body: {}", rejection.body_text());
    Json(StatusResponse::error(rejection.body_text()))
}

/// Saves every resolved article. A failed save is logged and the rest of the
/// batch is still attempted; the response reports failures afterwards.
pub async fn process(
    State(state): State<Arc<AppState>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Json<StatusResponse> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected(rejection),
    };

    let result = state.resolver.resolve(&request.queries).await;
    let mut failures = Vec::new();
    for article in &result.articles {
        if let Err(e) = state.store.save(article).await {
            error!("Error saving '{}': {}", article.title, e);
            failures.push(e.to_string());
        }
    }

    if failures.is_empty() {
        info!("Processing completed successfully");
        Json(StatusResponse::success("Data processed successfully"))
    } else {
        Json(StatusResponse::error(format!(
            "Failed to save {} of {} articles: {}",
            failures.len(),
            result.articles.len(),
            failures.join("; ")
        )))
    }
}

pub async fn list_news(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_all().await {
        Ok(news) => {
            info!("Retrieved {} news articles", news.len());
            Json(news).into_response()
        }
        Err(e) => {
            error!("Error retrieving news: {}", e);
            Json(StatusResponse::error(e.to_string())).into_response()
        }
    }
}

pub async fn general_query(
    State(state): State<Arc<AppState>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Json<StatusResponse> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected(rejection),
    };
    let Some(query) = request.queries.first() else {
        return Json(StatusResponse::error("No query provided"));
    };
    Json(StatusResponse::answer(state.general.answer(query).await))
}

pub async fn overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverviewParams>,
) -> Response {
    match state.store.list_all().await {
        Ok(news) => {
            let overview = MarketOverview::from_articles(
                news.iter().map(|stored| &stored.article),
                params.query.as_deref(),
            );
            Json(overview).into_response()
        }
        Err(e) => {
            error!("Error building market overview: {}", e);
            Json(StatusResponse::error(e.to_string())).into_response()
        }
    }
}
