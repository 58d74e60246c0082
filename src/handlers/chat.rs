use axum::{extract::State, http::StatusCode, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::{
    chatbot::{self, Catalog, ChatRequest, ChatResponse, ReplySource},
    db,
    error::{AppError, AppResult},
    AppState,
};

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<(StatusCode, Json<ChatResponse>)> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    if let Some(response) = state.chat.ask_remote(&request).await {
        debug!(username = %request.username, "Chat answered by remote service");
        return Ok((
            StatusCode::OK,
            Json(ChatResponse {
                response,
                source: ReplySource::Remote,
            }),
        ));
    }

    let (products, brands) = tokio::try_join!(db::fetch_all_products(&state.db), db::fetch_all_brands(&state.db))?;

    let mut rng = StdRng::from_entropy();
    let catalog = Catalog {
        products: &products,
        brands: &brands,
    };
    let response = chatbot::local_reply(&request.message, catalog, &mut rng);

    info!(
        username = %request.username,
        intent = ?chatbot::detect_intent(&request.message),
        "Chat answered locally"
    );

    Ok((
        StatusCode::OK,
        Json(ChatResponse {
            response,
            source: ReplySource::Local,
        }),
    ))
}
