use std::convert::Infallible;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use futures_util::stream;
use serde::Deserialize;

use crate::pipeline::{Role, Turn};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// Streaming question endpoint. Fragments are flushed as they arrive so the
/// client can render before generation completes; dropping the connection
/// cancels the pipeline.
pub async fn ask_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> impl IntoResponse {
    let AskRequest { question, history } = request;
    let history = strip_pending_question(history, &question);

    let rx = state.pipeline.respond(question, history);
    let body = Body::from_stream(stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|fragment| (Ok::<_, Infallible>(Bytes::from(fragment)), rx))
    }));

    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

/// The chat UI appends the question to the history before calling. Windowed
/// history must contain only turns strictly preceding the current question,
/// so a trailing user turn that duplicates it is dropped here.
fn strip_pending_question(mut history: Vec<Turn>, question: &str) -> Vec<Turn> {
    if matches!(
        history.last(),
        Some(turn) if turn.role == Role::User && turn.content == question
    ) {
        history.pop();
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_duplicate_of_the_question() {
        let history = vec![
            Turn::new(Role::User, "earlier question"),
            Turn::new(Role::Assistant, "earlier answer"),
            Turn::new(Role::User, "What is osmosis?"),
        ];
        let stripped = strip_pending_question(history, "What is osmosis?");
        assert_eq!(stripped.len(), 2);
        assert_eq!(stripped[1].content, "earlier answer");
    }

    #[test]
    fn keeps_history_that_does_not_end_with_the_question() {
        let history = vec![
            Turn::new(Role::User, "something else"),
            Turn::new(Role::Assistant, "an answer"),
        ];
        let stripped = strip_pending_question(history.clone(), "What is osmosis?");
        assert_eq!(stripped.len(), 2);
    }

    #[test]
    fn assistant_turn_matching_the_question_is_kept() {
        let history = vec![Turn::new(Role::Assistant, "What is osmosis?")];
        let stripped = strip_pending_question(history, "What is osmosis?");
        assert_eq!(stripped.len(), 1);
    }
}
