use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::{Deserialize, Serialize};

use couchparty_core::session::SessionSnapshot;

use crate::error::AppError;
use crate::state::AppState;

/// Page phones open to join.
pub const CONTROLLER_PAGE: &str = "controller.html";

/// Read-only session snapshot.
pub async fn get_state(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let party = state.party.read().await;
    Json(party.session().snapshot())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinInfo {
    pub url: String,
}

/// The URL a display encodes into its join QR code.
pub async fn join_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JoinInfo>, AppError> {
    let base = match &state.config.public_url {
        Some(url) => url.clone(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .filter(|h| !h.is_empty())
                .ok_or_else(|| AppError::BadRequest("missing Host header".to_string()))?;
            format!("http://{host}")
        },
    };
    Ok(Json(JoinInfo {
        url: controller_url(&base),
    }))
}

fn controller_url(base: &str) -> String {
    format!("{}/{CONTROLLER_PAGE}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_url_handles_trailing_slash() {
        assert_eq!(
            controller_url("http://10.0.0.2:3000/"),
            "http://10.0.0.2:3000/controller.html"
        );
        assert_eq!(
            controller_url("https://party.example"),
            "https://party.example/controller.html"
        );
    }
}
