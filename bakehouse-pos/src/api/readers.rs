//! Terminal reader listing
//!
//! GET /api/readers — reader banner data for the console

use crate::gateway::PaymentGateway;
use crate::state::AppState;
use axum::extract::State;
use shared::error::{ApiResponse, PosError};
use shared::payment::TerminalReader;

pub async fn list_readers(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<TerminalReader>>, PosError> {
    let readers = state.gateway.list_readers().await.map_err(PosError::from)?;
    if readers.is_empty() {
        // Not an error at the gateway, but the operator needs to know.
        return Ok(ApiResponse::info(
            "no terminal readers registered; check the terminal connection",
            readers,
        ));
    }
    Ok(ApiResponse::success(readers))
}
