use axum::Json;

use whispr_types::api::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        name: "whispr",
        version: env!("CARGO_PKG_VERSION"),
    })
}
