use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use contracts::{
    ApiError, BackfillReport, ErrorCode, ExtendContractRequest, Hostel, Month, NewHostelRequest,
    NewRoomRequest, Payment, RegisterResidentRequest, Resident, Room, UpdateResidentRequest,
    SCHEMA_VERSION_V1,
};
use hostel_core::{DepartureOutcome, LifecycleError, RegistrationOutcome};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

use crate::{PersistenceError, ResidencyApi};

include!("error.rs");
include!("state.rs");
include!("routes/hostels.rs");
include!("routes/residents.rs");
include!("routes/payments.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, sqlite_path: Option<String>) -> Result<(), ServerError> {
    let state = AppState::new(sqlite_path)?;
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("residency api listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/hostels", post(create_hostel).get(list_hostels))
        .route("/api/v1/hostels/{hostel_id}", get(get_hostel))
        .route(
            "/api/v1/hostels/{hostel_id}/rooms",
            post(create_room).get(list_rooms),
        )
        .route(
            "/api/v1/hostels/{hostel_id}/rooms/available",
            get(list_available_rooms),
        )
        .route(
            "/api/v1/hostels/{hostel_id}/residents",
            get(list_hostel_residents),
        )
        .route(
            "/api/v1/residents",
            post(register_resident).get(list_residents),
        )
        .route("/api/v1/residents/booking", post(book_resident))
        .route(
            "/api/v1/residents/contract_ended",
            get(list_contract_ended_residents),
        )
        .route(
            "/api/v1/residents/{resident_id}",
            get(get_resident)
                .put(update_resident)
                .delete(depart_resident),
        )
        .route(
            "/api/v1/residents/{resident_id}/extend",
            post(extend_contract),
        )
        .route(
            "/api/v1/residents/{resident_id}/payments",
            get(list_resident_payments),
        )
        .route(
            "/api/v1/payments/{payment_id}/mark_successful",
            post(mark_payment_successful),
        )
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
