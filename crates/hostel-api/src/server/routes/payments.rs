#[derive(Debug, Serialize)]
struct PaymentListResponse {
    schema_version: String,
    payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
struct PaymentResponse {
    schema_version: String,
    payment: Payment,
    warnings: Vec<String>,
}

async fn list_resident_payments(
    Path(resident_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PaymentListResponse>, HttpApiError> {
    let api = state.inner.lock().await;
    if api.directory().resident(&resident_id).is_none() {
        return Err(HttpApiError::not_found(
            "resident not found",
            Some(format!("resident_id={resident_id}")),
        ));
    }

    Ok(Json(PaymentListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        payments: api
            .directory()
            .payments_of_resident(&resident_id)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

async fn mark_payment_successful(
    Path(payment_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PaymentResponse>, HttpApiError> {
    let mut api = state.inner.lock().await;
    let payment = api
        .mark_payment_successful(&payment_id)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok(Json(PaymentResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        payment,
        warnings: api.warnings(),
    }))
}
