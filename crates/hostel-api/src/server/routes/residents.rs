#[derive(Debug, Serialize)]
struct ResidentMutationResponse {
    schema_version: String,
    resident: Resident,
    backfill: BackfillReport,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResidentResponse {
    schema_version: String,
    resident: Resident,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResidentListResponse {
    schema_version: String,
    residents: Vec<Resident>,
}

#[derive(Debug, Serialize)]
struct DepartureResponse {
    schema_version: String,
    resident_id: String,
    departed: bool,
    message: String,
    warnings: Vec<String>,
}

fn registration_response(
    api: &ResidencyApi,
    outcome: RegistrationOutcome,
) -> ResidentMutationResponse {
    ResidentMutationResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        resident: outcome.resident,
        backfill: outcome.backfill,
        warnings: api.warnings(),
    }
}

/// Admin registration entry point.
async fn register_resident(
    State(state): State<AppState>,
    Json(request): Json<RegisterResidentRequest>,
) -> Result<(StatusCode, Json<ResidentMutationResponse>), HttpApiError> {
    let mut api = state.inner.lock().await;
    let outcome = api
        .register_resident(&request)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok((
        StatusCode::CREATED,
        Json(registration_response(&api, outcome)),
    ))
}

/// Website booking entry point; same semantics as the admin path.
async fn book_resident(
    State(state): State<AppState>,
    Json(request): Json<RegisterResidentRequest>,
) -> Result<(StatusCode, Json<ResidentMutationResponse>), HttpApiError> {
    let mut api = state.inner.lock().await;
    let outcome = api
        .register_resident(&request)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok((
        StatusCode::CREATED,
        Json(registration_response(&api, outcome)),
    ))
}

async fn list_residents(State(state): State<AppState>) -> Json<ResidentListResponse> {
    let api = state.inner.lock().await;
    Json(ResidentListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        residents: api.directory().residents.values().cloned().collect(),
    })
}

async fn list_contract_ended_residents(
    State(state): State<AppState>,
) -> Json<ResidentListResponse> {
    let api = state.inner.lock().await;
    let residents = api
        .directory()
        .contract_ended_residents(current_month())
        .into_iter()
        .cloned()
        .collect();

    Json(ResidentListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        residents,
    })
}

async fn get_resident(
    Path(resident_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResidentResponse>, HttpApiError> {
    let api = state.inner.lock().await;
    let resident = api
        .directory()
        .resident(&resident_id)
        .cloned()
        .ok_or_else(|| {
            HttpApiError::not_found(
                "resident not found",
                Some(format!("resident_id={resident_id}")),
            )
        })?;

    Ok(Json(ResidentResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        resident,
        warnings: Vec::new(),
    }))
}

async fn update_resident(
    Path(resident_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateResidentRequest>,
) -> Result<Json<ResidentResponse>, HttpApiError> {
    let mut api = state.inner.lock().await;
    let resident = api
        .update_resident(&resident_id, &request)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok(Json(ResidentResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        resident,
        warnings: api.warnings(),
    }))
}

async fn extend_contract(
    Path(resident_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<ExtendContractRequest>,
) -> Result<Json<ResidentMutationResponse>, HttpApiError> {
    let mut api = state.inner.lock().await;
    let (resident, backfill) = api
        .extend_contract(&resident_id, request.extended_months)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok(Json(ResidentMutationResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        resident,
        backfill,
        warnings: api.warnings(),
    }))
}

async fn depart_resident(
    Path(resident_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DepartureResponse>, HttpApiError> {
    let mut api = state.inner.lock().await;
    let outcome = api
        .depart_resident(&resident_id)
        .map_err(HttpApiError::from_lifecycle)?;

    let (departed, message) = match outcome {
        DepartureOutcome::Departed(_) => (true, "resident departed".to_string()),
        DepartureOutcome::AlreadyDeparted => {
            (false, "resident had already departed".to_string())
        }
    };

    Ok(Json(DepartureResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        resident_id,
        departed,
        message,
        warnings: api.warnings(),
    }))
}
