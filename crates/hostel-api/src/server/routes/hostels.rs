#[derive(Debug, Serialize)]
struct HostelResponse {
    schema_version: String,
    hostel: Hostel,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HostelListResponse {
    schema_version: String,
    hostels: Vec<Hostel>,
}

#[derive(Debug, Serialize)]
struct RoomResponse {
    schema_version: String,
    room: Room,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RoomListResponse {
    schema_version: String,
    rooms: Vec<Room>,
}

async fn create_hostel(
    State(state): State<AppState>,
    Json(request): Json<NewHostelRequest>,
) -> Result<(StatusCode, Json<HostelResponse>), HttpApiError> {
    let mut api = state.inner.lock().await;
    let hostel = api
        .create_hostel(&request)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok((
        StatusCode::CREATED,
        Json(HostelResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            hostel,
            warnings: api.warnings(),
        }),
    ))
}

async fn list_hostels(State(state): State<AppState>) -> Json<HostelListResponse> {
    let api = state.inner.lock().await;
    Json(HostelListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        hostels: api.directory().hostels.values().cloned().collect(),
    })
}

async fn get_hostel(
    Path(hostel_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<HostelListItemResponse>, HttpApiError> {
    let api = state.inner.lock().await;
    let hostel = api
        .directory()
        .hostel(&hostel_id)
        .cloned()
        .ok_or_else(|| {
            HttpApiError::not_found("hostel not found", Some(format!("hostel_id={hostel_id}")))
        })?;

    Ok(Json(HostelListItemResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        hostel,
    }))
}

#[derive(Debug, Serialize)]
struct HostelListItemResponse {
    schema_version: String,
    hostel: Hostel,
}

async fn create_room(
    Path(hostel_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<NewRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), HttpApiError> {
    let mut api = state.inner.lock().await;
    let room = api
        .create_room(&hostel_id, &request)
        .map_err(HttpApiError::from_lifecycle)?;

    Ok((
        StatusCode::CREATED,
        Json(RoomResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            room,
            warnings: api.warnings(),
        }),
    ))
}

async fn list_rooms(
    Path(hostel_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RoomListResponse>, HttpApiError> {
    let api = state.inner.lock().await;
    require_hostel(&api, &hostel_id)?;

    Ok(Json(RoomListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        rooms: api
            .directory()
            .rooms_of_hostel(&hostel_id)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

async fn list_available_rooms(
    Path(hostel_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RoomListResponse>, HttpApiError> {
    let api = state.inner.lock().await;
    require_hostel(&api, &hostel_id)?;

    Ok(Json(RoomListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        rooms: api
            .directory()
            .available_rooms(&hostel_id)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

async fn list_hostel_residents(
    Path(hostel_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResidentListResponse>, HttpApiError> {
    let api = state.inner.lock().await;
    require_hostel(&api, &hostel_id)?;

    Ok(Json(ResidentListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        residents: api
            .directory()
            .residents_of_hostel(&hostel_id)
            .into_iter()
            .cloned()
            .collect(),
    }))
}
