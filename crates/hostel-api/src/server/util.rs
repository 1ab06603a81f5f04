fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS,PUT,PATCH,DELETE"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

fn current_month() -> Month {
    Month::from_date(Utc::now().date_naive())
}

fn require_hostel(api: &ResidencyApi, hostel_id: &str) -> Result<(), HttpApiError> {
    if api.directory().hostel(hostel_id).is_none() {
        return Err(HttpApiError::not_found(
            "hostel not found",
            Some(format!("hostel_id={hostel_id}")),
        ));
    }
    Ok(())
}
