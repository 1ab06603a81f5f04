#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
    Persistence(PersistenceError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
            Self::Persistence(err) => write!(f, "server persistence error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<PersistenceError> for ServerError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn from_lifecycle(err: LifecycleError) -> Self {
        let (status, error_code) = match &err {
            LifecycleError::UnknownHostel(_)
            | LifecycleError::UnknownRoom(_)
            | LifecycleError::UnknownResident(_)
            | LifecycleError::UnknownPayment(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            LifecycleError::RoomFull(_) | LifecycleError::HostelFull(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::CapacityExceeded)
            }
            LifecycleError::InvalidTransition { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidTransition)
            }
            LifecycleError::MissingField(_)
            | LifecycleError::DuplicateId(_)
            | LifecycleError::DuplicateEmail(_)
            | LifecycleError::RoomNotInHostel { .. }
            | LifecycleError::ContractOutOfRange(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed)
            }
        };

        Self {
            status,
            error: ApiError::new(error_code, err.to_string(), None),
        }
    }

    fn not_found(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(ErrorCode::NotFound, message, details),
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
