#[derive(Clone)]
struct AppState {
    inner: Arc<Mutex<ResidencyApi>>,
}

impl AppState {
    fn new(sqlite_path: Option<String>) -> Result<Self, ServerError> {
        let mut api = ResidencyApi::new();
        if let Some(path) = sqlite_path {
            api.attach_sqlite_store(path)?;
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(api)),
        })
    }
}
