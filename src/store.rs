use crate::PlanRecord;
use crate::export::plan_csv_bytes;

const SHEET_URL_ENV: &str = "WORKOUT_SHEET_URL";

/// Determine the sheet endpoint to use.
///
/// If the `WORKOUT_SHEET_URL` environment variable is set, its value takes
/// precedence over any URL stored in the application settings.
pub fn resolve_sheet_url(settings_url: Option<&str>) -> Option<String> {
    std::env::var(SHEET_URL_ENV)
        .ok()
        .or_else(|| settings_url.map(|s| s.to_string()))
}

/// A read or write against the remote sheet failed. The operation is fatal
/// for the current command; nothing was partially committed and no retry
/// happens here.
#[derive(Debug)]
pub enum StoreUnavailableError {
    Status(u16, String),
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for StoreUnavailableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreUnavailableError::Status(code, body) => {
                write!(f, "sheet endpoint returned {code}: {body}")
            }
            StoreUnavailableError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreUnavailableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreUnavailableError::Status(..) => None,
            StoreUnavailableError::Transport(e) => Some(&**e),
        }
    }
}

/// Whole-table access to the external plan store.
///
/// The sheet has no row-level primitives: a load reads everything and a save
/// replaces everything. Keeping the seam this narrow means a different
/// backing store only has to implement these two calls.
pub trait PlanStore {
    fn read_all(&self) -> Result<Vec<u8>, StoreUnavailableError>;
    fn write_all(&self, records: &[PlanRecord]) -> Result<(), StoreUnavailableError>;
}

/// HTTP adapter for a published sheet endpoint that serves the plan table as
/// CSV on GET and accepts a full replacement table on POST.
pub struct SheetStore {
    url: String,
}

impl SheetStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl PlanStore for SheetStore {
    fn read_all(&self) -> Result<Vec<u8>, StoreUnavailableError> {
        log::info!("Reading plan table from {}", self.url);
        let response = ureq::get(&self.url).set("Accept", "text/csv").call();
        let body = match response {
            Ok(r) => r
                .into_string()
                .map_err(|e| StoreUnavailableError::Transport(Box::new(e)))?,
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(StoreUnavailableError::Status(code, body));
            }
            Err(e) => return Err(StoreUnavailableError::Transport(Box::new(e))),
        };
        Ok(body.into_bytes())
    }

    fn write_all(&self, records: &[PlanRecord]) -> Result<(), StoreUnavailableError> {
        let table =
            plan_csv_bytes(records).map_err(|e| StoreUnavailableError::Transport(Box::new(e)))?;
        log::info!("Writing {} plan rows to {}", records.len(), self.url);
        match ureq::post(&self.url)
            .set("Content-Type", "text/csv")
            .send_bytes(&table)
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(StoreUnavailableError::Status(code, body))
            }
            Err(e) => Err(StoreUnavailableError::Transport(Box::new(e))),
        }
    }
}
