use serde::{Deserialize, Serialize};
use validator::Validate;

/// Worker model for creating and validating workers
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct CreateWorker {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Role must be between 1 and 100 characters"
    ))]
    pub role: String,
    pub job_id: Option<i32>,
}

/// Query string accepted by the worker listing
#[derive(Deserialize, Debug, Default, Clone, Validate)]
pub struct WorkerQuery {
    /// Case-insensitive substring of the worker name
    pub name: Option<String>,
    /// Case-insensitive substring of the role
    pub role: Option<String>,
    pub job_id: Option<i32>,
}
