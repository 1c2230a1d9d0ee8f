mod error;
mod extractor;
mod init;
mod middleware;

pub mod models;
pub mod routers;

pub use init::{setup_config, setup_db, setup_router};
use serde::Serialize;

/// The status/message envelope every HTTP endpoint answers with.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Consumes the response and returns the inner data if successful.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}
