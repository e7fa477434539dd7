use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    #[error("Duplicate {field}")]
    Duplicate { field: String },

    #[error("No active approver in the session")]
    NoActiveApprover,

    #[error("Delivery already in flight for {request_id}")]
    DeliveryInFlight { request_id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Remote operation failed: {message}")]
    Remote { message: String },
}

impl Error {
    /// Wrap a transport or bridge failure.
    pub fn remote(message: impl ToString) -> Self {
        Self::Remote {
            message: message.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
