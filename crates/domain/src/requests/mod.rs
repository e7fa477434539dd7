/// Request and line-item types
pub mod request;

/// Multi-collaborator draft builder
pub mod draft;

/// Input DTOs
pub mod inputs;

pub use draft::{Collaborator, ItemAssignment, RequestDraft};
pub use request::{AssignedEmployee, EppRequest, EppRequestItem, RequestParts, RequestReason};
