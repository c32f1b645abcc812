pub mod request_models;
pub mod request_service;
pub mod request_store;

pub use request_models::{
    Actor, DeskRequest, NewRequest, RequestAction, RequestStatus, RequestSummary, Submission,
};
pub use request_service::{RequestError, RequestService};
pub use request_store::RequestStore;
