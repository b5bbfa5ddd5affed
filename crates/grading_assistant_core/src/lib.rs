pub mod domain;
pub mod ports;

pub use domain::{
    Document, DocumentPage, DocumentStatus, GradingResult, GradingReview, GradingStatus, Rubric,
    RubricDraft, RubricValidationError, MIN_PROMPT_CHARS,
};
pub use ports::{DocRouterService, PortError, PortResult};
