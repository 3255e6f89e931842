//! Error types for Beamline

use crate::scene::ObjectId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeamlineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Duplicate object id: {0}")]
    DuplicateId(ObjectId),

    #[error("Unknown object: {0}")]
    UnknownObject(ObjectId),

    #[error("Object is fixed by the stage and cannot be edited: {0}")]
    ObjectLocked(ObjectId),

    #[error("Mirror budget exceeded (stage allows {max})")]
    MirrorBudgetExceeded { max: usize },
}

pub type Result<T> = std::result::Result<T, BeamlineError>;
