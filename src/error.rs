use smol_str::SmolStr;
use thiserror::Error;

use crate::view::{ControlId, FormId};

#[derive(Debug, Error)]
pub enum UiError {
    #[error("control {0:?} does not exist")]
    UnknownControl(ControlId),
    #[error("control {0:?} is not a container")]
    NotAContainer(ControlId),
    #[error("control {child:?} is not a child of {parent:?}")]
    NotAChild { parent: ControlId, child: ControlId },
    #[error("inserting {child:?} into {parent:?} would create a cycle")]
    WouldCreateCycle { parent: ControlId, child: ControlId },
    #[error("unknown control type `{0}`")]
    UnknownControlType(SmolStr),
    #[error("expected object `{0}`")]
    MissingObject(SmolStr),
    #[error("invalid value `{value}` for `{name}`")]
    InvalidValue { name: SmolStr, value: String },
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    #[error("form {0:?} is not registered")]
    UnknownForm(FormId),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = UiError> = std::result::Result<T, E>;
