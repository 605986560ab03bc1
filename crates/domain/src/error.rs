//! Domain error types.

use thiserror::Error;

use crate::actor::Role;

/// Errors raised by capability narrowing.
#[derive(Debug, Error)]
pub enum RoleError {
    /// The caller holds a different role than the operation requires.
    #[error("this action requires the {required} role (caller is a {actual})")]
    Forbidden { required: Role, actual: Role },
}
