//! This module holds typed parameters for various endpoint inputs.
//!
//! By using typed parameters, inputs are validated (by type) before they reach the
//! domain layer.

pub(crate) mod oauth;
pub(crate) mod user_action;
