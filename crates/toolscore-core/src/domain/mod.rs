//! Domain models for Toolscore.
//!
//! - `ToolCall`: the canonical, provider-independent call record
//! - `ToolscoreError` / `ValidationError`: the error taxonomy

pub mod call;
pub mod error;

pub use call::{args_equal, args_from_value, json_equal, Args, ToolCall};
pub use error::{Result, ToolscoreError, ValidationError};
