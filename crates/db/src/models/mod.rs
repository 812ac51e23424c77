//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the `Deserialize` DTOs used to create or query it.

pub mod artifact;
pub mod creative;
pub mod event;
pub mod hitl_task;
pub mod job;
pub mod run;
pub mod status;
