//! Application services: use-case orchestration.
//!
//! Each service module implements a single pipeline stage by composing domain
//! logic with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`; never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod build;
pub mod deploy;
pub mod fingerprint;
pub mod plan;
pub mod resources;
pub mod updater;
pub mod verify;
