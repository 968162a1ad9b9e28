//! Operation Planner
//!
//! Translates filesystem commands (ls, mkdir, rm, mv, put, get) into commits
//! and transfers against a [`Backend`](crate::backend::Backend). Planning is
//! pure and lives in [`plan`]; [`FsCommandService`] fetches the KeySet, plans
//! and submits.

mod commands;
mod local;
pub mod plan;

pub use commands::{
    FsCommandService, GetOutcome, GetRequest, MkdirOutcome, MvOutcome, PutOutcome, RmOutcome,
};
pub use local::{expand_local, place_file, Placement};
pub use plan::{DeletePlan, DeleteScope, MkdirPlan, MovePlan, PutPlan, Upload};
