//! Core modules for CalmPath

pub mod adapter;
pub mod api;
pub mod breathing;
pub mod checklist;
pub mod clock;
pub mod offline;
pub mod provider;
pub mod session;
pub mod store;
pub mod triage;
pub mod tutorial;

pub use api::{create_router, create_router_with, run_server};
pub use breathing::PhaseCycler;
pub use offline::OfflineNavigator;
pub use session::CrisisSession;
pub use triage::TriageEngine;
pub use tutorial::TutorialEngine;
