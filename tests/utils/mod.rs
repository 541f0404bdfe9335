pub mod actions;
pub mod mocks;
pub mod outcomes;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::response_json;
#[allow(unused_imports)]
pub use mocks::RecordingAnnouncer;
pub use outcomes::OutcomeBuilder;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
