pub mod config;
pub mod logging;

// Core modules
pub mod combo;
pub mod dispatch;
pub mod endpoint;
pub mod fetch;
pub mod outcome;
pub mod registry;

pub use combo::{ComboLoader, PathFor};
pub use fetch::{HttpResourceLoader, LoadSignal, ResourceLoader};
pub use outcome::{FailureKind, FragmentLoadError, LoadOutcome};
