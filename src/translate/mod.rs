pub mod backend;
pub mod orchestrator;
pub mod retry;

pub use backend::{GoogleTranslator, Translator};
pub use orchestrator::{ApplyStats, Applied, Orchestrator};
pub use retry::{with_retry, RetryPolicy, Retried};
