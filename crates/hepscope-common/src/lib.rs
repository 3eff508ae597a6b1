//! hepscope-common: Shared errors, the sandboxed HTTP client and the
//! notification channel used across all hepscope crates.

pub mod error;
pub mod notify;
pub mod sandbox;

// Re-export commonly used types
pub use error::{ApiError, HepscopeError, Result};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use sandbox::SandboxClient;
