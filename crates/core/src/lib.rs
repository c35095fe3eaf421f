//! # wing
//!
//! Orchestration engine for Wing lung function test sessions.
//!
//! A session is a series of recordings. Each recording is uploaded to its own
//! single-use upload target, processed by the service, and then folded back
//! into the local session, whose clinical state is derived from the pattern of
//! test outcomes.
//!
//! ## Design Philosophy
//!
//! - **Explicit collaborators**: the engine only sees the service through
//!   [`SessionService`]; configuration is a value passed to the service's
//!   constructor, never global state.
//! - **Presence over coalescing**: remote snapshots are merged field by field
//!   according to whether the service actually reported each field.
//! - **Message passing for observers**: state changes and poll progress are
//!   published on a broadcast channel rather than through callbacks.
//!
//! ## Example
//!
//! ```ignore
//! let service = Arc::new(HttpSessionService::new(config)?);
//! let manager = TestSessionManager::start(service, &patient).await?;
//! manager.submit_recording("blow-1.wav").await?;
//! let state = manager.process_session().await?;
//! ```

pub mod error;
pub mod events;
pub mod manager;
pub mod poll;
pub mod pool;
pub mod session;
pub mod state;

pub use error::{Error, Result};
pub use events::{EventBus, ProcessingOutcome, SessionEvent};
pub use manager::TestSessionManager;
pub use poll::{POLLING_INTERVAL, PollPhase, PollProgress, TIMEOUT_THRESHOLD};
pub use pool::UploadTargetPool;
pub use session::TestSession;
pub use state::{FAILED_TESTS_THRESHOLD, InterruptionReason, LOCAL_FAILURE_THRESHOLD, TestSessionState, derive_state};
pub use wing_protocol as protocol;
pub use wing_runtime as runtime;
pub use wing_runtime::{ClientConfig, HttpSessionService, ServiceError, SessionService};
