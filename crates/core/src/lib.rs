//! Grandview Core Library
//!
//! Room board and housekeeping models, the record gateway, and the domain
//! façades the front-ends talk to.

pub mod error;
pub mod gateway;
pub mod invariants;
pub mod mapper;
pub mod models;
pub mod notify;
pub mod services;
pub mod stats;
pub mod transitions;

pub use error::{Error, Result, ResultExt};
pub use gateway::{Collection, InMemoryGateway, RawRecord, RecordGateway, StoreSnapshot};
pub use models::*;
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use services::{
    BulkFailure, BulkOutcome, FacadeOptions, HousekeepingService, RoomService, DEFAULT_OPERATOR,
};
pub use stats::HousekeepingStats;
pub use transitions::{TaskPatch, TransitionPolicy};
