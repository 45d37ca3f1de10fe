//! Session Module
//!
//! Holds the bearer credential and the profile of the logged-in administrator,
//! persisted across process restarts under two fixed keys.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, PROFILE_KEY, TOKEN_KEY};
pub use store::{LoginResponse, Session, SessionState, SessionStore, UserProfile};
