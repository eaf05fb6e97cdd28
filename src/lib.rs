//! Homework watch: reports homework review status changes to Telegram.
//!
//! # Architecture
//!
//! One poll cycle flows through independent stages:
//! Status API → validator → change detector → verdict → state store → chat
//!
//! - **Source**: fetches the raw status payload (`reqwest`)
//! - **Validator**: checks the payload shape
//! - **Detector**: compares the newest record with the stored snapshot
//! - **Verdict**: turns a status code into message text
//! - **Store**: remembers the last reported status per homework (SQLite)
//! - **Notify**: sends messages, once per failure streak for errors

pub mod config;
pub mod detector;
pub mod error;
pub mod homework;
pub mod notify;
pub mod poll;
pub mod source;
pub mod store;
pub mod validator;
pub mod verdict;

pub use config::{Credentials, WatchConfig};
pub use error::{Result, Severity, WatchError};
pub use homework::{StatusRecord, StoredSnapshot};
pub use poll::{PollLoop, PollOutcome};
pub use store::StateStore;
