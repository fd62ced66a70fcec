//! Common utilities and shared types for sanction.
//!
//! This crate provides foundational components used across all sanction crates:
//!
//! - **Configuration**: Matcher, strategy and suspension settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use sanction_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let tz = config.default_timezone()?;
//!     let id = IdGenerator::new().generate_at(std::time::SystemTime::now());
//!     println!("Suspension {id} evaluated in {tz}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, MatcherConfig, RegexLimits, StrategyConfig, SuspensionConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
