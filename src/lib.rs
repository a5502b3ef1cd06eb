//! Generator of recording test stubs for Rust traits.
//!
//! Given named source roots and a module-qualified trait path, `stubgen`
//! locates the trait, flattens its supertrait closure, and emits a standalone
//! source file defining a stub struct that records every call, replays
//! configured return values, and accepts closure overrides per method. An
//! alternate backend emits an instrumented delegating wrapper instead.

pub mod cli;
pub mod commands;
pub mod error;
pub mod flatten;
pub mod generate;
pub mod instrument;
pub mod locate;
pub mod report;
pub mod resolve;
pub mod synth;
pub mod util;

pub use error::{Error, Result};
pub use generate::{generate_monitor, generate_stub, trait_report};
pub use locate::{Locator, SourceCache};
