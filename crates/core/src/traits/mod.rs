//! Platform-agnostic trait abstractions.
//!
//! The control loops never talk to an operating system or a HAL directly;
//! they receive a [`Clock`] for elapsed-time checks and a [`CancelSignal`]
//! for operator aborts. Platform crates provide the real implementations,
//! tests use [`MockClock`] and [`AbortFlag`].

pub mod cancel;
pub mod time;

pub use cancel::{AbortFlag, CancelSignal, NeverCancel};
pub use time::{Clock, MockClock};
