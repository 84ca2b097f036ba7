//! Follow graph resolution for the work calendar.
//!
//! Users follow the colleagues they share an active project with. Explicit
//! overrides add or remove individual relationships on top of that, and a
//! remove always wins.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
