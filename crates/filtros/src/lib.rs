//! Filtros - keeps a dashboard's filter controls in sync with the page URL.
//!
//! The page's query string is the only source of truth. It is parsed into a
//! [`FilterState`], projected onto whatever controls the page exposes, and
//! every user interaction is turned into the URL of the next page load.

pub mod config;
pub mod controller;
pub mod controls;
pub mod debounce;
pub mod error;
pub mod query;
pub mod sync;
pub mod types;

pub use config::Config;
pub use controller::{FilterController, Navigation};
pub use controls::{project_to_controls, Control, ControlRole, ControlSet};
pub use error::{FilterError, Result};
pub use query::{parse, rewrite_link, serialize};
pub use sync::apply_field_change;
pub use types::{Field, FilterState};
