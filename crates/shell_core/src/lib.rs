//! Permission-gated lifecycle controller and gesture dispatch for a GPU view shell.

pub mod config;
pub mod event_loop;
pub mod gesture;
pub mod lifecycle;
pub mod option;
pub mod permission;

pub use config::{load_settings, ShellSettings};
pub use gesture::{Consumption, GestureClassifier, GestureConfig, GestureEvent, TouchOutcome};
pub use lifecycle::{ActivityHost, LifecycleController};
pub use option::OptionCycler;
pub use permission::{Decision, PermissionGate, PermissionPlatform, PermissionSet};
