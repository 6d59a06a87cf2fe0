//! Client side of the to-do list: the HTTP item store adapter, the list
//! controller that reconciles local state with it, and the view model.

pub mod config;
pub mod controller;
pub mod error;
pub mod store;
pub mod view;

pub use config::{load_settings, ListFallback, StoreSettings};
pub use controller::{
    ControllerError, EditOutcome, EditSession, Feedback, ListAction, ListController,
    PendingAction,
};
pub use error::{ConfigError, StoreError};
pub use store::{HttpItemStore, ItemStore};
pub use view::{ListView, Notification, NotificationKind};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
