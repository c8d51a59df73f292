//! Host-facing view state: notifications and the status bar line.

pub mod statusbar;
pub mod toast;

pub use statusbar::{SaveState, StatusBarInfo};
pub use toast::{Toast, ToastEntry, ToastLevel};
