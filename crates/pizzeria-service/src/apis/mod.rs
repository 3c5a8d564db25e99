//! Request handlers, grouped by resource.

pub mod management;
pub mod menu;
pub mod orders;
