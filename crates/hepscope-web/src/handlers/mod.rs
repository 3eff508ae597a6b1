//! HTTP handlers for all web routes.

pub mod page;
pub mod sessions;
pub mod papers;
pub mod feedback;
pub mod pdf;
pub mod literature;
