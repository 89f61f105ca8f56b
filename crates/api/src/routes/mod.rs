//! Route Handlers

pub mod data;
pub mod email;
