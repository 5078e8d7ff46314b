//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Keeping the rules here lets the background worker reuse them.

pub mod rent_service;
pub mod storage_service;
pub mod user_service;
