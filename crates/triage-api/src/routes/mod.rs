//! # API Route Modules
//!
//! - `validation`: emergency patient record validation.

pub mod validation;
