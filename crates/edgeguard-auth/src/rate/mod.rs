//! Fixed-window rate admission backed by the shared cache tier.

pub mod admission;

pub use admission::RateAdmission;
