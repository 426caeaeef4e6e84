pub mod trending;
pub use trending::aggregate_trending;

pub mod tracking_service;
pub mod tracking_service_impl;
pub use tracking_service::{SessionOutcome, TrackError, TrackingService, spawn_record_search};
pub use tracking_service_impl::{Backend, CollectionRef, SearchTracker};
