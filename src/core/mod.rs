//! Core business logic - framework-agnostic subscription, statistics and user operations.

/// Subscription statistics and cost normalization
pub mod stats;
/// Owner-scoped subscription CRUD
pub mod subscription;
/// User registration and password verification
pub mod user;
/// Request validation for subscription writes
pub mod validation;
