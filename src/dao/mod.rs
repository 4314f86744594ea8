/// Persisted record definitions.
pub mod models;
/// Room, membership and vote persistence.
pub mod room_store;
/// Storage abstraction layer for database operations.
pub mod storage;
