//! Container-backed test infrastructure shared by the domain crates.
//!
//! - `TestDatabase`: throwaway PostgreSQL (feature `postgres`, default)
//! - `TestRedis`: throwaway Redis (feature `redis`)
//!
//! Containers are removed when the value is dropped. Tests using these need a
//! Docker daemon and are marked `#[ignore]` in the crates that use them.
//!
//! ```rust,ignore
//! use test_utils::TestRedis;
//!
//! #[tokio::test]
//! #[ignore = "requires docker"]
//! async fn relay_roundtrip() {
//!     let redis = TestRedis::new().await;
//!     let producer = StreamProducer::from_stream_def::<UserEventsStream>(redis.manager().await);
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "redis")]
pub use redis::TestRedis;
