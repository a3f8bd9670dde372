//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied (feature: "postgres")
//! - `TestDataBuilder`: deterministic test data
//! - `assertions`: assertion helpers
//!
//! Container-backed tests need a Docker daemon; mark them
//! `#[ignore = "requires Docker"]` and run with `cargo test -- --ignored`.
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!     let name = builder.name("widget");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Seeded from the test name so reruns produce the same values.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name (recommended).
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Unique product name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let name = TestDataBuilder::new(7).name("widget");
    /// assert_eq!(name, "test-widget-7");
    /// ```
    pub fn name(&self, suffix: &str) -> String {
        format!("test-{}-{}", suffix, self.seed)
    }

    /// Non-negative price with two decimals, below 1000.
    pub fn price(&self) -> f64 {
        (self.seed % 100_000) as f64 / 100.0
    }

    /// Non-negative stock below 1000.
    pub fn stock(&self) -> i32 {
        (self.seed % 1_000) as i32
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that `later` is strictly after `earlier`
    pub fn assert_strictly_after<T: PartialOrd + std::fmt::Debug>(
        later: T,
        earlier: T,
        context: &str,
    ) {
        assert!(
            later > earlier,
            "{}: expected {:?} to be after {:?}",
            context,
            later,
            earlier
        );
    }
}
