// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Test utility functions for use with the controller and storage tests
pub use ::serde_json;
pub use pretty_assertions::assert_eq;

#[cfg(feature = "database")]
pub mod database;

/// Helper macro to compare a `[Serialize]` implementor with a JSON literal
///
/// Asserts that the left expression equals the right JSON literal when serialized.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Debug, Serialize)]
/// struct User {
///     name: String,
///     age: u64,
/// }
///
/// let bob = User {
///     name: "bob".into(),
///     age: 42,
/// };
///
/// gather_test_util::assert_eq_json!(
///     bob,
///     {
///         "name": "bob",
///         "age": 42,
///     }
/// );
/// ```
#[macro_export]
macro_rules! assert_eq_json {
    ($val:expr,$($json:tt)+) => {
        let val: $crate::serde_json::Value = $crate::serde_json::to_value(&$val).expect("Expected value to be serializable");

        $crate::assert_eq!(val, $crate::serde_json::json!($($json)+));
    };
}
