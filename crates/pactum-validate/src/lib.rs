//! # Pactum Validate
//!
//! Constraint validation for values described by `pactum_core::Reflect`.
//!
//! [`validate`] walks a populated value and checks every payload field
//! against the constraints declared on it:
//!
//! - string length bounds (`min_length`, `max_length`, counted in characters)
//! - regular expression match (`pattern`, unanchored)
//! - numeric bounds (`minimum`, `maximum`, compared as `f64`)
//! - allowed values (`enum_values`)
//! - sequence length bounds (`min_items`, `max_items`)
//!
//! Every violation in the value is collected before returning. Fields bound
//! from the transport (path, query, header, cookie, form, raw request) are
//! skipped. The nested `body` member is reported under the `body` prefix and
//! other nested structs under their own field name, so a violation deep in a
//! request reads like `body.address.city`.
//!
//! # Example
//!
//! ```
//! use pactum_macros::Contract;
//! use serde::Serialize;
//!
//! #[derive(Serialize, Contract)]
//! pub struct Signup {
//!     #[contract(min_length = 3)]
//!     pub name: String,
//! }
//!
//! let err = pactum_validate::validate(&Signup { name: "ab".into() }).unwrap_err();
//! assert_eq!(err.violations()[0].field, "name");
//! assert_eq!(err.violations()[0].message, "must be at least 3 characters");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pattern;
mod walker;

use pactum_core::{describe, AggregateValidationError, Reflect};
use serde::Serialize;

use crate::walker::Walker;

/// Checks every declared constraint on `value`.
///
/// Returns `Ok(())` when nothing is violated; otherwise the error lists every
/// violation in field order.
pub fn validate<T: Reflect + Serialize>(value: &T) -> Result<(), AggregateValidationError> {
    let json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(err) => {
            // Values that serde_json cannot represent carry no checkable payload.
            tracing::debug!(error = %err, "skipping constraint validation");
            return Ok(());
        }
    };

    let info = describe::<T>();
    let mut violations = AggregateValidationError::new();
    Walker::new(&mut violations).visit_struct(&info, &json, "");

    if !violations.is_empty() {
        tracing::debug!(
            type_name = info.rust_name(),
            violations = violations.len(),
            "constraint validation failed"
        );
    }
    violations.into_result()
}

/// Runs [`validate`], then the type's own
/// [`SelfValidator`](pactum_core::SelfValidator) check if it declares one.
///
/// Self validation only runs on values that satisfy every constraint.
pub fn validate_request<T: Reflect + Serialize>(value: &T) -> Result<(), AggregateValidationError> {
    validate(value)?;
    value.self_validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pactum_core::{SelfValidator, Violation};
    use pactum_macros::Contract;
    use proptest::prelude::*;
    use serde::Serialize;

    #[derive(Debug, Default, Serialize, Contract)]
    pub struct Address {
        #[contract(min_length = 2)]
        pub city: String,
        #[contract(pattern = "^[0-9]{5}$")]
        pub zip: String,
    }

    #[derive(Debug, Default, Serialize, Contract)]
    pub struct Profile {
        #[contract(min_length = 3, max_length = 10)]
        pub name: String,
        #[contract(minimum = 18, maximum = 130)]
        pub age: i32,
        #[contract(enum_values = "admin,member")]
        pub role: String,
        #[contract(min_items = 1, max_items = 3)]
        pub tags: Vec<String>,
        #[contract(maximum = 1.5)]
        pub ratio: f64,
        pub address: Address,
        pub nickname: Option<Nickname>,
    }

    #[derive(Debug, Default, Serialize, Contract)]
    pub struct Nickname {
        #[contract(max_length = 4)]
        pub value: String,
    }

    #[derive(Debug, Default, Serialize, Contract)]
    pub struct UpdateProfile {
        #[contract(path = "id", min_length = 10)]
        pub id: String,
        #[contract(query = "page", minimum = 1)]
        pub page: i64,
        pub body: Profile,
    }

    #[derive(Debug, Default, Serialize, Contract)]
    #[contract(self_validate)]
    pub struct Window {
        #[contract(minimum = 0)]
        pub from: i64,
        pub to: i64,
    }

    impl SelfValidator for Window {
        fn validate(&self) -> Result<(), AggregateValidationError> {
            if self.from > self.to {
                return Err(AggregateValidationError::single("from", "must not exceed to"));
            }
            Ok(())
        }
    }

    fn valid_profile() -> Profile {
        Profile {
            name: "ada".to_string(),
            age: 36,
            role: "admin".to_string(),
            tags: vec!["math".to_string()],
            ratio: 1.0,
            address: Address {
                city: "London".to_string(),
                zip: "12345".to_string(),
            },
            nickname: None,
        }
    }

    fn fields(err: &AggregateValidationError) -> Vec<&str> {
        err.violations().iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_value_yields_no_error() {
        assert!(validate(&valid_profile()).is_ok());
    }

    #[test]
    fn test_min_length_message() {
        let profile = Profile {
            name: "ab".to_string(),
            ..valid_profile()
        };
        let err = validate(&profile).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(
            err.violations()[0],
            Violation::new("name", "must be at least 3 characters").with_value("ab".into())
        );
    }

    #[test]
    fn test_every_violation_is_collected() {
        let profile = Profile {
            name: "a".repeat(11),
            age: 12,
            role: "owner".to_string(),
            tags: Vec::new(),
            ratio: 2.0,
            address: Address {
                city: "X".to_string(),
                zip: "abc".to_string(),
            },
            nickname: Some(Nickname {
                value: "toolong".to_string(),
            }),
        };
        let err = validate(&profile).unwrap_err();

        assert_eq!(
            fields(&err),
            vec![
                "name",
                "age",
                "role",
                "tags",
                "ratio",
                "address.city",
                "address.zip",
                "nickname.value"
            ]
        );
        let messages: Vec<_> = err.violations().iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "must be at most 10 characters",
                "must be at least 18",
                "must be one of [admin,member]",
                "must have at least 1 items",
                "must be at most 1.5",
                "must be at least 2 characters",
                "must match pattern ^[0-9]{5}$",
                "must be at most 4 characters",
            ]
        );
    }

    #[test]
    fn test_body_prefix_and_parameter_fields_skipped() {
        let request = UpdateProfile {
            id: "short".to_string(),
            page: 0,
            body: Profile {
                name: "ab".to_string(),
                address: Address {
                    city: "X".to_string(),
                    ..valid_profile().address
                },
                ..valid_profile()
            },
        };
        let err = validate(&request).unwrap_err();
        assert_eq!(fields(&err), vec!["body.name", "body.address.city"]);
    }

    #[test]
    fn test_character_length_counts_scalars() {
        let profile = Profile {
            name: "ééé".to_string(),
            ..valid_profile()
        };
        assert!(validate(&profile).is_ok());
    }

    #[test]
    fn test_self_validation_runs_after_constraints() {
        let constrained = Window { from: -1, to: -5 };
        let err = validate_request(&constrained).unwrap_err();
        assert_eq!(fields(&err), vec!["from"]);
        assert_eq!(err.violations()[0].message, "must be at least 0");

        let inverted = Window { from: 5, to: 1 };
        let err = validate_request(&inverted).unwrap_err();
        assert_eq!(err.violations()[0].message, "must not exceed to");

        assert!(validate_request(&Window { from: 1, to: 5 }).is_ok());
    }

    proptest! {
        #[test]
        fn prop_violation_count_matches_broken_fields(
            name_len in 0usize..15,
            age in 0i32..200,
            tag_count in 0usize..6,
        ) {
            let profile = Profile {
                name: "x".repeat(name_len),
                age,
                tags: vec!["t".to_string(); tag_count],
                ..valid_profile()
            };
            let expected = usize::from(!(3..=10).contains(&name_len))
                + usize::from(!(18..=130).contains(&age))
                + usize::from(!(1..=3).contains(&tag_count));

            match validate(&profile) {
                Ok(()) => prop_assert_eq!(expected, 0),
                Err(err) => prop_assert_eq!(err.len(), expected),
            }
        }
    }
}
