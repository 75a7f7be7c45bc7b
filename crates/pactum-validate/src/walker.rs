//! Recursive constraint walk over a serialized value.
//!
//! The value is inspected through its JSON form, guided by the type's
//! descriptor: field names in the descriptor are the JSON keys, so a
//! violation path is simply the chain of keys that leads to the field.

use pactum_core::{
    peel, AggregateValidationError, ConstraintSet, FieldDescriptor, TypeInfo, Violation,
};
use serde_json::Value;

use crate::pattern;

/// Collects every violation below one root value.
pub struct Walker<'a> {
    out: &'a mut AggregateValidationError,
}

impl<'a> Walker<'a> {
    pub fn new(out: &'a mut AggregateValidationError) -> Self {
        Self { out }
    }

    /// Visits the exported payload fields of a struct value.
    pub fn visit_struct(&mut self, info: &TypeInfo, value: &Value, prefix: &str) {
        let Some(object) = value.as_object() else {
            return;
        };

        for field in info.fields() {
            if field.source.is_parameter() {
                continue;
            }
            let Some(field_value) = object.get(field.name) else {
                continue;
            };
            if field_value.is_null() {
                continue;
            }

            let path = if field.is_body() {
                "body".to_string()
            } else if prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{prefix}.{}", field.name)
            };

            self.check_field(field, field_value, &path);

            let field_info = peel(&field.field_type.info());
            if field_info.is_struct() {
                self.visit_struct(&field_info, field_value, &path);
            }
        }
    }

    fn check_field(&mut self, field: &FieldDescriptor, value: &Value, path: &str) {
        let constraints = &field.constraints;
        if constraints.is_empty() {
            return;
        }

        match value {
            Value::String(text) => self.check_string(constraints, text, path),
            Value::Number(number) => {
                if let Some(n) = number.as_f64() {
                    self.check_number(constraints, n, value, path);
                }
            }
            Value::Array(items) => self.check_items(constraints, items.len(), path),
            _ => {}
        }
    }

    fn check_string(&mut self, constraints: &ConstraintSet, text: &str, path: &str) {
        let length = text.chars().count();
        let offending = || Value::String(text.to_string());

        if let Some(min) = constraints.min_length {
            if length < min {
                self.push(path, format!("must be at least {min} characters"), offending());
            }
        }
        if let Some(max) = constraints.max_length {
            if length > max {
                self.push(path, format!("must be at most {max} characters"), offending());
            }
        }
        if let Some(regex) = constraints.pattern {
            if pattern::matches(regex, text) == Some(false) {
                self.push(path, format!("must match pattern {regex}"), offending());
            }
        }
        if !constraints.enum_values.is_empty() && !constraints.enum_values.contains(&text) {
            self.push(
                path,
                format!("must be one of [{}]", constraints.enum_values.join(",")),
                offending(),
            );
        }
    }

    fn check_number(&mut self, constraints: &ConstraintSet, n: f64, raw: &Value, path: &str) {
        if let Some(min) = constraints.minimum {
            if n < min {
                self.push(path, format!("must be at least {min}"), raw.clone());
            }
        }
        if let Some(max) = constraints.maximum {
            if n > max {
                self.push(path, format!("must be at most {max}"), raw.clone());
            }
        }
    }

    fn check_items(&mut self, constraints: &ConstraintSet, count: usize, path: &str) {
        if let Some(min) = constraints.min_items {
            if count < min {
                self.push(path, format!("must have at least {min} items"), Value::from(count));
            }
        }
        if let Some(max) = constraints.max_items {
            if count > max {
                self.push(path, format!("must have at most {max} items"), Value::from(count));
            }
        }
    }

    fn push(&mut self, path: &str, message: String, value: Value) {
        self.out.push(Violation::new(path, message).with_value(value));
    }
}
