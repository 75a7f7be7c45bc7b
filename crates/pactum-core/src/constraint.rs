//! Field-level constraints.
//!
//! A [`ConstraintSet`] is attached to every [`FieldDescriptor`](crate::FieldDescriptor)
//! and is read by two consumers: the validator checks populated values
//! against it, and the schema registry copies it onto property nodes.

/// Optional bounds and annotations declared on a field.
///
/// ```
/// use pactum_core::ConstraintSet;
///
/// let constraints = ConstraintSet::new().min_length(3).max_length(50);
/// assert_eq!(constraints.min_length, Some(3));
/// assert!(!constraints.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    /// Minimum string length in characters.
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    pub max_length: Option<usize>,
    /// Regular expression a string must match.
    pub pattern: Option<&'static str>,
    /// Inclusive numeric lower bound.
    pub minimum: Option<f64>,
    /// Inclusive numeric upper bound.
    pub maximum: Option<f64>,
    /// Allowed string values.
    pub enum_values: Vec<&'static str>,
    /// Minimum sequence length.
    pub min_items: Option<usize>,
    /// Maximum sequence length.
    pub max_items: Option<usize>,
    /// Default value, in wire (string) form.
    pub default: Option<&'static str>,
    /// Example value, in wire (string) form.
    pub example: Option<&'static str>,
}

impl ConstraintSet {
    /// Create an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum string length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Set the maximum string length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Set the pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Set the numeric minimum.
    #[must_use]
    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    /// Set the numeric maximum.
    #[must_use]
    pub fn maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    /// Set the allowed values.
    #[must_use]
    pub fn enum_values(mut self, values: &[&'static str]) -> Self {
        self.enum_values = values.to_vec();
        self
    }

    /// Set the minimum item count.
    #[must_use]
    pub fn min_items(mut self, count: usize) -> Self {
        self.min_items = Some(count);
        self
    }

    /// Set the maximum item count.
    #[must_use]
    pub fn max_items(mut self, count: usize) -> Self {
        self.max_items = Some(count);
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the example value.
    #[must_use]
    pub fn example(mut self, value: &'static str) -> Self {
        self.example = Some(value);
        self
    }

    /// Returns `true` if no bound is set. Annotations (`default`, `example`)
    /// are not bounds.
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.enum_values.is_empty()
            && self.min_items.is_none()
            && self.max_items.is_none()
    }
}
