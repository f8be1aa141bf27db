use serde::{ser::SerializeMap, Serialize, Serializer};

/// Collects named validation failures, keeping the first message per field
/// in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: Vec<(String, String)>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// A field that already failed keeps its first message.
    pub fn add_error(&mut self, field: &str, message: &str) {
        if self.error(field).is_none() {
            self.errors.push((field.to_string(), message.to_string()));
        }
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, message) in &self.errors {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

pub fn permitted_value<T: PartialEq + ?Sized>(value: &T, permitted: &[&T]) -> bool {
    permitted.iter().any(|p| *p == value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_validator_is_valid() {
        assert!(Validator::new().valid());
    }

    #[test]
    fn failed_check_is_recorded() {
        // Arrange
        let mut v = Validator::new();

        // Act
        v.check(1 > 2, "page", "must be greater than zero");
        v.check(true, "page_size", "never recorded");

        // Assert
        assert!(!v.valid());
        assert_eq!(v.len(), 1);
        assert_eq!(v.error("page"), Some("must be greater than zero"));
        assert_eq!(v.error("page_size"), None);
    }

    #[test]
    fn first_message_per_field_wins() {
        // Arrange
        let mut v = Validator::new();

        // Act
        v.check(false, "name", "must be provided");
        v.check(false, "name", "must not be more than 100 characters long");

        // Assert
        assert_eq!(v.len(), 1);
        assert_eq!(v.error("name"), Some("must be provided"));
    }

    #[test]
    fn serializes_in_insertion_order() {
        // Arrange
        let mut v = Validator::new();
        v.add_error("sort", "invalid sort value");
        v.add_error("page", "must be greater than zero");

        // Act
        let s = serde_json::to_string(&v).unwrap();

        // Assert
        assert_eq!(
            s,
            r#"{"sort":"invalid sort value","page":"must be greater than zero"}"#
        );
    }

    #[test]
    fn permitted_value_matches_exactly() {
        let permitted = ["price", "-price"];

        assert!(permitted_value("-price", &permitted));
        assert!(!permitted_value("price ", &permitted));
        assert!(!permitted_value("PRICE", &permitted));
    }
}
