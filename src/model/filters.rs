use sea_orm::Order;
use typed_builder::TypedBuilder;

use super::{permitted_value, StoreError, Validator};

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination and ordering requested for one list call.
///
/// `sort` is only ever turned into SQL after [`validate_filters`] matched it
/// verbatim against `sort_safelist`.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct Filters {
    #[builder(default = 1)]
    page: i64,
    #[builder(default = 20)]
    page_size: i64,
    #[builder(setter(into))]
    sort: String,
    sort_safelist: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl From<SortDirection> for Order {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

impl Filters {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn sort(&self) -> &str {
        self.sort.as_ref()
    }

    pub fn sort_safelist(&self) -> &'static [&'static str] {
        self.sort_safelist
    }

    /// Sort key without its direction prefix.
    pub fn sort_column(&self) -> &str {
        self.sort.strip_prefix('-').unwrap_or(&self.sort)
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE) as u64
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.limit()
    }

    /// Runs [`validate_filters`] on a fresh validator.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut v = Validator::new();
        validate_filters(&mut v, self);
        if v.valid() {
            Ok(())
        } else {
            Err(v.into())
        }
    }
}

/// The allowlist gate every list operation passes before touching the store.
pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        f.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(f.sort.as_str(), f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    static SAFELIST: &[&str] = &["id", "price", "-id", "-price"];

    fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
        Filters::builder()
            .page(page)
            .page_size(page_size)
            .sort(sort)
            .sort_safelist(SAFELIST)
            .build()
    }

    #[test]
    fn descending_key_resolves_column_and_direction() {
        let f = filters(1, 20, "-price");

        assert_eq!(f.sort_column(), "price");
        assert_eq!(f.sort_direction(), SortDirection::Desc);
        assert_eq!(f.sort_direction().as_str(), "DESC");
    }

    #[test]
    fn bare_key_is_ascending() {
        let f = filters(1, 20, "price");

        assert_eq!(f.sort_column(), "price");
        assert_eq!(f.sort_direction().as_str(), "ASC");
        assert_eq!(Order::from(f.sort_direction()), Order::Asc);
    }

    #[test]
    fn every_safelisted_key_resolves() {
        for key in SAFELIST {
            let f = filters(1, 20, key);
            let expected = if key.starts_with('-') { "DESC" } else { "ASC" };

            assert_eq!(f.sort_column(), key.trim_start_matches('-'));
            assert_eq!(f.sort_direction().as_str(), expected);
        }
    }

    #[test]
    fn limit_and_offset() {
        // Arrange
        let f = filters(3, 10, "id");

        // Act & Assert
        assert_eq!(f.limit(), 10);
        assert_eq!(f.offset(), 20);
        assert_eq!(filters(1, 25, "id").offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(filters(1, 1000, "id").limit(), 100);
        assert_eq!(filters(1, 0, "id").limit(), 1);
        assert_eq!(filters(1, -5, "id").limit(), 1);
        assert_eq!(filters(-2, 10, "id").offset(), 0);
    }

    #[test]
    fn builder_defaults() {
        let f = Filters::builder().sort("id").sort_safelist(SAFELIST).build();

        assert_eq!(f.page(), 1);
        assert_eq!(f.page_size(), 20);
    }

    #[test]
    fn valid_filters_pass() {
        assert!(filters(2, 10, "-price").validate().is_ok());
        assert!(filters(MAX_PAGE, MAX_PAGE_SIZE, "id").validate().is_ok());
    }

    #[test]
    fn numeric_bounds_are_checked() {
        // Arrange
        let mut v = Validator::new();

        // Act
        validate_filters(&mut v, &filters(0, 101, "id"));

        // Assert
        assert_eq!(v.error("page"), Some("must be greater than zero"));
        assert_eq!(v.error("page_size"), Some("must be a maximum of 100"));
        assert_eq!(v.error("sort"), None);

        let mut v = Validator::new();
        validate_filters(&mut v, &filters(MAX_PAGE + 1, 0, "id"));
        assert_eq!(v.error("page"), Some("must be a maximum of 10 million"));
        assert_eq!(v.error("page_size"), Some("must be greater than zero"));
    }

    #[test]
    fn sort_keys_outside_the_safelist_are_rejected() {
        for key in [
            "id; DROP TABLE products",
            "price DESC",
            "--price",
            "name",
            "Price",
            "",
            "-",
            "price,id",
        ] {
            // Act
            let result = filters(1, 20, key).validate();

            // Assert
            match result {
                Err(StoreError::ValidationFailed(v)) => {
                    assert_eq!(v.error("sort"), Some("invalid sort value"), "{key}")
                }
                _ => panic!("sort key {key:?} was accepted"),
            }
        }
    }
}
