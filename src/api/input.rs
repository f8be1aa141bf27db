use crate::model::Validator;

use super::ApiErrors;

/// Identity from a path segment; only positive integers are accepted.
pub(crate) fn read_id(param: &str) -> Result<i32, ApiErrors> {
    match param.parse::<i32>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiErrors::BadRequest("invalid id parameter".to_string())),
    }
}

pub(crate) fn read_string(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Missing or empty values fall back to `default`; anything that is not an
/// integer is recorded against `key`.
pub(crate) fn read_int(value: Option<&str>, default: i64, key: &str, v: &mut Validator) -> i64 {
    match value {
        None | Some("") => default,
        Some(s) => s.parse::<i64>().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
    }
}

pub(crate) fn ensure_valid(v: Validator) -> Result<(), ApiErrors> {
    if v.valid() {
        Ok(())
    } else {
        Err(v.into())
    }
}
