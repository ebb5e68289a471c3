// src/data_input/vector_text.rs
// Textual rendering of position vectors inside log fields: "[x y z]".

use crate::types::Vec3;

pub fn format_vector(v: &Vec3) -> String {
    format!("[{:?} {:?} {:?}]", v[0], v[1], v[2])
}

/// Parses a field by dropping its enclosing delimiter pair (first and last
/// character, usually brackets) and reading three space-separated floats.
pub fn parse_vector(field: &str) -> Result<Vec3, String> {
    let field = field.trim();
    let mut chars = field.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return Err(format!("field '{field}' is too short to hold a vector"));
    }
    let inner = chars.as_str();

    let mut values = [0.0; 3];
    let mut count = 0;
    for token in inner.split_whitespace() {
        if count == values.len() {
            return Err(format!("expected 3 values in '{field}', found more"));
        }
        values[count] = token
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{token}' in '{field}': {e}"))?;
        count += 1;
    }
    if count != values.len() {
        return Err(format!("expected 3 values in '{field}', found {count}"));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format_vector(&[1.0, -2.5, 3.0]), "[1.0 -2.5 3.0]");
    }

    #[test]
    fn test_parse_numpy_style() {
        assert_eq!(parse_vector("[ 1.  2.5 -3.]").unwrap(), [1.0, 2.5, -3.0]);
        assert_eq!(parse_vector("[1.0 2.0 3.0]").unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(parse_vector("\"4 5 6\"").unwrap(), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        assert!(parse_vector("").is_err());
        assert!(parse_vector("[]").is_err());
        assert!(parse_vector("[1.0 2.0]").is_err());
        assert!(parse_vector("[1.0 2.0 3.0 4.0]").is_err());
        assert!(parse_vector("[1.0 abc 3.0]").is_err());
    }
}
