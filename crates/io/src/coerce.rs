// String -> number|string inference applied on save.
//
// A cell becomes a number only when the number prints back as exactly the
// same text, so reloading the file reproduces the cell. "007", "+5", "1.50"
// and " 5" all stay text.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

pub fn coerce(value: &str) -> Scalar<'_> {
    if let Ok(n) = value.parse::<i64>() {
        if n.to_string() == value {
            return Scalar::Int(n);
        }
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n.to_string() == value => Scalar::Float(n),
        _ => Scalar::Text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(coerce("42"), Scalar::Int(42));
        assert_eq!(coerce("-7"), Scalar::Int(-7));
        assert_eq!(coerce("0"), Scalar::Int(0));
        assert_eq!(coerce("2.5"), Scalar::Float(2.5));
        assert_eq!(coerce("-0.25"), Scalar::Float(-0.25));
    }

    #[test]
    fn test_text_that_would_not_round_trip() {
        for s in [
            "", "007", "+5", " 5", "5 ", "1.", ".5", "1.50", "1e3", "inf", "NaN", "1,000", "12ab",
            "-", "0x10", "99999999999999999999",
        ] {
            assert_eq!(coerce(s), Scalar::Text(s), "{:?}", s);
        }
    }
}
