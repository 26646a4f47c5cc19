use polytwin::core::orientation::Orientation;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid orientation '{0}'. Expected three Euler-Bunge angles in degrees, e.g. '10,20,30'.")]
    InvalidOrientation(String),

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Parses `phi1,Phi,phi2` (commas and/or whitespace) into an orientation.
pub fn parse_orientation(input: &str) -> Result<Orientation, ParseError> {
    let invalid = || ParseError::InvalidOrientation(input.to_string());
    let angles = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    match angles.as_slice() {
        [phi1, big_phi, phi2] if angles.iter().all(|a| a.is_finite()) => {
            Ok(Orientation::from_degrees(*phi1, *big_phi, *phi2))
        }
        _ => Err(invalid()),
    }
}

/// Splits a `KEY=VALUE` assignment at the first `=`.
pub fn parse_assignment(input: &str) -> Result<(&str, &str), ParseError> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidAssignment(input.to_string())),
    }
}

pub fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_space_separated_orientations() {
        assert_eq!(
            parse_orientation("10,20,30").unwrap(),
            Orientation::from_degrees(10.0, 20.0, 30.0)
        );
        assert_eq!(
            parse_orientation(" 10, 20  30 ").unwrap(),
            Orientation::from_degrees(10.0, 20.0, 30.0)
        );
    }

    #[test]
    fn negative_angles_are_wrapped() {
        let orientation = parse_orientation("-90,0,0").unwrap();
        assert_eq!(orientation.degrees(), [270.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_wrong_arity_and_non_numbers() {
        assert!(matches!(parse_orientation("10,20"), Err(ParseError::InvalidOrientation(_))));
        assert!(matches!(parse_orientation("10,20,30,40"), Err(ParseError::InvalidOrientation(_))));
        assert!(matches!(parse_orientation("a,b,c"), Err(ParseError::InvalidOrientation(_))));
        assert!(matches!(parse_orientation("10,inf,30"), Err(ParseError::InvalidOrientation(_))));
    }

    #[test]
    fn assignments_split_at_the_first_equals_sign() {
        assert_eq!(parse_assignment("seed=4").unwrap(), ("seed", "4"));
        assert_eq!(parse_assignment("output.program=a=b").unwrap(), ("output.program", "a=b"));
        assert_eq!(
            parse_assignment("seed"),
            Err(ParseError::InvalidAssignment("seed".to_string()))
        );
        assert!(parse_assignment("=4").is_err());
    }

    #[test]
    fn values_parse_to_the_requested_type() {
        assert_eq!(parse_value::<usize>("layout.max-expected-twins", "8").unwrap(), 8);
        assert_eq!(
            parse_value::<f64>("layout.domain-length", "abc"),
            Err(ParseError::InvalidValue {
                key: "layout.domain-length".to_string(),
                value: "abc".to_string()
            })
        );
    }
}
