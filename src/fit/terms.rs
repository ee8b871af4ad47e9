//! Term selection for surface fits.
//!
//! A control string names the monomials `x^dx · y^dy` that take part in a fit:
//!
//! ```text
//! "(0,0) (1,0) (0,1) (1,1)"
//! ```
//!
//! Tokens are whitespace separated and may not contain whitespace themselves.
//! Validation runs term by term in input order; for each term the degree bound
//! is checked before the duplicate check, so a repeated over-degree term is
//! reported as a `DegreeViolation`.

use std::collections::HashSet;

use crate::domain::{MAX_EXPONENT, Term};
use crate::error::FitError;

/// Parse a control string, enforcing `dx + dy <= max_degree` and uniqueness.
pub fn parse_terms(control: &str, max_degree: u32) -> Result<Vec<Term>, FitError> {
    let mut terms = Vec::new();
    let mut seen = HashSet::new();

    for token in control.split_whitespace() {
        let term = parse_token(token)?;
        if term.degree() > u64::from(max_degree) {
            return Err(FitError::DegreeViolation {
                dx: term.dx,
                dy: term.dy,
                max_degree,
            });
        }
        if !seen.insert(term) {
            return Err(FitError::DuplicateTerm {
                dx: term.dx,
                dy: term.dy,
            });
        }
        terms.push(term);
    }

    if terms.is_empty() {
        return Err(FitError::malformed(control, "control string names no terms"));
    }
    Ok(terms)
}

/// Every monomial of total degree `<= max_degree`.
///
/// Ordering is `dy` outer, `dx` inner: `(0,0) (1,0) ... (max,0) (0,1) ...`.
/// Surface fit coefficients come back in this order.
pub fn default_terms(max_degree: u32) -> Vec<Term> {
    let mut terms = Vec::new();
    for dy in 0..=max_degree {
        for dx in 0..=max_degree {
            if dx <= max_degree - dy {
                terms.push(Term::new(dx, dy));
            }
        }
    }
    terms
}

/// Render terms back into control-string form.
pub fn format_terms(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_token(token: &str) -> Result<Term, FitError> {
    let inner = token
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| FitError::malformed(token, "expected '(dx,dy)'"))?;

    let (dx, dy) = inner
        .split_once(',')
        .ok_or_else(|| FitError::malformed(token, "expected a comma between exponents"))?;

    let parse = |s: &str| match s.parse::<u32>() {
        Ok(e) if e <= MAX_EXPONENT => Ok(e),
        Ok(_) => Err(FitError::malformed(token, format!("exponent '{s}' exceeds {MAX_EXPONENT}"))),
        Err(_) => Err(FitError::malformed(token, format!("invalid exponent '{s}'"))),
    };
    Ok(Term::new(parse(dx)?, parse(dy)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_control_string() {
        let terms = parse_terms("(0,0) (1,0)   (0,1)", 1).unwrap();
        assert_eq!(terms, vec![Term::new(0, 0), Term::new(1, 0), Term::new(0, 1)]);
    }

    #[test]
    fn duplicate_term_is_rejected() {
        let err = parse_terms("(1,0) (1,0)", 2).unwrap_err();
        assert_eq!(err, FitError::DuplicateTerm { dx: 1, dy: 0 });
    }

    #[test]
    fn over_degree_term_is_rejected() {
        let err = parse_terms("(5,5)", 2).unwrap_err();
        assert_eq!(
            err,
            FitError::DegreeViolation {
                dx: 5,
                dy: 5,
                max_degree: 2
            }
        );
    }

    #[test]
    fn huge_exponents_are_rejected_without_overflow() {
        assert!(matches!(
            parse_terms("(4294967295,1)", 2),
            Err(FitError::MalformedGrammar { .. })
        ));
        assert!(matches!(
            parse_terms("(2147483648,0)", 2),
            Err(FitError::MalformedGrammar { .. })
        ));
        // Both exponents in range, sum past u32::MAX.
        assert_eq!(
            parse_terms("(2147483647,2147483647)", 2).unwrap_err(),
            FitError::DegreeViolation {
                dx: MAX_EXPONENT,
                dy: MAX_EXPONENT,
                max_degree: 2
            }
        );
    }

    #[test]
    fn degree_checked_before_duplicate() {
        let err = parse_terms("(3,0) (3,0)", 2).unwrap_err();
        assert!(matches!(err, FitError::DegreeViolation { dx: 3, dy: 0, .. }));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for bad in ["(1,0", "1,0)", "(1;0)", "(a,0)", "(-1,0)", "(1, 0)", "(1,0)x"] {
            assert!(
                matches!(parse_terms(bad, 4), Err(FitError::MalformedGrammar { .. })),
                "{bad} should be malformed"
            );
        }
        assert!(matches!(
            parse_terms("   ", 2),
            Err(FitError::MalformedGrammar { .. })
        ));
    }

    #[test]
    fn default_terms_enumerate_dy_outer() {
        let terms = default_terms(2);
        assert_eq!(
            format_terms(&terms),
            "(0,0) (1,0) (2,0) (0,1) (1,1) (0,2)"
        );
        assert_eq!(default_terms(0), vec![Term::new(0, 0)]);
    }
}
