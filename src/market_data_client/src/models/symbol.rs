use std::fmt;

/// A ticker symbol as entered by the user, trimmed and uppercased.
///
/// No further format checks happen locally; whether the symbol exists is
/// decided by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes raw user input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_trims() {
        assert_eq!(Symbol::parse("  tcs.ns ").unwrap().as_str(), "TCS.NS");
        assert_eq!(Symbol::parse("aapl").unwrap().to_string(), "AAPL");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(Symbol::parse("").is_none());
        assert!(Symbol::parse(" \t\n").is_none());
    }
}
