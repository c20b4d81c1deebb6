use std::fmt;
use std::str::FromStr;

/// A dotted numeric version such as `9.0.3` or `19.0.25050.3`.
///
/// Components are compared numerically from left to right. When one version
/// is a prefix of the other, the shorter one sorts lower, so `9.0` < `9.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DottedVersion {
    components: Vec<u64>,
}

impl DottedVersion {
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, component) in self.components.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid component {position} in '{input}': {value:?}")]
    InvalidComponent {
        input: String,
        position: usize,
        value: String,
    },
}

impl FromStr for DottedVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let components = s
            .split('.')
            .enumerate()
            .map(|(position, part)| {
                // `u64::from_str` accepts a leading '+', which is not a digit.
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionParseError::InvalidComponent {
                        input: s.to_string(),
                        position,
                        value: part.to_string(),
                    });
                }
                part.parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidComponent {
                        input: s.to_string(),
                        position,
                        value: part.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }
}
