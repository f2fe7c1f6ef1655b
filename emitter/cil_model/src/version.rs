//! Four-part assembly versions.

use std::fmt;
use std::str::FromStr;

/// Error when parsing a dotted version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// More than four dotted components.
    TooManyParts(String),
    /// A component is not an unsigned 16-bit integer.
    BadComponent(String),
    /// The string is empty.
    Empty,
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::TooManyParts(s) => {
                write!(f, "version `{s}` has more than four components")
            }
            VersionError::BadComponent(s) => {
                write!(f, "version component `{s}` is not a u16")
            }
            VersionError::Empty => write!(f, "version string is empty"),
        }
    }
}

impl std::error::Error for VersionError {}

/// A `major.minor.build.revision` version.
///
/// Missing trailing components default to zero, so `"1.0"` parses the same
/// as `"1.0.0.0"`. Displayed with all four components, which is the form
/// every backend stamps into the artifact.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl Version {
    /// Create from explicit components.
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Version {
            major,
            minor,
            build,
            revision,
        }
    }

    /// The default assembly version, `1.0.0.0`.
    pub const ONE: Version = Version::new(1, 0, 0, 0);

    /// Components in order, for serialized forms.
    pub const fn parts(self) -> [u16; 4] {
        [self.major, self.minor, self.build, self.revision]
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }
        let mut parts = [0u16; 4];
        let mut count = 0;
        for piece in s.split('.') {
            if count == 4 {
                return Err(VersionError::TooManyParts(s.to_string()));
            }
            parts[count] = piece
                .parse::<u16>()
                .map_err(|_| VersionError::BadComponent(piece.to_string()))?;
            count += 1;
        }
        Ok(Version::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full() {
        let v: Version = "2.1.3.9".parse().unwrap();
        assert_eq!(v, Version::new(2, 1, 3, 9));
    }

    #[test]
    fn test_parse_short_pads_zero() {
        let v: Version = "1.0".parse().unwrap();
        assert_eq!(v, Version::ONE);
        assert_eq!(v.to_string(), "1.0.0.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "1.x".parse::<Version>(),
            Err(VersionError::BadComponent("x".to_string()))
        );
        assert_eq!(
            "1.2.3.4.5".parse::<Version>(),
            Err(VersionError::TooManyParts("1.2.3.4.5".to_string()))
        );
        assert_eq!("".parse::<Version>(), Err(VersionError::Empty));
    }
}
