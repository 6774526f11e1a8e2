//! Validated text primitives shared across the labops crates.
//!
//! Sample names and family identifiers end up in file names (`<family>.json`,
//! `<run>_<well>_<sample>.json`, `<family>.ped`), so they are checked once at the
//! boundary and carried as dedicated types afterwards.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
    /// The input contained a character that cannot appear in a file name component
    #[error("identifier '{0}' contains whitespace or a path separator")]
    NotFileSafe(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a sample, family or run that is safe to embed in a file name.
///
/// Sequencing names such as `GM001`, `24-01142-T1` or `HSJ-0102` qualify;
/// anything with inner whitespace or a `/` or `\` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(NonEmptyText);

impl Identifier {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        if text
            .as_str()
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(TextError::NotFileSafe(text.0));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::str::FromStr for Identifier {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  GM001 \n").unwrap();
        assert_eq!(text.as_str(), "GM001");
    }

    #[test]
    fn non_empty_text_rejects_blank_input() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn identifier_accepts_sequencing_names() {
        for name in ["GM001", "24-01142-T1", "MO-24-00012", "HSJ-0102"] {
            assert!(Identifier::new(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn identifier_rejects_path_like_names() {
        assert!(matches!(
            Identifier::new("../GM001"),
            Err(TextError::NotFileSafe(_))
        ));
        assert!(matches!(
            Identifier::new("GM 001"),
            Err(TextError::NotFileSafe(_))
        ));
    }

    #[test]
    fn identifier_deserialize_validates() {
        let ok: Identifier = serde_json::from_str("\"GM002\"").unwrap();
        assert_eq!(ok.as_str(), "GM002");
        assert!(serde_json::from_str::<Identifier>("\"\"").is_err());
    }
}
