use serde::Deserialize;
use std::fmt;

/// A wrapper for secrets that masks its value in Debug and Display output.
///
/// Config structs derive `Debug`, so anything credential-like is held in a
/// `Masked` to keep it out of `tracing` output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let secret = Masked("hunter2".to_string());
        assert_eq!(format!("{:?}", secret), "********");
        assert_eq!(format!("{}", secret), "********");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_masked_deserializes_transparently() {
        let secret: Masked<String> = serde_json::from_str("\"s3cret\"").unwrap();
        assert_eq!(secret.into_inner(), "s3cret");
    }
}
