use skyops_shared::Masked;

/// Decides whether a caller may mutate scheduling data.
///
/// The API layer consults this before invoking any mutation on the
/// scheduler; the scheduler itself never looks at credentials.
pub trait EditAuthorizer: Send + Sync {
    fn authorize(&self, credential: Option<&str>) -> bool;
}

/// Grants edit access to callers presenting one shared secret.
pub struct SharedSecretAuthorizer {
    secret: Masked<String>,
}

impl SharedSecretAuthorizer {
    pub fn new(secret: Masked<String>) -> Self {
        Self { secret }
    }
}

impl EditAuthorizer for SharedSecretAuthorizer {
    fn authorize(&self, credential: Option<&str>) -> bool {
        let expected = self.secret.expose().as_bytes();
        // An unset secret locks editing instead of opening it.
        if expected.is_empty() {
            tracing::warn!("Edit secret is not configured; rejecting mutation");
            return false;
        }

        match credential {
            Some(given) => constant_time_eq(expected, given.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_secret() {
        let auth = SharedSecretAuthorizer::new(Masked("tower-2024".to_string()));
        assert!(auth.authorize(Some("tower-2024")));
        assert!(!auth.authorize(Some("tower-2025")));
        assert!(!auth.authorize(Some("tower")));
        assert!(!auth.authorize(None));
    }

    #[test]
    fn test_empty_secret_denies_everyone() {
        let auth = SharedSecretAuthorizer::new(Masked(String::new()));
        assert!(!auth.authorize(Some("")));
        assert!(!auth.authorize(None));
    }
}
