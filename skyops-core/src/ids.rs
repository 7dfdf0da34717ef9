use uuid::Uuid;

/// Source of fresh flight identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Accepts only the hyphenated 8-4-4-4-12 form.
pub fn is_valid_uuid(candidate: &str) -> bool {
    candidate.len() == 36 && Uuid::parse_str(candidate).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid_and_unique() {
        let ids = UuidGenerator;
        let a = ids.generate();
        let b = ids.generate();
        assert!(is_valid_uuid(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_uuid_format() {
        assert!(is_valid_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(is_valid_uuid("67E55044-10B1-426F-9247-BB680E5FE0C8"));
        assert!(!is_valid_uuid("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_valid_uuid("not-a-uuid"));
        assert!(!is_valid_uuid(""));
    }
}
