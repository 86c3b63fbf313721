use sha2::{Digest, Sha256};

/// Generic SHA256 helper — returns a lowercase hex-encoded digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SHA256 hash of a Block's serialized source text.
///
/// Used by the editor's dirty-detection fallback and by block alignment to
/// cheaply tell whether two blocks carry identical content.
pub fn compute_content_hash(source_text: &str) -> String {
    sha256_hex(source_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_known_vector() {
        let digest = sha256_hex("");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn compute_content_hash_is_deterministic() {
        let text = "The borrower shall repay.";
        assert_eq!(compute_content_hash(text), compute_content_hash(text));
    }

    #[test]
    fn compute_content_hash_differs_on_different_input() {
        assert_ne!(compute_content_hash("foo"), compute_content_hash("bar"));
    }
}
