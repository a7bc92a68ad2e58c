//! Unique test resource names
//!
//! Kubernetes object names must be DNS-1123 labels, so suffixes are
//! lowercase alphanumeric.

use rand::Rng;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random lowercase alphanumeric suffix of the given length
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_CHARSET.len());
            SUFFIX_CHARSET[idx] as char
        })
        .collect()
}

/// Build a unique object name from a prefix, e.g. `"testkit" -> "testkit-x4f2q"`
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, random_suffix(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_suffix_charset() {
        let suffix = random_suffix(32);
        assert_eq!(suffix.len(), 32);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_unique_name_prefix() {
        let name = unique_name("testkit");
        assert!(name.starts_with("testkit-"));
        assert_eq!(name.len(), "testkit-".len() + 5);
    }

    #[test]
    fn test_unique_names_differ() {
        // 36^5 possibilities; a collision here would be a broken RNG
        assert_ne!(unique_name("ns"), unique_name("ns"));
    }
}
