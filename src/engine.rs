use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use xxhash_rust::xxh64::xxh64;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Longest root a u64 digest can fill in base 36.
pub const MAX_HASH_LENGTH: usize = 13;

// Scheme, dotted host with an alphabetic final label, then end of input or
// the start of a port, path, query or fragment.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:[A-Za-z0-9-]+\.)+[A-Za-z]+(?:[:/?#]|$)")
        .expect("URL pattern is a valid regex")
});

/// Best-effort surface check of a submitted URL.
///
/// Only the scheme and host shape are inspected; TLDs, ports and paths are
/// not validated.
pub fn validate_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// Render `n` in lowercase base 36 (`0` renders as `"0"`).
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

/// Derives the root token a URL's short id is built on.
///
/// Roots are not required to be unique; the id assigner appends a
/// per-root counter to tell colliding URLs apart.
pub trait RootHasher: Send + Sync {
    fn generate_hash(&self, url: &str) -> String;
}

/// How root tokens are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashStrategy {
    /// xxh64 of the URL in base 36. The same URL always gets the same root.
    Digest,
    /// A fresh random base-36 token on every call.
    Random,
}

impl FromStr for HashStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digest" => Ok(Self::Digest),
            "random" => Ok(Self::Random),
            other => anyhow::bail!("unknown hash strategy '{other}' (expected 'digest' or 'random')"),
        }
    }
}

/// The production hasher: a strategy plus the root length it produces.
#[derive(Debug, Clone)]
pub struct HashGenerator {
    strategy: HashStrategy,
    length: usize,
}

impl HashGenerator {
    pub fn new(strategy: HashStrategy, length: usize) -> Self {
        Self {
            strategy,
            length: length.clamp(1, MAX_HASH_LENGTH),
        }
    }
}

impl RootHasher for HashGenerator {
    fn generate_hash(&self, url: &str) -> String {
        match self.strategy {
            HashStrategy::Digest => {
                // Keep the low-order digits; the leading base-36 digit of a
                // u64 is almost always 1, 2 or 3.
                let digest = xxh64(url.as_bytes(), 0);
                let digest = match 36u64.checked_pow(self.length as u32) {
                    Some(modulus) => digest % modulus,
                    None => digest,
                };
                format!("{:0>width$}", to_base36(digest), width = self.length)
            }
            HashStrategy::Random => {
                let mut rng = rand::thread_rng();
                (0..self.length)
                    .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_accepts_http_and_https() {
        assert!(validate_url("http://ex.sample"));
        assert!(validate_url("https://ex.sample"));
        assert!(validate_url("https://www.example.com/some/path?q=1#frag"));
        assert!(validate_url("http://example.com:8080/"));
    }

    #[test]
    fn validator_rejects_bad_scheme_or_host() {
        assert!(!validate_url("http1://ex.sample"));
        assert!(!validate_url("ftp://ex.sample"));
        assert!(!validate_url("ex.sample"));
        assert!(!validate_url("http://"));
        assert!(!validate_url("http://localhost"));
        assert!(!validate_url("http://10.0.0.1"));
        assert!(!validate_url(""));
    }

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(1), "1");
        assert_eq!(to_base36(10), "a");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1295), "zz");
        assert_eq!(to_base36(u64::MAX).len(), MAX_HASH_LENGTH);
    }

    #[test]
    fn digest_is_stable_and_sized() {
        let hasher = HashGenerator::new(HashStrategy::Digest, 6);
        let a = hasher.generate_hash("https://www.example.com");
        let b = hasher.generate_hash("https://www.example.com");
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.bytes().all(|c| BASE36.contains(&c)));
    }

    #[test]
    fn digest_is_padded_at_every_length() {
        for length in 1..=MAX_HASH_LENGTH {
            let hasher = HashGenerator::new(HashStrategy::Digest, length);
            for i in 0..50 {
                let root = hasher.generate_hash(&format!("https://ex{i}.sample"));
                assert_eq!(root.len(), length);
            }
        }
    }

    #[test]
    fn digest_leading_char_is_spread_over_alphabet() {
        let hasher = HashGenerator::new(HashStrategy::Digest, 6);
        let mut counts = [0usize; 36];
        let samples = 36 * 200;
        for i in 0..samples {
            let root = hasher.generate_hash(&format!("https://ex{i}.sample/path"));
            let first = root.as_bytes()[0];
            let idx = BASE36.iter().position(|&c| c == first).unwrap();
            counts[idx] += 1;
        }
        // Expected 200 per digit; a skewed top digit would put thousands on
        // '1'..'3' and leave most of the alphabet near 10.
        for (idx, count) in counts.iter().enumerate() {
            assert!(
                (100..=320).contains(count),
                "leading '{}' seen {} times",
                BASE36[idx] as char,
                count
            );
        }
    }

    #[test]
    fn random_has_requested_length() {
        let hasher = HashGenerator::new(HashStrategy::Random, 8);
        let root = hasher.generate_hash("https://www.example.com");
        assert_eq!(root.len(), 8);
        assert!(root.bytes().all(|c| BASE36.contains(&c)));
    }

    #[test]
    fn length_is_clamped() {
        let hasher = HashGenerator::new(HashStrategy::Random, 0);
        assert_eq!(hasher.generate_hash("http://a.b").len(), 1);
        let hasher = HashGenerator::new(HashStrategy::Random, 64);
        assert_eq!(hasher.generate_hash("http://a.b").len(), MAX_HASH_LENGTH);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Digest".parse::<HashStrategy>().unwrap(), HashStrategy::Digest);
        assert_eq!("random".parse::<HashStrategy>().unwrap(), HashStrategy::Random);
        assert!("sha".parse::<HashStrategy>().is_err());
    }
}
