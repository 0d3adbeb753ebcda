use chrono::{DateTime, Utc};

/// One assistant utterance immediately followed by one developer utterance
/// (spec.md GLOSSARY "Pair").
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub assistant_text: String,
    pub developer_text: String,
    pub assistant_at: DateTime<Utc>,
    pub developer_at: DateTime<Utc>,
}

impl Pair {
    /// Stable fingerprint used by the session buffer's analyzed-dedup cache.
    /// Content-addressed rather than timestamp-addressed so re-reading the
    /// same pair from the transcript on a retried hook invocation dedupes.
    pub fn fingerprint(&self) -> String {
        use sha2_fingerprint::fingerprint_text;
        fingerprint_text(&self.assistant_text, &self.developer_text)
    }
}

// Kept as a tiny inline module (rather than pulling `sha2` into opentell-types
// as a full dependency) since this is the only hash this crate needs.
mod sha2_fingerprint {
    pub fn fingerprint_text(a: &str, b: &str) -> String {
        // FNV-1a 64-bit: fast, dependency-free, sufficient for a dedup cache
        // (not a security boundary).
        const OFFSET: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;
        let mut hash = OFFSET;
        for byte in a.bytes().chain(std::iter::once(0u8)).chain(b.bytes()) {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(PRIME);
        }
        format!("{hash:016x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_identical_pairs() {
        let now = Utc::now();
        let p1 = Pair {
            assistant_text: "a".into(),
            developer_text: "b".into(),
            assistant_at: now,
            developer_at: now,
        };
        let p2 = p1.clone();
        assert_eq!(p1.fingerprint(), p2.fingerprint());
    }

    #[test]
    fn fingerprint_differs_for_different_pairs() {
        let now = Utc::now();
        let p1 = Pair {
            assistant_text: "a".into(),
            developer_text: "b".into(),
            assistant_at: now,
            developer_at: now,
        };
        let p2 = Pair {
            assistant_text: "a".into(),
            developer_text: "c".into(),
            assistant_at: now,
            developer_at: now,
        };
        assert_ne!(p1.fingerprint(), p2.fingerprint());
    }
}
