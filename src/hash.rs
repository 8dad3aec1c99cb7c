use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sha2::Sha512;

/// The hash pair stored in every file manifest, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHashes {
    pub sha1: String,
    pub sha512: String,
}

/// Compute both digests over the literal content. Pure and deterministic.
pub fn digest(bytes: &[u8]) -> ContentHashes {
    let mut sha1 = Sha1::new();
    sha1.update(bytes);

    let mut sha512 = Sha512::new();
    sha512.update(bytes);

    ContentHashes {
        sha1: hex::encode(sha1.finalize()),
        sha512: hex::encode(sha512.finalize()),
    }
}

/// 32-bit MurmurHash2 as used by the CurseForge fingerprint API:
/// seed 1, computed over the content with whitespace bytes stripped.
pub fn curseforge_fingerprint(bytes: &[u8]) -> u32 {
    let normalized: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| !matches!(b, 0x09 | 0x0a | 0x0d | 0x20))
        .collect();
    murmur2(&normalized, 1)
}

fn murmur2(data: &[u8], seed: u32) -> u32 {
    const M: u32 = 0x5bd1_e995;
    const R: u32 = 24;

    let mut h: u32 = seed ^ (data.len() as u32);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);
        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        if tail.len() >= 3 {
            h ^= (tail[2] as u32) << 16;
        }
        if tail.len() >= 2 {
            h ^= (tail[1] as u32) << 8;
        }
        h ^= tail[0] as u32;
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_vectors() {
        let hashes = digest(b"abc");
        assert_eq!(hashes.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            hashes.sha512,
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let content = b"some mod jar bytes";
        assert_eq!(digest(content), digest(content));
    }

    #[test]
    fn fingerprint_strips_whitespace() {
        assert_eq!(
            curseforge_fingerprint(b"hello \r\n\tworld"),
            curseforge_fingerprint(b"helloworld")
        );
    }

    #[test]
    fn fingerprint_differs_for_different_content() {
        assert_ne!(
            curseforge_fingerprint(b"helloworld"),
            curseforge_fingerprint(b"helloworle")
        );
    }
}
