use sha2::{Digest, Sha256};

/// Algorithm tag prefixed to every content hash
const ALGORITHM: &str = "sha256";

/// Content-address a byte sequence as `sha256:<hex digest>`
pub fn hash_content(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("{ALGORITHM}:{}", hex::encode(digest))
}
