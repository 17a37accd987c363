//! Seeds, commitments and request identifiers.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::games::types::GameType;

/// Fresh hex-encoded seed of `length` bytes from the OS CSPRNG.
pub fn generate_seed(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// `hex(sha256(seed || requestId))` over the UTF-8 text of both.
pub fn hashed_commitment(seed_hex: &str, request_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed_hex.as_bytes());
    hasher.update(request_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// `api_<game>_<unix millis>_<9 hex chars>`.
pub fn request_id(game: GameType) -> String {
    let fragment = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "api_{}_{}_{}",
        game.slug(),
        chrono::Utc::now().timestamp_millis(),
        &fragment[..9]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_are_fresh() {
        let a = generate_seed(32);
        let b = generate_seed(32);
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_commitment_binds_request() {
        let seed = "00ff";
        let c1 = hashed_commitment(seed, "req-1");
        assert_eq!(c1.len(), 64);
        assert_eq!(c1, hashed_commitment(seed, "req-1"));
        assert_ne!(c1, hashed_commitment(seed, "req-2"));
        // sha256("abc")
        assert_eq!(
            hashed_commitment("ab", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_request_id_shape() {
        let id = request_id(GameType::Plinko);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "api");
        assert_eq!(parts[1], "plinko");
        assert!(parts[2].parse::<i64>().is_ok());
        assert_eq!(parts[3].len(), 9);
        assert_ne!(id, request_id(GameType::Plinko));
    }
}
