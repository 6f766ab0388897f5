use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

/// Tiles on the 5x5 board
pub const GRID_TILES: usize = 25;
/// Safe tiles derived per seed
pub const SAFE_TILES: usize = 5;

/// Derive the safe tile set for a client seed.
///
/// The seed is hashed through SHA-256 and the digest seeds the generator,
/// so the same seed yields the same tiles on every machine. The empty
/// string is a valid seed like any other. Returned indices are distinct,
/// in [0,25), in draw order.
pub fn safe_tiles(seed: &str) -> Vec<usize> {
    let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
    let mut rng = StdRng::from_seed(digest);
    rand::seq::index::sample(&mut rng, GRID_TILES, SAFE_TILES).into_vec()
}
