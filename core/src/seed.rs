use sha2::{Digest, Sha256};

/// Stream label for level-up option draws.
pub const RNG_STREAM_OPTIONS: &str = "options";
/// Stream label for spawn edge selection.
pub const RNG_STREAM_SPAWN_EDGES: &str = "spawn_edges";
/// Stream label for conductor spawn-type rolls.
pub const RNG_STREAM_SPAWN_ROLLS: &str = "spawn_rolls";

/// Derives an independent RNG seed for `label` from the session seed.
///
/// Streams with different labels are independent of one another.
#[must_use]
pub fn derive_stream_seed(session_seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
