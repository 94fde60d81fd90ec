//! Exact cosine distance for the in-memory store.
//!
//! Matches pgvector's `<=>` operator: `1 - cos(a, b)`, so identical
//! directions score 0 and opposite directions score 2.

/// Cosine distance in `[0, 2]`. A zero vector is treated as orthogonal to
/// everything (distance 1).
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;
    // Chunks of 8 let the compiler keep the three accumulators in registers.
    let mut a_chunks = a.chunks_exact(8);
    let mut b_chunks = b.chunks_exact(8);
    for (ca, cb) in (&mut a_chunks).zip(&mut b_chunks) {
        for i in 0..8 {
            dot += ca[i] * cb[i];
            norm_a += ca[i] * ca[i];
            norm_b += cb[i] * cb[i];
        }
    }
    for (x, y) in a_chunks.remainder().iter().zip(b_chunks.remainder()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let cos = dot / (norm_a.sqrt() * norm_b.sqrt());
    (1.0 - cos).clamp(0.0, 2.0)
}
