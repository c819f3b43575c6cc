//! Vector arithmetic shared by ranking and summarization.

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity in [-1, 1]. Zero-length or mismatched vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norms = l2_norm(a) * l2_norm(b);
    if norms == 0.0 {
        return 0.0;
    }
    (dot / norms).clamp(-1.0, 1.0)
}

/// Sum of absolute per-dimension differences.
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Manhattan distance divided by the sum of both L2 norms.
///
/// 0 means identical vectors. When both vectors are zero the distance is 1.0.
pub fn normalized_manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    let max_distance = l2_norm(a) + l2_norm(b);
    if max_distance <= 0.0 {
        return 1.0;
    }
    (manhattan_distance(a, b) / max_distance).clamp(0.0, 1.0)
}
