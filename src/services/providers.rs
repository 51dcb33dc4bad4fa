//! External collaborator seams.
//!
//! The embedding and traffic providers live outside this crate (the host
//! wires in real clients); both are strictly best-effort. A missing or
//! failing provider never fails a search — the affected signal degrades to
//! its documented default instead.

use async_trait::async_trait;
use chrono::{NaiveTime, Timelike};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Text to fixed-length vector. Backed by an embedding model upstream.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionLevel {
    Low,
    Moderate,
    Heavy,
}

/// Live congestion classification for a place at a point in time.
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    async fn congestion(
        &self,
        coordinates: (f64, f64),
        at: NaiveTime,
    ) -> Result<CongestionLevel, BoxError>;
}

/// Static fallback when no traffic provider is wired in: commute windows
/// and the lunch rush are busier, everything else is quiet.
pub fn static_congestion(at: NaiveTime) -> CongestionLevel {
    match at.hour() {
        7..=9 | 16..=19 => CongestionLevel::Heavy,
        11..=13 => CongestionLevel::Moderate,
        _ => CongestionLevel::Low,
    }
}

/// Cosine similarity clamped to `0.0..=1.0`. Mismatched or empty vectors
/// score zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}
