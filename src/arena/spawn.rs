//! Uniform spawn-point sampling inside the play area

use glam::Vec2;
use rand::Rng;

use crate::cross3;

/// Pick a uniformly distributed point inside a convex polygon
///
/// Fan-triangulates from vertex 0, picks a triangle weighted by area, then
/// samples it with reflected barycentric coordinates. Returns `None` for fewer
/// than three vertices or zero total area.
pub fn sample_uniform_point<R: Rng + ?Sized>(polygon: &[Vec2], rng: &mut R) -> Option<Vec2> {
    if polygon.len() < 3 {
        return None;
    }

    let apex = polygon[0];
    let areas: Vec<f32> = polygon
        .windows(2)
        .skip(1)
        .map(|w| cross3(apex, w[0], w[1]).abs() / 2.0)
        .collect();
    let total: f32 = areas.iter().sum();
    if !(total > 0.0) {
        return None;
    }

    let mut remaining = rng.random::<f32>() * total;
    // Float slop falls through to the last triangle
    let mut chosen = areas.len() - 1;
    for (i, &area) in areas.iter().enumerate() {
        if remaining < area {
            chosen = i;
            break;
        }
        remaining -= area;
    }

    let b = polygon[chosen + 1];
    let c = polygon[chosen + 2];
    let mut r1 = rng.random::<f32>();
    let mut r2 = rng.random::<f32>();
    if r1 + r2 > 1.0 {
        r1 = 1.0 - r1;
        r2 = 1.0 - r2;
    }
    Some(apex + (b - apex) * r1 + (c - apex) * r2)
}

/// Like [`sample_uniform_point`], but degenerate polygons fall back to
/// their first vertex
pub fn sample_point_or_first_vertex<R: Rng + ?Sized>(polygon: &[Vec2], rng: &mut R) -> Option<Vec2> {
    sample_uniform_point(polygon, rng).or_else(|| polygon.first().copied())
}
