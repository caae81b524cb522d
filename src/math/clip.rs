//! Convex half-plane clipping for Voronoi cell construction
//!
//! A Voronoi cell is the intersection of the half-planes bounded by the
//! perpendicular bisectors toward each Delaunay neighbor. Clipping a convex
//! ring against one bisector at a time (Sutherland–Hodgman with a single
//! plane) keeps the intermediate polygon convex throughout.

use geo::Coord;

/// Clip a convex ring to the side of the `keep`/`other` bisector nearer `keep`
///
/// The ring is an open vertex list (no repeated endpoint). Returns the
/// clipped ring, which may be empty when the input lies entirely on the far
/// side, or degenerate (fewer than three vertices) when only an edge grazes
/// the bisector.
pub fn clip_to_bisector(
    ring: &[Coord<f64>],
    keep: Coord<f64>,
    other: Coord<f64>,
) -> Vec<Coord<f64>> {
    if ring.is_empty() {
        return Vec::new();
    }

    let mid_x = (keep.x + other.x) / 2.0;
    let mid_y = (keep.y + other.y) / 2.0;
    let dir_x = other.x - keep.x;
    let dir_y = other.y - keep.y;

    // Signed offset from the bisector; non-positive means nearer `keep`.
    let offset = |p: &Coord<f64>| (p.x - mid_x).mul_add(dir_x, (p.y - mid_y) * dir_y);

    let mut output = Vec::with_capacity(ring.len() + 1);

    for (current, next) in ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .take(ring.len())
    {
        let current_offset = offset(current);
        let next_offset = offset(next);
        let current_inside = current_offset <= 0.0;
        let next_inside = next_offset <= 0.0;

        if current_inside {
            output.push(*current);
        }

        if current_inside != next_inside {
            let t = current_offset / (current_offset - next_offset);
            output.push(Coord {
                x: t.mul_add(next.x - current.x, current.x),
                y: t.mul_add(next.y - current.y, current.y),
            });
        }
    }

    output
}
