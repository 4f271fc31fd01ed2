use glam::Vec3;

/// Repulsion uses `strength / max(d², MIN_DISTANCE_SQ)`.
pub(super) const MIN_DISTANCE_SQ: f32 = 0.1;
/// Hookean stiffness scale applied on top of `connection_stiffness`.
pub(super) const SPRING_SCALE: f32 = 0.01;

const COINCIDENT_EPSILON_SQ: f32 = 1e-12;

/// Unit vector for two nodes at the same point, stable for a given pair of indices.
fn fallback_direction(a: usize, b: usize) -> Vec3 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    let lift = ((a as f32) * 0.271_828 + (b as f32) * 0.141_421).fract() * 2.0 - 1.0;
    Vec3::new(angle.cos(), angle.sin(), lift).normalize_or(Vec3::X)
}

/// Force on `a` pushing it away from `b`.
pub(super) fn repulsion_between(
    point_a: Vec3,
    point_b: Vec3,
    index_a: usize,
    index_b: usize,
    strength: f32,
) -> Vec3 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_squared();
    let direction = if distance_sq > COINCIDENT_EPSILON_SQ {
        delta / distance_sq.sqrt()
    } else {
        fallback_direction(index_a, index_b)
    };

    direction * (strength / distance_sq.max(MIN_DISTANCE_SQ))
}

/// Force on `end` along the edge; `start` receives the negation. Positive displacement
/// (stretched) pulls `end` toward `start`.
pub(super) fn spring_between(start: Vec3, end: Vec3, rest_length: f32, stiffness: f32) -> Vec3 {
    let delta = start - end;
    let distance = delta.length();
    if distance <= 1e-6 {
        return Vec3::ZERO;
    }

    let displacement = distance - rest_length;
    (delta / distance) * (stiffness * displacement * SPRING_SCALE)
}

pub(super) fn cluster_pull(position: Vec3, center: Vec3, attraction: f32) -> Vec3 {
    (center - position) * attraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repulsion_points_away_and_floors_distance() {
        let force = repulsion_between(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, 0, 1, 20.0);
        assert!((force - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-5);

        let close = repulsion_between(Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO, 0, 1, 20.0);
        assert!((close.length() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn coincident_points_still_get_a_finite_push() {
        let force = repulsion_between(Vec3::ONE, Vec3::ONE, 3, 7, 10.0);
        assert!(force.is_finite());
        assert!((force.length() - 100.0).abs() < 1e-3);
        assert_eq!(force, repulsion_between(Vec3::ONE, Vec3::ONE, 3, 7, 10.0));
    }

    #[test]
    fn spring_pulls_when_stretched_and_pushes_when_compressed() {
        let stretched = spring_between(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 4.0, 50.0);
        assert!(stretched.x < 0.0);
        assert!((stretched.x + 3.0).abs() < 1e-5);

        let compressed = spring_between(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 4.0, 50.0);
        assert!(compressed.x > 0.0);

        assert_eq!(spring_between(Vec3::ONE, Vec3::ONE, 4.0, 50.0), Vec3::ZERO);
    }

    #[test]
    fn cluster_pull_scales_offset() {
        let force = cluster_pull(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 1.5);
        assert_eq!(force, Vec3::new(-3.0, 0.0, 0.0));
    }
}
