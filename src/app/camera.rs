use std::f32::consts::FRAC_PI_3;

use eframe::egui::{Pos2, Rect, Vec2};
use glam::{Mat4, Vec3};

const FOV_Y: f32 = FRAC_PI_3;
const NEAR: f32 = 0.1;
const FAR: f32 = 4_000.0;
const ORBIT_SPEED: f32 = 0.008;
const PITCH_LIMIT: f32 = 1.45;

/// Camera circling `target` at `distance`, steered by yaw/pitch in radians.
#[derive(Clone, Copy, Debug)]
pub(super) struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.6,
            pitch: 0.35,
            distance: 140.0,
        }
    }
}

impl OrbitCamera {
    fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub(super) fn orbit(&mut self, drag: Vec2) {
        self.yaw -= drag.x * ORBIT_SPEED;
        self.pitch = (self.pitch + drag.y * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub(super) fn zoom(&mut self, scroll: f32) {
        let factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
        self.distance = (self.distance * factor).clamp(10.0, 1_200.0);
    }

    pub(super) fn projector(&self, rect: Rect) -> Projector {
        let eye = self.eye();
        let aspect = (rect.width() / rect.height().max(1.0)).max(0.01);
        let view_proj = Mat4::perspective_rh(FOV_Y, aspect, NEAR, FAR)
            * Mat4::look_at_rh(eye, self.target, Vec3::Y);
        Projector {
            rect,
            forward: (self.target - eye).normalize_or_zero(),
            view_proj,
            inverse: view_proj.inverse(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Projected {
    pub(super) screen: Pos2,
    /// Distance along the view axis.
    pub(super) depth: f32,
}

/// World/screen conversions for one frame.
pub(super) struct Projector {
    rect: Rect,
    forward: Vec3,
    view_proj: Mat4,
    inverse: Mat4,
}

impl Projector {
    pub(super) fn project(&self, world: Vec3) -> Option<Projected> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let center = self.rect.center();
        Some(Projected {
            screen: Pos2::new(
                center.x + ndc.x * self.rect.width() * 0.5,
                center.y - ndc.y * self.rect.height() * 0.5,
            ),
            depth: clip.w,
        })
    }

    /// Screen pixels covered by one world unit at `depth`.
    pub(super) fn pixels_per_unit(&self, depth: f32) -> f32 {
        let half_height = self.rect.height() * 0.5;
        half_height / (depth.max(NEAR) * (FOV_Y * 0.5).tan())
    }

    /// The point under `screen` on the plane through `anchor` facing the camera.
    pub(super) fn unproject_at(&self, screen: Pos2, anchor: Vec3) -> Option<Vec3> {
        let center = self.rect.center();
        let x = (screen.x - center.x) / (self.rect.width() * 0.5).max(1.0);
        let y = -(screen.y - center.y) / (self.rect.height() * 0.5).max(1.0);

        let near = self.inverse.project_point3(Vec3::new(x, y, 0.0));
        let far = self.inverse.project_point3(Vec3::new(x, y, 1.0));
        let direction = (far - near).normalize_or_zero();
        let facing = direction.dot(self.forward);
        if facing.abs() <= f32::EPSILON {
            return None;
        }

        let along = (anchor - near).dot(self.forward) / facing;
        let point = near + direction * along;
        point.is_finite().then_some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let camera = OrbitCamera::default();
        let projected = camera
            .projector(viewport())
            .project(camera.target)
            .expect("target in front of camera");

        assert!((projected.screen.x - 400.0).abs() < 1e-2);
        assert!((projected.screen.y - 300.0).abs() < 1e-2);
        assert!((projected.depth - camera.distance).abs() < 1e-2);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let camera = OrbitCamera::default();
        let projector = camera.projector(viewport());
        let behind = camera.eye() + (camera.eye() - camera.target);
        assert!(projector.project(behind).is_none());
    }

    #[test]
    fn unproject_stays_on_anchor_plane() {
        let camera = OrbitCamera::default();
        let projector = camera.projector(viewport());
        let anchor = Vec3::new(5.0, -3.0, 8.0);
        let screen = projector.project(anchor).expect("visible").screen;

        let moved = projector
            .unproject_at(screen + Vec2::new(40.0, 0.0), anchor)
            .expect("plane hit");

        let plane_offset = (moved - anchor).dot(projector.forward);
        assert!(plane_offset.abs() < 1e-2);
        assert!(moved.distance(anchor) > 0.1);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.zoom(-1.0e6);
        assert!(camera.distance <= 1_200.0);
    }
}
