//! Eased camera
//!
//! The camera drifts toward a randomized target position and field of view,
//! always looking at the origin. A fresh target is drawn on every scene
//! change; the projection is rebuilt every frame since the viewport can
//! change independently.

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ease::ease;
use crate::consts::*;
use crate::settings::CameraRanges;

/// Perspective projection inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Camera position and fov offset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    /// Offset added to `CAMERA_BASE_FOV`
    pub fov: f32,
}

impl CameraState {
    /// Field of view the projection uses (degrees)
    pub fn effective_fov(&self) -> f32 {
        (CAMERA_BASE_FOV + self.fov).clamp(CAMERA_MIN_FOV, CAMERA_MAX_FOV)
    }

    /// World-to-view transform looking at the origin
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position;
        let dir = -eye;
        if dir.length_squared() <= f32::EPSILON {
            return Mat4::look_to_rh(eye, Vec3::NEG_Z, Vec3::Y);
        }
        // Looking straight up or down the Y axis needs another up vector
        let up = if dir.normalize().cross(Vec3::Y).length_squared() <= 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(eye, Vec3::ZERO, up)
    }
}

/// Eases the camera toward randomized targets
#[derive(Debug, Clone)]
pub struct CameraController {
    current: CameraState,
    target: CameraState,
    ranges: CameraRanges,
    rng: Pcg32,
}

impl CameraController {
    pub fn new(ranges: CameraRanges, seed: u64) -> Self {
        Self {
            current: CameraState::default(),
            target: CameraState::default(),
            ranges,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn current(&self) -> &CameraState {
        &self.current
    }

    pub fn target(&self) -> &CameraState {
        &self.target
    }

    /// Draw each axis and the fov from its own range
    pub fn randomize_target(&mut self) {
        let r = &self.ranges;
        let rng = &mut self.rng;
        self.target = CameraState {
            position: Vec3::new(
                r.x.lerp(rng.random::<f32>()),
                r.y.lerp(rng.random::<f32>()),
                r.z.lerp(rng.random::<f32>()),
            ),
            fov: r.fov.lerp(rng.random::<f32>()),
        };
    }

    /// Advance one frame toward the target
    pub fn ease(&mut self) {
        let (c, t) = (&mut self.current, &self.target);
        c.position.x = ease(c.position.x, t.position.x, CAMERA_EASE, EASE_THRESHOLD);
        c.position.y = ease(c.position.y, t.position.y, CAMERA_EASE, EASE_THRESHOLD);
        c.position.z = ease(c.position.z, t.position.z, CAMERA_EASE, EASE_THRESHOLD);
        c.fov = ease(c.fov, t.fov, CAMERA_EASE, EASE_THRESHOLD);
    }

    /// Projection for the current fov and the given aspect ratio
    pub fn projection(&self, aspect: f32) -> Projection {
        Projection {
            fov: self.current.effective_fov(),
            aspect,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Range;

    fn controller(seed: u64) -> CameraController {
        CameraController::new(CameraRanges::default(), seed)
    }

    #[test]
    fn test_target_within_ranges() {
        let mut cam = controller(10);
        let ranges = CameraRanges::default();
        for _ in 0..100 {
            cam.randomize_target();
            let t = cam.target();
            assert!(ranges.x.contains(t.position.x));
            assert!(ranges.y.contains(t.position.y));
            assert!(ranges.z.contains(t.position.z));
            assert!(ranges.fov.contains(t.fov));
        }
    }

    #[test]
    fn test_ease_uses_camera_rate_per_axis() {
        let mut cam = controller(1);
        cam.target = CameraState {
            position: Vec3::new(10.0, -20.0, 4.0),
            fov: 8.0,
        };
        cam.ease();
        let c = cam.current();
        assert!((c.position.x - 10.0 * CAMERA_EASE).abs() < 1e-6);
        assert!((c.position.y + 20.0 * CAMERA_EASE).abs() < 1e-6);
        assert!((c.position.z - 4.0 * CAMERA_EASE).abs() < 1e-6);
        assert!((c.fov - 8.0 * CAMERA_EASE).abs() < 1e-6);
    }

    #[test]
    fn test_settled_camera_stays_put() {
        let mut cam = controller(2);
        cam.ease();
        assert_eq!(*cam.current(), CameraState::default());
    }

    #[test]
    fn test_effective_fov_offsets_and_clamps() {
        let mut state = CameraState::default();
        assert_eq!(state.effective_fov(), 60.0);
        state.fov = -20.0;
        assert_eq!(state.effective_fov(), 40.0);
        state.fov = -500.0;
        assert_eq!(state.effective_fov(), CAMERA_MIN_FOV);
        state.fov = 500.0;
        assert_eq!(state.effective_fov(), CAMERA_MAX_FOV);
    }

    #[test]
    fn test_projection_follows_aspect() {
        let cam = controller(3);
        let p = cam.projection(16.0 / 9.0);
        assert_eq!(p.aspect, 16.0 / 9.0);
        assert_eq!((p.near, p.far), (CAMERA_NEAR, CAMERA_FAR));
        assert!(p.matrix().is_finite());
    }

    #[test]
    fn test_view_matrix_finite_for_degenerate_positions() {
        for position in [Vec3::ZERO, Vec3::new(0.0, 15.0, 0.0), Vec3::new(3.0, -2.0, 9.0)] {
            let state = CameraState { position, fov: 0.0 };
            assert!(state.view_matrix().is_finite(), "{position:?}");
        }
    }

    #[test]
    fn test_fixed_ranges_pin_target() {
        let ranges = CameraRanges {
            x: Range::new(1.0, 1.0),
            y: Range::new(2.0, 2.0),
            z: Range::new(3.0, 3.0),
            fov: Range::new(0.0, 0.0),
        };
        let mut cam = CameraController::new(ranges, 4);
        cam.randomize_target();
        assert_eq!(cam.target().position, Vec3::new(1.0, 2.0, 3.0));
    }
}
