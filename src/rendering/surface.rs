use crate::{camera::Camera, scene_graph::Scene};

/// Something that can draw the scene through a camera.
///
/// Animation loops call `draw` once per iteration.
pub trait RenderSurface {
    fn draw(&mut self, scene: &Scene, camera: &Camera);
}

/// Collects the draw requests issued during one display refresh.
///
/// The GPU renderer presents at most one image per refresh, so any number of
/// requests in a frame collapse into a single present.
#[derive(Debug, Default)]
pub struct FrameRequests {
    count: usize,
}

impl FrameRequests {
    pub fn begin_frame(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn should_present(&self) -> bool {
        self.count > 0
    }
}

impl RenderSurface for FrameRequests {
    fn draw(&mut self, _scene: &Scene, _camera: &Camera) {
        self.count += 1;
        if self.count > 1 {
            log::trace!("Coalescing draw request {} into this frame", self.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn requests_reset_every_frame() {
        let scene = Scene::new();
        let camera = Camera::perspective(Vec3::Z * 2.0, 1.0);
        let mut requests = FrameRequests::default();

        assert!(!requests.should_present());
        requests.draw(&scene, &camera);
        requests.draw(&scene, &camera);
        assert_eq!(requests.count(), 2);
        assert!(requests.should_present());

        requests.begin_frame();
        assert_eq!(requests.count(), 0);
    }
}
