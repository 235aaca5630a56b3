use anyhow::Context;
use glam::Vec3;

use crate::{
    config::DemoConfig,
    geometry::{axes_vertices, Geometry},
    gradient::{from_rgb_u32, GradientTexture, GRADIENT_WIDTH},
    particles::{point_vertices, random_positions},
    scene_graph::{ModelKind, Object3D, ObjectId, Scene, SceneModel},
};

pub const GRADIENT_COLORS: [&str; 5] = ["#FEAC5E", "#C779D0", "#4BC0C8", "#C779D0", "#FEAC5E"];

pub const MESH_RADIUS: f32 = 0.7;
pub const MESH_DETAIL: u32 = 1;
pub const WIREFRAME_SCALE: f32 = 1.001;
pub const AXES_LENGTH: f32 = 1.0;

pub const WIREFRAME_COLOR: u32 = 0xffffff;
pub const PARTICLE_COLOR: u32 = 0xffffff;

/// Hemisphere light: sky color, ground color, intensity.
pub const HEMISPHERE_LIGHT: (u32, u32, f32) = (0xffffff, 0x080820, 1.0);

/// Objects mutated by the animation loops.
#[derive(Debug, Clone, Copy)]
pub struct SceneHandles {
    pub mesh: ObjectId,
    pub wireframe: ObjectId,
    pub particles: Option<ObjectId>,
}

pub struct SceneSetup {
    pub scene: Scene,
    pub handles: SceneHandles,
    pub gradient: GradientTexture,
}

pub fn build_scene(config: &DemoConfig) -> anyhow::Result<SceneSetup> {
    let gradient = GradientTexture::from_hex(&GRADIENT_COLORS, GRADIENT_WIDTH)
        .context("Failed to create gradient texture")?;

    let mut scene = Scene::new();

    let axes_model = scene.add_model(SceneModel::new(
        "Axes",
        ModelKind::Lines(axes_vertices(AXES_LENGTH)),
    ));
    scene.add_object(Object3D::named("Axes").with_model(axes_model));

    let geometry = Geometry::icosahedron(MESH_RADIUS, MESH_DETAIL);

    let mesh_model = scene.add_model(SceneModel::new(
        "Icosahedron",
        ModelKind::Shaded(geometry.shaded_vertices()),
    ));
    let mesh = scene.add_object(Object3D::named("Mesh").with_model(mesh_model));

    let wireframe_model = scene.add_model(SceneModel::new(
        "Icosahedron wireframe",
        ModelKind::Lines(geometry.edge_vertices(from_rgb_u32(WIREFRAME_COLOR))),
    ));
    let wireframe = scene.add_child(
        mesh,
        Object3D::named("Wireframe").with_model(wireframe_model),
    );
    scene.update_object_transform(wireframe, |t| t.set_uniform_scale(WIREFRAME_SCALE));

    let particles = if config.has_particles() {
        let positions = random_positions(
            config.particles,
            config.particle_extent,
            &mut rand::thread_rng(),
        );
        let particle_model = scene.add_model(SceneModel::new(
            "Particles",
            ModelKind::Points(point_vertices(&positions, from_rgb_u32(PARTICLE_COLOR))),
        ));
        Some(scene.add_object(Object3D::named("Particles").with_model(particle_model)))
    } else {
        None
    };

    scene.late_update();

    log::info!(
        "Built {:?} scene: {} objects, {} triangles, {} particles",
        config.variant,
        scene.objects.len(),
        geometry.triangle_count(),
        if particles.is_some() { config.particles } else { 0 },
    );

    Ok(SceneSetup {
        scene,
        handles: SceneHandles {
            mesh,
            wireframe,
            particles,
        },
        gradient,
    })
}

pub fn hemisphere_light() -> (Vec3, Vec3, f32) {
    let (sky, ground, intensity) = HEMISPHERE_LIGHT;
    (from_rgb_u32(sky), from_rgb_u32(ground), intensity)
}

#[cfg(test)]
mod tests {
    use crate::config::Variant;

    use super::*;

    #[test]
    fn particles_variant_has_particle_group() {
        let config = DemoConfig {
            particles: 50,
            ..DemoConfig::default()
        };
        let setup = build_scene(&config).unwrap();

        let particles = setup.handles.particles.expect("particle group");
        let object = setup.scene.get_object(particles).unwrap();
        let model = setup.scene.models.get(object.model_id.unwrap()).unwrap();
        assert_eq!(model.vertex_count(), 50);
        assert!(matches!(model.kind, ModelKind::Points(_)));
    }

    #[test]
    fn pulse_variant_skips_particles() {
        let config = DemoConfig {
            variant: Variant::Pulse,
            ..DemoConfig::default()
        };
        let setup = build_scene(&config).unwrap();

        assert!(setup.handles.particles.is_none());
        assert_eq!(setup.scene.objects.len(), 3);
    }

    #[test]
    fn wireframe_hangs_off_the_mesh() {
        let setup = build_scene(&DemoConfig::default()).unwrap();
        let scene = &setup.scene;

        let wireframe = scene.get_object(setup.handles.wireframe).unwrap();
        assert_eq!(wireframe.parent_id, Some(setup.handles.mesh));
        assert_eq!(
            scene
                .get_object_transform(setup.handles.wireframe)
                .unwrap()
                .scale(),
            Vec3::splat(WIREFRAME_SCALE)
        );

        let mesh = scene.get_object(setup.handles.mesh).unwrap();
        let mesh_model = scene.models.get(mesh.model_id.unwrap()).unwrap();
        assert_eq!(mesh_model.vertex_count(), 240);
        assert_eq!(setup.gradient.width(), GRADIENT_WIDTH);
    }
}
