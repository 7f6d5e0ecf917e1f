use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use terra::frame::DEFAULT_ROTATION_STEP;
use terra::{
    FrameDriver, FrameScheduler, FrameSink, GlobeScene, SphereMesh, StarFieldGenerator,
    StarFieldParams,
};

#[derive(Default)]
struct Frames {
    submitted: u32,
    active_uniforms: u32,
}

impl FrameSink for Frames {
    type Error = std::convert::Infallible;

    fn submit(&mut self, scene: &GlobeScene) -> Result<(), Self::Error> {
        self.submitted += 1;
        if scene.terrain_uniforms().to_std140().interaction[2] > 0.5 {
            self.active_uniforms += 1;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Refresh {
    requests: u32,
}

impl FrameScheduler for Refresh {
    fn request_next_frame(&mut self) {
        self.requests += 1;
    }
}

fn scene() -> GlobeScene {
    GlobeScene::new(SphereMesh::icosphere(16), 1280, 720)
}

#[test]
fn idle_tick_spins_the_globe_and_leaves_interaction_unset() {
    let mut scene = scene();
    let mut driver = FrameDriver::default();
    let mut sink = Frames::default();
    let mut refresh = Refresh::default();

    driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();

    assert_eq!(scene.rotation, DEFAULT_ROTATION_STEP);
    assert_eq!(scene.interaction.surface_uv(), None);
    assert_eq!(scene.interaction.pointer(), None);
    assert!((scene.camera.position - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    assert_eq!(refresh.requests, 1);
}

#[test]
fn every_tick_submits_once_and_requests_once() {
    let mut scene = scene();
    let mut driver = FrameDriver::default();
    let mut sink = Frames::default();
    let mut refresh = Refresh::default();

    for _ in 0..120 {
        driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();
    }

    assert_eq!(sink.submitted, 120);
    assert_eq!(refresh.requests, 120);
    assert_eq!(driver.frames(), 120);
    assert!((scene.rotation - 120.0 * DEFAULT_ROTATION_STEP).abs() < 1e-5);
    assert_eq!(sink.active_uniforms, 0);
}

#[test]
fn pointer_over_the_globe_activates_the_highlight_next_frame() {
    let mut scene = scene();
    let mut driver = FrameDriver::default();
    let mut sink = Frames::default();
    let mut refresh = Refresh::default();

    scene.interaction.set_pointer_px(640.0, 360.0, 1280.0, 720.0);
    driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();
    // The first frame was submitted before the pointer was resolved.
    assert_eq!(sink.active_uniforms, 0);

    let uv = scene.interaction.surface_uv().expect("centre of the view hits the globe");
    assert!((uv.y - 0.5).abs() < 1e-2);

    driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();
    assert_eq!(sink.active_uniforms, 1);

    // Leaving the globe keeps the highlight where it was.
    scene.interaction.set_pointer(Vec2::new(0.98, 0.98));
    driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();
    assert_eq!(scene.interaction.surface_uv(), Some(uv));
}

#[test]
fn drag_keeps_gliding_after_release() {
    let mut scene = scene();
    let mut driver = FrameDriver::default();
    let mut sink = Frames::default();
    let mut refresh = Refresh::default();

    scene.controls.rotate_by_pixels(80.0, 0.0, scene.viewport.y);
    driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();
    let after_one = scene.camera.position;
    for _ in 0..10 {
        driver.tick(&mut scene, &mut sink, &mut refresh).unwrap();
    }
    assert!(scene.camera.position.x < after_one.x);
    assert!((scene.camera.position.length() - 4.0).abs() < 1e-4);
}

#[test]
fn seeded_star_field_is_stable_across_runs() {
    let generator = StarFieldGenerator::new(StarFieldParams::default());
    let a = generator.generate(&mut StdRng::seed_from_u64(7));
    let b = generator.generate(&mut StdRng::seed_from_u64(7));
    assert_eq!(a.len(), 4500);
    assert_eq!(a, b);
}
