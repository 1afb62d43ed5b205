//! End-to-end pipeline tests against the recording backend.
//!
//! Covers:
//! - uploaded geometry for every variant's cube
//! - shader build success and stage-tagged compile failures
//! - projection tracking a surface resize
//! - the first frame's model-view and the per-tick rotation
//! - the textured startup ordering around the image load

use cubist_engine::animation::{AnimationDriver, CancelToken, ROTATION_STEP};
use cubist_engine::assets::{ImageSet, PendingImages, pending};
use cubist_engine::coords::SurfaceSize;
use cubist_engine::graphics::{BufferKind, RecordingContext};
use cubist_engine::model::{Model, Transform};
use cubist_engine::render::Renderer;
use cubist_engine::scene::{Scene, SceneConfig, SceneStatus, TEXTURE_KEY, Variant};
use cubist_engine::shader::{ProgramSources, ShaderError, ShaderProgram, Stage};
use glam::{Mat3, Vec3, Vec4};
use image::RgbaImage;

const CUBE_VARIANTS: [Variant; 3] = [Variant::Plain, Variant::Colored, Variant::Textured];

fn build(sources: &ProgramSources) -> Result<ShaderProgram, ShaderError> {
    ShaderProgram::build(&sources.vertex, &sources.fragment)
}

fn texture_images() -> ImageSet {
    let mut set = ImageSet::new();
    set.insert(TEXTURE_KEY, RgbaImage::new(16, 16));
    set
}

fn running_scene(variant: Variant, ctx: &mut RecordingContext) -> Scene {
    let mut scene = Scene::new(
        SceneConfig {
            variant,
            ..SceneConfig::default()
        },
        PendingImages::ready(texture_images()),
    );
    scene.frame(ctx).unwrap();
    scene
}

// ============================================================================
// Geometry upload
// ============================================================================

#[test]
fn uploaded_positions_cover_every_vertex() {
    for variant in CUBE_VARIANTS {
        let mut ctx = RecordingContext::new(SurfaceSize::new(640, 480));
        let scene = running_scene(variant, &mut ctx);

        let model = scene.model().unwrap();
        let buffers = model.buffers().unwrap();
        let vertex_count = model.geometry().vertex_count();

        let positions = ctx.buffer(buffers.positions).unwrap();
        assert_eq!(positions.kind, BufferKind::Vertex);
        assert_eq!(positions.floats().len(), 3 * vertex_count, "{variant}");

        let indices = ctx.buffer(buffers.indices).unwrap().indices();
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|&i| usize::from(i) < vertex_count), "{variant}");
    }
}

// ============================================================================
// Shader builder
// ============================================================================

#[test]
fn builtin_programs_resolve_their_inputs() {
    for variant in CUBE_VARIANTS {
        let program = build(&variant.sources().unwrap()).unwrap();
        let layout = program.layout();
        assert!(layout.attribute("aPos").is_ok());
        assert!(layout.uniform("uPMatrix").is_ok());
        assert!(layout.uniform("uMVMatrix").is_ok());
        assert!(matches!(
            layout.attribute("aNormal"),
            Err(ShaderError::UnknownAttribute(name)) if name == "aNormal"
        ));
    }
}

#[test]
fn syntax_error_names_the_failing_stage() {
    let good = ProgramSources::colored();

    let err = build(&ProgramSources::new("fn vs_main( {", good.fragment.clone())).unwrap_err();
    assert!(matches!(err, ShaderError::Compile { stage: Stage::Vertex, .. }));

    let err = build(&ProgramSources::new(good.vertex.clone(), "@fragment fn fs_main(")).unwrap_err();
    match err {
        ShaderError::Compile { stage, diagnostic } => {
            assert_eq!(stage, Stage::Fragment);
            assert!(!diagnostic.is_empty());
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
}

// ============================================================================
// Renderer
// ============================================================================

#[test]
fn resize_changes_only_the_aspect_ratio() {
    let mut ctx = RecordingContext::new(SurfaceSize::new(800, 600));
    let mut model = Model::new(Variant::Plain.geometry().unwrap(), Transform::default());
    model.init(&mut ctx, None).unwrap();
    let program = build(&ProgramSources::plain()).unwrap();
    let mut renderer = Renderer::new(&mut ctx, &program, &model).unwrap();

    renderer.draw_frame(&mut ctx, &model).unwrap();
    let before = renderer.last_frame_state().unwrap().projection;

    ctx.resize(SurfaceSize::new(400, 300));
    renderer.draw_frame(&mut ctx, &model).unwrap();
    let after = *renderer.last_frame_state().unwrap();

    assert_eq!(after.viewport, SurfaceSize::new(400, 300));
    assert_eq!(ctx.last_frame().unwrap().viewport, SurfaceSize::new(400, 300));
    // Same aspect (4:3), same fov and planes: identical matrices.
    assert!(after.projection.abs_diff_eq(before, 1e-6));

    let aspect = after.projection.y_axis.y / after.projection.x_axis.x;
    assert!((aspect - 400.0 / 300.0).abs() < 1e-5);
}

#[test]
fn first_frame_at_zero_rotation_is_a_pure_translation() {
    let mut ctx = RecordingContext::new(SurfaceSize::new(800, 600));
    let offset = Vec3::new(0.0, 0.0, -10.0);
    let mut model = Model::new(Variant::Colored.geometry().unwrap(), Transform::at(offset));
    model.init(&mut ctx, None).unwrap();
    let program = build(&ProgramSources::colored()).unwrap();
    let mut renderer = Renderer::new(&mut ctx, &program, &model).unwrap();

    renderer.draw_frame(&mut ctx, &model).unwrap();
    let mv = renderer.last_frame_state().unwrap().model_view;

    assert_eq!(Mat3::from_mat4(mv), Mat3::IDENTITY);
    assert_eq!(mv.w_axis, Vec4::new(0.0, 0.0, -10.0, 1.0));
    assert_eq!(ctx.draw_count(), 1);
}

#[test]
fn rotation_after_n_ticks() {
    let mut transform = Transform::default();
    let mut driver = AnimationDriver::new(CancelToken::new());
    let n = 500;
    for _ in 0..n {
        driver.tick(&mut transform);
    }
    let expected = (n as f32 * ROTATION_STEP).rem_euclid(std::f32::consts::TAU);
    assert!((transform.rotation.x - expected).abs() < 1e-3);
}

// ============================================================================
// Textured startup
// ============================================================================

#[test]
fn textured_scene_draws_nothing_until_the_image_arrives() {
    let (completer, images) = pending();
    let mut scene = Scene::new(SceneConfig::default(), images);
    let mut ctx = RecordingContext::new(SurfaceSize::new(640, 480));

    for _ in 0..5 {
        assert_eq!(scene.frame(&mut ctx).unwrap(), SceneStatus::Waiting);
    }
    assert_eq!(ctx.draw_count(), 0);
    assert!(ctx.textures().is_empty());

    completer.complete(Ok(texture_images()));
    for _ in 0..5 {
        scene.frame(&mut ctx).unwrap();
    }

    assert_eq!(ctx.textures().len(), 1);
    assert_eq!(ctx.draw_count(), 5);
}
