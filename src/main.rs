// main.rs — panorama sphere viewer
//
// Drop an image on the window or press O to swap the panorama, click to log
// the source pixel under the cursor, +/- to change the tessellation.

use std::path::PathBuf;

use log::{error, info};
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use panorama_sphere::camera::Camera;
use panorama_sphere::config::ViewerConfig;
use panorama_sphere::error::{ConfigurationError, RenderError, SphereError};
use panorama_sphere::mesh::SphereSpec;
use panorama_sphere::renderer::Renderer;
use panorama_sphere::sphere::PanoramaSphere;
use panorama_sphere::texture::TextureSource;

const TITLE: &str = "Panorama Sphere";
const MAX_SLICES: u32 = 1024;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ViewerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(config) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: ViewerConfig) -> Result<(), SphereError> {
    let spec = config.sphere_spec()?;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(TITLE)
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
        .map_err(|e| RenderError::Rejected(format!("create window: {e}")))?;

    let mut renderer = pollster::block_on(Renderer::new(&window))?;
    let mut camera = config.camera(renderer.size.width, renderer.size.height);

    let initial = match &config.image {
        Some(path) => TextureSource::FilePath(path.clone()),
        None => TextureSource::Decoded(placeholder_image()),
    };
    let mut sphere = PanoramaSphere::with_spec(&mut renderer, spec, initial)?;
    update_title(&window, &sphere);

    let mut cursor: Option<PhysicalPosition<f64>> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }

                WindowEvent::Resized(new_size) => {
                    renderer.resize(new_size);
                    camera.set_viewport(new_size.width, new_size.height);
                    window.request_redraw();
                }

                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    renderer.resize(*new_inner_size);
                    camera.set_viewport(new_inner_size.width, new_inner_size.height);
                }

                WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                    match input.virtual_keycode {
                        Some(VirtualKeyCode::O) => {
                            if let Some(path) = pick_image() {
                                swap(&mut sphere, &mut renderer, &window, path);
                            }
                        }
                        Some(VirtualKeyCode::Equals | VirtualKeyCode::Plus | VirtualKeyCode::NumpadAdd) => {
                            let spec = sphere.spec().refined();
                            retessellate(&mut sphere, &mut renderer, &window, spec);
                        }
                        Some(VirtualKeyCode::Minus | VirtualKeyCode::NumpadSubtract) => {
                            let spec = sphere.spec().coarsened();
                            retessellate(&mut sphere, &mut renderer, &window, spec);
                        }
                        _ => {}
                    }
                }

                WindowEvent::CursorMoved { position, .. } => {
                    cursor = Some(position);
                }

                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => {
                    if let Some(position) = cursor {
                        report_pixel(&sphere, &camera, &renderer, position);
                    }
                }

                WindowEvent::DroppedFile(path) => {
                    swap(&mut sphere, &mut renderer, &window, path);
                }

                _ => {}
            },

            Event::RedrawRequested(_) => {
                renderer.update_camera(&camera, sphere.spec().radius());
                match sphere.render(&mut renderer) {
                    Ok(()) => {}
                    Err(RenderError::Surface(wgpu::SurfaceError::Lost)) => {
                        renderer.resize(renderer.size);
                        window.request_redraw();
                    }
                    Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        error!("out of GPU memory, exiting");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => error!("render failed: {e}"),
                }
            }

            _ => {}
        }
    });
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"])
        .pick_file()
}

fn swap(sphere: &mut PanoramaSphere<Renderer>, renderer: &mut Renderer, window: &Window, path: PathBuf) {
    info!("loading panorama {:?}", path);
    match sphere.swap_texture(renderer, path) {
        Ok(()) => {
            update_title(window, sphere);
            window.request_redraw();
        }
        Err(e) => error!("keeping current panorama: {e}"),
    }
}

fn retessellate(
    sphere: &mut PanoramaSphere<Renderer>,
    renderer: &mut Renderer,
    window: &Window,
    spec: Result<SphereSpec, ConfigurationError>,
) {
    let spec = match spec {
        Ok(spec) if spec.slices() > MAX_SLICES => {
            info!("keeping current tessellation: {} slices is the limit", MAX_SLICES);
            return;
        }
        Ok(spec) => spec,
        Err(e) => {
            error!("keeping current tessellation: {e}");
            return;
        }
    };
    match sphere.retessellate(renderer, spec) {
        Ok(()) => {
            update_title(window, sphere);
            window.request_redraw();
        }
        Err(e) => error!("keeping current tessellation: {e}"),
    }
}

fn report_pixel(
    sphere: &PanoramaSphere<Renderer>,
    camera: &Camera,
    renderer: &Renderer,
    position: PhysicalPosition<f64>,
) {
    let direction = camera.ray_direction(
        position.x as f32,
        position.y as f32,
        renderer.size.width,
        renderer.size.height,
    );
    match sphere.image_pixel_from_vector(direction) {
        Ok(pixel) => info!(
            "cursor ({:.0}, {:.0}) -> image pixel ({:.1}, {:.1})",
            position.x, position.y, pixel.x, pixel.y
        ),
        Err(e) => error!("hit test failed: {e}"),
    }
}

fn update_title(window: &Window, sphere: &PanoramaSphere<Renderer>) {
    let (w, h) = sphere.texture().dimensions();
    let spec = sphere.spec();
    window.set_title(&format!(
        "{TITLE} | {w}x{h} | {}x{} ({} triangles)",
        spec.stacks(),
        spec.slices(),
        sphere.mesh().triangle_count()
    ));
}

/// Latitude gradient shown until a panorama is loaded: sky on top, ground below.
fn placeholder_image() -> image::RgbaImage {
    image::RgbaImage::from_fn(512, 256, |x, y| {
        let v = y as f32 / 255.0;
        let band = if (x / 32 + y / 32) % 2 == 0 { 0 } else { 24 };
        let sky = [70u8, 130, 200];
        let ground = [90u8, 70, 50];
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - v) + b as f32 * v) as u8;
        image::Rgba([
            mix(sky[0], ground[0]).saturating_add(band),
            mix(sky[1], ground[1]).saturating_add(band),
            mix(sky[2], ground[2]).saturating_add(band),
            255,
        ])
    })
}
