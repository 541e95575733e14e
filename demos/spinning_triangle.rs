//! A spinning triangle over a checkered backdrop: the smallest tour of the
//! crate. Window and context plumbing via glutin + winit; everything after
//! `gl::load_with` is minigfx.

use glutin::prelude::*;
use minigfx::gl;
use minigfx::{
    FillPolicy, Filtering, Image, IndirectDraw, Mat4, Model, Shader, StorageFlags, Texture2D,
    Topology, Vec2, Vec3, Vec4,
};

const VERTEX_SOURCE: &str = r"#version 460 core
layout(location = 0) uniform mat4 projection;
layout(location = 1) uniform float angle;

layout(location = 0) in vec3 pos;

out vec2 uv;

void main() {
    mat2 spin = mat2(cos(angle), sin(angle), -sin(angle), cos(angle));
    uv = pos.xy + 0.5;
    gl_Position = projection * vec4(spin * pos.xy, pos.z, 1.0);
}
";

const FRAGMENT_SOURCE: &str = r"#version 460 core
layout(location = 2) uniform vec4 tint;
layout(binding = 0) uniform sampler2D backdrop;

in vec2 uv;
out vec4 color;

void main() {
    color = texture(backdrop, uv) * tint;
}
";

struct App {
    window: Option<Window>,
}

impl winit::application::ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        event_loop.listen_device_events(winit::event_loop::DeviceEvents::Never);
        if self.window.is_none() {
            self.window = Some(Window::new(event_loop));
        }
    }
    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        use winit::event::WindowEvent as Event;
        match event {
            Event::CloseRequested
            | Event::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        state: winit::event::ElementState::Pressed,
                        physical_key:
                            winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            Event::RedrawRequested => {
                if let Some(window) = &mut self.window {
                    window.redraw();
                }
            }
            _ => (),
        }
    }
    fn about_to_wait(&mut self, _: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.window.request_redraw();
        }
    }
    fn suspended(&mut self, _: &winit::event_loop::ActiveEventLoop) {
        self.window.take();
    }
    fn exiting(&mut self, _: &winit::event_loop::ActiveEventLoop) {
        self.window.take();
    }
}

struct Window {
    // Field order: GL objects drop while the context lives, context before
    // the window.
    shader: Shader,
    triangle: Model,
    backdrop: Texture2D,
    command: IndirectDraw,

    surface: glutin::surface::Surface<glutin::surface::WindowSurface>,
    context: glutin::context::PossiblyCurrentContext,
    window: winit::window::Window,

    started: std::time::Instant,
}

impl Window {
    fn new(event_loop: &winit::event_loop::ActiveEventLoop) -> Self {
        use glutin::display::{GetGlDisplay, GlDisplay};
        use winit::raw_window_handle::HasWindowHandle;

        let (window, config) = glutin_winit::DisplayBuilder::new()
            .build(
                event_loop,
                glutin::config::ConfigTemplateBuilder::new().with_depth_size(24),
                |mut configs| configs.next().unwrap(),
            )
            .unwrap();
        assert!(window.is_none());

        let window = glutin_winit::finalize_window(
            event_loop,
            winit::window::WindowAttributes::default()
                .with_inner_size(winit::dpi::PhysicalSize::new(512, 512))
                .with_resizable(false),
            &config,
        )
        .unwrap();

        let display = config.display();
        let rwh = window.window_handle().unwrap().as_raw();
        // Safety: Window must be valid. It is.
        let surface = unsafe {
            display.create_window_surface(
                &config,
                &glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new()
                    .build(
                        rwh,
                        window.inner_size().width.try_into().unwrap(),
                        window.inner_size().height.try_into().unwrap(),
                    ),
            ).unwrap()
        };
        // Safety: Window must be valid. It is.
        let context = unsafe {
            display.create_context(
                &config,
                &glutin::context::ContextAttributesBuilder::new()
                    .with_profile(glutin::context::GlProfile::Core)
                    .with_debug(cfg!(debug_assertions))
                    .with_context_api(glutin::context::ContextApi::OpenGl(Some(
                        glutin::context::Version::new(4, 6),
                    )))
                    .build(Some(rwh)),
            )
        }
        .unwrap()
        .make_current(&surface)
        .unwrap();

        // Load global proc addresses. This is only usable if there is ONE
        // display in use for the lifetime of the program.
        gl::load_with(|sym| display.get_proc_address(&std::ffi::CString::new(sym).unwrap()));

        // Safety for everything below: the context we just made current
        // stays current on this thread for the life of these objects.
        unsafe { minigfx::debug::install() };

        let shader =
            unsafe { Shader::new(VERTEX_SOURCE, FRAGMENT_SOURCE) }.expect("shader failed to build");

        let triangle = unsafe {
            Model::new(&[
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.0, 0.5, 0.0),
            ])
        };

        let backdrop = Image::generate(
            Vec2::new(256.0, 256.0),
            FillPolicy::Checkered,
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            Vec4::new(0.4, 0.4, 0.4, 1.0),
        );
        let backdrop = unsafe {
            Texture2D::from_image(
                &backdrop,
                Filtering {
                    linear: true,
                    ..Filtering::default()
                },
            )
        };

        let command = unsafe {
            IndirectDraw::new(
                triangle.vertex_count() as u32,
                1,
                0,
                StorageFlags::dynamic_storage(),
            )
        };

        Self {
            shader,
            triangle,
            backdrop,
            command,
            surface,
            context,
            window,
            started: std::time::Instant::now(),
        }
    }

    fn redraw(&mut self) {
        let angle = self.started.elapsed().as_secs_f32();
        let projection = Mat4::orthographic(-1.0, 1.0, 1.0, -1.0, -1.0, 1.0);

        unsafe {
            gl::ClearColor(0.1, 0.1, 0.12, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }

        self.shader.bind();
        self.shader.uniform(0, &projection);
        self.shader.uniform(1, &angle);
        self.shader.uniform(2, &Vec4::new(1.0, 0.6, 0.2, 1.0));
        self.backdrop.bind(0);

        self.triangle.bind();
        self.command.draw_call(Topology::Triangles);

        self.surface.swap_buffers(&self.context).unwrap();
    }
}

fn main() -> anyhow::Result<()> {
    let event_loop = winit::event_loop::EventLoop::builder().build()?;
    let mut app = App { window: None };
    event_loop.run_app(&mut app)?;
    Ok(())
}
