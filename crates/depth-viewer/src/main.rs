//! Entry point for the depth viewer.

use anyhow::{Context, Result};
use clap::Parser;
use depth_viewer::{
    app::App,
    config::{Config, SourceKind},
    renderer::pipelines::point_cloud::DEFAULT_SHADER,
    source::{self, FrameMailbox},
};
use std::{
    borrow::Cow,
    sync::{atomic::AtomicBool, atomic::Ordering, Arc},
    time::Duration,
};
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = Config::parse();
    let settings = config.cloud_settings();
    log::debug!("{:?}", config);

    let shader_source: Cow<'static, str> = match &config.shader {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read shader {}", path.display()))?
            .into(),
        None => DEFAULT_SHADER.into(),
    };

    // Start the frame producer before the window so the first pair is waiting.
    let mailbox = FrameMailbox::new();
    let stop = Arc::new(AtomicBool::new(false));
    let producer = match config.source {
        SourceKind::Synthetic => {
            source::spawn_synthetic(settings.dims, config.fps, mailbox.clone(), stop.clone())
        }
        SourceKind::Static => {
            let color_path = config
                .color_image
                .as_deref()
                .context("--color-image is required for the static source")?;
            let pair = source::load_static_pair(settings.dims, color_path, config.depth_file.as_deref())?;
            source::spawn_static(pair, config.fps, mailbox.clone(), stop.clone())
        }
    };

    // Create the event loop and window.
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Depth Viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window_width,
                config.window_height,
            ))
            .build(&event_loop)?,
    );

    // Initialise the application (async → sync).
    let mut app = pollster::block_on(App::new(window.clone(), &settings, &shader_source, mailbox))?;

    let frame_interval = Duration::from_secs_f64(1.0 / config.fps.max(0.1));

    event_loop.run(move |event, elwt| {
        // Wake up at the source rate to pick up new frames; input wakes us earlier.
        elwt.set_control_flow(ControlFlow::wait_duration(frame_interval));

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                // Forward events to the app; handle unconsumed window events.
                if !app.handle_event(&window, &event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            match app.render(&window) {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => {
                                    app.resize(app.renderer.gfx.size);
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    log::error!("WGPU out of memory – exiting.");
                                    elwt.exit();
                                }
                                Err(e) => log::error!("Render error: {:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                // New frames request their own redraw.
                if let Err(err) = app.pump_frames() {
                    log::error!("GPU context lost: {} – exiting.", err);
                    elwt.exit();
                }
            }
            Event::LoopExiting => {
                stop.store(true, Ordering::Relaxed);
            }
            _ => {}
        }
    })?;

    if producer.join().is_err() {
        log::warn!("Frame source thread panicked");
    }

    Ok(())
}
