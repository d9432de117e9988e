mod capture;
mod render;

use std::time::Instant;

use anyhow::Context;
use cosmos_core::{Clock, Scene, SceneParams};
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use capture::CaptureSource;
use render::GpuState;

const DEFAULT_SEED: u64 = 42;

/// `COSMOS_SEED` overrides the simulation seed; anything unparsable is ignored.
fn seed_from_env() -> u64 {
    match std::env::var("COSMOS_SEED") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(seed) => seed,
            Err(err) => {
                log::warn!("ignoring COSMOS_SEED={raw:?}: {err}");
                DEFAULT_SEED
            }
        },
        Err(_) => DEFAULT_SEED,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut scene =
        Scene::new(SceneParams::default(), seed_from_env()).context("scene parameters")?;

    // Without a capture device the cluster simply holds its shape
    let mut capture = match CaptureSource::start() {
        Ok(source) => Some(source),
        Err(err) => {
            log::warn!("[audio] capture unavailable: {err:#}");
            None
        }
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Cosmos")
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window, &scene))?;
    let mut clock = Clock::new();
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => state.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::AboutToWait => {
            let now = Instant::now();
            let time = clock.tick(now - last_frame);
            last_frame = now;
            match capture.as_mut() {
                Some(source) => scene.step_with_source(time, source),
                None => scene.step(time, None),
            }
            match state.render(&scene) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        _ => {}
    })?;
    Ok(())
}
