use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod asset;
mod error;
mod material;
mod model;
mod renderer;
mod settings;
mod ui;

pub const CONFY_APP_NAME: &str = "glbvis-rs";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Optional first argument replaces the configured mesh for this run.
    let mesh_override = std::env::args().nth(1);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = app::handler::AppHandler::new(mesh_override, tokio::runtime::Runtime::new()?);
    event_loop.run_app(&mut handler)?;

    Ok(())
}
