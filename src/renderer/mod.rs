pub mod camera;
pub mod environment;
pub mod line_vertex;
pub mod post;
pub mod render;
pub mod renderer;
pub mod uniforms;
pub mod vertex;

pub use render::FrameInputs;
pub use renderer::Renderer;
