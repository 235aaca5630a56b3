pub mod common;
pub mod global_uniform;
pub mod imgui_renderer;
pub mod instance;
pub mod passes;
pub mod render_model;
pub mod renderer;
pub mod shader_loader;
pub mod surface;
pub mod texture;
