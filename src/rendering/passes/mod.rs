pub mod background_pass;
pub mod pass;
pub mod scene_pass;
pub mod upscale_pass;
