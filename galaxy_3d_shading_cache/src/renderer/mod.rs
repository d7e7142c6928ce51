/// Renderer module - the cache buffer seam shared with the shading stage

pub mod buffer;
pub mod host_buffer;

pub use buffer::*;
pub use host_buffer::HostBuffer;
