/*!
# Galaxy 3D Shading Cache

Incremental invalidation engine for a per-pixel shading cache.

A compute-shaded renderer keeps one cache record per pixel and only
re-shades pixels whose record is marked invalid. Each frame, this crate
compares the camera and the bounding spheres of the scene objects against
the previous frame and marks exactly the pixels that may have changed.

## Architecture

- **ScreenProjection**: Projects bounding spheres to clamped pixel rectangles
- **MovementTracker**: Detects camera and per-object movement against thresholds
- **InvalidationManager**: Chooses full, selective or no invalidation and writes the cache buffer
- **InvalidationStats**: Running totals, rolling window, trend and efficiency rating
- **Buffer**: Seam to the externally-owned cache buffer (`HostBuffer` for CPU memory)

Every component receives an injected `Logger`; nothing is global.
*/

// Internal modules
mod error;
pub mod log;
pub mod renderer;
pub mod camera;
pub mod scene;
pub mod cache;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Main entry point
    pub use crate::cache::InvalidationManager;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger, NullLogger};
    }

    // Cache buffer seam
    pub mod render {
        pub use crate::renderer::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Invalidation sub-module
    pub mod cache {
        pub use crate::cache::*;
    }
}

// Re-export math library at crate root
pub use glam;
