//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, bind-group layout helpers,
//! and texture uploads for the mesh renderer.

/// Bind-group layout entries, samplers and the mesh pipeline builder.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Depth targets and sampled-texture uploads.
pub mod texture;
