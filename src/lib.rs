// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Tests unwrap freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

//! Scroll-synchronized 3D scene rendering on wgpu.
//!
//! A single glTF model is loaded in the background, normalized (centered,
//! textured, placed) and attached to a scene. Page scroll positions drive a
//! timeline of scroll tracks that interpolate the model's transform and
//! named external values, while a two-state machine decides when the render
//! surface stops following the viewport.
//!
//! # Key entry points
//!
//! - [`engine::SceneEngine`] - owns the scene and every controller
//! - [`assets::AssetPipeline`] - background fetch, decode and normalize
//! - [`scroll::ScrollTimeline`] - scroll tracks and their progress
//! - [`scroll::SurfacePositionFsm`] - fixed/absolute surface mode
//! - [`options::Options`] - the page and preview profiles, TOML presets
//!
//! # Architecture
//!
//! Everything but asset loading runs on the host's event-loop thread. Scroll
//! events, resizes and frames are applied in arrival order, so a frame always
//! sees the latest scroll position. Rendering goes through the
//! [`renderer::SceneRenderer`] trait: [`renderer::GpuRenderer`] draws with
//! wgpu, [`renderer::RecordingRenderer`] captures frames headlessly.

pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod scroll;
pub mod util;
pub mod viewport;

#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::EngineError;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
