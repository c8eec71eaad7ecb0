//! Strata is the impl-side core of a layer compositor.
//!
//! It owns an *active* layer tree that is drawn and scrolled, plus an optional
//! *pending* tree that a producer commits into and that replaces the active one
//! on activation. Input is applied directly to the active tree without waiting
//! for the producer; scroll and page-scale changes are reported back through
//! [`LayerTreeHost::process_scroll_deltas`].
//!
//! # Pipeline overview
//!
//! 1. **Commit**: `TreeDescription -> pending LayerTree` ([`LayerTreeHost::commit_description`])
//! 2. **Activate**: pending becomes active; scroll deltas and scrollbar fades carry over by id
//! 3. **Input**: [`LayerTreeHost::scroll_begin`], [`LayerTreeHost::scroll_by`], pinch gestures
//! 4. **Prepare**: draw properties, occlusion and damage, then render passes of quads
//!    ([`LayerTreeHost::prepare_to_draw`])
//! 5. **Draw**: passes go to a [`Renderer`]; drawn layers get `did_draw`
//!
//! Geometry is 2D and uses `kurbo` types. Device space is physical pixels,
//! viewport space is DIPs (device space over the device scale factor), and layer
//! space is CSS pixels before page scale.
//!
//! Everything is synchronous and single-threaded: a host is driven from one
//! context and hands notifications to its [`HostClient`] from inside the call
//! that caused them.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod animation;
mod draw;
mod foundation;
mod host;
mod layer;
mod tree;

pub use animation::page_scale::PageScaleAnimation;
pub use animation::scrollbar::{FadePhase, ScrollbarFadeController};
pub use animation::timing::CubicBezier;
pub use draw::quads::{
    AppendQuadsData, DrawQuad, QuadMaterial, RenderPass, RenderPassId, SharedQuadState,
    TileResolution,
};
pub use draw::surface::RenderSurface;
pub use foundation::core::{Affine, Color, LayerId, Point, Rect, Size, Vec2};
pub use foundation::error::{StrataError, StrataResult};
pub use foundation::math::Region;
pub use foundation::settings::LayerTreeSettings;
pub use host::activation::{LayerScrollUpdate, ScrollAndScaleSet};
pub use host::client::{
    HostClient, MemoryPolicy, NullClient, PriorityCutoff, Renderer, RendererCapabilities,
    TileCoverage, TileStatus,
};
pub use host::frame::{DrawResult, FrameData};
pub use host::host::{LayerTreeHost, TreeGuard};
pub use host::input::{ScrollDirection, ScrollInputType, ScrollStatus};
pub use host::top_controls::TopControlsManager;
pub use layer::content::{LayerContent, ScrollbarContent, ScrollbarOrientation, TiledContent};
pub use layer::layer::{DrawProperties, Layer, LayerDrawStats, LayerProps, PositionConstraint};
pub use tree::layer_tree::LayerTree;
pub use tree::sync::{LayerDescription, LayerSlot, TreeDescription};
