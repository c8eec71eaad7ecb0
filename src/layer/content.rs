use crate::draw::quads::{
    AppendQuadsData, DrawQuad, QuadMaterial, SharedQuadState, TileResolution,
};
use crate::foundation::core::{Color, LayerId, Rect, Size};
use crate::foundation::math::{intersect, rect_from_size, rect_is_empty};
use crate::host::client::{TileCoverage, TileStatus};

/// Scrollbar axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollbarOrientation {
    /// Scrolls along x.
    Horizontal,
    /// Scrolls along y.
    Vertical,
}

/// Tile-backed content whose pixels are produced by an external rasterizer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TiledContent {
    /// Tile edge length in content pixels.
    pub tile_size: f64,
    #[serde(skip)]
    pub(crate) resources_released: bool,
}

impl Default for TiledContent {
    fn default() -> Self {
        Self {
            tile_size: 256.0,
            resources_released: false,
        }
    }
}

/// A scrollbar drawn on behalf of a scroll layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollbarContent {
    /// Axis the scrollbar represents.
    pub orientation: ScrollbarOrientation,
    /// Layer whose scroll position the thumb reflects.
    pub scroll_layer: Option<LayerId>,
}

/// What a layer draws. The variant set is closed; callers never downcast.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    /// Nothing of its own.
    #[default]
    Empty,
    /// A flat color fill.
    SolidColor {
        /// Fill color.
        color: Color,
    },
    /// Tiles rasterized elsewhere.
    Tiled(TiledContent),
    /// A scrollbar track and thumb.
    Scrollbar(ScrollbarContent),
}

/// Scrollbar thumb placement along the track, as fractions of the track length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ThumbGeometry {
    pub(crate) start: f64,
    pub(crate) length: f64,
    pub(crate) opacity: f64,
}

pub(crate) struct AppendQuadsContext<'a> {
    pub(crate) layer: LayerId,
    pub(crate) shared: SharedQuadState,
    pub(crate) content_bounds: Size,
    pub(crate) contents_opaque: bool,
    pub(crate) background_color: Color,
    pub(crate) tiles: Option<&'a dyn TileCoverage>,
    pub(crate) thumb: Option<ThumbGeometry>,
}

impl LayerContent {
    /// Prepare for drawing. Returning false drops the layer from this frame.
    pub(crate) fn will_draw(&mut self) -> bool {
        match self {
            Self::Scrollbar(sb) => sb.scroll_layer.is_some(),
            _ => true,
        }
    }

    pub(crate) fn did_draw(&mut self) {}

    /// Forget GPU-side resources. Tiled content redraws as checkerboard until the
    /// rasterizer provides tiles again.
    pub(crate) fn release_resources(&mut self) {
        if let Self::Tiled(t) = self {
            t.resources_released = true;
        }
    }

    pub(crate) fn append_quads(
        &self,
        ctx: &AppendQuadsContext<'_>,
        out: &mut Vec<DrawQuad>,
        data: &mut AppendQuadsData,
    ) {
        let visible = ctx.shared.visible_content_rect;
        if rect_is_empty(visible) {
            return;
        }
        let opaque_layer = ctx.contents_opaque && ctx.shared.opacity >= 1.0;
        match self {
            Self::Empty => {}
            Self::SolidColor { color } => out.push(DrawQuad {
                layer: Some(ctx.layer),
                rect: visible,
                visible_rect: visible,
                needs_blending: !color.is_opaque() || ctx.shared.opacity < 1.0,
                shared: ctx.shared,
                material: QuadMaterial::SolidColor { color: *color },
            }),
            Self::Tiled(tiled) => append_tile_quads(tiled, ctx, opaque_layer, out, data),
            Self::Scrollbar(sb) => append_scrollbar_quads(sb, ctx, out),
        }
    }
}

fn append_tile_quads(
    tiled: &TiledContent,
    ctx: &AppendQuadsContext<'_>,
    opaque_layer: bool,
    out: &mut Vec<DrawQuad>,
    data: &mut AppendQuadsData,
) {
    let ts = tiled.tile_size.max(1.0);
    let content = rect_from_size(ctx.content_bounds);
    let visible = intersect(ctx.shared.visible_content_rect, content);
    if rect_is_empty(visible) {
        return;
    }
    let (i0, i1) = ((visible.x0 / ts).floor() as i64, (visible.x1 / ts).ceil() as i64);
    let (j0, j1) = ((visible.y0 / ts).floor() as i64, (visible.y1 / ts).ceil() as i64);
    for j in j0..j1 {
        for i in i0..i1 {
            let tile = intersect(
                Rect::new(
                    i as f64 * ts,
                    j as f64 * ts,
                    (i + 1) as f64 * ts,
                    (j + 1) as f64 * ts,
                ),
                content,
            );
            let tile_visible = intersect(tile, visible);
            if rect_is_empty(tile_visible) {
                continue;
            }
            let status = if tiled.resources_released {
                TileStatus::Missing
            } else {
                ctx.tiles
                    .map_or(TileStatus::Ready, |c| c.tile_status(ctx.layer, tile))
            };
            let material = match status {
                TileStatus::Ready => QuadMaterial::Tile {
                    resolution: TileResolution::High,
                },
                TileStatus::LowResolution => {
                    data.num_incomplete_tiles += 1;
                    QuadMaterial::Tile {
                        resolution: TileResolution::Low,
                    }
                }
                TileStatus::Missing => {
                    data.num_missing_tiles += 1;
                    let color = if ctx.background_color.a > 0 {
                        ctx.background_color
                    } else {
                        Color::CHECKERBOARD
                    };
                    QuadMaterial::Checkerboard { color }
                }
            };
            out.push(DrawQuad {
                layer: Some(ctx.layer),
                rect: tile,
                visible_rect: tile_visible,
                needs_blending: !opaque_layer,
                shared: ctx.shared,
                material,
            });
        }
    }
}

fn append_scrollbar_quads(
    sb: &ScrollbarContent,
    ctx: &AppendQuadsContext<'_>,
    out: &mut Vec<DrawQuad>,
) {
    let track = rect_from_size(ctx.content_bounds);
    let Some(thumb) = ctx.thumb else {
        return;
    };
    if thumb.opacity <= 0.0 {
        return;
    }
    let mut shared = ctx.shared;
    shared.opacity *= thumb.opacity;

    let thumb_rect = match sb.orientation {
        ScrollbarOrientation::Horizontal => {
            let w = track.width();
            Rect::new(
                track.x0 + thumb.start * w,
                track.y0,
                track.x0 + (thumb.start + thumb.length) * w,
                track.y1,
            )
        }
        ScrollbarOrientation::Vertical => {
            let h = track.height();
            Rect::new(
                track.x0,
                track.y0 + thumb.start * h,
                track.x1,
                track.y0 + (thumb.start + thumb.length) * h,
            )
        }
    };
    let visible = ctx.shared.visible_content_rect;
    let thumb_visible = intersect(thumb_rect, visible);
    if !rect_is_empty(thumb_visible) {
        out.push(DrawQuad {
            layer: Some(ctx.layer),
            rect: thumb_rect,
            visible_rect: thumb_visible,
            needs_blending: true,
            shared,
            material: QuadMaterial::ScrollbarThumb {
                orientation: sb.orientation,
            },
        });
    }
    out.push(DrawQuad {
        layer: Some(ctx.layer),
        rect: track,
        visible_rect: intersect(track, visible),
        needs_blending: true,
        shared,
        material: QuadMaterial::ScrollbarTrack {
            orientation: sb.orientation,
        },
    });
}

#[cfg(test)]
#[path = "../../tests/unit/layer/content.rs"]
mod tests;
