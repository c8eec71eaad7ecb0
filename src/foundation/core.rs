use std::sync::atomic::{AtomicI32, Ordering};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Process-unique layer identifier.
///
/// Ids are stable across tree copies and activations: the same logical layer
/// keeps its id in the pending and active trees, which is how per-layer runtime
/// state is matched up when trees are swapped.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub i32);

static NEXT_LAYER_ID: AtomicI32 = AtomicI32::new(1);

impl LayerId {
    /// Allocate a fresh id that no other call in this process has returned.
    ///
    /// Ids picked by hand (as the producer side and tests do) are not tracked,
    /// so mixing both schemes in one tree is the caller's responsibility.
    pub fn next_unique() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 is opaque).
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Placeholder color drawn where tile content is missing.
    pub const CHECKERBOARD: Self = Self::rgba(241, 241, 241, 255);

    /// Build a color from straight RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether alpha is 255.
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
