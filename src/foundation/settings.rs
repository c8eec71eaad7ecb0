use crate::foundation::error::StrataResult;

/// Host and tree configuration.
///
/// Every field has a default, so a JSON document only needs to name the values it
/// overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerTreeSettings {
    /// Let ancestor transforms raise a layer's rasterization scale. When off,
    /// content scale stays at 1 regardless of transforms.
    pub layer_transforms_should_scale_layer_contents: bool,
    /// Lower bound for computed content scales.
    pub minimum_contents_scale: f64,
    /// Upper bound for computed content scales.
    pub maximum_contents_scale: f64,
    /// Height in DIPs of the browser-chrome bar. Zero disables top controls.
    pub top_controls_height: f64,
    /// Duration of the show/hide animation started when a gesture leaves the
    /// bar partially shown.
    pub top_controls_animation_ms: u64,
    /// Refuse flings that would land on a viewport scroll layer.
    pub ignore_root_layer_flings: bool,
    /// Drop overscroll on axes the viewport cannot scroll at all.
    pub report_overscroll_only_for_scrollable_axes: bool,
    /// Default duration for programmatic page-scale animations.
    pub page_scale_animation_ms: u64,
    /// Attach fade controllers to layers that have scrollbars.
    pub scrollbar_fade_enabled: bool,
    /// Idle time after a gesture ends before scrollbars start fading.
    pub scrollbar_fade_delay_ms: u64,
    /// Length of the scrollbar fade-out.
    pub scrollbar_fade_duration_ms: u64,
}

impl Default for LayerTreeSettings {
    fn default() -> Self {
        Self {
            layer_transforms_should_scale_layer_contents: false,
            minimum_contents_scale: 0.0625,
            maximum_contents_scale: 8.0,
            top_controls_height: 0.0,
            top_controls_animation_ms: 200,
            ignore_root_layer_flings: false,
            report_overscroll_only_for_scrollable_axes: false,
            page_scale_animation_ms: 300,
            scrollbar_fade_enabled: true,
            scrollbar_fade_delay_ms: 300,
            scrollbar_fade_duration_ms: 300,
        }
    }
}

impl LayerTreeSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> StrataResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    pub fn validate(&self) -> StrataResult<()> {
        if !(self.minimum_contents_scale > 0.0)
            || self.maximum_contents_scale < self.minimum_contents_scale
        {
            return Err(crate::StrataError::validation(
                "contents scale bounds must satisfy 0 < min <= max",
            ));
        }
        if !(self.top_controls_height >= 0.0) {
            return Err(crate::StrataError::validation(
                "top_controls_height must be >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/settings.rs"]
mod tests;
