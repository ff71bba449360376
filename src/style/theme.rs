use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::geometry::Rect;
use crate::style::{Color, FontMetrics, MonospaceFont};
use crate::view::ControlState;

pub static DEFAULT_STYLE: Lazy<Arc<Style>> = Lazy::new(|| Arc::new(Style::new("default")));

static DEFAULT_FONT: Lazy<Arc<dyn FontMetrics>> = Lazy::new(|| Arc::new(MonospaceFont::default()));

/// A named sub-rectangle of the theme atlas, tinted by `color`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRegion {
    pub name: SmolStr,
    pub region: Rect,
    pub color: Color,
}

impl ImageRegion {
    pub fn new(name: impl Into<SmolStr>, region: Rect) -> Self {
        Self {
            name: name.into(),
            region,
            color: Color::WHITE,
        }
    }

    pub fn solid(color: Color) -> Self {
        Self {
            name: SmolStr::new_static("solid"),
            region: Rect::default(),
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateStyle {
    pub tint: Color,
    pub text_color: Option<Color>,
    pub font_size: Option<f32>,
}

impl Default for StateStyle {
    fn default() -> Self {
        Self {
            tint: Color::WHITE,
            text_color: None,
            font_size: None,
        }
    }
}

#[derive(Clone)]
pub struct Style {
    name: SmolStr,
    background: Option<ImageRegion>,
    images: FxHashMap<SmolStr, ImageRegion>,
    font: Option<Arc<dyn FontMetrics>>,
    font_size: f32,
    text_color: Color,
    opacity: f32,
    overlays: [StateStyle; ControlState::COUNT],
}

impl Style {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            background: None,
            images: FxHashMap::default(),
            font: None,
            font_size: 16.0,
            text_color: Color::BLACK,
            opacity: 1.0,
            overlays: Default::default(),
        }
    }

    pub fn with_background(mut self, background: ImageRegion) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_image(mut self, image: ImageRegion) -> Self {
        self.images.insert(image.name.clone(), image);
        self
    }

    pub fn with_font(mut self, font: Arc<dyn FontMetrics>, font_size: f32) -> Self {
        self.font = Some(font);
        self.font_size = font_size;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_overlay(mut self, state: ControlState, overlay: StateStyle) -> Self {
        self.overlays[state.index()] = overlay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn overlay(&self, state: ControlState) -> &StateStyle {
        &self.overlays[state.index()]
    }

    pub fn image(&self, name: &str) -> Option<&ImageRegion> {
        self.images.get(name)
    }

    pub fn background(&self, state: ControlState) -> Option<ImageRegion> {
        let tint = self.overlay(state).tint;
        self.background.clone().map(|mut region| {
            region.color = region.color.modulate(tint);
            region
        })
    }

    pub fn font(&self) -> Arc<dyn FontMetrics> {
        self.font.clone().unwrap_or_else(|| DEFAULT_FONT.clone())
    }

    pub fn font_size(&self, state: ControlState) -> f32 {
        self.overlay(state).font_size.unwrap_or(self.font_size)
    }

    pub fn text_color(&self, state: ControlState) -> Color {
        self.overlay(state).text_color.unwrap_or(self.text_color)
    }
}

impl std::fmt::Debug for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Style")
            .field("name", &self.name)
            .field("background", &self.background)
            .field("font_size", &self.font_size)
            .field("opacity", &self.opacity)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    styles: FxHashMap<SmolStr, Arc<Style>>,
    default: Arc<Style>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            styles: FxHashMap::default(),
            default: DEFAULT_STYLE.clone(),
        }
    }
}

impl Theme {
    pub fn new(default: Style) -> Self {
        Self {
            styles: FxHashMap::default(),
            default: Arc::new(default),
        }
    }

    pub fn add_style(&mut self, style: Style) -> Arc<Style> {
        let style = Arc::new(style);
        self.styles.insert(style.name.clone(), style.clone());
        style
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn style(&self, name: &str) -> Arc<Style> {
        self.styles
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn default_style(&self) -> Arc<Style> {
        self.default.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageRegion, StateStyle, Style, Theme};
    use crate::style::Color;
    use crate::view::ControlState;

    #[test]
    fn unknown_style_falls_back_to_default() {
        let mut theme = Theme::new(Style::new("base"));
        theme.add_style(Style::new("button"));
        assert_eq!(theme.style("button").name(), "button");
        assert_eq!(theme.style("missing").name(), "base");
    }

    #[test]
    fn state_overlay_tints_background() {
        let style = Style::new("button")
            .with_background(ImageRegion::solid(Color::rgb(200, 200, 200)))
            .with_overlay(
                ControlState::Active,
                StateStyle {
                    tint: Color::rgb(128, 128, 128),
                    text_color: Some(Color::WHITE),
                    font_size: Some(20.0),
                },
            );
        let normal = style.background(ControlState::Normal).unwrap();
        let active = style.background(ControlState::Active).unwrap();
        assert_eq!(normal.color, Color::rgb(200, 200, 200));
        assert_eq!(active.color, Color::rgb(100, 100, 100));
        assert_eq!(style.font_size(ControlState::Active), 20.0);
        assert_eq!(style.font_size(ControlState::Hover), 16.0);
        assert_eq!(style.text_color(ControlState::Active), Color::WHITE);
    }
}
