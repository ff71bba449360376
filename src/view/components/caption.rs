use glam::Vec2;
use smol_str::SmolStr;

use crate::error::{Result, UiError};
use crate::geometry::{Alignment, HorizontalAlign, VerticalAlign};
use crate::serialize::{PropertyReader, PropertyWriter};
use crate::style::Style;
use crate::view::render::{RenderTarget, TextRun};
use crate::view::widget::DrawContext;
use crate::view::{ControlId, ControlState, ControlTree, DirtyBits};

/// A line of text aligned inside its owner's viewport.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Caption {
    text: String,
    alignment: Alignment,
}

impl Caption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alignment: Alignment::CENTER,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the text changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_owned();
        true
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn measure(&self, style: &Style, state: ControlState) -> Vec2 {
        style.font().measure(&self.text, style.font_size(state))
    }

    /// Draws the text inside the viewport, skipping `inset_left` units on the left.
    pub fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget, inset_left: f32) {
        if self.text.is_empty() {
            return;
        }
        let viewport = ctx.control.viewport_bounds();
        let size = self.measure(ctx.style, ctx.state);
        let left = viewport.x + inset_left;
        let width = (viewport.width - inset_left).max(0.0);
        let x = match self.alignment.horizontal {
            HorizontalAlign::Left => left,
            HorizontalAlign::Center => left + (width - size.x) * 0.5,
            HorizontalAlign::Right => left + width - size.x,
        };
        let y = match self.alignment.vertical {
            VerticalAlign::Top => viewport.y,
            VerticalAlign::Center => viewport.y + (viewport.height - size.y) * 0.5,
            VerticalAlign::Bottom => viewport.bottom() - size.y,
        };
        target.draw_text(&TextRun {
            text: self.text.clone(),
            position: Vec2::new(x, y),
            clip: ctx.clip,
            color: ctx.style.text_color(ctx.state).with_opacity(ctx.opacity),
            font_size: ctx.style.font_size(ctx.state),
        });
    }

    pub fn serialize(&self, writer: &mut dyn PropertyWriter) -> Result<()> {
        writer.write_string("text", &self.text);
        writer.write_enum("text_alignment", self.alignment.as_str());
        Ok(())
    }

    pub fn deserialize(&mut self, reader: &mut dyn PropertyReader) -> Result<()> {
        self.text = reader.read_string("text", "");
        let raw = reader.read_enum("text_alignment", Alignment::CENTER.as_str());
        self.alignment = Alignment::parse(&raw).ok_or_else(|| UiError::InvalidValue {
            name: SmolStr::new_static("text_alignment"),
            value: raw.clone(),
        })?;
        Ok(())
    }
}

impl ControlTree {
    pub fn text(&self, id: ControlId) -> Option<&str> {
        self.nodes
            .get(id)?
            .widget
            .as_ref()?
            .caption()
            .map(Caption::text)
    }

    /// Replaces the caption text of a labeled widget; returns false when `id`
    /// has no caption.
    pub fn set_text(&mut self, id: ControlId, text: &str) -> bool {
        self.with_widget(id, |widget, ctx| match widget.caption_mut() {
            Some(caption) => {
                if caption.set_text(text) {
                    ctx.invalidate(DirtyBits::BOUNDS);
                }
                true
            }
            None => false,
        })
        .unwrap_or(false)
    }
}
