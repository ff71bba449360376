use std::any::Any;

use glam::Vec2;

use super::{Button, Caption};
use crate::error::Result;
use crate::geometry::{Alignment, HorizontalAlign, Rect, VerticalAlign};
use crate::serialize::{PropertyReader, PropertyWriter};
use crate::style::Style;
use crate::ui::{ControlEvent, EventKind, KeyEvent};
use crate::view::render::{Quad, RenderTarget};
use crate::view::widget::{DrawContext, MeasureContext, Widget, WidgetContext};
use crate::view::{ControlState, DirtyBits};

const BOX_GAP: f32 = 4.0;

/// A button that flips `checked` on every CLICK and reports it with VALUE_CHANGED.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckBox {
    button: Button,
    checked: bool,
}

impl CheckBox {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        let mut button = Button::new(text);
        button
            .label_mut()
            .set_alignment(Alignment::new(HorizontalAlign::Left, VerticalAlign::Center));
        Self { button, checked }
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    fn box_size(style: &Style, state: ControlState) -> f32 {
        style.font().line_height(style.font_size(state))
    }
}

impl Widget for CheckBox {
    fn type_name(&self) -> &'static str {
        "CheckBox"
    }

    fn can_focus(&self) -> bool {
        self.button.can_focus()
    }

    fn measure_content(&self, ctx: &MeasureContext<'_>) -> Option<Vec2> {
        let side = Self::box_size(ctx.style, ctx.state);
        let text = self.button.label().measure(ctx.style, ctx.state);
        Some(Vec2::new(side + BOX_GAP + text.x, side.max(text.y)))
    }

    fn draw_images(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        let viewport = ctx.control.viewport_bounds();
        let side = Self::box_size(ctx.style, ctx.state);
        let rect = Rect::new(
            viewport.x,
            viewport.y + (viewport.height - side) * 0.5,
            side,
            side,
        );
        let mut names = vec!["box"];
        if self.checked {
            names.push("check");
        }
        for name in names {
            let quad = match ctx.style.image(name) {
                Some(image) => Quad {
                    rect,
                    clip: ctx.clip,
                    color: image.color.with_opacity(ctx.opacity),
                    image: Some(image.name.clone()),
                    region: image.region,
                },
                None if name == "check" => Quad {
                    image: Some(name.into()),
                    ..Quad::solid(
                        rect,
                        ctx.clip,
                        ctx.style.text_color(ctx.state).with_opacity(ctx.opacity),
                    )
                },
                None => continue,
            };
            target.draw_quad(&quad);
        }
    }

    fn draw_text(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        let inset = Self::box_size(ctx.style, ctx.state) + BOX_GAP;
        self.button.label().draw(ctx, target, inset);
    }

    fn key_event(&mut self, event: &KeyEvent, ctx: &mut WidgetContext) -> bool {
        self.button.key_event(event, ctx)
    }

    fn on_event(&mut self, event: &ControlEvent, ctx: &mut WidgetContext) {
        if event.kind == EventKind::Click {
            self.checked = !self.checked;
            ctx.invalidate(DirtyBits::STATE);
            ctx.emit(EventKind::ValueChanged);
        }
        self.button.on_event(event, ctx);
    }

    fn caption(&self) -> Option<&Caption> {
        Some(self.button.label())
    }

    fn caption_mut(&mut self) -> Option<&mut Caption> {
        Some(self.button.label_mut())
    }

    fn serialize(&self, writer: &mut dyn PropertyWriter) -> Result<()> {
        self.button.serialize(writer)?;
        writer.write_bool("checked", self.checked);
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut dyn PropertyReader) -> Result<()> {
        self.button.deserialize(reader)?;
        self.checked = reader.read_bool("checked", false);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
