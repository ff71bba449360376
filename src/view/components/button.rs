use std::any::Any;

use glam::Vec2;

use super::Caption;
use crate::error::Result;
use crate::serialize::{PropertyReader, PropertyWriter};
use crate::ui::{ControlEvent, EventKind, Key, KeyEvent, KeyKind};
use crate::view::render::RenderTarget;
use crate::view::widget::{DrawContext, MeasureContext, Widget, WidgetContext};

/// A focusable, captioned push button. A pointer click or an Enter/Space
/// release fires CLICK; every CLICK is followed by ACTIVATED.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Button {
    caption: Caption,
    key_pressed: Option<Key>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            caption: Caption::new(text),
            key_pressed: None,
        }
    }

    pub fn label(&self) -> &Caption {
        &self.caption
    }

    pub fn label_mut(&mut self) -> &mut Caption {
        &mut self.caption
    }
}

fn activates(key: Key) -> bool {
    matches!(key, Key::Enter | Key::Space)
}

impl Widget for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn can_focus(&self) -> bool {
        true
    }

    fn measure_content(&self, ctx: &MeasureContext<'_>) -> Option<Vec2> {
        Some(self.caption.measure(ctx.style, ctx.state))
    }

    fn draw_text(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        self.caption.draw(ctx, target, 0.0);
    }

    fn key_event(&mut self, event: &KeyEvent, ctx: &mut WidgetContext) -> bool {
        if !activates(event.key) {
            return false;
        }
        match event.kind {
            KeyKind::Press => {
                self.key_pressed = Some(event.key);
                true
            }
            KeyKind::Release if self.key_pressed == Some(event.key) => {
                self.key_pressed = None;
                ctx.emit(EventKind::Click);
                true
            }
            KeyKind::Release | KeyKind::Char => false,
        }
    }

    fn on_event(&mut self, event: &ControlEvent, ctx: &mut WidgetContext) {
        match event.kind {
            EventKind::Click => ctx.emit(EventKind::Activated),
            EventKind::FocusLost => self.key_pressed = None,
            _ => {}
        }
    }

    fn caption(&self) -> Option<&Caption> {
        Some(&self.caption)
    }

    fn caption_mut(&mut self) -> Option<&mut Caption> {
        Some(&mut self.caption)
    }

    fn serialize(&self, writer: &mut dyn PropertyWriter) -> Result<()> {
        self.caption.serialize(writer)
    }

    fn deserialize(&mut self, reader: &mut dyn PropertyReader) -> Result<()> {
        self.caption.deserialize(reader)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
