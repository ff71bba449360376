use std::any::Any;
use std::time::Duration;

use glam::Vec2;

use crate::error::Result;
use crate::geometry::Rect;
use crate::serialize::{PropertyReader, PropertyWriter};
use crate::style::Style;
use crate::ui::{ControlEvent, EventKind, KeyEvent, PointerEvent};
use crate::view::components::Caption;
use crate::view::render::{Quad, RenderTarget};
use crate::view::{Control, ControlId, ControlState, DirtyBits};

pub struct MeasureContext<'a> {
    pub style: &'a Style,
    pub state: ControlState,
}

pub struct DrawContext<'a> {
    pub control: &'a Control,
    pub style: &'a Style,
    pub state: ControlState,
    pub bounds: Rect,
    pub clip: Rect,
    pub opacity: f32,
}

/// Side effects a widget requests while the tree lends it out.
pub struct WidgetContext {
    target: ControlId,
    state: ControlState,
    bounds: Rect,
    pub(crate) emitted: Vec<EventKind>,
    pub(crate) dirty: DirtyBits,
}

impl WidgetContext {
    pub(crate) fn new(target: ControlId, control: &Control) -> Self {
        Self {
            target,
            state: control.state(),
            bounds: control.absolute_bounds(),
            emitted: Vec::new(),
            dirty: DirtyBits::empty(),
        }
    }

    pub fn target(&self) -> ControlId {
        self.target
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn emit(&mut self, kind: EventKind) {
        self.emitted.push(kind);
    }

    pub fn invalidate(&mut self, bits: DirtyBits) {
        self.dirty |= bits;
    }
}

/// The capability set a concrete control type plugs into the tree.
pub trait Widget: Any {
    fn type_name(&self) -> &'static str;

    fn style_name(&self) -> &str {
        self.type_name()
    }

    fn can_focus(&self) -> bool {
        false
    }

    fn consumes_input(&self) -> bool {
        true
    }

    /// Content size used by WRAP_CONTENT axes, padding excluded.
    fn measure_content(&self, _ctx: &MeasureContext<'_>) -> Option<Vec2> {
        None
    }

    fn update(&mut self, _elapsed: Duration, _ctx: &mut WidgetContext) {}

    fn draw_skin(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        draw_background(ctx, target);
    }

    fn draw_images(&self, _ctx: &DrawContext<'_>, _target: &mut dyn RenderTarget) {}

    fn draw_text(&self, _ctx: &DrawContext<'_>, _target: &mut dyn RenderTarget) {}

    fn mouse_event(&mut self, _event: &PointerEvent, _ctx: &mut WidgetContext) -> bool {
        false
    }

    fn pointer_event(&mut self, _event: &PointerEvent, _ctx: &mut WidgetContext) -> bool {
        false
    }

    fn key_event(&mut self, _event: &KeyEvent, _ctx: &mut WidgetContext) -> bool {
        false
    }

    fn on_event(&mut self, _event: &ControlEvent, _ctx: &mut WidgetContext) {}

    fn caption(&self) -> Option<&Caption> {
        None
    }

    fn caption_mut(&mut self) -> Option<&mut Caption> {
        None
    }

    fn serialize(&self, _writer: &mut dyn PropertyWriter) -> Result<()> {
        Ok(())
    }

    fn deserialize(&mut self, _reader: &mut dyn PropertyReader) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub fn draw_background(ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
    let Some(background) = ctx.style.background(ctx.state) else {
        return;
    };
    target.draw_quad(&Quad {
        rect: ctx.bounds,
        clip: ctx.clip,
        color: background.color.with_opacity(ctx.opacity),
        image: Some(background.name),
        region: background.region,
    });
}
