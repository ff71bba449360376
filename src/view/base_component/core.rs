use std::sync::Arc;

use bitflags::bitflags;
use glam::Vec2;
use smol_str::SmolStr;

use super::ControlId;
use crate::geometry::{Alignment, AutoSize, EdgeInsets, Rect, SizeModes};
use crate::style::{DEFAULT_STYLE, Style};
use crate::ui::ControlListeners;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyBits: u8 {
        const BOUNDS = 1;
        const STATE = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlState {
    #[default]
    Normal,
    Focus,
    Active,
    Disabled,
    Hover,
}

impl ControlState {
    pub const COUNT: usize = 5;

    pub const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Focus => 1,
            Self::Active => 2,
            Self::Disabled => 3,
            Self::Hover => 4,
        }
    }
}

/// Reference quantities a control resolves its percentage axes against.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct MeasureReference {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub left: Option<Vec2>,
}

pub struct Control {
    pub(crate) id: SmolStr,
    pub(crate) parent: Option<ControlId>,
    pub(crate) desired: Rect,
    pub(crate) modes: SizeModes,
    pub(crate) alignment: Alignment,
    pub(crate) margin: EdgeInsets,
    pub(crate) padding: EdgeInsets,
    pub(crate) measured: Rect,
    pub(crate) bounds: Rect,
    pub(crate) absolute_bounds: Rect,
    pub(crate) absolute_clip_bounds: Rect,
    pub(crate) viewport_bounds: Rect,
    pub(crate) viewport_clip_bounds: Rect,
    pub(crate) space_left: Option<Vec2>,
    pub(crate) last_reference: Option<MeasureReference>,
    pub(crate) dirty: DirtyBits,
    pub(crate) applied_state: ControlState,
    pub(crate) focused: bool,
    pub(crate) hovered: bool,
    pub(crate) active_contacts: u32,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) consume_input_events: bool,
    pub(crate) can_focus: bool,
    pub(crate) z_index: Option<i32>,
    pub(crate) focus_index: Option<i32>,
    pub(crate) style_name: SmolStr,
    pub(crate) style: Arc<Style>,
    pub(crate) opacity: f32,
    pub(crate) listeners: ControlListeners,
}

impl Control {
    pub(crate) fn new() -> Self {
        Self {
            id: SmolStr::default(),
            parent: None,
            desired: Rect::default(),
            modes: SizeModes::default(),
            alignment: Alignment::TOP_LEFT,
            margin: EdgeInsets::ZERO,
            padding: EdgeInsets::ZERO,
            measured: Rect::default(),
            bounds: Rect::default(),
            absolute_bounds: Rect::default(),
            absolute_clip_bounds: Rect::default(),
            viewport_bounds: Rect::default(),
            viewport_clip_bounds: Rect::default(),
            space_left: None,
            last_reference: None,
            dirty: DirtyBits::STATE,
            applied_state: ControlState::Normal,
            focused: false,
            hovered: false,
            active_contacts: 0,
            visible: true,
            enabled: true,
            consume_input_events: true,
            can_focus: false,
            z_index: None,
            focus_index: None,
            style_name: SmolStr::default(),
            style: DEFAULT_STYLE.clone(),
            opacity: 1.0,
            listeners: ControlListeners::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    pub fn desired_bounds(&self) -> Rect {
        self.desired
    }

    pub fn size_modes(&self) -> SizeModes {
        self.modes
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn margin(&self) -> EdgeInsets {
        self.margin
    }

    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    pub fn measured_bounds(&self) -> Rect {
        self.measured
    }

    /// Post-layout bounds relative to the parent's content box.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn absolute_bounds(&self) -> Rect {
        self.absolute_bounds
    }

    pub fn absolute_clip_bounds(&self) -> Rect {
        self.absolute_clip_bounds
    }

    pub fn viewport_bounds(&self) -> Rect {
        self.viewport_bounds
    }

    pub fn viewport_clip_bounds(&self) -> Rect {
        self.viewport_clip_bounds
    }

    pub fn dirty(&self) -> DirtyBits {
        self.dirty
    }

    pub fn is_dirty(&self, bits: DirtyBits) -> bool {
        self.dirty.intersects(bits)
    }

    /// Display state: ACTIVE wins over FOCUS, which wins over the base state.
    pub fn state(&self) -> ControlState {
        if !self.enabled {
            ControlState::Disabled
        } else if self.active_contacts != 0 {
            ControlState::Active
        } else if self.focused {
            ControlState::Focus
        } else if self.hovered {
            ControlState::Hover
        } else {
            ControlState::Normal
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_active(&self) -> bool {
        self.active_contacts != 0
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn consumes_input_events(&self) -> bool {
        self.consume_input_events
    }

    pub fn can_focus(&self) -> bool {
        self.can_focus
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    pub fn focus_index(&self) -> Option<i32> {
        self.focus_index
    }

    pub fn style_name(&self) -> &str {
        &self.style_name
    }

    pub fn style(&self) -> &Arc<Style> {
        &self.style
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn content_size(&self) -> Vec2 {
        Vec2::new(
            (self.measured.width - self.padding.horizontal()).max(0.0),
            (self.measured.height - self.padding.vertical()).max(0.0),
        )
    }

    /// Content-box size offered to children; wrap-content axes offer nothing.
    pub(crate) fn child_reference(&self) -> (Option<f32>, Option<f32>) {
        let content = self.content_size();
        let width = (self.modes.width != AutoSize::WrapContent).then_some(content.x);
        let height = (self.modes.height != AutoSize::WrapContent).then_some(content.y);
        (width, height)
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("bounds", &self.bounds)
            .field("absolute_bounds", &self.absolute_bounds)
            .field("dirty", &self.dirty)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
