use std::time::Duration;

use glam::Vec2;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::{ControlId, ControlTree, DirtyBits, MeasureReference};
use crate::geometry::{Alignment, AutoSize, EdgeInsets, Rect, SizeModes, rect_approx_eq};
use crate::ui::{KeyEvent, PointerEvent};
use crate::view::layout::{ChildGeometry, place_absolute};
use crate::view::widget::MeasureContext;

impl ControlTree {
    /// Marks `id` (and its whole subtree when `recursive`) dirty. BOUNDS also walks
    /// upward through every ancestor whose geometry derives from its children,
    /// stopping at the first one that is already dirty.
    pub fn set_dirty(&mut self, id: ControlId, bits: DirtyBits, recursive: bool) {
        if !self.contains(id) {
            return;
        }
        if recursive {
            self.mark_subtree(id, bits);
        } else if let Some(control) = self.control_mut(id) {
            control.dirty |= bits;
        }
        if bits.contains(DirtyBits::BOUNDS) {
            self.propagate_bounds(id);
        }
    }

    fn mark_subtree(&mut self, id: ControlId, bits: DirtyBits) {
        if let Some(control) = self.control_mut(id) {
            control.dirty |= bits;
        }
        for child in self.children(id).to_vec() {
            self.mark_subtree(child, bits);
        }
    }

    pub(crate) fn propagate_bounds(&mut self, id: ControlId) {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            let Some(node) = self.nodes.get_mut(parent) else {
                break;
            };
            if node.control.dirty.contains(DirtyBits::BOUNDS) || !node.derives_from_children() {
                break;
            }
            node.control.dirty |= DirtyBits::BOUNDS;
            current = node.control.parent;
        }
    }

    /// Per-frame entry point: measure `id` and its subtree, then recompute the
    /// absolute, clip and viewport rects from the parent's viewport.
    pub fn update_layout(&mut self, id: ControlId, offset: Vec2) {
        if !self.contains(id) {
            return;
        }
        let changed = self.measure_control(id);
        match self.parent(id) {
            None => {
                if let Some(geometry) = self.child_geometry_of(id) {
                    let bounds = place_absolute(&geometry, self.viewport.size());
                    if let Some(control) = self.control_mut(id) {
                        control.bounds = bounds;
                    }
                }
            }
            Some(parent) if changed => self.layout_children(parent),
            Some(_) => {}
        }
        self.update_absolute_bounds(id, offset);
    }

    /// Resolves `id`'s measured rect from its auto-size modes. Measuring twice
    /// without an intervening change yields the same rect.
    pub fn measure_size(&mut self, id: ControlId) -> Rect {
        if let Some(parent) = self.parent(id) {
            if self
                .control(parent)
                .is_some_and(|parent| parent.last_reference.is_none())
            {
                self.measure_size(parent);
            }
        }
        let reference = self.measure_reference(id);
        self.measure_self(id, reference);
        self.control(id)
            .map(|control| control.measured)
            .unwrap_or_default()
    }

    pub(crate) fn measure_control(&mut self, id: ControlId) -> bool {
        self.resolve_state(id);
        let reference = self.measure_reference(id);
        let Some(control) = self.control_mut(id) else {
            return false;
        };
        if control.last_reference != Some(reference) {
            control.dirty |= DirtyBits::BOUNDS;
        }
        let dirty = control.dirty.contains(DirtyBits::BOUNDS);
        let before = control.measured;

        if dirty {
            self.measure_self(id, reference);
        }
        if self.is_container(id) {
            let children_changed = self.update_child_bounds(id);
            if dirty || children_changed {
                self.layout_children(id);
            }
        }

        let Some(control) = self.control_mut(id) else {
            return false;
        };
        control.dirty.remove(DirtyBits::BOUNDS);
        control.last_reference = Some(reference);
        !rect_approx_eq(before, control.measured)
    }

    /// Measure half of the two-phase pass: re-measures every visible child and,
    /// when any child's rect changed, marks this container and every ancestor
    /// derived from it dirty.
    pub fn update_child_bounds(&mut self, id: ControlId) -> bool {
        let mut changed = false;
        for child in self.children(id).to_vec() {
            if !self.control(child).is_some_and(|control| control.visible) {
                continue;
            }
            changed |= self.measure_control(child);
        }
        if changed {
            self.set_dirty(id, DirtyBits::BOUNDS, false);
        }
        changed
    }

    fn resolve_state(&mut self, id: ControlId) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        if !control.dirty.contains(DirtyBits::STATE) {
            return;
        }
        control.dirty.remove(DirtyBits::STATE);
        let state = control.state();
        if state == control.applied_state {
            return;
        }
        control.applied_state = state;
        if control.modes.wraps_content() {
            control.dirty |= DirtyBits::BOUNDS;
            self.propagate_bounds(id);
        }
    }

    fn measure_reference(&self, id: ControlId) -> MeasureReference {
        let Some(control) = self.control(id) else {
            return MeasureReference::default();
        };
        let (width, height) = match control.parent.and_then(|parent| self.control(parent)) {
            Some(parent) => parent.child_reference(),
            None => (Some(self.viewport.width), Some(self.viewport.height)),
        };
        MeasureReference {
            width,
            height,
            left: control.space_left,
        }
    }

    fn parent_supplies_space_left(&self, id: ControlId) -> bool {
        self.parent(id)
            .and_then(|parent| self.container(parent))
            .is_some_and(|container| container.layout.supplies_space_left())
    }

    fn measure_self(&mut self, id: ControlId, reference: MeasureReference) {
        let Some(control) = self.control(id) else {
            return;
        };
        let desired = control.desired;
        let modes = control.modes;
        let padding = control.padding;
        let left_pending = control.space_left.is_none() && self.parent_supplies_space_left(id);
        let left_x = reference.left.map(|left| left.x);
        let left_y = reference.left.map(|left| left.y);
        let axis = |name: &'static str, mode: AutoSize, value: f32, content: f32, parent: Option<f32>, left: Option<f32>| {
            resolve_axis(name, mode, value, content, parent, left, left_pending)
        };

        let fixed_width = (modes.width != AutoSize::WrapContent)
            .then(|| axis("width", modes.width, desired.width, 0.0, reference.width, left_x));
        let content = if modes.wraps_content() {
            let width_limit = fixed_width
                .map(|width| (width - padding.horizontal()).max(0.0))
                .unwrap_or(f32::INFINITY);
            self.content_extent(id, width_limit)
        } else {
            Vec2::ZERO
        };
        let width = fixed_width.unwrap_or(content.x + padding.horizontal());
        let height = axis(
            "height",
            modes.height,
            desired.height,
            content.y + padding.vertical(),
            reference.height,
            left_y,
        );
        let x = axis("x", modes.x, desired.x, desired.x, reference.width, left_x);
        let y = axis("y", modes.y, desired.y, desired.y, reference.height, left_y);

        if let Some(control) = self.control_mut(id) {
            control.measured = Rect::new(x, y, width.max(0.0), height.max(0.0));
        }
    }

    fn content_extent(&self, id: ControlId, width_limit: f32) -> Vec2 {
        let Some(node) = self.nodes.get(id) else {
            return Vec2::ZERO;
        };
        if let Some(widget) = &node.widget {
            let ctx = MeasureContext {
                style: &node.control.style,
                state: node.control.applied_state,
            };
            return widget.measure_content(&ctx).unwrap_or(Vec2::ZERO);
        }
        match &node.container {
            Some(container) => container
                .layout
                .strategy()
                .pref_content_size(&self.child_geometry(id), width_limit),
            None => Vec2::ZERO,
        }
    }

    pub(crate) fn child_geometry_of(&self, id: ControlId) -> Option<ChildGeometry> {
        let control = self.control(id)?;
        Some(ChildGeometry {
            id,
            measured: control.measured,
            margin: control.margin,
            alignment: control.alignment,
            modes: control.modes,
            bounds: control.bounds,
        })
    }

    pub(crate) fn child_geometry(&self, id: ControlId) -> Vec<ChildGeometry> {
        self.children(id)
            .iter()
            .filter(|&&child| self.control(child).is_some_and(|control| control.visible))
            .filter_map(|&child| self.child_geometry_of(child))
            .collect()
    }

    /// Resolves wrap-content axes from the children, hands PERCENT_LEFT children
    /// their leftover space and lets the layout strategy place everything.
    pub(crate) fn layout_children(&mut self, id: ControlId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let Some(layout) = node.container.as_ref().map(|container| container.layout) else {
            return;
        };
        let modes = node.control.modes;
        let padding = node.control.padding;
        let mut geometry = self.child_geometry(id);

        if modes.wraps_content() {
            let content = node.control.content_size();
            let width_limit = if modes.width == AutoSize::WrapContent {
                f32::INFINITY
            } else {
                content.x
            };
            let pref = layout.strategy().pref_content_size(&geometry, width_limit);
            if let Some(control) = self.control_mut(id) {
                if modes.width == AutoSize::WrapContent {
                    control.measured.width = pref.x + padding.horizontal();
                }
                if modes.height == AutoSize::WrapContent {
                    control.measured.height = pref.y + padding.vertical();
                }
            }
        }

        let content = self
            .control(id)
            .map(|control| control.content_size())
            .unwrap_or(Vec2::ZERO);
        if let Some(left) = layout.strategy().space_left(&geometry, content) {
            let takers: Vec<ControlId> = geometry
                .iter()
                .filter(|child| child.takes_space_left())
                .map(|child| child.id)
                .collect();
            for &child in &takers {
                if let Some(control) = self.control_mut(child) {
                    control.space_left = Some(left);
                }
                self.measure_control(child);
            }
            if !takers.is_empty() {
                geometry = self.child_geometry(id);
            }
        }

        layout.strategy().update(&mut geometry, content);
        for child in &geometry {
            if let Some(control) = self.control_mut(child.id) {
                control.bounds = child.bounds;
            }
        }
    }

    /// Position half of the two-phase pass.
    pub fn update_absolute_bounds(&mut self, id: ControlId, offset: Vec2) {
        let Some(control) = self.control(id) else {
            return;
        };
        let (origin, clip) = match control.parent.and_then(|parent| self.control(parent)) {
            Some(parent) => (parent.viewport_bounds.origin(), parent.viewport_clip_bounds),
            None => (self.viewport.origin(), self.viewport),
        };
        let Some(control) = self.control_mut(id) else {
            return;
        };
        let absolute = control.bounds.translate(origin + offset);
        let absolute_clip = absolute.intersect(clip);
        let viewport = absolute.inset(control.padding);
        control.absolute_bounds = absolute;
        control.absolute_clip_bounds = absolute_clip;
        control.viewport_bounds = viewport;
        control.viewport_clip_bounds = viewport.intersect(absolute_clip);

        if !self.is_container(id) {
            return;
        }
        let child_offset = if self.is_scroll_container(id) {
            self.update_scroll(id);
            self.scroll_position(id)
        } else {
            Vec2::ZERO
        };
        for child in self.children(id).to_vec() {
            if self.control(child).is_some_and(|control| control.visible) {
                self.update_absolute_bounds(child, child_offset);
            }
        }
    }

    /// Topmost control under `point` that accepts input, probing children
    /// back-to-front before the container itself.
    pub fn find_input_control(&self, id: ControlId, point: Vec2) -> Option<ControlId> {
        let control = self.control(id)?;
        if !control.visible || !control.enabled {
            return None;
        }
        for &child in self.children(id).iter().rev() {
            if let Some(hit) = self.find_input_control(child, point) {
                return Some(hit);
            }
        }
        (self.accepts_input(id) && control.absolute_clip_bounds.contains_point(point)).then_some(id)
    }

    pub fn accepts_input(&self, id: ControlId) -> bool {
        self.control(id)
            .is_some_and(|control| control.consume_input_events)
            || self.is_scroll_container(id)
    }

    /// Offers a pointer event to `target` and its ancestors; mouse handlers run
    /// before the generic pointer handler. Stops at the first consumer or at the
    /// first control that consumes input events.
    pub fn dispatch_pointer_bubble(&mut self, target: ControlId, event: &PointerEvent) -> bool {
        let mut current = Some(target);
        while let Some(id) = current {
            let consumed = self
                .with_widget(id, |widget, ctx| {
                    (event.is_mouse() && widget.mouse_event(event, ctx))
                        || widget.pointer_event(event, ctx)
                })
                .unwrap_or(false);
            if consumed {
                trace!(?id, kind = ?event.kind, "pointer event consumed");
                return true;
            }
            let Some(control) = self.control(id) else {
                return false;
            };
            if control.consume_input_events {
                trace!(?id, kind = ?event.kind, "bubbling stopped at input consumer");
                return false;
            }
            current = control.parent;
        }
        false
    }

    pub fn dispatch_key_bubble(&mut self, target: ControlId, event: &KeyEvent) -> bool {
        let mut current = Some(target);
        while let Some(id) = current {
            if self
                .with_widget(id, |widget, ctx| widget.key_event(event, ctx))
                .unwrap_or(false)
            {
                trace!(?id, key = ?event.key, "key event consumed");
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Runs widget updates over the enabled, visible part of the subtree.
    pub fn update_widgets(&mut self, id: ControlId, elapsed: Duration) {
        let Some(control) = self.control(id) else {
            return;
        };
        if !control.visible || !control.enabled {
            return;
        }
        self.with_widget(id, |widget, ctx| widget.update(elapsed, ctx));
        for child in self.children(id).to_vec() {
            self.update_widgets(child, elapsed);
        }
    }

    pub fn set_name(&mut self, id: ControlId, name: &str) {
        if let Some(control) = self.control_mut(id) {
            control.id = SmolStr::new(name);
        }
    }

    /// Sets the authored rect; percentage axes read their fraction from it.
    pub fn set_bounds(&mut self, id: ControlId, desired: Rect) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        if control.desired == desired {
            return;
        }
        control.desired = desired;
        self.set_dirty(id, DirtyBits::BOUNDS, false);
    }

    pub fn set_position(&mut self, id: ControlId, x: f32, y: f32) {
        if let Some(desired) = self.control(id).map(|control| control.desired) {
            self.set_bounds(id, Rect::new(x, y, desired.width, desired.height));
        }
    }

    pub fn set_size(&mut self, id: ControlId, width: f32, height: f32) {
        if let Some(desired) = self.control(id).map(|control| control.desired) {
            self.set_bounds(id, Rect::new(desired.x, desired.y, width, height));
        }
    }

    pub fn set_size_modes(&mut self, id: ControlId, modes: SizeModes) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        control.modes = modes;
        if !modes.width.is_percent() && !modes.height.is_percent() {
            control.space_left = None;
        }
        self.set_dirty(id, DirtyBits::BOUNDS, false);
    }

    pub fn set_width_mode(&mut self, id: ControlId, mode: AutoSize) {
        if let Some(mut modes) = self.control(id).map(|control| control.modes) {
            modes.width = mode;
            self.set_size_modes(id, modes);
        }
    }

    pub fn set_height_mode(&mut self, id: ControlId, mode: AutoSize) {
        if let Some(mut modes) = self.control(id).map(|control| control.modes) {
            modes.height = mode;
            self.set_size_modes(id, modes);
        }
    }

    pub fn set_alignment(&mut self, id: ControlId, alignment: Alignment) {
        if let Some(control) = self.control_mut(id) {
            control.alignment = alignment;
            self.set_dirty(id, DirtyBits::BOUNDS, false);
            if let Some(parent) = self.parent(id) {
                self.set_dirty(parent, DirtyBits::BOUNDS, false);
            }
        }
    }

    pub fn set_margin(&mut self, id: ControlId, margin: EdgeInsets) {
        if let Some(control) = self.control_mut(id) {
            control.margin = margin;
            self.set_dirty(id, DirtyBits::BOUNDS, false);
            if let Some(parent) = self.parent(id) {
                self.set_dirty(parent, DirtyBits::BOUNDS, false);
            }
        }
    }

    pub fn set_padding(&mut self, id: ControlId, padding: EdgeInsets) {
        if let Some(control) = self.control_mut(id) {
            control.padding = padding;
            self.set_dirty(id, DirtyBits::BOUNDS, true);
        }
    }

    /// Hiding a control drops every focus, active and hover reference into its subtree.
    pub fn set_visible(&mut self, id: ControlId, visible: bool) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        if control.visible == visible {
            return;
        }
        control.visible = visible;
        self.set_dirty(id, DirtyBits::BOUNDS, true);
        if let Some(parent) = self.parent(id) {
            self.set_dirty(parent, DirtyBits::BOUNDS, false);
        }
        if !visible {
            self.release_references(id);
        }
    }

    /// Disabling a control drops every focus, active and hover reference into its subtree.
    pub fn set_enabled(&mut self, id: ControlId, enabled: bool) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        if control.enabled == enabled {
            return;
        }
        control.enabled = enabled;
        self.set_dirty(id, DirtyBits::STATE, true);
        if !enabled {
            self.release_references(id);
        }
    }

    pub fn set_consume_input_events(&mut self, id: ControlId, consume: bool) {
        if let Some(control) = self.control_mut(id) {
            control.consume_input_events = consume;
        }
    }

    pub fn set_can_focus(&mut self, id: ControlId, can_focus: bool) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        control.can_focus = can_focus;
        if !can_focus && self.focused() == Some(id) {
            self.set_focus(None);
        }
    }

    pub fn set_z_index(&mut self, id: ControlId, z_index: i32) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        control.z_index = Some(z_index);
        if let Some(parent) = self.parent(id) {
            if let Some(container) = self.container_mut(parent) {
                container.next_z_index = container.next_z_index.max(z_index + 1);
            }
            self.sort_children(parent);
        }
    }

    pub fn set_focus_index(&mut self, id: ControlId, focus_index: i32) {
        let Some(control) = self.control_mut(id) else {
            return;
        };
        control.focus_index = Some(focus_index);
        if let Some(container) = self.parent(id).and_then(|parent| self.container_mut(parent)) {
            container.next_focus_index = container.next_focus_index.max(focus_index + 1);
        }
    }

    pub fn set_style_name(&mut self, id: ControlId, name: &str) {
        let style = self.theme.style(name);
        if !self.theme.contains(name) {
            debug!(style = name, "unknown style, using theme default");
        }
        let Some(control) = self.control_mut(id) else {
            return;
        };
        control.style_name = SmolStr::new(name);
        control.style = style;
        self.set_dirty(id, DirtyBits::BOUNDS | DirtyBits::STATE, false);
    }

    pub fn set_opacity(&mut self, id: ControlId, opacity: f32) {
        if let Some(control) = self.control_mut(id) {
            control.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

fn resolve_axis(
    name: &'static str,
    mode: AutoSize,
    value: f32,
    content: f32,
    parent: Option<f32>,
    left: Option<f32>,
    left_pending: bool,
) -> f32 {
    let resolved = match mode {
        AutoSize::None => value,
        AutoSize::WrapContent => content,
        AutoSize::PercentParent => match parent {
            Some(reference) => value * reference,
            None => {
                debug!(axis = name, "percent of a wrap-content parent axis, using 0");
                0.0
            }
        },
        AutoSize::PercentLeft => match left {
            Some(reference) => value * reference,
            None if left_pending => 0.0,
            None => {
                warn!(axis = name, "percent-left without a layout-supplied space, using 0");
                0.0
            }
        },
    };
    if resolved.is_nan() {
        warn!(axis = name, "size resolved to NaN, using 0");
        return 0.0;
    }
    resolved
}
