use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::{Control, ContainerData, DirtyBits, ScrollState};
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::geometry::Rect;
use crate::style::Theme;
use crate::ui::{ControlEvent, EventKind, ListenerId, ListenerProp};
use crate::view::layout::Layout;
use crate::view::widget::{Widget, WidgetContext};

new_key_type! {
    pub struct ControlId;
}

pub struct ControlNode {
    pub(crate) control: Control,
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) container: Option<ContainerData>,
}

impl ControlNode {
    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn type_name(&self) -> &str {
        match (&self.widget, &self.container) {
            (Some(widget), _) => widget.type_name(),
            (None, Some(container)) if container.scroll.is_some() => "ScrollContainer",
            (None, Some(_)) => "Container",
            (None, None) => "Control",
        }
    }

    /// Whether this node's size or child placement is derived from its children.
    pub(crate) fn derives_from_children(&self) -> bool {
        self.control.modes.is_auto()
            || self
                .container
                .as_ref()
                .is_some_and(|container| !matches!(container.layout, Layout::Absolute(_)))
    }
}

/// Form-wide references into the tree; every entry is cleared as soon as the
/// referenced control is detached or disabled.
#[derive(Debug, Default)]
pub(crate) struct Interaction {
    pub focus: Option<ControlId>,
    pub active: Vec<Option<ControlId>>,
    pub hover: Vec<Option<ControlId>>,
}

pub struct ControlTree {
    pub(crate) nodes: SlotMap<ControlId, ControlNode>,
    pub(crate) interaction: Interaction,
    pub(crate) viewport: Rect,
    pub(crate) now: Duration,
    pub(crate) config: UiConfig,
    pub(crate) theme: Theme,
}

impl Default for ControlTree {
    fn default() -> Self {
        Self::new(UiConfig::default())
    }
}

impl ControlTree {
    pub fn new(config: UiConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            interaction: Interaction {
                focus: None,
                active: vec![None; config.max_contacts],
                hover: vec![None; config.max_contacts],
            },
            viewport: Rect::default(),
            now: Duration::ZERO,
            config,
            theme: Theme::default(),
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Replaces the platform viewport and forces every root subtree to re-measure.
    pub fn set_viewport(&mut self, viewport: Rect) {
        if viewport == self.viewport {
            return;
        }
        debug!(
            width = viewport.width,
            height = viewport.height,
            "platform viewport changed"
        );
        self.viewport = viewport;
        let roots: Vec<ControlId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.control.parent.is_none())
            .map(|(id, _)| id)
            .collect();
        for root in roots {
            self.set_dirty(root, DirtyBits::BOUNDS, true);
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Installs a theme and re-resolves every control's style by name.
    pub fn set_theme(&mut self, theme: Theme) {
        debug!("theme changed");
        self.theme = theme;
        for node in self.nodes.values_mut() {
            node.control.style = self.theme.style(&node.control.style_name);
            node.control.dirty |= DirtyBits::BOUNDS | DirtyBits::STATE;
        }
    }

    pub fn create_control(&mut self) -> ControlId {
        self.insert_node(Control::new(), None, None)
    }

    pub fn create_widget<W: Widget>(&mut self, widget: W) -> ControlId {
        let mut control = Control::new();
        control.can_focus = widget.can_focus();
        control.consume_input_events = widget.consumes_input();
        control.style_name = SmolStr::new(widget.style_name());
        self.insert_node(control, Some(Box::new(widget)), None)
    }

    pub fn create_container(&mut self, layout: Layout) -> ControlId {
        let mut control = Control::new();
        control.consume_input_events = false;
        control.style_name = SmolStr::new_static("Container");
        self.insert_node(control, None, Some(ContainerData::new(layout)))
    }

    pub(crate) fn insert_node(
        &mut self,
        mut control: Control,
        widget: Option<Box<dyn Widget>>,
        container: Option<ContainerData>,
    ) -> ControlId {
        control.style = self.theme.style(&control.style_name);
        self.nodes.insert(ControlNode {
            control,
            widget,
            container,
        })
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ControlId) -> Option<&ControlNode> {
        self.nodes.get(id)
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.nodes.get(id).map(|node| &node.control)
    }

    pub(crate) fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.nodes.get_mut(id).map(|node| &mut node.control)
    }

    pub(crate) fn try_control_mut(&mut self, id: ControlId) -> Result<&mut Control> {
        self.control_mut(id).ok_or(UiError::UnknownControl(id))
    }

    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.control(id).and_then(|control| control.parent)
    }

    pub fn is_container(&self, id: ControlId) -> bool {
        self.nodes.get(id).is_some_and(ControlNode::is_container)
    }

    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.nodes
            .get(id)
            .and_then(|node| node.container.as_ref())
            .map(|container| container.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn container(&self, id: ControlId) -> Option<&ContainerData> {
        self.nodes.get(id).and_then(|node| node.container.as_ref())
    }

    pub(crate) fn container_mut(&mut self, id: ControlId) -> Option<&mut ContainerData> {
        self.nodes.get_mut(id).and_then(|node| node.container.as_mut())
    }

    pub(crate) fn scroll_state(&self, id: ControlId) -> Option<&ScrollState> {
        self.container(id).and_then(|container| container.scroll.as_ref())
    }

    pub(crate) fn scroll_state_mut(&mut self, id: ControlId) -> Option<&mut ScrollState> {
        self.container_mut(id)
            .and_then(|container| container.scroll.as_mut())
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        let mut current = self.contains(id).then_some(id);
        while let Some(next) = current {
            out.push(next);
            current = self.parent(next);
        }
        out
    }

    pub fn is_ancestor_or_self(&self, ancestor: ControlId, id: ControlId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.parent(next);
        }
        false
    }

    pub fn root_of(&self, id: ControlId) -> ControlId {
        let mut root = id;
        while let Some(parent) = self.parent(root) {
            root = parent;
        }
        root
    }

    /// Depth-first search for a control by its string id.
    pub fn find_control(&self, root: ControlId, name: &str) -> Option<ControlId> {
        let node = self.nodes.get(root)?;
        if node.control.id == name {
            return Some(root);
        }
        self.children(root)
            .iter()
            .find_map(|&child| self.find_control(child, name))
    }

    pub fn visible_in_hierarchy(&self, id: ControlId) -> bool {
        self.ancestors(id)
            .iter()
            .all(|&id| self.control(id).is_some_and(|control| control.visible))
    }

    pub fn enabled_in_hierarchy(&self, id: ControlId) -> bool {
        self.ancestors(id)
            .iter()
            .all(|&id| self.control(id).is_some_and(|control| control.enabled))
    }

    pub fn widget<W: Widget>(&self, id: ControlId) -> Option<&W> {
        self.nodes
            .get(id)?
            .widget
            .as_ref()?
            .as_any()
            .downcast_ref::<W>()
    }

    /// Runs `f` against the typed widget of `id`, then applies the dirty bits and
    /// events it queued on the context.
    pub fn update_widget<W: Widget, R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut W, &mut WidgetContext) -> R,
    ) -> Option<R> {
        let (result, ctx) = self.with_widget_raw(id, |widget, ctx| {
            widget.as_any_mut().downcast_mut::<W>().map(|widget| f(widget, ctx))
        })?;
        self.apply_widget_context(ctx);
        result
    }

    pub(crate) fn with_widget<R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut dyn Widget, &mut WidgetContext) -> R,
    ) -> Option<R> {
        let (result, ctx) = self.with_widget_raw(id, f)?;
        self.apply_widget_context(ctx);
        Some(result)
    }

    fn with_widget_raw<R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut dyn Widget, &mut WidgetContext) -> R,
    ) -> Option<(R, WidgetContext)> {
        let node = self.nodes.get_mut(id)?;
        let mut widget = node.widget.take()?;
        let mut ctx = WidgetContext::new(id, &node.control);
        let result = f(widget.as_mut(), &mut ctx);
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
        Some((result, ctx))
    }

    pub(crate) fn apply_widget_context(&mut self, ctx: WidgetContext) {
        let target = ctx.target();
        if !ctx.dirty.is_empty() {
            self.set_dirty(target, ctx.dirty, false);
        }
        for kind in ctx.emitted {
            if self.contains(target) {
                self.notify(target, ControlEvent::new(kind, target));
            }
        }
    }

    pub fn add_listener(&mut self, id: ControlId, listener: ListenerProp) -> Result<ListenerId> {
        Ok(self.try_control_mut(id)?.listeners.push(listener))
    }

    pub fn remove_listener(&mut self, id: ControlId, listener: ListenerId) -> bool {
        self.control_mut(id)
            .is_some_and(|control| control.listeners.remove(listener))
    }

    /// Delivers `event` to the widget of `id` and then to every matching listener.
    /// Listener handles are cloned up front, so a listener that detaches or destroys
    /// the source control does not cut the remaining listeners short.
    pub fn notify(&mut self, id: ControlId, event: ControlEvent) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let listeners = node.control.listeners.matching(event.kind);
        let reaction = self.with_widget_raw(id, |widget, ctx| widget.on_event(&event, ctx));

        for listener in listeners {
            if !listener.call(self, &event) {
                trace!(?id, kind = ?event.kind, "listener re-entered, skipped");
            }
            if !self.contains(id) {
                trace!(?id, kind = ?event.kind, "control destroyed by listener");
            }
        }

        if let Some(((), ctx)) = reaction {
            if self.contains(id) {
                self.apply_widget_context(ctx);
            }
        }
    }

    pub fn emit(&mut self, id: ControlId, kind: EventKind) {
        self.notify(id, ControlEvent::new(kind, id));
    }

    pub fn focused(&self) -> Option<ControlId> {
        self.interaction.focus
    }

    pub fn active(&self, contact: usize) -> Option<ControlId> {
        self.interaction.active.get(contact).copied().flatten()
    }

    pub fn hovered(&self, contact: usize) -> Option<ControlId> {
        self.interaction.hover.get(contact).copied().flatten()
    }

    /// Promotes `target` to ACTIVE for `contact`, demoting the previous one.
    pub fn set_active(&mut self, contact: usize, target: Option<ControlId>) {
        let Some(slot) = self.interaction.active.get_mut(contact) else {
            return;
        };
        let previous = std::mem::replace(slot, target);
        if previous == target {
            return;
        }
        if let Some(previous) = previous.and_then(|id| self.control_mut(id)) {
            previous.active_contacts = previous.active_contacts.saturating_sub(1);
            previous.dirty |= DirtyBits::STATE;
        }
        if let Some(control) = target.and_then(|id| self.control_mut(id)) {
            control.active_contacts += 1;
            control.dirty |= DirtyBits::STATE;
        }
    }

    /// Promotes `target` to HOVER for `contact`, demoting the previous one.
    pub fn set_hover(&mut self, contact: usize, target: Option<ControlId>) {
        let Some(slot) = self.interaction.hover.get_mut(contact) else {
            return;
        };
        let previous = std::mem::replace(slot, target);
        if previous == target {
            return;
        }
        let still_hovered = |tree: &Self, id: ControlId| tree.interaction.hover.contains(&Some(id));
        if let Some(previous) = previous {
            let keep = still_hovered(self, previous);
            if let Some(control) = self.control_mut(previous) {
                control.hovered = keep;
                control.dirty |= DirtyBits::STATE;
            }
        }
        if let Some(control) = target.and_then(|id| self.control_mut(id)) {
            control.hovered = true;
            control.dirty |= DirtyBits::STATE;
        }
    }

    /// Drops every form-level reference to controls in the subtree of `id`.
    /// Returns the control that lost focus, if any. No event is fired.
    pub(crate) fn clear_references(&mut self, id: ControlId) -> Option<ControlId> {
        let lost_focus = self
            .interaction
            .focus
            .filter(|&focus| self.is_ancestor_or_self(id, focus));
        if let Some(focus) = lost_focus {
            if let Some(control) = self.control_mut(focus) {
                control.focused = false;
                control.dirty |= DirtyBits::STATE;
            }
            self.interaction.focus = None;
        }
        for contact in 0..self.interaction.active.len() {
            if self
                .active(contact)
                .is_some_and(|active| self.is_ancestor_or_self(id, active))
            {
                self.set_active(contact, None);
            }
        }
        for contact in 0..self.interaction.hover.len() {
            if self
                .hovered(contact)
                .is_some_and(|hover| self.is_ancestor_or_self(id, hover))
            {
                self.set_hover(contact, None);
            }
        }
        lost_focus
    }

    /// Like [`Self::clear_references`], but tells a control that keeps living
    /// that it lost focus.
    pub(crate) fn release_references(&mut self, id: ControlId) {
        if let Some(lost) = self.clear_references(id) {
            trace!(?lost, "focus dropped with its subtree");
            self.emit(lost, EventKind::FocusLost);
        }
    }

    /// Frees `id` and its whole subtree. The control must already be detached.
    pub(crate) fn destroy(&mut self, id: ControlId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.destroy(child);
        }
        self.nodes.remove(id);
    }
}
