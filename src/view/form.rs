use std::time::Duration;

use glam::Vec2;
use tracing::{debug, trace};

use crate::config::UiConfig;
use crate::error::Result;
use crate::geometry::{AutoSize, Rect, SizeModes};
use crate::serialize::{ControlFactory, PropertyReader, PropertyWriter};
use crate::style::Theme;
use crate::ui::{ControlEvent, EventKind, Key, KeyEvent, KeyKind, MouseButton, PointerEvent, PointerKind};
use crate::view::layout::Layout;
use crate::view::render::RenderTarget;
use crate::view::{ControlId, ControlTree, FocusDirection};

/// Outcome of routing one pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub target: Option<ControlId>,
    pub consumed: bool,
}

impl Dispatch {
    fn to(target: ControlId, consumed: bool) -> Self {
        Self {
            target: Some(target),
            consumed,
        }
    }
}

/// Owner of one control tree: a root holding the `content` container and an
/// `overlay` layer drawn and hit-tested above it.
pub struct Form {
    tree: ControlTree,
    root: ControlId,
    content: ControlId,
    overlay: ControlId,
    visible: bool,
    enabled: bool,
    shift_held: bool,
    held: Vec<bool>,
    scrolled: Vec<bool>,
    last_update: Option<Duration>,
}

fn fill_parent(tree: &mut ControlTree, id: ControlId) {
    tree.set_bounds(id, Rect::from_size(1.0, 1.0));
    tree.set_size_modes(
        id,
        SizeModes {
            width: AutoSize::PercentParent,
            height: AutoSize::PercentParent,
            ..SizeModes::default()
        },
    );
}

impl Form {
    pub fn new(config: UiConfig, width: f32, height: f32) -> Self {
        let mut tree = ControlTree::new(config);
        tree.set_viewport(Rect::from_size(width, height));
        let root = tree.create_container(Layout::absolute());
        let content = tree.create_container(Layout::absolute());
        let overlay = tree.create_container(Layout::absolute());
        tree.set_name(root, "root");
        tree.set_name(content, "content");
        tree.set_name(overlay, "overlay");
        for id in [root, content, overlay] {
            fill_parent(&mut tree, id);
        }
        // Both layers are fresh containers, so insertion cannot fail.
        let _ = tree.add_control(root, content);
        let _ = tree.add_control(root, overlay);

        Self {
            tree,
            root,
            content,
            overlay,
            visible: true,
            enabled: true,
            shift_held: false,
            held: vec![false; config.max_contacts],
            scrolled: vec![false; config.max_contacts],
            last_update: None,
        }
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    pub fn root(&self) -> ControlId {
        self.root
    }

    pub fn content(&self) -> ControlId {
        self.content
    }

    pub fn overlay(&self) -> ControlId {
        self.overlay
    }

    pub fn add_control(&mut self, child: ControlId) -> Result<()> {
        self.tree.add_control(self.content, child)
    }

    pub fn add_overlay(&mut self, child: ControlId) -> Result<()> {
        self.tree.add_control(self.overlay, child)
    }

    pub fn remove_control(&mut self, child: ControlId) -> Result<()> {
        let parent = self.tree.parent(child).unwrap_or(self.content);
        self.tree.remove_control(parent, child)
    }

    pub fn find_control(&self, name: &str) -> Option<ControlId> {
        self.tree.find_control(self.root, name)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.release_interaction();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.release_interaction();
        }
    }

    fn release_interaction(&mut self) {
        self.tree.release_references(self.root);
        self.held.fill(false);
        self.scrolled.fill(false);
    }

    /// Drops the held state of `contact` after its release was routed to
    /// another form.
    pub(crate) fn forget_contact(&mut self, contact: usize) {
        if let Some(held) = self.held.get_mut(contact) {
            *held = false;
        }
    }

    /// Whether a primary press of `contact` is still held on one of this
    /// form's controls.
    pub fn captures(&self, contact: usize) -> bool {
        self.tree.active(contact).is_some()
    }

    pub fn viewport(&self) -> Rect {
        self.tree.viewport()
    }

    /// Sets the platform viewport and forces a full bounds pass.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.tree.set_viewport(Rect::from_size(width, height));
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.tree.set_theme(theme);
    }

    pub fn focused(&self) -> Option<ControlId> {
        self.tree.focused()
    }

    pub fn set_focus(&mut self, target: Option<ControlId>) -> bool {
        self.tree.set_focus(target)
    }

    /// Moves focus among the siblings of the focused control.
    pub fn move_focus(&mut self, direction: FocusDirection) -> Option<ControlId> {
        let container = self
            .tree
            .focused()
            .and_then(|focus| self.tree.parent(focus))
            .unwrap_or(self.content);
        self.tree.move_focus(container, direction)
    }

    /// Per-frame tick: widget updates over the enabled, visible tree, then the
    /// two-phase bounds pass from the root.
    pub fn update(&mut self, now: Duration) {
        let elapsed = self
            .last_update
            .map(|last| now.saturating_sub(last))
            .unwrap_or_default();
        self.last_update = Some(now);
        self.tree.set_time(now);
        if self.enabled {
            self.tree.update_widgets(self.root, elapsed);
        }
        self.tree.update_layout(self.root, Vec2::ZERO);
    }

    /// Draws content, then overlay. Returns how many controls drew.
    pub fn draw(&self, target: &mut dyn RenderTarget) -> usize {
        if !self.visible {
            return 0;
        }
        self.tree.draw(self.root, target, self.tree.viewport())
    }

    pub fn hit_test(&self, point: Vec2) -> Option<ControlId> {
        self.tree.find_input_control(self.root, point)
    }

    pub fn pointer_event(&mut self, event: &PointerEvent) -> Dispatch {
        if !self.visible || !self.enabled {
            return Dispatch::default();
        }
        if event.contact >= self.tree.config().max_contacts {
            trace!(contact = event.contact, "contact index out of range, ignored");
            return Dispatch::default();
        }
        let dispatch = match event.kind {
            PointerKind::Press => self.press(event),
            PointerKind::Move => self.pointer_move(event),
            PointerKind::Release => self.release(event),
            PointerKind::Wheel => self.wheel(event),
        };
        trace!(kind = ?event.kind, contact = event.contact, target = ?dispatch.target, consumed = dispatch.consumed, "pointer dispatched");
        dispatch
    }

    fn press(&mut self, event: &PointerEvent) -> Dispatch {
        let contact = event.contact;
        let target = self.hit_test(event.position);
        if !event.is_primary() {
            return match target {
                Some(target) => Dispatch::to(target, self.tree.dispatch_pointer_bubble(target, event)),
                None => Dispatch::default(),
            };
        }

        self.tree.set_hover(contact, None);
        self.tree.set_active(contact, target);
        self.held[contact] = true;
        self.scrolled[contact] = false;
        let Some(target) = target else {
            self.tree.set_focus(None);
            return Dispatch::default();
        };

        if self.tree.intercept_scroll(target, event) {
            self.scrolled[contact] = true;
            return Dispatch::to(target, true);
        }
        self.tree
            .notify(target, ControlEvent::from_pointer(EventKind::Press, target, event));
        if !self.tree.contains(target) {
            return Dispatch::to(target, false);
        }
        let focus = self
            .tree
            .ancestors(target)
            .into_iter()
            .find(|&id| self.tree.accepts_focus(id));
        self.tree.set_focus(focus);
        let consumed = self.tree.contains(target) && self.tree.dispatch_pointer_bubble(target, event);
        Dispatch::to(target, consumed)
    }

    fn pointer_move(&mut self, event: &PointerEvent) -> Dispatch {
        let contact = event.contact;
        if let Some(active) = self.tree.active(contact) {
            if self.tree.intercept_scroll(active, event) {
                self.scrolled[contact] = true;
                return Dispatch::to(active, true);
            }
            let consumed = self.tree.dispatch_pointer_bubble(active, event);
            return Dispatch::to(active, consumed);
        }

        let target = self.hit_test(event.position);
        if !self.held[contact] {
            self.tree.set_hover(contact, target);
        }
        match target {
            Some(target) => Dispatch::to(target, self.tree.dispatch_pointer_bubble(target, event)),
            None => Dispatch::default(),
        }
    }

    fn release(&mut self, event: &PointerEvent) -> Dispatch {
        let contact = event.contact;
        let active = self.tree.active(contact).filter(|_| event.is_primary());
        if event.is_primary() {
            self.held[contact] = false;
        }
        let Some(active) = active else {
            if event.is_primary() {
                self.tree.end_scroll_gestures(event);
            }
            let Some(target) = self.hit_test(event.position) else {
                return Dispatch::default();
            };
            let click = match event.button() {
                Some(MouseButton::Right) => Some(EventKind::RightClick),
                Some(MouseButton::Middle) => Some(EventKind::MiddleClick),
                _ => None,
            };
            if let Some(kind) = click {
                self.tree
                    .notify(target, ControlEvent::from_pointer(kind, target, event));
            }
            let consumed = self.tree.contains(target) && self.tree.dispatch_pointer_bubble(target, event);
            return Dispatch::to(target, consumed);
        };

        let dragged = self.scrolled[contact] || self.tree.scroll_gesture_passed_threshold(active, contact);
        self.tree.intercept_scroll(active, event);
        self.tree
            .notify(active, ControlEvent::from_pointer(EventKind::Release, active, event));
        let inside = self
            .tree
            .control(active)
            .is_some_and(|control| control.absolute_clip_bounds().contains_point(event.position));
        if inside && !dragged {
            self.tree
                .notify(active, ControlEvent::from_pointer(EventKind::Click, active, event));
        } else if inside {
            trace!(?active, "click suppressed by scroll gesture");
        }
        let consumed = self.tree.contains(active) && self.tree.dispatch_pointer_bubble(active, event);

        self.tree.set_active(contact, None);
        self.scrolled[contact] = false;
        if event.is_mouse() {
            let hover = self.hit_test(event.position);
            self.tree.set_hover(contact, hover);
        }
        Dispatch::to(active, consumed)
    }

    fn wheel(&mut self, event: &PointerEvent) -> Dispatch {
        let Some(target) = self.hit_test(event.position) else {
            return Dispatch::default();
        };
        if self.tree.intercept_scroll(target, event) {
            return Dispatch::to(target, true);
        }
        Dispatch::to(target, self.tree.dispatch_pointer_bubble(target, event))
    }

    /// Routes a key to the focused control and its ancestors. Unconsumed Tab
    /// and arrow presses move focus. Escape is never reported consumed.
    pub fn key_event(&mut self, event: &KeyEvent) -> bool {
        if !self.visible || !self.enabled {
            return false;
        }
        if event.key == Key::Shift {
            self.shift_held = event.kind != KeyKind::Release;
            return false;
        }
        let consumed = self
            .tree
            .focused()
            .is_some_and(|focus| self.tree.dispatch_key_bubble(focus, event));
        if event.key == Key::Escape {
            return false;
        }
        if consumed || event.kind != KeyKind::Press {
            return consumed;
        }
        let direction = match event.key {
            Key::Tab if self.shift_held => FocusDirection::Previous,
            Key::Tab => FocusDirection::Next,
            Key::Up => FocusDirection::Up,
            Key::Down => FocusDirection::Down,
            Key::Left => FocusDirection::Left,
            Key::Right => FocusDirection::Right,
            _ => return false,
        };
        let moved = self.move_focus(direction);
        debug!(?direction, ?moved, "keyboard focus move");
        moved.is_some()
    }

    /// Writes the children of the content container.
    pub fn save(&self, writer: &mut dyn PropertyWriter) -> Result<()> {
        let children = self.tree.children(self.content);
        writer.write_object("form", "Form");
        writer.write_list("children", children.len());
        for &child in children {
            self.tree.save_control(child, "", writer)?;
        }
        writer.end_list();
        writer.end_object();
        Ok(())
    }

    /// Replaces the content container's children with those read from `reader`.
    pub fn load(&mut self, reader: &mut dyn PropertyReader, factory: &ControlFactory) -> Result<()> {
        reader.read_object("form")?;
        self.tree.remove_all_controls(self.content)?;
        let count = reader.read_list("children");
        for _ in 0..count {
            let child = self.tree.load_control("", reader, factory)?;
            self.tree.add_control(self.content, child)?;
        }
        reader.end_list();
        reader.end_object();
        debug!(count, "form loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use glam::Vec2;

    use super::{Dispatch, Form};
    use crate::config::UiConfig;
    use crate::geometry::Rect;
    use crate::serialize::{ControlFactory, JsonReader, JsonWriter};
    use crate::ui::{
        EventKind, EventMask, Key, KeyEvent, ListenerProp, MouseButton, PointerEvent, PointerKind,
    };
    use crate::view::layout::Layout;
    use crate::view::{Button, ControlId, ControlState, DrawList, Label, ScrollDirection};

    fn form() -> Form {
        let mut form = Form::new(UiConfig::default(), 400.0, 300.0);
        form.update(Duration::ZERO);
        form
    }

    fn button(form: &mut Form, bounds: Rect) -> ControlId {
        let id = form.tree_mut().create_widget(Button::new("B"));
        form.tree_mut().set_bounds(id, bounds);
        form.add_control(id).unwrap();
        id
    }

    fn record(form: &mut Form, id: ControlId) -> Rc<RefCell<Vec<EventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        form.tree_mut()
            .add_listener(
                id,
                ListenerProp::new(EventMask::all(), move |_, event| sink.borrow_mut().push(event.kind)),
            )
            .unwrap();
        seen
    }

    #[test]
    fn layers_fill_the_viewport() {
        let mut form = form();
        let content = form.tree().control(form.content()).unwrap();
        assert_eq!(content.absolute_bounds(), Rect::from_size(400.0, 300.0));

        form.resize(800.0, 600.0);
        form.update(Duration::from_millis(16));
        let overlay = form.tree().control(form.overlay()).unwrap();
        assert_eq!(overlay.absolute_bounds(), Rect::from_size(800.0, 600.0));
    }

    #[test]
    fn overlay_wins_hit_tests() {
        let mut form = form();
        let below = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = form.tree_mut().create_widget(Button::new("Top"));
        form.tree_mut().set_bounds(above, Rect::new(50.0, 50.0, 100.0, 100.0));
        form.add_overlay(above).unwrap();
        form.update(Duration::ZERO);

        assert_eq!(form.hit_test(Vec2::new(75.0, 75.0)), Some(above));
        assert_eq!(form.hit_test(Vec2::new(25.0, 25.0)), Some(below));
        assert_eq!(form.hit_test(Vec2::new(300.0, 250.0)), None);
    }

    #[test]
    fn press_release_inside_clicks_and_focuses() {
        let mut form = form();
        let a = button(&mut form, Rect::new(10.0, 10.0, 100.0, 40.0));
        form.update(Duration::ZERO);
        let seen = record(&mut form, a);

        let pressed = form.pointer_event(&PointerEvent::mouse_press(20.0, 20.0));
        assert_eq!(pressed.target, Some(a));
        assert_eq!(form.focused(), Some(a));
        assert_eq!(form.tree().active(0), Some(a));
        form.update(Duration::from_millis(16));
        assert_eq!(form.tree().control(a).unwrap().state(), ControlState::Active);

        form.pointer_event(&PointerEvent::mouse_release(25.0, 25.0));
        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::Press,
                EventKind::FocusGained,
                EventKind::Release,
                EventKind::Click,
                EventKind::Activated,
            ]
        );
        assert_eq!(form.tree().active(0), None);
        assert_eq!(form.tree().hovered(0), Some(a));
    }

    #[test]
    fn captured_pointer_keeps_routing_to_the_pressed_control() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = button(&mut form, Rect::new(200.0, 0.0, 100.0, 100.0));
        form.update(Duration::ZERO);
        let seen = record(&mut form, a);

        form.pointer_event(&PointerEvent::mouse_press(50.0, 50.0));
        let moved = form.pointer_event(&PointerEvent::mouse_move(250.0, 50.0));
        assert_eq!(moved.target, Some(a));
        assert!(!form.tree().control(a).unwrap().is_hovered());
        assert!(!form.tree().control(b).unwrap().is_hovered());
        assert_eq!(form.tree().hovered(0), None);

        let released = form.pointer_event(&PointerEvent::mouse_release(250.0, 50.0));
        assert_eq!(released.target, Some(a));
        assert!(!seen.borrow().contains(&EventKind::Click));
        assert_eq!(form.tree().hovered(0), Some(b));
    }

    #[test]
    fn dragging_a_scroll_container_suppresses_click() {
        let mut form = form();
        let tree = form.tree_mut();
        let list = tree.create_scroll_container(Layout::vertical(0.0), ScrollDirection::Vertical);
        tree.set_bounds(list, Rect::new(0.0, 0.0, 200.0, 200.0));
        let item = tree.create_widget(Button::new("item"));
        tree.set_bounds(item, Rect::new(0.0, 0.0, 200.0, 600.0));
        tree.add_control(list, item).unwrap();
        form.add_control(list).unwrap();
        form.update(Duration::ZERO);
        let seen = record(&mut form, item);

        let at = |kind, y: f32, ms| PointerEvent::touch(kind, 100.0, y, 0).at_ms(ms);
        assert_eq!(form.pointer_event(&at(PointerKind::Press, 150.0, 0)).target, Some(item));
        assert!(!form.pointer_event(&at(PointerKind::Move, 145.0, 10)).consumed);
        assert!(form.pointer_event(&at(PointerKind::Move, 120.0, 20)).consumed);
        form.pointer_event(&at(PointerKind::Release, 120.0, 30));

        let seen = seen.borrow();
        assert!(seen.contains(&EventKind::Release));
        assert!(!seen.contains(&EventKind::Click));
        assert_eq!(form.tree().scroll_position(list), Vec2::new(0.0, -30.0));
        assert!(form.tree().scroll_velocity(list).y < 0.0);
    }

    #[test]
    fn short_touch_inside_scroll_container_still_clicks() {
        let mut form = form();
        let tree = form.tree_mut();
        let list = tree.create_scroll_container(Layout::vertical(0.0), ScrollDirection::Vertical);
        tree.set_bounds(list, Rect::new(0.0, 0.0, 200.0, 200.0));
        let item = tree.create_widget(Button::new("item"));
        tree.set_bounds(item, Rect::new(0.0, 0.0, 200.0, 600.0));
        tree.add_control(list, item).unwrap();
        form.add_control(list).unwrap();
        form.update(Duration::ZERO);
        let seen = record(&mut form, item);

        form.pointer_event(&PointerEvent::touch(PointerKind::Press, 100.0, 150.0, 0));
        form.pointer_event(&PointerEvent::touch(PointerKind::Move, 100.0, 146.0, 0).at_ms(10));
        form.pointer_event(&PointerEvent::touch(PointerKind::Release, 100.0, 146.0, 0).at_ms(20));
        assert!(seen.borrow().contains(&EventKind::Click));
    }

    #[test]
    fn press_on_unfocusable_control_focuses_nearest_focusable_ancestor() {
        let mut form = form();
        let tree = form.tree_mut();
        let panel = tree.create_container(Layout::absolute());
        tree.set_bounds(panel, Rect::new(0.0, 0.0, 200.0, 200.0));
        tree.set_can_focus(panel, true);
        let plain = tree.create_control();
        tree.set_bounds(plain, Rect::new(10.0, 10.0, 50.0, 50.0));
        tree.add_control(panel, plain).unwrap();
        form.add_control(panel).unwrap();
        let elsewhere = button(&mut form, Rect::new(300.0, 0.0, 50.0, 50.0));
        form.update(Duration::ZERO);

        form.set_focus(Some(elsewhere));
        form.pointer_event(&PointerEvent::mouse_press(20.0, 20.0));
        assert_eq!(form.focused(), Some(panel));
        form.pointer_event(&PointerEvent::mouse_release(20.0, 20.0));

        form.pointer_event(&PointerEvent::mouse_press(390.0, 290.0));
        assert_eq!(form.focused(), None);
    }

    #[test]
    fn labels_let_presses_through() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        let label = form.tree_mut().create_widget(Label::new("over"));
        form.tree_mut().set_bounds(label, Rect::new(0.0, 0.0, 100.0, 100.0));
        form.add_control(label).unwrap();
        form.update(Duration::ZERO);

        let pressed = form.pointer_event(&PointerEvent::mouse_press(50.0, 50.0));
        assert_eq!(pressed, Dispatch { target: Some(a), consumed: false });
    }

    #[test]
    fn right_release_fires_right_click_without_capture() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        form.update(Duration::ZERO);
        let seen = record(&mut form, a);

        form.pointer_event(&PointerEvent::mouse(PointerKind::Press, MouseButton::Right, 10.0, 10.0));
        assert_eq!(form.tree().active(0), None);
        form.pointer_event(&PointerEvent::mouse(PointerKind::Release, MouseButton::Right, 10.0, 10.0));
        assert_eq!(*seen.borrow(), vec![EventKind::RightClick]);
    }

    #[test]
    fn out_of_range_contacts_are_ignored() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        form.update(Duration::ZERO);
        let press = PointerEvent::touch(PointerKind::Press, 10.0, 10.0, 10);
        assert_eq!(form.pointer_event(&press), Dispatch::default());
        assert_eq!(form.tree().active(9), None);
        assert!(!form.tree().control(a).unwrap().is_active());
    }

    #[test]
    fn tab_cycles_focus_and_escape_is_never_consumed() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 50.0, 20.0));
        let b = button(&mut form, Rect::new(0.0, 30.0, 50.0, 20.0));
        form.update(Duration::ZERO);

        assert!(form.key_event(&KeyEvent::press(Key::Tab)));
        assert_eq!(form.focused(), Some(a));
        assert!(form.key_event(&KeyEvent::press(Key::Tab)));
        assert_eq!(form.focused(), Some(b));
        form.key_event(&KeyEvent::press(Key::Shift));
        assert!(form.key_event(&KeyEvent::press(Key::Tab)));
        assert_eq!(form.focused(), Some(a));
        form.key_event(&KeyEvent::release(Key::Shift));

        assert!(form.key_event(&KeyEvent::press(Key::Down)));
        assert_eq!(form.focused(), Some(b));
        assert!(!form.key_event(&KeyEvent::press(Key::Escape)));
    }

    #[test]
    fn focused_button_clicks_on_enter() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 50.0, 20.0));
        form.update(Duration::ZERO);
        let seen = record(&mut form, a);
        form.set_focus(Some(a));

        assert!(form.key_event(&KeyEvent::press(Key::Enter)));
        assert!(form.key_event(&KeyEvent::release(Key::Enter)));
        assert!(seen.borrow().contains(&EventKind::Click));
    }

    #[test]
    fn removing_the_active_control_clears_interaction() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        form.update(Duration::ZERO);
        form.pointer_event(&PointerEvent::mouse_press(10.0, 10.0));
        form.remove_control(a).unwrap();

        assert_eq!(form.tree().active(0), None);
        assert_eq!(form.focused(), None);
        let released = form.pointer_event(&PointerEvent::mouse_release(10.0, 10.0));
        assert_eq!(released.target, None);
    }

    #[test]
    fn draws_nothing_while_hidden() {
        let mut form = form();
        button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        form.update(Duration::ZERO);
        let mut list = DrawList::new();
        assert_eq!(form.draw(&mut list), 4);
        form.set_visible(false);
        assert_eq!(form.draw(&mut list), 0);
        assert_eq!(
            form.pointer_event(&PointerEvent::mouse_press(10.0, 10.0)),
            Dispatch::default()
        );
    }

    #[test]
    fn save_and_load_round_trip_content() {
        let mut form = form();
        let a = button(&mut form, Rect::new(5.0, 5.0, 80.0, 20.0));
        form.tree_mut().set_name(a, "ok");
        let mut writer = JsonWriter::new();
        form.save(&mut writer).unwrap();
        let document = writer.finish().to_string();

        let mut copy = Form::new(UiConfig::default(), 400.0, 300.0);
        let stale = copy.tree_mut().create_control();
        copy.add_control(stale).unwrap();
        let mut reader = JsonReader::parse(&document).unwrap();
        copy.load(&mut reader, &ControlFactory::default()).unwrap();

        assert!(!copy.tree().contains(stale));
        let ok = copy.find_control("ok").unwrap();
        assert_eq!(copy.tree().text(ok), Some("B"));
        assert_eq!(copy.tree().control(ok).unwrap().desired_bounds(), Rect::new(5.0, 5.0, 80.0, 20.0));
    }

    #[test]
    fn right_release_leaves_a_left_drag_running() {
        let mut form = form();
        let tree = form.tree_mut();
        let list = tree.create_scroll_container(Layout::vertical(0.0), ScrollDirection::Vertical);
        tree.set_bounds(list, Rect::new(0.0, 0.0, 200.0, 200.0));
        let item = tree.create_widget(Button::new("item"));
        tree.set_bounds(item, Rect::new(0.0, 0.0, 200.0, 600.0));
        tree.add_control(list, item).unwrap();
        form.add_control(list).unwrap();
        form.update(Duration::ZERO);
        let seen = record(&mut form, item);

        let left = |kind, y: f32, ms| PointerEvent::mouse(kind, MouseButton::Left, 100.0, y).at_ms(ms);
        assert_eq!(form.pointer_event(&left(PointerKind::Press, 150.0, 0)).target, Some(item));
        assert!(form.pointer_event(&left(PointerKind::Move, 120.0, 10)).consumed);
        form.pointer_event(&PointerEvent::mouse(PointerKind::Release, MouseButton::Right, 100.0, 120.0).at_ms(20));
        assert_eq!(form.tree().active(0), Some(item));

        let dispatch = form.pointer_event(&left(PointerKind::Move, 80.0, 30));
        assert_eq!(dispatch, Dispatch { target: Some(item), consumed: true });
        assert_eq!(form.tree().scroll_position(list), Vec2::new(0.0, -70.0));

        form.pointer_event(&left(PointerKind::Release, 80.0, 40));
        let seen = seen.borrow();
        assert!(seen.contains(&EventKind::RightClick));
        assert!(!seen.contains(&EventKind::Click));
        assert_eq!(form.tree().active(0), None);
    }

    #[test]
    fn held_button_does_not_hover_until_released() {
        let mut form = form();
        let a = button(&mut form, Rect::new(0.0, 0.0, 100.0, 100.0));
        form.update(Duration::ZERO);

        assert_eq!(form.pointer_event(&PointerEvent::mouse_press(390.0, 290.0)).target, None);
        assert_eq!(form.pointer_event(&PointerEvent::mouse_move(50.0, 50.0)).target, Some(a));
        assert_eq!(form.tree().hovered(0), None);
        assert!(!form.tree().control(a).unwrap().is_hovered());

        form.pointer_event(&PointerEvent::mouse_release(50.0, 50.0));
        form.pointer_event(&PointerEvent::mouse_move(60.0, 60.0));
        assert_eq!(form.tree().hovered(0), Some(a));
        assert!(form.tree().control(a).unwrap().is_hovered());
    }
}
