use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace};

use super::form::{Dispatch, Form};
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::ui::{KeyEvent, PointerEvent, PointerKind};
use crate::view::render::RenderTarget;

new_key_type! {
    pub struct FormId;
}

/// Registry of live forms. Updates and draws every registered form in
/// registration order, routes pointer input to visible forms and keys to the
/// form that owns keyboard focus.
pub struct FormManager {
    config: UiConfig,
    forms: SlotMap<FormId, Form>,
    order: Vec<FormId>,
    focused: Option<FormId>,
}

impl Default for FormManager {
    fn default() -> Self {
        Self::new(UiConfig::default())
    }
}

impl FormManager {
    pub fn new(config: UiConfig) -> Self {
        Self {
            config,
            forms: SlotMap::with_key(),
            order: Vec::new(),
            focused: None,
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Creates a form sized to the platform viewport and registers it.
    pub fn create_form(&mut self, width: f32, height: f32) -> FormId {
        self.register(Form::new(self.config, width, height))
    }

    pub fn register(&mut self, form: Form) -> FormId {
        let id = self.forms.insert(form);
        self.order.push(id);
        debug!(?id, forms = self.order.len(), "form registered");
        id
    }

    /// Removes `id` from the registry and hands the form back; focus ownership
    /// is dropped if it pointed at this form.
    pub fn unregister(&mut self, id: FormId) -> Result<Form> {
        let form = self.forms.remove(id).ok_or(UiError::UnknownForm(id))?;
        self.order.retain(|&other| other != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        debug!(?id, forms = self.order.len(), "form unregistered");
        Ok(form)
    }

    pub fn contains(&self, id: FormId) -> bool {
        self.forms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered forms in registration order.
    pub fn forms(&self) -> &[FormId] {
        &self.order
    }

    pub fn form(&self, id: FormId) -> Result<&Form> {
        self.forms.get(id).ok_or(UiError::UnknownForm(id))
    }

    pub fn form_mut(&mut self, id: FormId) -> Result<&mut Form> {
        self.forms.get_mut(id).ok_or(UiError::UnknownForm(id))
    }

    pub fn focused_form(&self) -> Option<FormId> {
        self.focused
    }

    /// Hands keyboard focus to `id`, clearing control focus in every other form.
    pub fn set_focused_form(&mut self, id: Option<FormId>) -> Result<()> {
        if let Some(id) = id {
            if !self.forms.contains_key(id) {
                return Err(UiError::UnknownForm(id));
            }
        }
        if self.focused == id {
            return Ok(());
        }
        debug!(previous = ?self.focused, form = ?id, "keyboard focus owner changed");
        self.focused = id;
        for (other, form) in self.forms.iter_mut() {
            if Some(other) != id {
                form.set_focus(None);
            }
        }
        Ok(())
    }

    pub fn update(&mut self, now: Duration) {
        for &id in &self.order {
            if let Some(form) = self.forms.get_mut(id) {
                form.update(now);
            }
        }
    }

    /// Draws visible forms back-to-front in registration order. Returns how
    /// many controls drew.
    pub fn draw(&self, target: &mut dyn RenderTarget) -> usize {
        self.order
            .iter()
            .filter_map(|&id| self.forms.get(id))
            .map(|form| form.draw(target))
            .sum()
    }

    /// Moves and primary releases go to the form holding the pointer capture
    /// for their contact. Everything else is offered to each visible, enabled
    /// form until one finds a target.
    pub fn pointer_event(&mut self, event: &PointerEvent) -> Option<(FormId, Dispatch)> {
        let routed = match self.capturing_form(event) {
            Some(id) => self
                .forms
                .get_mut(id)
                .map(|form| (id, form.pointer_event(event))),
            None => self.first_hit(event),
        };
        if event.kind == PointerKind::Release && event.is_primary() {
            for (id, form) in self.forms.iter_mut() {
                if routed.is_none_or(|(target, _)| target != id) {
                    form.forget_contact(event.contact);
                }
            }
        }
        let (id, dispatch) = routed?;
        trace!(form = ?id, target = ?dispatch.target, "pointer routed to form");
        let gained_focus = self.forms.get(id).is_some_and(|form| form.focused().is_some());
        if gained_focus && self.focused != Some(id) {
            // Registered id, cannot fail.
            let _ = self.set_focused_form(Some(id));
        }
        Some((id, dispatch))
    }

    fn capturing_form(&self, event: &PointerEvent) -> Option<FormId> {
        let captured = match event.kind {
            PointerKind::Move => true,
            PointerKind::Release => event.is_primary(),
            PointerKind::Press | PointerKind::Wheel => false,
        };
        if !captured {
            return None;
        }
        self.order.iter().copied().find(|&id| {
            self.forms.get(id).is_some_and(|form| {
                form.is_visible() && form.is_enabled() && form.captures(event.contact)
            })
        })
    }

    fn first_hit(&mut self, event: &PointerEvent) -> Option<(FormId, Dispatch)> {
        for &id in &self.order {
            let Some(form) = self.forms.get_mut(id) else {
                continue;
            };
            if !form.is_visible() || !form.is_enabled() {
                continue;
            }
            let dispatch = form.pointer_event(event);
            if dispatch.target.is_some() {
                return Some((id, dispatch));
            }
        }
        None
    }

    /// Routes a key to the focus-owning form. Hidden or disabled owners
    /// receive nothing.
    pub fn key_event(&mut self, event: &KeyEvent) -> bool {
        let Some(form) = self.focused.and_then(|id| self.forms.get_mut(id)) else {
            return false;
        };
        form.key_event(event)
    }

    /// Applies a platform resize to every form.
    pub fn resize(&mut self, width: f32, height: f32) {
        debug!(width, height, "resizing forms");
        for form in self.forms.values_mut() {
            form.resize(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::FormManager;
    use crate::error::UiError;
    use crate::geometry::Rect;
    use crate::ui::{EventKind, EventMask, Key, KeyEvent, ListenerProp, PointerEvent};
    use crate::view::{Button, DrawList};

    fn with_button(manager: &mut FormManager, bounds: Rect) -> (super::FormId, crate::view::ControlId) {
        let id = manager.create_form(400.0, 300.0);
        let form = manager.form_mut(id).unwrap();
        let button = form.tree_mut().create_widget(Button::new("go"));
        form.tree_mut().set_bounds(button, bounds);
        form.add_control(button).unwrap();
        (id, button)
    }

    #[test]
    fn pointer_routing_stops_at_the_first_form_with_a_target() {
        let mut manager = FormManager::default();
        let (first, a) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        let (second, b) = with_button(&mut manager, Rect::new(0.0, 0.0, 300.0, 300.0));
        manager.update(Duration::ZERO);

        let (form, dispatch) = manager.pointer_event(&PointerEvent::mouse_press(50.0, 50.0)).unwrap();
        assert_eq!((form, dispatch.target), (first, Some(a)));
        manager.pointer_event(&PointerEvent::mouse_release(50.0, 50.0));

        let (form, dispatch) = manager.pointer_event(&PointerEvent::mouse_press(200.0, 200.0)).unwrap();
        assert_eq!((form, dispatch.target), (second, Some(b)));
        assert!(manager.pointer_event(&PointerEvent::mouse_move(390.0, 290.0)).is_some());
    }

    #[test]
    fn hidden_forms_are_skipped() {
        let mut manager = FormManager::default();
        let (first, _) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        let (second, b) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        manager.update(Duration::ZERO);
        manager.form_mut(first).unwrap().set_visible(false);

        let (form, dispatch) = manager.pointer_event(&PointerEvent::mouse_press(10.0, 10.0)).unwrap();
        assert_eq!((form, dispatch.target), (second, Some(b)));
    }

    #[test]
    fn keyboard_focus_follows_the_last_focused_form() {
        let mut manager = FormManager::default();
        let (first, a) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        let (second, b) = with_button(&mut manager, Rect::new(200.0, 0.0, 100.0, 100.0));
        manager.update(Duration::ZERO);

        manager.pointer_event(&PointerEvent::mouse_press(10.0, 10.0));
        manager.pointer_event(&PointerEvent::mouse_release(10.0, 10.0));
        assert_eq!(manager.focused_form(), Some(first));
        assert_eq!(manager.form(first).unwrap().focused(), Some(a));

        manager.pointer_event(&PointerEvent::mouse_press(250.0, 10.0));
        assert_eq!(manager.focused_form(), Some(second));
        assert_eq!(manager.form(second).unwrap().focused(), Some(b));
        assert_eq!(manager.form(first).unwrap().focused(), None);

        assert!(manager.key_event(&KeyEvent::press(Key::Enter)));
    }

    #[test]
    fn unregistering_drops_focus_ownership() {
        let mut manager = FormManager::default();
        let (id, button) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        manager.update(Duration::ZERO);
        manager.form_mut(id).unwrap().set_focus(Some(button));
        manager.set_focused_form(Some(id)).unwrap();

        let form = manager.unregister(id).unwrap();
        assert_eq!(form.focused(), Some(button));
        assert_eq!(manager.focused_form(), None);
        assert!(manager.is_empty());
        assert!(!manager.key_event(&KeyEvent::press(Key::Enter)));
        assert!(matches!(manager.unregister(id), Err(UiError::UnknownForm(other)) if other == id));
        assert!(matches!(manager.form(id), Err(UiError::UnknownForm(_))));
    }

    #[test]
    fn resize_and_draw_reach_every_form() {
        let mut manager = FormManager::default();
        let (first, _) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        manager.resize(640.0, 480.0);
        manager.update(Duration::ZERO);

        assert_eq!(manager.form(first).unwrap().viewport(), Rect::from_size(640.0, 480.0));
        let mut list = DrawList::new();
        assert_eq!(manager.draw(&mut list), 8);
    }

    #[test]
    fn capture_keeps_moves_and_release_in_the_pressing_form() {
        let mut manager = FormManager::default();
        let (first, a) = with_button(&mut manager, Rect::new(0.0, 0.0, 100.0, 100.0));
        let (second, b) = with_button(&mut manager, Rect::new(200.0, 0.0, 100.0, 100.0));
        manager.update(Duration::ZERO);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        manager
            .form_mut(first)
            .unwrap()
            .tree_mut()
            .add_listener(
                a,
                ListenerProp::new(EventMask::all(), move |_, event| sink.borrow_mut().push(event.kind)),
            )
            .unwrap();

        manager.pointer_event(&PointerEvent::mouse_press(250.0, 50.0));
        let (form, dispatch) = manager.pointer_event(&PointerEvent::mouse_move(50.0, 50.0)).unwrap();
        assert_eq!((form, dispatch.target), (second, Some(b)));
        let (form, dispatch) = manager.pointer_event(&PointerEvent::mouse_release(50.0, 50.0)).unwrap();
        assert_eq!((form, dispatch.target), (second, Some(b)));

        assert_eq!(manager.form(second).unwrap().tree().active(0), None);
        assert!(!manager.form(second).unwrap().tree().control(b).unwrap().is_active());
        assert!(!seen.borrow().contains(&EventKind::Release));
        assert!(!seen.borrow().contains(&EventKind::Click));

        let (form, _) = manager.pointer_event(&PointerEvent::mouse_press(50.0, 50.0)).unwrap();
        assert_eq!(form, first);
        assert!(seen.borrow().contains(&EventKind::Press));
    }
}
