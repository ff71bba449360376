use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bitflags::bitflags;
use glam::Vec2;

use crate::view::{ControlId, ControlTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse(MouseButton),
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Press,
    Release,
    Move,
    Wheel,
}

/// A normalized pointer event in form coordinates. Mouse events always use contact 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub source: PointerSource,
    pub position: Vec2,
    pub contact: usize,
    pub wheel_delta: f32,
    pub time: Duration,
}

impl PointerEvent {
    pub fn mouse(kind: PointerKind, button: MouseButton, x: f32, y: f32) -> Self {
        Self {
            kind,
            source: PointerSource::Mouse(button),
            position: Vec2::new(x, y),
            contact: 0,
            wheel_delta: 0.0,
            time: Duration::ZERO,
        }
    }

    pub fn mouse_press(x: f32, y: f32) -> Self {
        Self::mouse(PointerKind::Press, MouseButton::Left, x, y)
    }

    pub fn mouse_release(x: f32, y: f32) -> Self {
        Self::mouse(PointerKind::Release, MouseButton::Left, x, y)
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::mouse(PointerKind::Move, MouseButton::Left, x, y)
    }

    pub fn wheel(x: f32, y: f32, delta: f32) -> Self {
        Self {
            wheel_delta: delta,
            ..Self::mouse(PointerKind::Wheel, MouseButton::Middle, x, y)
        }
    }

    pub fn touch(kind: PointerKind, x: f32, y: f32, contact: usize) -> Self {
        Self {
            kind,
            source: PointerSource::Touch,
            position: Vec2::new(x, y),
            contact,
            wheel_delta: 0.0,
            time: Duration::ZERO,
        }
    }

    pub fn at(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    pub fn at_ms(self, millis: u64) -> Self {
        self.at(Duration::from_millis(millis))
    }

    pub fn is_mouse(&self) -> bool {
        matches!(self.source, PointerSource::Mouse(_))
    }

    pub fn button(&self) -> Option<MouseButton> {
        match self.source {
            PointerSource::Mouse(button) => Some(button),
            PointerSource::Touch => None,
        }
    }

    /// Left mouse button or any touch contact; the sources that drive press capture.
    pub fn is_primary(&self) -> bool {
        matches!(
            self.source,
            PointerSource::Mouse(MouseButton::Left) | PointerSource::Touch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Press,
    Release,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Shift,
    Escape,
    Enter,
    Space,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub key: Key,
    pub time: Duration,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            kind: KeyKind::Press,
            key,
            time: Duration::ZERO,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            kind: KeyKind::Release,
            key,
            time: Duration::ZERO,
        }
    }

    pub fn char(c: char) -> Self {
        Self {
            kind: KeyKind::Char,
            key: Key::Char(c),
            time: Duration::ZERO,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u16 {
        const PRESS = 1;
        const RELEASE = 1 << 1;
        const CLICK = 1 << 2;
        const RIGHT_CLICK = 1 << 3;
        const MIDDLE_CLICK = 1 << 4;
        const VALUE_CHANGED = 1 << 5;
        const TEXT_CHANGED = 1 << 6;
        const ACTIVATED = 1 << 7;
        const FOCUS_GAINED = 1 << 8;
        const FOCUS_LOST = 1 << 9;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    Release,
    Click,
    RightClick,
    MiddleClick,
    ValueChanged,
    TextChanged,
    Activated,
    FocusGained,
    FocusLost,
}

impl EventKind {
    pub fn mask(self) -> EventMask {
        match self {
            Self::Press => EventMask::PRESS,
            Self::Release => EventMask::RELEASE,
            Self::Click => EventMask::CLICK,
            Self::RightClick => EventMask::RIGHT_CLICK,
            Self::MiddleClick => EventMask::MIDDLE_CLICK,
            Self::ValueChanged => EventMask::VALUE_CHANGED,
            Self::TextChanged => EventMask::TEXT_CHANGED,
            Self::Activated => EventMask::ACTIVATED,
            Self::FocusGained => EventMask::FOCUS_GAINED,
            Self::FocusLost => EventMask::FOCUS_LOST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    pub kind: EventKind,
    pub target: ControlId,
    pub position: Option<Vec2>,
    pub contact: Option<usize>,
}

impl ControlEvent {
    pub fn new(kind: EventKind, target: ControlId) -> Self {
        Self {
            kind,
            target,
            position: None,
            contact: None,
        }
    }

    pub fn from_pointer(kind: EventKind, target: ControlId, pointer: &PointerEvent) -> Self {
        Self {
            kind,
            target,
            position: Some(pointer.position),
            contact: Some(pointer.contact),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

type ListenerFn = dyn FnMut(&mut ControlTree, &ControlEvent);

#[derive(Clone)]
pub struct ListenerProp {
    id: u64,
    mask: EventMask,
    handler: Rc<RefCell<ListenerFn>>,
}

impl ListenerProp {
    pub fn new<F>(mask: EventMask, handler: F) -> Self
    where
        F: FnMut(&mut ControlTree, &ControlEvent) + 'static,
    {
        Self {
            id: next_handler_id(),
            mask,
            handler: Rc::new(RefCell::new(handler)),
        }
    }

    pub fn id(&self) -> ListenerId {
        ListenerId(self.id)
    }

    pub fn mask(&self) -> EventMask {
        self.mask
    }

    /// Returns false when the listener is already running further up the stack.
    pub fn call(&self, tree: &mut ControlTree, event: &ControlEvent) -> bool {
        let Ok(mut handler) = self.handler.try_borrow_mut() else {
            return false;
        };
        (&mut *handler)(tree, event);
        true
    }
}

impl PartialEq for ListenerProp {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ListenerProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerProp")
            .field("id", &self.id)
            .field("mask", &self.mask)
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ControlListeners {
    entries: Vec<ListenerProp>,
}

impl ControlListeners {
    pub fn push(&mut self, listener: ListenerProp) -> ListenerId {
        let id = listener.id();
        self.entries.push(listener);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id() != id);
        before != self.entries.len()
    }

    /// Cloned handles, so the caller can run them while the tree is borrowed mutably.
    pub fn matching(&self, kind: EventKind) -> Vec<ListenerProp> {
        self.entries
            .iter()
            .filter(|entry| entry.mask.contains(kind.mask()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn on_click<F>(handler: F) -> ListenerProp
where
    F: FnMut(&mut ControlTree, &ControlEvent) + 'static,
{
    ListenerProp::new(EventMask::CLICK, handler)
}

pub fn on_value_changed<F>(handler: F) -> ListenerProp
where
    F: FnMut(&mut ControlTree, &ControlEvent) + 'static,
{
    ListenerProp::new(EventMask::VALUE_CHANGED, handler)
}

pub fn on_focus_change<F>(handler: F) -> ListenerProp
where
    F: FnMut(&mut ControlTree, &ControlEvent) + 'static,
{
    ListenerProp::new(EventMask::FOCUS_GAINED | EventMask::FOCUS_LOST, handler)
}

fn next_handler_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::{ControlListeners, EventKind, EventMask, ListenerProp, on_click};

    #[test]
    fn matching_filters_by_mask_and_remove_by_id() {
        let mut listeners = ControlListeners::default();
        let click = listeners.push(on_click(|_, _| {}));
        listeners.push(ListenerProp::new(
            EventMask::PRESS | EventMask::RELEASE,
            |_, _| {},
        ));
        assert_eq!(listeners.matching(EventKind::Click).len(), 1);
        assert_eq!(listeners.matching(EventKind::Release).len(), 1);
        assert!(listeners.matching(EventKind::FocusLost).is_empty());
        assert!(listeners.remove(click));
        assert!(!listeners.remove(click));
        assert_eq!(listeners.len(), 1);
    }
}
