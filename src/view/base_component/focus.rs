use glam::Vec2;
use tracing::{debug, warn};

use super::{ControlId, ControlTree, DirtyBits};
use crate::geometry::Rect;
use crate::ui::EventKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusDirection {
    Next,
    Previous,
    Up,
    Down,
    Left,
    Right,
}

impl FocusDirection {
    pub fn is_ordinal(self) -> bool {
        matches!(self, Self::Next | Self::Previous)
    }

    /// Anchor on the current control's edge facing the direction of travel.
    fn start_anchor(self, bounds: Rect) -> Vec2 {
        let center = bounds.center();
        match self {
            Self::Up => Vec2::new(center.x, bounds.y),
            Self::Down => Vec2::new(center.x, bounds.bottom()),
            Self::Left => Vec2::new(bounds.x, center.y),
            Self::Right => Vec2::new(bounds.right(), center.y),
            Self::Next | Self::Previous => center,
        }
    }

    /// Anchor on a candidate's edge facing back toward the start.
    fn candidate_anchor(self, bounds: Rect) -> Vec2 {
        let center = bounds.center();
        match self {
            Self::Up => Vec2::new(center.x, bounds.bottom()),
            Self::Down => Vec2::new(center.x, bounds.y),
            Self::Left => Vec2::new(bounds.right(), center.y),
            Self::Right => Vec2::new(bounds.x, center.y),
            Self::Next | Self::Previous => center,
        }
    }

    fn is_wrong_side(self, start: Vec2, candidate: Vec2) -> bool {
        match self {
            Self::Up => candidate.y > start.y,
            Self::Down => candidate.y < start.y,
            Self::Left => candidate.x > start.x,
            Self::Right => candidate.x < start.x,
            Self::Next | Self::Previous => false,
        }
    }
}

impl ControlTree {
    pub fn accepts_focus(&self, id: ControlId) -> bool {
        self.control(id).is_some_and(|control| control.can_focus)
            && self.visible_in_hierarchy(id)
            && self.enabled_in_hierarchy(id)
    }

    /// Whether focus can land on `id` or somewhere inside it.
    pub fn can_take_focus(&self, id: ControlId) -> bool {
        if self.accepts_focus(id) {
            return true;
        }
        let Some(control) = self.control(id) else {
            return false;
        };
        control.visible
            && control.enabled
            && self
                .children(id)
                .iter()
                .any(|&child| self.can_take_focus(child))
    }

    /// Moves keyboard focus, firing FOCUS_LOST then FOCUS_GAINED and scrolling the
    /// new target into view. Returns false when nothing changed.
    pub fn set_focus(&mut self, target: Option<ControlId>) -> bool {
        if let Some(id) = target {
            if !self.accepts_focus(id) {
                warn!(?id, "control cannot take focus");
                return false;
            }
        }
        let previous = self.interaction.focus;
        if previous == target {
            return false;
        }
        debug!(?previous, ?target, "focus changed");
        self.interaction.focus = target;

        if let Some(previous) = previous {
            if let Some(control) = self.control_mut(previous) {
                control.focused = false;
                control.dirty |= DirtyBits::STATE;
            }
            self.emit(previous, EventKind::FocusLost);
        }
        if let Some(id) = target {
            if self.interaction.focus != Some(id) {
                return true;
            }
            if let Some(control) = self.control_mut(id) {
                control.focused = true;
                control.dirty |= DirtyBits::STATE;
            }
            self.scroll_into_view(id);
            self.emit(id, EventKind::FocusGained);
        }
        true
    }

    /// Moves focus among the children of `container`, starting from the child that
    /// holds the current focus. Falls through to the parent container when no other
    /// child can take focus.
    pub fn move_focus(&mut self, container: ControlId, direction: FocusDirection) -> Option<ControlId> {
        if direction.is_ordinal() {
            self.move_focus_ordinal(container, direction == FocusDirection::Next)
        } else {
            self.move_focus_directional(container, direction)
        }
    }

    fn focus_child_of(&self, container: ControlId) -> Option<ControlId> {
        let focus = self.focused()?;
        self.ancestors(focus)
            .into_iter()
            .find(|&id| self.parent(id) == Some(container))
    }

    fn focus_candidates(&self, container: ControlId) -> Vec<ControlId> {
        let mut candidates: Vec<(i32, usize, ControlId)> = self
            .children(container)
            .iter()
            .enumerate()
            .filter(|&(_, &child)| self.can_take_focus(child))
            .map(|(position, &child)| {
                let index = self
                    .control(child)
                    .and_then(|control| control.focus_index)
                    .unwrap_or(i32::MAX);
                (index, position, child)
            })
            .collect();
        candidates.sort_by_key(|&(index, position, _)| (index, position));
        candidates.into_iter().map(|(_, _, child)| child).collect()
    }

    fn move_focus_ordinal(&mut self, container: ControlId, forward: bool) -> Option<ControlId> {
        let current = self.focus_child_of(container);
        let mut candidates = self.focus_candidates(container);
        if !forward {
            candidates.reverse();
        }

        let ordered: Vec<ControlId> = match current.and_then(|current| {
            candidates.iter().position(|&id| id == current)
        }) {
            Some(position) => candidates[position + 1..]
                .iter()
                .chain(&candidates[..position])
                .copied()
                .collect(),
            None => candidates,
        };

        for candidate in ordered {
            if let Some(focused) = self.focus_into(candidate, forward) {
                return Some(focused);
            }
        }
        match self.parent(container) {
            Some(parent) if current.is_some() => self.move_focus_ordinal(parent, forward),
            _ => None,
        }
    }

    /// Focuses `id` itself or, for a container, its first (or last) focusable descendant.
    pub fn focus_into(&mut self, id: ControlId, forward: bool) -> Option<ControlId> {
        if self.accepts_focus(id) {
            self.set_focus(Some(id));
            return Some(id);
        }
        let mut candidates = self.focus_candidates(id);
        if !forward {
            candidates.reverse();
        }
        candidates
            .into_iter()
            .find_map(|candidate| self.focus_into(candidate, forward))
    }

    fn move_focus_directional(&mut self, container: ControlId, direction: FocusDirection) -> Option<ControlId> {
        let focus = self.focused()?;
        let current = self.focus_child_of(container);
        let from = self.control(focus)?.absolute_bounds;
        let start = direction.start_anchor(from);

        let mut best: Option<(f32, ControlId)> = None;
        for &child in self.children(container) {
            if Some(child) == current || !self.can_take_focus(child) {
                continue;
            }
            let Some(bounds) = self.control(child).map(|control| control.absolute_bounds) else {
                continue;
            };
            let anchor = direction.candidate_anchor(bounds);
            if direction.is_wrong_side(start, anchor) {
                continue;
            }
            let distance = start.distance(anchor);
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, child));
            }
        }

        match best {
            Some((_, candidate)) => self.focus_toward(candidate, start, direction),
            None => match self.parent(container) {
                Some(parent) => self.move_focus_directional(parent, direction),
                None => None,
            },
        }
    }

    fn focus_toward(&mut self, id: ControlId, start: Vec2, direction: FocusDirection) -> Option<ControlId> {
        if self.accepts_focus(id) {
            self.set_focus(Some(id));
            return Some(id);
        }
        let mut candidates: Vec<(f32, ControlId)> = self
            .children(id)
            .iter()
            .filter(|&&child| self.can_take_focus(child))
            .filter_map(|&child| {
                let bounds = self.control(child)?.absolute_bounds;
                Some((start.distance(direction.candidate_anchor(bounds)), child))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates
            .into_iter()
            .find_map(|(_, child)| self.focus_toward(child, start, direction))
    }

    /// Adjusts every scroll-container ancestor so `id` lies inside its viewport.
    pub fn scroll_into_view(&mut self, id: ControlId) {
        let Some(mut target) = self.control(id).map(|control| control.absolute_bounds) else {
            return;
        };
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            current = self.parent(ancestor);
            if !self.is_scroll_container(ancestor) {
                continue;
            }
            let Some(viewport) = self.control(ancestor).map(|control| control.viewport_bounds) else {
                continue;
            };
            let Some(state) = self.scroll_state_mut(ancestor) else {
                continue;
            };
            let before = state.position;
            let mut position = state.position;
            if state.direction.scrolls_y() {
                if target.y < viewport.y {
                    position.y += viewport.y - target.y;
                } else if target.bottom() > viewport.bottom() {
                    position.y -= (target.bottom() - viewport.bottom()).min(target.y - viewport.y);
                }
            }
            if state.direction.scrolls_x() {
                if target.x < viewport.x {
                    position.x += viewport.x - target.x;
                } else if target.right() > viewport.right() {
                    position.x -= (target.right() - viewport.right()).min(target.x - viewport.x);
                }
            }
            state.set_position_clamped(position);
            let shift = state.position - before;
            target = target.translate(shift);
        }
    }
}
