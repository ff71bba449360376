use std::time::Duration;

use glam::Vec2;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::{ControlId, ControlTree, DirtyBits};
use crate::config::ScrollConfig;
use crate::error::{Result, UiError};
use crate::geometry::Rect;
use crate::style::Color;
use crate::transition::{FadeTrack, FadeTransition};
use crate::ui::{MouseButton, PointerEvent, PointerKind};
use crate::view::layout::Layout;
use crate::view::render::{Quad, RenderTarget};

const DEFAULT_THUMB_COLOR: Color = Color::rgba(0, 0, 0, 140);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    #[default]
    None,
    Vertical,
    Horizontal,
    Both,
}

impl ScrollDirection {
    pub fn scrolls_x(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    pub fn scrolls_y(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    /// Zeroes the components of `value` on axes that do not scroll.
    pub fn mask(self, value: Vec2) -> Vec2 {
        Vec2::new(
            if self.scrolls_x() { value.x } else { 0.0 },
            if self.scrolls_y() { value.y } else { 0.0 },
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Both => "both",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(Self::None),
            "vertical" => Some(Self::Vertical),
            "horizontal" => Some(Self::Horizontal),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollbarAxis {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollbarGeometry {
    pub vertical_track: Option<Rect>,
    pub vertical_thumb: Option<Rect>,
    pub horizontal_track: Option<Rect>,
    pub horizontal_thumb: Option<Rect>,
}

impl ScrollbarGeometry {
    fn axis(&self, axis: ScrollbarAxis) -> (Option<Rect>, Option<Rect>) {
        match axis {
            ScrollbarAxis::Vertical => (self.vertical_track, self.vertical_thumb),
            ScrollbarAxis::Horizontal => (self.horizontal_track, self.horizontal_thumb),
        }
    }
}

/// Pointer history of one drag. `first` and `start_time` restart per axis
/// whenever the movement on that axis reverses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScrollGesture {
    pub contact: usize,
    pub very_first: Vec2,
    pub first: Vec2,
    pub last: Vec2,
    pub last_time: Duration,
    pub start_time: [Duration; 2],
    pub direction: [i8; 2],
    pub passed_threshold: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScrollbarDrag {
    pub axis: ScrollbarAxis,
    pub grab_offset: f32,
}

/// Scroll offset and kinetics of a scroll container. `position` is
/// non-positive: the content is shifted by it.
#[derive(Clone, Debug)]
pub struct ScrollState {
    pub(crate) direction: ScrollDirection,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) friction: f32,
    pub(crate) wheel_speed: f32,
    pub(crate) auto_hide: bool,
    pub(crate) scrollbar_opacity: f32,
    pub(crate) fade: Option<FadeTrack>,
    pub(crate) gesture: Option<ScrollGesture>,
    pub(crate) scrollbar_drag: Option<ScrollbarDrag>,
    pub(crate) total_size: Vec2,
    pub(crate) viewport_size: Vec2,
    pub(crate) last_frame_time: Option<Duration>,
}

impl ScrollState {
    pub fn new(direction: ScrollDirection, config: &ScrollConfig) -> Self {
        Self {
            direction,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            friction: config.friction,
            wheel_speed: config.wheel_speed,
            auto_hide: true,
            scrollbar_opacity: 0.0,
            fade: None,
            gesture: None,
            scrollbar_drag: None,
            total_size: Vec2::ZERO,
            viewport_size: Vec2::ZERO,
            last_frame_time: None,
        }
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn total_size(&self) -> Vec2 {
        self.total_size
    }

    pub fn scrollbar_opacity(&self) -> f32 {
        self.scrollbar_opacity
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some() || self.scrollbar_drag.is_some()
    }

    pub fn max_scroll(&self) -> Vec2 {
        (self.total_size - self.viewport_size).max(Vec2::ZERO)
    }

    pub(crate) fn set_position_clamped(&mut self, position: Vec2) {
        let max = self.max_scroll();
        self.position = self.direction.mask(position.clamp(-max, Vec2::ZERO));
    }

    pub(crate) fn show_scrollbars(&mut self) {
        self.scrollbar_opacity = 1.0;
        self.fade = None;
    }

    pub(crate) fn press(&mut self, contact: usize, position: Vec2, now: Duration) {
        if self.gesture.is_some() {
            return;
        }
        self.gesture = Some(ScrollGesture {
            contact,
            very_first: position,
            first: position,
            last: position,
            last_time: now,
            start_time: [now; 2],
            direction: [0; 2],
            passed_threshold: false,
        });
        self.velocity = Vec2::ZERO;
        self.show_scrollbars();
    }

    /// Applies a drag step for `contact`; returns whether the gesture has
    /// travelled past `threshold` on a scrolling axis.
    pub(crate) fn drag(&mut self, contact: usize, position: Vec2, now: Duration, threshold: f32) -> bool {
        let direction = self.direction;
        let Some(gesture) = self.gesture.as_mut().filter(|gesture| gesture.contact == contact) else {
            return false;
        };
        let delta = direction.mask(position - gesture.last);
        let dt = now.saturating_sub(gesture.last_time).as_secs_f32();
        for axis in 0..2 {
            if delta[axis] == 0.0 {
                continue;
            }
            let sign = if delta[axis] > 0.0 { 1 } else { -1 };
            if gesture.direction[axis] != 0 && gesture.direction[axis] != sign {
                gesture.first[axis] = gesture.last[axis];
                gesture.start_time[axis] = gesture.last_time;
            }
            gesture.direction[axis] = sign;
        }
        gesture.last = position;
        gesture.last_time = now;
        let travel = direction.mask(position - gesture.very_first).abs();
        if travel.x > threshold || travel.y > threshold {
            gesture.passed_threshold = true;
        }
        let passed = gesture.passed_threshold;

        self.position += delta;
        if dt > 0.0 {
            self.velocity = delta / dt;
        }
        self.show_scrollbars();
        passed
    }

    /// Ends the gesture of `contact`. A finger resting longer than
    /// `fling_delay` before lifting produces no fling.
    pub(crate) fn release(&mut self, contact: usize, now: Duration, fling_delay: Duration) {
        let Some(gesture) = self.gesture.take_if(|gesture| gesture.contact == contact) else {
            return;
        };
        if now.saturating_sub(gesture.last_time) > fling_delay {
            self.velocity = Vec2::ZERO;
            return;
        }
        let mut velocity = Vec2::ZERO;
        for axis in 0..2 {
            let elapsed = now.saturating_sub(gesture.start_time[axis]).as_secs_f32();
            if elapsed > 0.0 {
                velocity[axis] = (gesture.last[axis] - gesture.first[axis]) / elapsed;
            }
        }
        self.velocity = self.direction.mask(velocity);
    }

    pub(crate) fn wheel(&mut self, delta: f32) {
        self.velocity.y += self.wheel_speed * delta;
        self.show_scrollbars();
    }

    /// Advances one frame: integrates velocity while no gesture holds the
    /// content, damps it, clamps the position and drives the scrollbar fade.
    pub(crate) fn step(&mut self, now: Duration, config: &ScrollConfig) {
        let dt = self
            .last_frame_time
            .map(|last| now.saturating_sub(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame_time = Some(now);
        let dragging = self.is_dragging();

        if !dragging && dt > 0.0 {
            self.position += self.velocity * dt;
            let damping = (1.0 - self.friction * config.friction_factor * dt).max(0.0);
            self.velocity *= damping;
        }
        if !dragging {
            for axis in 0..2 {
                if self.velocity[axis].abs() < config.velocity_snap {
                    self.velocity[axis] = 0.0;
                }
            }
        }

        let max = self.max_scroll();
        let enabled = [self.direction.scrolls_x(), self.direction.scrolls_y()];
        for axis in 0..2 {
            if !enabled[axis] {
                self.position[axis] = 0.0;
                self.velocity[axis] = 0.0;
            } else if self.position[axis] < -max[axis] {
                self.position[axis] = -max[axis];
                self.velocity[axis] = 0.0;
            } else if self.position[axis] > 0.0 {
                self.position[axis] = 0.0;
                self.velocity[axis] = 0.0;
            }
        }

        if !self.auto_hide {
            self.scrollbar_opacity = 1.0;
            self.fade = None;
            return;
        }
        let settled = self.velocity == Vec2::ZERO && !dragging;
        if settled && self.fade.is_none() && self.scrollbar_opacity > 0.0 {
            self.fade = Some(FadeTrack::start(
                self.scrollbar_opacity,
                0.0,
                now,
                FadeTransition::new(config.scrollbar_fade()),
            ));
        }
        if let Some(fade) = self.fade {
            self.scrollbar_opacity = fade.sample(now);
            if fade.is_finished(now) {
                self.fade = None;
            }
        }
    }

    /// Track and thumb rects inside `viewport` for every axis that can scroll.
    pub fn scrollbar_geometry(&self, viewport: Rect, config: &ScrollConfig) -> ScrollbarGeometry {
        let thickness = config.scrollbar_thickness;
        let margin = config.scrollbar_margin;
        let mut geometry = ScrollbarGeometry::default();
        let max = self.max_scroll();
        let can_scroll_x = self.direction.scrolls_x() && max.x > 0.0;
        let can_scroll_y = self.direction.scrolls_y() && max.y > 0.0;
        let reserve_v = if can_scroll_y { thickness + margin } else { 0.0 };
        let reserve_h = if can_scroll_x { thickness + margin } else { 0.0 };

        if can_scroll_y {
            let track_h = (viewport.height - margin * 2.0 - reserve_h).max(0.0);
            if track_h > 0.0 {
                let track = Rect::new(
                    viewport.right() - thickness - margin,
                    viewport.y + margin,
                    thickness,
                    track_h,
                );
                let thumb_h = thumb_length(track_h, viewport.height, self.total_size.y, config);
                let offset = (-self.position.y / max.y).clamp(0.0, 1.0) * (track_h - thumb_h).max(0.0);
                geometry.vertical_track = Some(track);
                geometry.vertical_thumb = Some(Rect::new(track.x, track.y + offset, thickness, thumb_h));
            }
        }

        if can_scroll_x {
            let track_w = (viewport.width - margin * 2.0 - reserve_v).max(0.0);
            if track_w > 0.0 {
                let track = Rect::new(
                    viewport.x + margin,
                    viewport.bottom() - thickness - margin,
                    track_w,
                    thickness,
                );
                let thumb_w = thumb_length(track_w, viewport.width, self.total_size.x, config);
                let offset = (-self.position.x / max.x).clamp(0.0, 1.0) * (track_w - thumb_w).max(0.0);
                geometry.horizontal_track = Some(track);
                geometry.horizontal_thumb = Some(Rect::new(track.x + offset, track.y, thumb_w, thickness));
            }
        }
        geometry
    }

    /// Scroll position that puts the thumb start under `pointer - grab_offset`.
    fn position_from_thumb(
        &self,
        axis: ScrollbarAxis,
        pointer: Vec2,
        grab_offset: f32,
        viewport: Rect,
        config: &ScrollConfig,
    ) -> Option<f32> {
        let (Some(track), Some(thumb)) = self.scrollbar_geometry(viewport, config).axis(axis) else {
            return None;
        };
        let max = self.max_scroll();
        let (pointer_axis, track_start, track_len, thumb_len, max_scroll) = match axis {
            ScrollbarAxis::Vertical => (pointer.y, track.y, track.height, thumb.height, max.y),
            ScrollbarAxis::Horizontal => (pointer.x, track.x, track.width, thumb.width, max.x),
        };
        let travel = (track_len - thumb_len).max(0.0);
        if travel <= 0.0 || max_scroll <= 0.0 {
            return None;
        }
        let thumb_start = (pointer_axis - grab_offset).clamp(track_start, track_start + travel);
        Some(-((thumb_start - track_start) / travel) * max_scroll)
    }

    /// Starts a scrollbar drag when `pointer` lands on a visible track.
    /// Pressing the track outside the thumb centers the thumb on the pointer.
    pub(crate) fn begin_scrollbar_drag(&mut self, pointer: Vec2, viewport: Rect, config: &ScrollConfig) -> bool {
        if self.scrollbar_opacity <= 0.0 {
            return false;
        }
        let geometry = self.scrollbar_geometry(viewport, config);
        for axis in [ScrollbarAxis::Vertical, ScrollbarAxis::Horizontal] {
            let (Some(track), Some(thumb)) = geometry.axis(axis) else {
                continue;
            };
            let along = |rect: Rect| match axis {
                ScrollbarAxis::Vertical => (pointer.y - rect.y, rect.height),
                ScrollbarAxis::Horizontal => (pointer.x - rect.x, rect.width),
            };
            let grab_offset = if thumb.contains_point(pointer) {
                along(thumb).0
            } else if track.contains_point(pointer) {
                along(thumb).1 * 0.5
            } else {
                continue;
            };
            self.scrollbar_drag = Some(ScrollbarDrag { axis, grab_offset });
            self.velocity = Vec2::ZERO;
            self.drag_scrollbar(pointer, viewport, config);
            return true;
        }
        false
    }

    pub(crate) fn drag_scrollbar(&mut self, pointer: Vec2, viewport: Rect, config: &ScrollConfig) {
        let Some(drag) = self.scrollbar_drag else {
            return;
        };
        if let Some(value) = self.position_from_thumb(drag.axis, pointer, drag.grab_offset, viewport, config) {
            match drag.axis {
                ScrollbarAxis::Vertical => self.position.y = value,
                ScrollbarAxis::Horizontal => self.position.x = value,
            }
        }
        self.show_scrollbars();
    }
}

fn thumb_length(track: f32, viewport: f32, total: f32, config: &ScrollConfig) -> f32 {
    let ratio = (viewport / total.max(1.0)).clamp(0.0, 1.0);
    (track * ratio).clamp(config.scrollbar_min_thumb.min(track), track)
}

impl ControlTree {
    pub fn create_scroll_container(&mut self, layout: Layout, direction: ScrollDirection) -> ControlId {
        let id = self.create_container(layout);
        let state = ScrollState::new(direction, &self.config.scroll);
        if let Some(container) = self.container_mut(id) {
            container.scroll = Some(state);
        }
        let style = self.theme.style("ScrollContainer");
        if let Some(control) = self.control_mut(id) {
            control.style_name = SmolStr::new_static("ScrollContainer");
            control.style = style;
        }
        id
    }

    pub fn is_scroll_container(&self, id: ControlId) -> bool {
        self.scroll_state(id)
            .is_some_and(|state| state.direction != ScrollDirection::None)
    }

    pub fn scroll_direction(&self, id: ControlId) -> ScrollDirection {
        self.scroll_state(id)
            .map(|state| state.direction)
            .unwrap_or_default()
    }

    /// Turns any container into a scroll container, or back with `ScrollDirection::None`.
    pub fn set_scroll_direction(&mut self, id: ControlId, direction: ScrollDirection) -> Result<()> {
        let config = self.config.scroll;
        let container = self.container_mut(id).ok_or(UiError::NotAContainer(id))?;
        container
            .scroll
            .get_or_insert_with(|| ScrollState::new(direction, &config))
            .direction = direction;
        self.set_dirty(id, DirtyBits::BOUNDS, false);
        Ok(())
    }

    pub fn scroll_position(&self, id: ControlId) -> Vec2 {
        self.scroll_state(id)
            .map(|state| state.position)
            .unwrap_or(Vec2::ZERO)
    }

    /// Moves the content; out-of-range values are clamped on the next update.
    pub fn set_scroll_position(&mut self, id: ControlId, position: Vec2) {
        if let Some(state) = self.scroll_state_mut(id) {
            state.position = position;
        }
    }

    pub fn scroll_velocity(&self, id: ControlId) -> Vec2 {
        self.scroll_state(id)
            .map(|state| state.velocity)
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_scroll_velocity(&mut self, id: ControlId, velocity: Vec2) {
        if let Some(state) = self.scroll_state_mut(id) {
            state.velocity = velocity;
        }
    }

    pub fn set_scroll_friction(&mut self, id: ControlId, friction: f32) {
        if let Some(state) = self.scroll_state_mut(id) {
            state.friction = friction.max(0.0);
        }
    }

    pub fn set_wheel_speed(&mut self, id: ControlId, speed: f32) {
        if let Some(state) = self.scroll_state_mut(id) {
            state.wheel_speed = speed;
        }
    }

    pub fn set_scrollbar_auto_hide(&mut self, id: ControlId, auto_hide: bool) {
        if let Some(state) = self.scroll_state_mut(id) {
            state.auto_hide = auto_hide;
            state.show_scrollbars();
        }
    }

    pub fn scrollbar_opacity(&self, id: ControlId) -> f32 {
        self.scroll_state(id)
            .map(|state| state.scrollbar_opacity)
            .unwrap_or(0.0)
    }

    pub fn scroll_total_size(&self, id: ControlId) -> Vec2 {
        self.scroll_state(id)
            .map(|state| state.total_size)
            .unwrap_or(Vec2::ZERO)
    }

    /// Recomputes the content extent of `id` and steps its kinetics to the tree clock.
    pub fn update_scroll(&mut self, id: ControlId) {
        let mut total = Vec2::ZERO;
        for &child in self.children(id) {
            let Some(control) = self.control(child).filter(|control| control.visible) else {
                continue;
            };
            total = total.max(Vec2::new(
                control.bounds.right() + control.margin.right,
                control.bounds.bottom() + control.margin.bottom,
            ));
        }
        let viewport = self
            .control(id)
            .map(|control| control.content_size())
            .unwrap_or(Vec2::ZERO);
        let (now, config) = (self.now, self.config.scroll);
        if let Some(state) = self.scroll_state_mut(id) {
            state.total_size = total;
            state.viewport_size = viewport;
            state.step(now, &config);
        }
    }

    pub fn scrollbar_geometry(&self, id: ControlId) -> ScrollbarGeometry {
        match (self.scroll_state(id), self.control(id)) {
            (Some(state), Some(control)) => {
                state.scrollbar_geometry(control.viewport_bounds, &self.config.scroll)
            }
            _ => ScrollbarGeometry::default(),
        }
    }

    pub(crate) fn draw_scrollbars(&self, id: ControlId, target: &mut dyn RenderTarget, clip: Rect) {
        let (Some(state), Some(control)) = (self.scroll_state(id), self.control(id)) else {
            return;
        };
        if state.direction == ScrollDirection::None {
            return;
        }
        let opacity = state.scrollbar_opacity * control.opacity;
        if opacity <= 0.0 {
            return;
        }
        let geometry = self.scrollbar_geometry(id);
        let thumb = control.style.image("scrollbar");
        let color = thumb
            .map(|image| image.color)
            .unwrap_or(DEFAULT_THUMB_COLOR)
            .with_opacity(opacity);
        for rect in [geometry.vertical_thumb, geometry.horizontal_thumb].into_iter().flatten() {
            target.draw_quad(&Quad {
                rect,
                clip,
                color,
                image: thumb.map(|image| image.name.clone()),
                region: thumb.map(|image| image.region).unwrap_or_default(),
            });
        }
    }

    /// Lets every scroll container on the path from `target` to the root see
    /// `event` before the controls do. Returns whether it was consumed: a drag
    /// past the threshold, a scrollbar grab or a wheel notch.
    pub(crate) fn intercept_scroll(&mut self, target: ControlId, event: &PointerEvent) -> bool {
        let config = self.config.scroll;
        if event.kind == PointerKind::Release {
            self.end_scroll_gestures(event);
            return false;
        }
        let chain: Vec<ControlId> = self
            .ancestors(target)
            .into_iter()
            .filter(|&id| {
                self.is_scroll_container(id)
                    && self
                        .control(id)
                        .is_some_and(|control| control.visible && control.enabled)
            })
            .collect();

        let mut consumed = false;
        for id in chain {
            let viewport = self
                .control(id)
                .map(|control| control.viewport_bounds)
                .unwrap_or_default();
            let Some(state) = self.scroll_state_mut(id) else {
                continue;
            };
            match event.kind {
                PointerKind::Press => {
                    if event.button() == Some(MouseButton::Left)
                        && state.begin_scrollbar_drag(event.position, viewport, &config)
                    {
                        trace!(?id, "scrollbar grabbed");
                        return true;
                    }
                    state.press(event.contact, event.position, event.time);
                }
                PointerKind::Move => {
                    if state.scrollbar_drag.is_some() {
                        state.drag_scrollbar(event.position, viewport, &config);
                        consumed = true;
                    } else if state.drag(event.contact, event.position, event.time, config.drag_threshold) {
                        consumed = true;
                    }
                }
                PointerKind::Wheel => {
                    if state.direction.scrolls_y() && state.max_scroll().y > 0.0 {
                        state.wheel(event.wheel_delta);
                        trace!(?id, delta = event.wheel_delta, "wheel scrolled");
                        return true;
                    }
                }
                PointerKind::Release => {}
            }
        }
        consumed
    }

    /// Ends the gesture of `event.contact` on every scroll container of the tree.
    /// Only primary releases end gestures; other buttons leave a drag running.
    pub(crate) fn end_scroll_gestures(&mut self, event: &PointerEvent) {
        if !event.is_primary() {
            return;
        }
        let fling_delay = self.config.scroll.fling_delay();
        for (id, node) in self.nodes.iter_mut() {
            let Some(state) = node.container.as_mut().and_then(|container| container.scroll.as_mut()) else {
                continue;
            };
            if event.button() == Some(MouseButton::Left) && state.scrollbar_drag.take().is_some() {
                trace!(?id, "scrollbar released");
            }
            state.release(event.contact, event.time, fling_delay);
            if state.velocity != Vec2::ZERO {
                debug!(?id, velocity = ?state.velocity, "fling");
            }
        }
    }

    /// Whether a scroll container above `id` is dragging `contact` past the
    /// drag threshold.
    pub fn scroll_gesture_passed_threshold(&self, id: ControlId, contact: usize) -> bool {
        self.ancestors(id).into_iter().any(|ancestor| {
            self.scroll_state(ancestor).is_some_and(|state| {
                state
                    .gesture
                    .is_some_and(|gesture| gesture.contact == contact && gesture.passed_threshold)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use super::{ScrollDirection, ScrollState};
    use crate::config::ScrollConfig;
    use crate::geometry::Rect;
    use crate::ui::PointerEvent;
    use crate::view::ControlTree;
    use crate::view::layout::Layout;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn vertical_state() -> (ScrollState, ScrollConfig) {
        let config = ScrollConfig::default();
        let mut state = ScrollState::new(ScrollDirection::Vertical, &config);
        state.total_size = Vec2::new(100.0, 1000.0);
        state.viewport_size = Vec2::new(100.0, 100.0);
        (state, config)
    }

    fn scroll_fixture() -> (ControlTree, super::ControlId, super::ControlId) {
        let mut tree = ControlTree::default();
        tree.set_viewport(Rect::from_size(400.0, 400.0));
        let root = tree.create_container(Layout::absolute());
        tree.set_bounds(root, Rect::from_size(400.0, 400.0));
        let scroll = tree.create_scroll_container(Layout::vertical(0.0), ScrollDirection::Vertical);
        tree.set_bounds(scroll, Rect::from_size(200.0, 200.0));
        let content = tree.create_control();
        tree.set_bounds(content, Rect::from_size(200.0, 500.0));
        tree.add_control(root, scroll).unwrap();
        tree.add_control(scroll, content).unwrap();
        tree.update_layout(root, Vec2::ZERO);
        (tree, root, scroll)
    }

    #[test]
    fn position_clamps_to_content_extent() {
        let (mut tree, _root, scroll) = scroll_fixture();
        assert_eq!(tree.scroll_total_size(scroll), Vec2::new(200.0, 500.0));

        tree.set_scroll_position(scroll, Vec2::new(0.0, -1000.0));
        tree.set_scroll_velocity(scroll, Vec2::new(0.0, -2000.0));
        tree.update_scroll(scroll);
        assert_eq!(tree.scroll_position(scroll), Vec2::new(0.0, -300.0));
        assert_eq!(tree.scroll_velocity(scroll), Vec2::ZERO);

        tree.set_scroll_position(scroll, Vec2::new(40.0, 25.0));
        tree.update_scroll(scroll);
        assert_eq!(tree.scroll_position(scroll), Vec2::ZERO);
    }

    #[test]
    fn quick_release_flings() {
        let (mut state, config) = vertical_state();
        state.press(0, Vec2::new(50.0, 300.0), ms(0));
        assert!(!state.drag(0, Vec2::new(50.0, 290.0), ms(10), config.drag_threshold));
        assert!(state.drag(0, Vec2::new(50.0, 250.0), ms(50), config.drag_threshold));
        assert_eq!(state.position, Vec2::new(0.0, -50.0));

        state.release(0, ms(60), config.fling_delay());
        assert!((state.velocity.y - (-50.0 / 0.06)).abs() < 0.01);
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn resting_finger_does_not_fling() {
        let (mut state, config) = vertical_state();
        state.press(0, Vec2::new(50.0, 300.0), ms(0));
        state.drag(0, Vec2::new(50.0, 200.0), ms(50), config.drag_threshold);
        state.release(0, ms(151), config.fling_delay());
        assert_eq!(state.velocity, Vec2::ZERO);
        assert!(state.gesture.is_none());
    }

    #[test]
    fn reversal_restarts_the_fling_window() {
        let (mut state, config) = vertical_state();
        state.press(0, Vec2::new(50.0, 300.0), ms(0));
        state.drag(0, Vec2::new(50.0, 250.0), ms(20), config.drag_threshold);
        state.drag(0, Vec2::new(50.0, 270.0), ms(40), config.drag_threshold);
        state.release(0, ms(50), config.fling_delay());
        assert!((state.velocity.y - 20.0 / 0.03).abs() < 0.01);
    }

    #[test]
    fn other_contacts_do_not_drive_the_gesture() {
        let (mut state, config) = vertical_state();
        state.press(0, Vec2::new(50.0, 300.0), ms(0));
        assert!(!state.drag(1, Vec2::new(50.0, 100.0), ms(10), config.drag_threshold));
        assert_eq!(state.position, Vec2::ZERO);
        state.release(1, ms(20), config.fling_delay());
        assert!(state.gesture.is_some());
    }

    #[test]
    fn friction_decays_velocity_to_rest() {
        let (mut state, config) = vertical_state();
        state.velocity = Vec2::new(0.0, -1000.0);
        state.step(ms(0), &config);
        state.step(ms(100), &config);
        assert!((state.position.y - -100.0).abs() < 1e-3);
        assert!((state.velocity.y - -500.0).abs() < 1e-3);

        let mut now = 100;
        while state.velocity != Vec2::ZERO {
            now += 16;
            state.step(ms(now), &config);
        }
        assert!(state.position.y < -100.0);
        assert!(state.position.y >= -900.0);
    }

    #[test]
    fn dragging_suspends_integration() {
        let (mut state, config) = vertical_state();
        state.step(ms(0), &config);
        state.press(0, Vec2::new(50.0, 300.0), ms(0));
        state.drag(0, Vec2::new(50.0, 280.0), ms(10), config.drag_threshold);
        let held = state.position;
        state.step(ms(100), &config);
        assert_eq!(state.position, held);
    }

    #[test]
    fn wheel_scrolls_innermost_vertical_container() {
        let (mut tree, _root, scroll) = scroll_fixture();
        let wheel = PointerEvent::wheel(50.0, 50.0, -1.0);
        assert!(tree.intercept_scroll(scroll, &wheel));
        assert_eq!(tree.scroll_velocity(scroll), Vec2::new(0.0, -400.0));
        assert_eq!(tree.scrollbar_opacity(scroll), 1.0);
    }

    #[test]
    fn scrollbars_fade_after_motion_stops() {
        let (mut state, config) = vertical_state();
        state.show_scrollbars();
        state.step(ms(1000), &config);
        assert_eq!(state.scrollbar_opacity, 1.0);
        state.step(ms(1750), &config);
        assert!((state.scrollbar_opacity - 0.5).abs() < 1e-3);
        state.step(ms(2500), &config);
        assert_eq!(state.scrollbar_opacity, 0.0);
        assert!(state.fade.is_none());
    }

    #[test]
    fn thumb_tracks_position() {
        let (mut state, config) = vertical_state();
        let viewport = Rect::from_size(100.0, 100.0);
        let geometry = state.scrollbar_geometry(viewport, &config);
        let track = geometry.vertical_track.unwrap();
        let thumb = geometry.vertical_thumb.unwrap();
        assert_eq!(track, Rect::new(91.0, 3.0, 6.0, 94.0));
        assert_eq!(thumb.height, 24.0);
        assert_eq!(thumb.y, 3.0);
        assert!(geometry.horizontal_track.is_none());

        state.position.y = -900.0;
        let thumb = state.scrollbar_geometry(viewport, &config).vertical_thumb.unwrap();
        assert_eq!(thumb.bottom(), track.bottom());
    }

    #[test]
    fn grabbing_the_thumb_drags_content() {
        let (mut state, config) = vertical_state();
        let viewport = Rect::from_size(100.0, 100.0);
        assert!(!state.begin_scrollbar_drag(Vec2::new(94.0, 10.0), viewport, &config));

        state.show_scrollbars();
        assert!(state.begin_scrollbar_drag(Vec2::new(94.0, 10.0), viewport, &config));
        assert_eq!(state.position.y, 0.0);
        state.drag_scrollbar(Vec2::new(94.0, 10.0 + 70.0), viewport, &config);
        assert!((state.position.y - -900.0).abs() < 1e-3);
    }
}
