use glam::Vec2;

use super::{ChildGeometry, LayoutStrategy, align_vertical};
use crate::geometry::{AutoSize, Rect};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HorizontalLayout {
    pub spacing: f32,
}

impl LayoutStrategy for HorizontalLayout {
    fn update(&self, children: &mut [ChildGeometry], content: Vec2) {
        let mut x = 0.0;
        for child in children {
            let outer = child.outer_size();
            child.bounds = Rect::new(
                x + child.margin.left,
                align_vertical(child, content.y),
                child.measured.width,
                child.measured.height,
            );
            x += outer.x + self.spacing;
        }
    }

    fn pref_content_size(&self, children: &[ChildGeometry], _width_limit: f32) -> Vec2 {
        let mut size = Vec2::ZERO;
        for child in children {
            let outer = child.outer_size();
            size.x += outer.x;
            size.y = size.y.max(outer.y);
        }
        size.x += self.spacing * (children.len().saturating_sub(1) as f32);
        size
    }

    fn space_left(&self, children: &[ChildGeometry], content: Vec2) -> Option<Vec2> {
        let mut used = self.spacing * (children.len().saturating_sub(1) as f32);
        for child in children {
            used += child.margin.horizontal();
            if child.modes.width != AutoSize::PercentLeft {
                used += child.measured.width;
            }
        }
        Some(Vec2::new((content.x - used).max(0.0), content.y))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::HorizontalLayout;
    use crate::geometry::{Alignment, EdgeInsets};
    use crate::view::layout::LayoutStrategy;
    use crate::view::layout::test_support::children;

    #[test]
    fn packs_left_to_right_without_wrapping() {
        let layout = HorizontalLayout { spacing: 5.0 };
        let mut items = children(&[(60.0, 10.0), (60.0, 30.0)]);
        items[0].alignment = Alignment::BOTTOM_RIGHT;
        items[1].margin = EdgeInsets::new(2.0, 0.0, 0.0, 0.0);
        layout.update(&mut items, Vec2::new(100.0, 40.0));
        assert_eq!((items[0].bounds.x, items[0].bounds.y), (0.0, 30.0));
        assert_eq!((items[1].bounds.x, items[1].bounds.y), (67.0, 0.0));
    }
}
