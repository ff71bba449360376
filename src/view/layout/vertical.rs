use glam::Vec2;

use super::{ChildGeometry, LayoutStrategy, align_horizontal};
use crate::geometry::{AutoSize, Rect};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalLayout {
    pub spacing: f32,
}

impl LayoutStrategy for VerticalLayout {
    fn update(&self, children: &mut [ChildGeometry], content: Vec2) {
        let mut y = 0.0;
        for child in children {
            let outer = child.outer_size();
            child.bounds = Rect::new(
                align_horizontal(child, content.x),
                y + child.margin.top,
                child.measured.width,
                child.measured.height,
            );
            y += outer.y + self.spacing;
        }
    }

    fn pref_content_size(&self, children: &[ChildGeometry], _width_limit: f32) -> Vec2 {
        let mut size = Vec2::ZERO;
        for child in children {
            let outer = child.outer_size();
            size.x = size.x.max(outer.x);
            size.y += outer.y;
        }
        size.y += self.spacing * (children.len().saturating_sub(1) as f32);
        size
    }

    fn space_left(&self, children: &[ChildGeometry], content: Vec2) -> Option<Vec2> {
        let mut used = self.spacing * (children.len().saturating_sub(1) as f32);
        for child in children {
            used += child.margin.vertical();
            if child.modes.height != AutoSize::PercentLeft {
                used += child.measured.height;
            }
        }
        Some(Vec2::new(content.x, (content.y - used).max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::VerticalLayout;
    use crate::geometry::{Alignment, AutoSize};
    use crate::view::layout::LayoutStrategy;
    use crate::view::layout::test_support::children;

    #[test]
    fn stacks_with_spacing_and_aligns_across() {
        let layout = VerticalLayout { spacing: 4.0 };
        let mut items = children(&[(20.0, 10.0), (40.0, 20.0)]);
        items[0].alignment = Alignment::CENTER;
        layout.update(&mut items, Vec2::new(100.0, 100.0));
        assert_eq!((items[0].bounds.x, items[0].bounds.y), (40.0, 0.0));
        assert_eq!((items[1].bounds.x, items[1].bounds.y), (0.0, 14.0));
        assert_eq!(
            layout.pref_content_size(&items, f32::INFINITY),
            Vec2::new(40.0, 34.0)
        );
    }

    #[test]
    fn space_left_excludes_fixed_siblings() {
        let layout = VerticalLayout { spacing: 10.0 };
        let mut items = children(&[(20.0, 30.0), (20.0, 0.0)]);
        items[1].modes.height = AutoSize::PercentLeft;
        let left = layout.space_left(&items, Vec2::new(100.0, 200.0));
        assert_eq!(left, Some(Vec2::new(100.0, 160.0)));
    }
}
