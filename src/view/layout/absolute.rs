use glam::Vec2;

use super::{ChildGeometry, LayoutStrategy};
use crate::geometry::{HorizontalAlign, Rect, VerticalAlign};

/// Children keep their authored position, offset by their alignment inside the content box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsoluteLayout;

impl LayoutStrategy for AbsoluteLayout {
    fn update(&self, children: &mut [ChildGeometry], content: Vec2) {
        for child in children {
            child.bounds = place_absolute(child, content);
        }
    }

    fn pref_content_size(&self, children: &[ChildGeometry], _width_limit: f32) -> Vec2 {
        children.iter().fold(Vec2::ZERO, |extent, child| {
            let outer = child.outer_size();
            let x = match child.alignment.horizontal {
                HorizontalAlign::Left => child.measured.x.max(0.0),
                _ => 0.0,
            };
            let y = match child.alignment.vertical {
                VerticalAlign::Top => child.measured.y.max(0.0),
                _ => 0.0,
            };
            extent.max(Vec2::new(x + outer.x, y + outer.y))
        })
    }
}

pub fn place_absolute(child: &ChildGeometry, content: Vec2) -> Rect {
    let measured = child.measured;
    let x = match child.alignment.horizontal {
        HorizontalAlign::Left => measured.x + child.margin.left,
        HorizontalAlign::Center => (content.x - measured.width) * 0.5 + measured.x,
        HorizontalAlign::Right => content.x - measured.width - child.margin.right - measured.x,
    };
    let y = match child.alignment.vertical {
        VerticalAlign::Top => measured.y + child.margin.top,
        VerticalAlign::Center => (content.y - measured.height) * 0.5 + measured.y,
        VerticalAlign::Bottom => content.y - measured.height - child.margin.bottom - measured.y,
    };
    Rect::new(x, y, measured.width, measured.height)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::AbsoluteLayout;
    use crate::geometry::{Alignment, EdgeInsets, Rect};
    use crate::view::layout::LayoutStrategy;
    use crate::view::layout::test_support::children;

    #[test]
    fn alignment_offsets_from_the_matching_edge() {
        let mut items = children(&[(20.0, 10.0), (20.0, 10.0)]);
        items[0].measured.x = 5.0;
        items[0].margin = EdgeInsets::uniform(2.0);
        items[1].alignment = Alignment::BOTTOM_RIGHT;
        items[1].measured.x = 5.0;
        AbsoluteLayout.update(&mut items, Vec2::new(100.0, 50.0));
        assert_eq!(items[0].bounds, Rect::new(7.0, 2.0, 20.0, 10.0));
        assert_eq!(items[1].bounds, Rect::new(75.0, 40.0, 20.0, 10.0));
    }

    #[test]
    fn preferred_size_covers_positioned_children() {
        let mut items = children(&[(20.0, 10.0), (10.0, 40.0)]);
        items[0].measured.x = 30.0;
        items[1].margin.bottom = 5.0;
        let size = AbsoluteLayout.pref_content_size(&items, f32::INFINITY);
        assert_eq!(size, Vec2::new(50.0, 45.0));
    }
}
