use glam::Vec2;

use crate::geometry::{Alignment, AutoSize, EdgeInsets, HorizontalAlign, Rect, SizeModes, VerticalAlign};
use crate::view::ControlId;

mod absolute;
mod flow;
mod horizontal;
mod vertical;

pub use absolute::*;
pub use flow::*;
pub use horizontal::*;
pub use vertical::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutType {
    #[default]
    Absolute,
    Flow,
    Vertical,
    Horizontal,
}

impl LayoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Flow => "flow",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "absolute" => Some(Self::Absolute),
            "flow" => Some(Self::Flow),
            "vertical" => Some(Self::Vertical),
            "horizontal" => Some(Self::Horizontal),
            _ => None,
        }
    }
}

/// One visible child as seen by a layout strategy. `measured` is the child's
/// own resolved rect; strategies write the placed rect into `bounds`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildGeometry {
    pub id: ControlId,
    pub measured: Rect,
    pub margin: EdgeInsets,
    pub alignment: Alignment,
    pub modes: SizeModes,
    pub bounds: Rect,
}

impl ChildGeometry {
    pub(crate) fn outer_size(&self) -> Vec2 {
        Vec2::new(
            self.measured.width + self.margin.horizontal(),
            self.measured.height + self.margin.vertical(),
        )
    }

    pub(crate) fn takes_space_left(&self) -> bool {
        self.modes.width == AutoSize::PercentLeft || self.modes.height == AutoSize::PercentLeft
    }
}

pub trait LayoutStrategy {
    /// Assigns `bounds` of every child inside a content box of size `content`.
    fn update(&self, children: &mut [ChildGeometry], content: Vec2);

    /// Content size a wrap-content container needs to hold `children`.
    /// `width_limit` is the wrap width for strategies that break rows.
    fn pref_content_size(&self, children: &[ChildGeometry], width_limit: f32) -> Vec2;

    /// Space left over for PERCENT_LEFT children, if the strategy supplies one.
    fn space_left(&self, _children: &[ChildGeometry], _content: Vec2) -> Option<Vec2> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Layout {
    Absolute(AbsoluteLayout),
    Flow(FlowLayout),
    Vertical(VerticalLayout),
    Horizontal(HorizontalLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Self::Absolute(AbsoluteLayout)
    }
}

impl Layout {
    pub fn absolute() -> Self {
        Self::Absolute(AbsoluteLayout)
    }

    pub fn flow(spacing: Vec2) -> Self {
        Self::Flow(FlowLayout { spacing })
    }

    pub fn vertical(spacing: f32) -> Self {
        Self::Vertical(VerticalLayout { spacing })
    }

    pub fn horizontal(spacing: f32) -> Self {
        Self::Horizontal(HorizontalLayout { spacing })
    }

    pub fn from_type(kind: LayoutType, spacing: Vec2) -> Self {
        match kind {
            LayoutType::Absolute => Self::absolute(),
            LayoutType::Flow => Self::flow(spacing),
            LayoutType::Vertical => Self::vertical(spacing.y),
            LayoutType::Horizontal => Self::horizontal(spacing.x),
        }
    }

    pub fn kind(&self) -> LayoutType {
        match self {
            Self::Absolute(_) => LayoutType::Absolute,
            Self::Flow(_) => LayoutType::Flow,
            Self::Vertical(_) => LayoutType::Vertical,
            Self::Horizontal(_) => LayoutType::Horizontal,
        }
    }

    pub fn spacing(&self) -> Vec2 {
        match self {
            Self::Absolute(_) => Vec2::ZERO,
            Self::Flow(flow) => flow.spacing,
            Self::Vertical(vertical) => Vec2::new(0.0, vertical.spacing),
            Self::Horizontal(horizontal) => Vec2::new(horizontal.spacing, 0.0),
        }
    }

    pub fn supplies_space_left(&self) -> bool {
        matches!(self, Self::Vertical(_) | Self::Horizontal(_))
    }

    pub fn strategy(&self) -> &dyn LayoutStrategy {
        match self {
            Self::Absolute(layout) => layout,
            Self::Flow(layout) => layout,
            Self::Vertical(layout) => layout,
            Self::Horizontal(layout) => layout,
        }
    }
}

pub(crate) fn align_horizontal(child: &ChildGeometry, available: f32) -> f32 {
    match child.alignment.horizontal {
        HorizontalAlign::Left => child.margin.left,
        HorizontalAlign::Center => (available - child.measured.width) * 0.5,
        HorizontalAlign::Right => available - child.measured.width - child.margin.right,
    }
}

pub(crate) fn align_vertical(child: &ChildGeometry, available: f32) -> f32 {
    match child.alignment.vertical {
        VerticalAlign::Top => child.margin.top,
        VerticalAlign::Center => (available - child.measured.height) * 0.5,
        VerticalAlign::Bottom => available - child.measured.height - child.margin.bottom,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use slotmap::SlotMap;

    use super::ChildGeometry;
    use crate::geometry::{Alignment, EdgeInsets, Rect, SizeModes};
    use crate::view::ControlId;

    pub fn children(sizes: &[(f32, f32)]) -> Vec<ChildGeometry> {
        let mut keys: SlotMap<ControlId, ()> = SlotMap::with_key();
        sizes
            .iter()
            .map(|&(width, height)| ChildGeometry {
                id: keys.insert(()),
                measured: Rect::from_size(width, height),
                margin: EdgeInsets::ZERO,
                alignment: Alignment::TOP_LEFT,
                modes: SizeModes::default(),
                bounds: Rect::default(),
            })
            .collect()
    }
}
