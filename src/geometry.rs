use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(self, px: f32, py: f32) -> bool {
        !self.is_empty() && px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn contains_point(self, point: Vec2) -> bool {
        self.contains(point.x, point.y)
    }

    /// Empty rects (zero size at the overlap origin) are returned for disjoint inputs.
    pub fn intersect(self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    pub fn translate(self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    pub fn inset(self, insets: EdgeInsets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.horizontal()).max(0.0),
            (self.height - insets.vertical()).max(0.0),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets::uniform(0.0);

    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl Alignment {
    pub const TOP_LEFT: Alignment = Alignment::new(HorizontalAlign::Left, VerticalAlign::Top);
    pub const CENTER: Alignment = Alignment::new(HorizontalAlign::Center, VerticalAlign::Center);
    pub const BOTTOM_RIGHT: Alignment =
        Alignment::new(HorizontalAlign::Right, VerticalAlign::Bottom);

    pub const fn new(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn as_str(self) -> &'static str {
        use HorizontalAlign as H;
        use VerticalAlign as V;
        match (self.vertical, self.horizontal) {
            (V::Top, H::Left) => "top-left",
            (V::Top, H::Center) => "top-center",
            (V::Top, H::Right) => "top-right",
            (V::Center, H::Left) => "center-left",
            (V::Center, H::Center) => "center",
            (V::Center, H::Right) => "center-right",
            (V::Bottom, H::Left) => "bottom-left",
            (V::Bottom, H::Center) => "bottom-center",
            (V::Bottom, H::Right) => "bottom-right",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        use HorizontalAlign as H;
        use VerticalAlign as V;
        let (vertical, horizontal) = match raw {
            "top-left" => (V::Top, H::Left),
            "top-center" => (V::Top, H::Center),
            "top-right" => (V::Top, H::Right),
            "center-left" => (V::Center, H::Left),
            "center" => (V::Center, H::Center),
            "center-right" => (V::Center, H::Right),
            "bottom-left" => (V::Bottom, H::Left),
            "bottom-center" => (V::Bottom, H::Center),
            "bottom-right" => (V::Bottom, H::Right),
            _ => return None,
        };
        Some(Self::new(horizontal, vertical))
    }
}

/// How one axis of a control resolves its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AutoSize {
    #[default]
    None,
    WrapContent,
    PercentParent,
    PercentLeft,
}

impl AutoSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::WrapContent => "wrap-content",
            Self::PercentParent => "percent-parent",
            Self::PercentLeft => "percent-left",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(Self::None),
            "wrap-content" => Some(Self::WrapContent),
            "percent-parent" => Some(Self::PercentParent),
            "percent-left" => Some(Self::PercentLeft),
            _ => None,
        }
    }

    pub fn is_percent(self) -> bool {
        matches!(self, Self::PercentParent | Self::PercentLeft)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SizeModes {
    pub x: AutoSize,
    pub y: AutoSize,
    pub width: AutoSize,
    pub height: AutoSize,
}

impl SizeModes {
    pub fn wraps_content(self) -> bool {
        self.width == AutoSize::WrapContent || self.height == AutoSize::WrapContent
    }

    pub fn is_auto(self) -> bool {
        self.width != AutoSize::None || self.height != AutoSize::None
    }
}

pub(crate) fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= 0.001
}

pub(crate) fn rect_approx_eq(a: Rect, b: Rect) -> bool {
    approx_eq(a.x, b.x)
        && approx_eq(a.y, b.y)
        && approx_eq(a.width, b.width)
        && approx_eq(a.height, b.height)
}
