use std::any::Any;

use glam::Vec2;

use super::Caption;
use crate::error::Result;
use crate::geometry::Alignment;
use crate::serialize::{PropertyReader, PropertyWriter};
use crate::view::render::RenderTarget;
use crate::view::widget::{DrawContext, MeasureContext, Widget};

/// Static text. Not focusable and transparent to pointer input, so presses
/// fall through to whatever lies underneath.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Label {
    caption: Caption,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        let mut caption = Caption::new(text);
        caption.set_alignment(Alignment::TOP_LEFT);
        Self { caption }
    }
}

impl Widget for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn consumes_input(&self) -> bool {
        false
    }

    fn measure_content(&self, ctx: &MeasureContext<'_>) -> Option<Vec2> {
        Some(self.caption.measure(ctx.style, ctx.state))
    }

    fn draw_text(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        self.caption.draw(ctx, target, 0.0);
    }

    fn caption(&self) -> Option<&Caption> {
        Some(&self.caption)
    }

    fn caption_mut(&mut self) -> Option<&mut Caption> {
        Some(&mut self.caption)
    }

    fn serialize(&self, writer: &mut dyn PropertyWriter) -> Result<()> {
        self.caption.serialize(writer)
    }

    fn deserialize(&mut self, reader: &mut dyn PropertyReader) -> Result<()> {
        self.caption.deserialize(reader)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::Label;
    use crate::geometry::{AutoSize, Rect, SizeModes};
    use crate::view::layout::Layout;
    use crate::view::{ControlTree, DrawList};

    #[test]
    fn wraps_to_its_text_and_ignores_input() {
        let mut tree = ControlTree::default();
        tree.set_viewport(Rect::from_size(200.0, 100.0));
        let root = tree.create_container(Layout::absolute());
        tree.set_bounds(root, Rect::from_size(200.0, 100.0));
        let label = tree.create_widget(Label::new("hello"));
        tree.set_size_modes(
            label,
            SizeModes {
                width: AutoSize::WrapContent,
                height: AutoSize::WrapContent,
                ..SizeModes::default()
            },
        );
        tree.add_control(root, label).unwrap();
        tree.update_layout(root, Vec2::ZERO);

        // Default monospace font: 0.5em advance, 1.25em lines at 16 units.
        assert_eq!(tree.control(label).unwrap().bounds(), Rect::new(0.0, 0.0, 40.0, 20.0));
        assert_eq!(tree.find_input_control(root, Vec2::new(5.0, 5.0)), None);

        assert!(tree.set_text(label, "hello world"));
        tree.update_layout(root, Vec2::ZERO);
        assert_eq!(tree.control(label).unwrap().bounds().width, 88.0);
        assert_eq!(tree.text(label), Some("hello world"));

        let mut list = DrawList::new();
        tree.draw(root, &mut list, tree.viewport());
        let text = list.texts().next().unwrap();
        assert_eq!(text.text, "hello world");
        assert_eq!(text.position, Vec2::ZERO);
    }
}
