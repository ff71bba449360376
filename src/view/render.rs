use glam::Vec2;
use smol_str::SmolStr;

use crate::geometry::Rect;
use crate::style::Color;
use crate::view::widget::{DrawContext, draw_background};
use crate::view::{ControlId, ControlTree};

#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    pub rect: Rect,
    pub clip: Rect,
    pub color: Color,
    pub image: Option<SmolStr>,
    pub region: Rect,
}

impl Quad {
    pub fn solid(rect: Rect, clip: Rect, color: Color) -> Self {
        Self {
            rect,
            clip,
            color,
            image: None,
            region: Rect::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub position: Vec2,
    pub clip: Rect,
    pub color: Color,
    pub font_size: f32,
}

/// Sprite-batch-like sink the draw pass hands its geometry to.
pub trait RenderTarget {
    fn draw_quad(&mut self, quad: &Quad);
    fn draw_text(&mut self, text: &TextRun);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Quad(Quad),
    Text(TextRun),
}

#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Quad(quad) => Some(quad),
            DrawCommand::Text(_) => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            DrawCommand::Quad(_) => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderTarget for DrawList {
    fn draw_quad(&mut self, quad: &Quad) {
        self.commands.push(DrawCommand::Quad(quad.clone()));
    }

    fn draw_text(&mut self, text: &TextRun) {
        self.commands.push(DrawCommand::Text(text.clone()));
    }
}

impl ControlTree {
    /// Draws `id` and its visible descendants top-down, returning how many controls drew.
    pub fn draw(&self, id: ControlId, target: &mut dyn RenderTarget, clip: Rect) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        let control = &node.control;
        if !control.visible {
            return 0;
        }
        let own_clip = control.absolute_clip_bounds.intersect(clip);
        if own_clip.is_empty() {
            return 0;
        }

        let ctx = DrawContext {
            control,
            style: &control.style,
            state: control.state(),
            bounds: control.absolute_bounds,
            clip: own_clip,
            opacity: control.style.opacity() * control.opacity,
        };
        match &node.widget {
            Some(widget) => {
                widget.draw_skin(&ctx, target);
                widget.draw_images(&ctx, target);
                widget.draw_text(&ctx, target);
            }
            None => draw_background(&ctx, target),
        }

        let mut drawn = 1;
        if node.container.is_some() {
            let child_clip = control.viewport_clip_bounds.intersect(clip);
            for &child in self.children(id) {
                drawn += self.draw(child, target, child_clip);
            }
            self.draw_scrollbars(id, target, own_clip);
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::DrawList;
    use crate::geometry::Rect;
    use crate::style::{Color, ImageRegion, Style, Theme};
    use crate::view::ControlTree;
    use crate::view::layout::Layout;

    #[test]
    fn children_are_clipped_to_the_parent_viewport() {
        let mut tree = ControlTree::default();
        let mut theme = Theme::default();
        theme.add_style(Style::new("panel").with_background(ImageRegion::solid(Color::BLACK)));
        tree.set_theme(theme);
        tree.set_viewport(Rect::from_size(200.0, 200.0));

        let root = tree.create_container(Layout::absolute());
        tree.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = tree.create_control();
        tree.set_style_name(child, "panel");
        tree.set_bounds(child, Rect::new(80.0, 80.0, 50.0, 50.0));
        tree.add_control(root, child).unwrap();
        tree.update_layout(root, Vec2::ZERO);

        let mut list = DrawList::new();
        let drawn = tree.draw(root, &mut list, tree.viewport());
        assert_eq!(drawn, 2);
        let quads: Vec<_> = list.quads().collect();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].rect, Rect::new(80.0, 80.0, 50.0, 50.0));
        assert_eq!(quads[0].clip, Rect::new(80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn invisible_subtrees_draw_nothing() {
        let mut tree = ControlTree::default();
        tree.set_viewport(Rect::from_size(100.0, 100.0));
        let root = tree.create_container(Layout::absolute());
        tree.set_bounds(root, Rect::from_size(100.0, 100.0));
        let child = tree.create_control();
        tree.set_bounds(child, Rect::from_size(10.0, 10.0));
        tree.add_control(root, child).unwrap();
        tree.set_visible(root, false);
        tree.update_layout(root, Vec2::ZERO);
        assert_eq!(tree.draw(root, &mut DrawList::new(), tree.viewport()), 0);
    }
}
