use glam::Vec2;

use super::{ChildGeometry, LayoutStrategy};
use crate::geometry::Rect;

/// Left-to-right rows, breaking when the next child would pass the content width.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowLayout {
    pub spacing: Vec2,
}

struct FlowLines {
    lines: Vec<Vec<usize>>,
    line_width: Vec<f32>,
    line_height: Vec<f32>,
}

impl FlowLayout {
    fn compute_lines(&self, children: &[ChildGeometry], width_limit: f32) -> FlowLines {
        let mut lines = Vec::new();
        let mut line_width = Vec::new();
        let mut line_height = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_width = 0.0f32;
        let mut current_height = 0.0f32;

        for (idx, child) in children.iter().enumerate() {
            let outer = child.outer_size();
            let next_width = if current.is_empty() {
                outer.x
            } else {
                current_width + self.spacing.x + outer.x
            };
            if !current.is_empty() && next_width > width_limit {
                lines.push(std::mem::take(&mut current));
                line_width.push(current_width);
                line_height.push(current_height);
                current_width = 0.0;
                current_height = 0.0;
            }
            if current.is_empty() {
                current_width = outer.x;
                current_height = outer.y;
            } else {
                current_width += self.spacing.x + outer.x;
                current_height = current_height.max(outer.y);
            }
            current.push(idx);
        }
        if !current.is_empty() {
            lines.push(current);
            line_width.push(current_width);
            line_height.push(current_height);
        }

        FlowLines {
            lines,
            line_width,
            line_height,
        }
    }
}

impl LayoutStrategy for FlowLayout {
    fn update(&self, children: &mut [ChildGeometry], content: Vec2) {
        let info = self.compute_lines(children, content.x);
        let mut y = 0.0;
        for (line, height) in info.lines.iter().zip(&info.line_height) {
            let mut x = 0.0;
            for &idx in line {
                let child = &mut children[idx];
                let outer = child.outer_size();
                child.bounds = Rect::new(
                    x + child.margin.left,
                    y + child.margin.top,
                    child.measured.width,
                    child.measured.height,
                );
                x += outer.x + self.spacing.x;
            }
            y += height + self.spacing.y;
        }
    }

    fn pref_content_size(&self, children: &[ChildGeometry], width_limit: f32) -> Vec2 {
        let info = self.compute_lines(children, width_limit);
        let width = info.line_width.iter().fold(0.0f32, |a, &b| a.max(b));
        let height = info.line_height.iter().sum::<f32>()
            + self.spacing.y * (info.line_height.len().saturating_sub(1) as f32);
        Vec2::new(width, height)
    }
}
