use tracing::trace;

use super::{ControlId, ControlTree, DirtyBits, ScrollState};
use crate::error::{Result, UiError};
use crate::view::layout::Layout;

#[derive(Debug)]
pub struct ContainerData {
    pub(crate) children: Vec<ControlId>,
    pub(crate) layout: Layout,
    pub(crate) scroll: Option<ScrollState>,
    pub(crate) next_z_index: i32,
    pub(crate) next_focus_index: i32,
}

impl ContainerData {
    pub(crate) fn new(layout: Layout) -> Self {
        Self {
            children: Vec::new(),
            layout,
            scroll: None,
            next_z_index: 0,
            next_focus_index: 0,
        }
    }

    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl ControlTree {
    pub fn add_control(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_control(parent, index, child)
    }

    /// Inserts `child` at `index` (clamped), first detaching it from any previous
    /// container. Unset z and focus indices get the container's next free value.
    pub fn insert_control(&mut self, parent: ControlId, index: usize, child: ControlId) -> Result<()> {
        if !self.contains(child) {
            return Err(UiError::UnknownControl(child));
        }
        if !self.contains(parent) {
            return Err(UiError::UnknownControl(parent));
        }
        if !self.is_container(parent) {
            return Err(UiError::NotAContainer(parent));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(UiError::WouldCreateCycle { parent, child });
        }
        if let Some(previous) = self.parent(child) {
            self.detach_control(previous, child)?;
        }

        let (z_index, focus_index) = {
            let control = self.try_control_mut(child)?;
            (control.z_index, control.focus_index)
        };
        let container = self
            .container_mut(parent)
            .ok_or(UiError::NotAContainer(parent))?;
        let z_index = z_index.unwrap_or_else(|| {
            let next = container.next_z_index;
            container.next_z_index += 1;
            next
        });
        container.next_z_index = container.next_z_index.max(z_index + 1);
        let focus_index = focus_index.unwrap_or_else(|| {
            let next = container.next_focus_index;
            container.next_focus_index += 1;
            next
        });
        container.next_focus_index = container.next_focus_index.max(focus_index + 1);
        let index = index.min(container.children.len());
        container.children.insert(index, child);

        let control = self.try_control_mut(child)?;
        control.parent = Some(parent);
        control.z_index = Some(z_index);
        control.focus_index = Some(focus_index);
        control.last_reference = None;

        self.sort_children(parent);
        self.set_dirty(child, DirtyBits::BOUNDS | DirtyBits::STATE, true);
        self.set_dirty(parent, DirtyBits::BOUNDS, false);
        trace!(?parent, ?child, index, "control inserted");
        Ok(())
    }

    /// Detaches `child` and destroys it together with its subtree.
    pub fn remove_control(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        self.detach_control(parent, child)?;
        self.destroy(child);
        Ok(())
    }

    /// Detaches `child` from `parent` but keeps it alive as a new root, ready
    /// to be inserted elsewhere.
    pub fn detach_control(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let position = self
            .container(parent)
            .ok_or(UiError::NotAContainer(parent))?
            .children
            .iter()
            .position(|&id| id == child)
            .ok_or(UiError::NotAChild { parent, child })?;
        self.clear_references(child);
        if let Some(container) = self.container_mut(parent) {
            container.children.remove(position);
        }
        if let Some(control) = self.control_mut(child) {
            control.parent = None;
        }
        self.set_dirty(parent, DirtyBits::BOUNDS, false);
        trace!(?parent, ?child, "control detached");
        Ok(())
    }

    pub fn remove_all_controls(&mut self, parent: ControlId) -> Result<()> {
        for child in self.children(parent).to_vec() {
            self.remove_control(parent, child)?;
        }
        Ok(())
    }

    pub fn layout(&self, id: ControlId) -> Option<Layout> {
        self.container(id).map(|container| container.layout)
    }

    pub fn set_layout(&mut self, id: ControlId, layout: Layout) -> Result<()> {
        let container = self.container_mut(id).ok_or(UiError::NotAContainer(id))?;
        container.layout = layout;
        self.sort_children(id);
        self.set_dirty(id, DirtyBits::BOUNDS, false);
        Ok(())
    }

    /// Absolute layouts paint and hit-test in z order; other layouts keep insertion order.
    pub(crate) fn sort_children(&mut self, id: ControlId) {
        let Some(container) = self.nodes.get(id).and_then(|node| node.container.as_ref()) else {
            return;
        };
        if !matches!(container.layout, Layout::Absolute(_)) {
            return;
        }
        let mut children = container.children.clone();
        children.sort_by_key(|&child| {
            self.control(child)
                .and_then(|control| control.z_index)
                .unwrap_or(0)
        });
        if let Some(container) = self.container_mut(id) {
            container.children = children;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::error::UiError;
    use crate::geometry::Rect;
    use crate::view::layout::Layout;
    use crate::view::{ControlTree, DirtyBits};

    #[test]
    fn insert_assigns_increasing_indices() {
        let mut tree = ControlTree::default();
        let root = tree.create_container(Layout::vertical(0.0));
        let a = tree.create_control();
        let b = tree.create_control();
        let c = tree.create_control();
        tree.set_focus_index(c, 7);
        tree.add_control(root, a).unwrap();
        tree.add_control(root, c).unwrap();
        tree.insert_control(root, 0, b).unwrap();

        assert_eq!(tree.children(root), &[b, a, c]);
        assert_eq!(tree.control(a).unwrap().focus_index(), Some(0));
        assert_eq!(tree.control(c).unwrap().focus_index(), Some(7));
        assert_eq!(tree.control(b).unwrap().focus_index(), Some(8));
        assert_eq!(tree.control(b).unwrap().z_index(), Some(2));
    }

    #[test]
    fn moving_a_child_detaches_it_first() {
        let mut tree = ControlTree::default();
        let first = tree.create_container(Layout::absolute());
        let second = tree.create_container(Layout::absolute());
        let child = tree.create_control();
        tree.add_control(first, child).unwrap();
        tree.add_control(second, child).unwrap();

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second), &[child]);
        assert_eq!(tree.parent(child), Some(second));
    }

    #[test]
    fn cycles_and_strangers_are_rejected() {
        let mut tree = ControlTree::default();
        let outer = tree.create_container(Layout::absolute());
        let inner = tree.create_container(Layout::absolute());
        let leaf = tree.create_control();
        tree.add_control(outer, inner).unwrap();

        assert!(matches!(
            tree.add_control(inner, outer),
            Err(UiError::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            tree.add_control(leaf, inner),
            Err(UiError::NotAContainer(_))
        ));
        assert!(matches!(
            tree.remove_control(outer, leaf),
            Err(UiError::NotAChild { .. })
        ));
    }

    #[test]
    fn removal_destroys_subtree_and_clears_references() {
        let mut tree = ControlTree::default();
        tree.set_viewport(Rect::from_size(100.0, 100.0));
        let root = tree.create_container(Layout::absolute());
        let panel = tree.create_container(Layout::absolute());
        let button = tree.create_control();
        tree.set_can_focus(button, true);
        tree.add_control(root, panel).unwrap();
        tree.add_control(panel, button).unwrap();
        tree.update_layout(root, Vec2::ZERO);
        tree.set_focus(Some(button));
        tree.set_active(0, Some(button));
        tree.set_hover(1, Some(button));

        tree.remove_control(root, panel).unwrap();
        assert!(!tree.contains(panel));
        assert!(!tree.contains(button));
        assert_eq!(tree.focused(), None);
        assert_eq!(tree.active(0), None);
        assert_eq!(tree.hovered(1), None);
        assert!(tree.control(root).unwrap().is_dirty(DirtyBits::BOUNDS));
    }
}
