use glam::Vec2;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{Result, UiError};
use crate::geometry::{Alignment, AutoSize, EdgeInsets, Rect, SizeModes};
use crate::view::layout::{Layout, LayoutType};
use crate::view::{Button, CheckBox, ControlId, ControlTree, DirtyBits, Label, ScrollDirection};

mod json;

pub use json::*;

/// Sink for a flat set of named properties. Lists and nested objects are
/// bracketed by `write_list`/`end_list` and `write_object`/`end_object`;
/// elements of a list are written as unnamed objects.
pub trait PropertyWriter {
    fn write_string(&mut self, name: &str, value: &str);
    fn write_bool(&mut self, name: &str, value: bool);
    fn write_int(&mut self, name: &str, value: i64);
    fn write_float(&mut self, name: &str, value: f32);
    fn write_vec2(&mut self, name: &str, value: Vec2);
    fn write_enum(&mut self, name: &str, value: &str);
    fn write_list(&mut self, name: &str, count: usize);
    fn end_list(&mut self);
    fn write_object(&mut self, name: &str, type_name: &str);
    fn end_object(&mut self);
}

/// Source mirroring [`PropertyWriter`]. Scalar reads fall back to `default`
/// when the property is absent.
pub trait PropertyReader {
    fn read_string(&mut self, name: &str, default: &str) -> String;
    fn read_bool(&mut self, name: &str, default: bool) -> bool;
    fn read_int(&mut self, name: &str, default: i64) -> i64;
    fn read_float(&mut self, name: &str, default: f32) -> f32;
    fn read_vec2(&mut self, name: &str, default: Vec2) -> Vec2;
    fn read_enum(&mut self, name: &str, default: &str) -> String;
    /// Enters the list `name` and returns its length.
    fn read_list(&mut self, name: &str) -> usize;
    fn end_list(&mut self);
    /// Enters the object `name` (or the next list element) and returns its type name.
    fn read_object(&mut self, name: &str) -> Result<SmolStr>;
    fn end_object(&mut self);
}

type Constructor = Box<dyn Fn(&mut ControlTree) -> ControlId>;

/// Maps persisted type names to constructors of default-initialized controls.
pub struct ControlFactory {
    constructors: FxHashMap<SmolStr, Constructor>,
}

impl Default for ControlFactory {
    fn default() -> Self {
        let mut factory = Self {
            constructors: FxHashMap::default(),
        };
        factory.register("Control", ControlTree::create_control);
        factory.register("Container", |tree| tree.create_container(Layout::absolute()));
        factory.register("ScrollContainer", |tree| {
            tree.create_scroll_container(Layout::absolute(), ScrollDirection::Vertical)
        });
        factory.register("Label", |tree| tree.create_widget(Label::default()));
        factory.register("Button", |tree| tree.create_widget(Button::default()));
        factory.register("CheckBox", |tree| tree.create_widget(CheckBox::default()));
        factory
    }
}

impl ControlFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        type_name: &str,
        constructor: impl Fn(&mut ControlTree) -> ControlId + 'static,
    ) {
        self.constructors
            .insert(SmolStr::new(type_name), Box::new(constructor));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    pub fn create(&self, type_name: &str, tree: &mut ControlTree) -> Result<ControlId> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| UiError::UnknownControlType(SmolStr::new(type_name)))?;
        Ok(constructor(tree))
    }
}

const UNSET_INDEX: i64 = i64::MIN;

fn write_insets(writer: &mut dyn PropertyWriter, name: &str, insets: EdgeInsets) {
    writer.write_vec2(&format!("{name}_top_left"), Vec2::new(insets.left, insets.top));
    writer.write_vec2(
        &format!("{name}_bottom_right"),
        Vec2::new(insets.right, insets.bottom),
    );
}

fn read_insets(reader: &mut dyn PropertyReader, name: &str) -> EdgeInsets {
    let top_left = reader.read_vec2(&format!("{name}_top_left"), Vec2::ZERO);
    let bottom_right = reader.read_vec2(&format!("{name}_bottom_right"), Vec2::ZERO);
    EdgeInsets {
        left: top_left.x,
        top: top_left.y,
        right: bottom_right.x,
        bottom: bottom_right.y,
    }
}

fn read_parsed<T>(
    reader: &mut dyn PropertyReader,
    name: &'static str,
    default: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
    let raw = reader.read_enum(name, default);
    parse(&raw).ok_or(UiError::InvalidValue {
        name: SmolStr::new_static(name),
        value: raw,
    })
}

impl ControlTree {
    /// Writes `id` and its subtree as the object `name`.
    pub fn save_control(&self, id: ControlId, name: &str, writer: &mut dyn PropertyWriter) -> Result<()> {
        let node = self.node(id).ok_or(UiError::UnknownControl(id))?;
        let control = node.control();
        writer.write_object(name, node.type_name());

        writer.write_string("name", control.id());
        let desired = control.desired_bounds();
        writer.write_vec2("position", desired.origin());
        writer.write_vec2("size", desired.size());
        let modes = control.size_modes();
        writer.write_enum("mode_x", modes.x.as_str());
        writer.write_enum("mode_y", modes.y.as_str());
        writer.write_enum("mode_width", modes.width.as_str());
        writer.write_enum("mode_height", modes.height.as_str());
        writer.write_enum("alignment", control.alignment().as_str());
        write_insets(writer, "margin", control.margin());
        write_insets(writer, "padding", control.padding());
        writer.write_bool("visible", control.is_visible());
        writer.write_bool("enabled", control.is_enabled());
        writer.write_bool("consume_input", control.consumes_input_events());
        writer.write_bool("can_focus", control.can_focus());
        writer.write_int("z_index", control.z_index().map_or(UNSET_INDEX, i64::from));
        writer.write_int(
            "focus_index",
            control.focus_index().map_or(UNSET_INDEX, i64::from),
        );
        writer.write_string("style", control.style_name());
        writer.write_float("opacity", control.opacity());

        if let Some(widget) = &node.widget {
            widget.serialize(writer)?;
        }
        if let Some(layout) = self.layout(id) {
            writer.write_enum("layout", layout.kind().as_str());
            writer.write_vec2("spacing", layout.spacing());
            writer.write_enum("scroll", self.scroll_direction(id).as_str());
            let children = self.children(id);
            writer.write_list("children", children.len());
            for &child in children {
                self.save_control(child, "", writer)?;
            }
            writer.end_list();
        }
        writer.end_object();
        Ok(())
    }

    /// Reads the object `name` into a new, detached control subtree.
    pub fn load_control(
        &mut self,
        name: &str,
        reader: &mut dyn PropertyReader,
        factory: &ControlFactory,
    ) -> Result<ControlId> {
        let type_name = reader.read_object(name)?;
        let id = factory.create(&type_name, self)?;
        if let Err(err) = self.read_properties(id, reader, factory) {
            debug!(%type_name, %err, "discarding partially loaded control");
            self.destroy(id);
            return Err(err);
        }
        reader.end_object();
        Ok(id)
    }

    fn read_properties(
        &mut self,
        id: ControlId,
        reader: &mut dyn PropertyReader,
        factory: &ControlFactory,
    ) -> Result<()> {
        let name = reader.read_string("name", "");
        self.set_name(id, &name);
        let position = reader.read_vec2("position", Vec2::ZERO);
        let size = reader.read_vec2("size", Vec2::ZERO);
        self.set_bounds(id, Rect::new(position.x, position.y, size.x, size.y));
        let modes = SizeModes {
            x: read_parsed(reader, "mode_x", "none", AutoSize::parse)?,
            y: read_parsed(reader, "mode_y", "none", AutoSize::parse)?,
            width: read_parsed(reader, "mode_width", "none", AutoSize::parse)?,
            height: read_parsed(reader, "mode_height", "none", AutoSize::parse)?,
        };
        self.set_size_modes(id, modes);
        let alignment = read_parsed(reader, "alignment", "top-left", Alignment::parse)?;
        self.set_alignment(id, alignment);
        let margin = read_insets(reader, "margin");
        self.set_margin(id, margin);
        let padding = read_insets(reader, "padding");
        self.set_padding(id, padding);

        let visible = reader.read_bool("visible", true);
        self.set_visible(id, visible);
        let enabled = reader.read_bool("enabled", true);
        self.set_enabled(id, enabled);
        let consume = reader.read_bool("consume_input", true);
        self.set_consume_input_events(id, consume);
        let can_focus = reader.read_bool("can_focus", false);
        self.set_can_focus(id, can_focus);
        let z_index = reader.read_int("z_index", UNSET_INDEX);
        if let Ok(z_index) = i32::try_from(z_index) {
            self.set_z_index(id, z_index);
        }
        let focus_index = reader.read_int("focus_index", UNSET_INDEX);
        if let Ok(focus_index) = i32::try_from(focus_index) {
            self.set_focus_index(id, focus_index);
        }
        let style = reader.read_string("style", "");
        if !style.is_empty() {
            self.set_style_name(id, &style);
        }
        let opacity = reader.read_float("opacity", 1.0);
        self.set_opacity(id, opacity);

        if let Some(result) = self.with_widget(id, |widget, ctx| {
            ctx.invalidate(DirtyBits::BOUNDS);
            widget.deserialize(reader)
        }) {
            result?;
        }

        if self.is_container(id) {
            let kind = read_parsed(reader, "layout", "absolute", LayoutType::parse)?;
            let spacing = reader.read_vec2("spacing", Vec2::ZERO);
            self.set_layout(id, Layout::from_type(kind, spacing))?;
            let scroll = read_parsed(reader, "scroll", "none", ScrollDirection::parse)?;
            if scroll != ScrollDirection::None || self.scroll_state(id).is_some() {
                self.set_scroll_direction(id, scroll)?;
            }
            let count = reader.read_list("children");
            for _ in 0..count {
                let child = self.load_control("", reader, factory)?;
                self.add_control(id, child)?;
            }
            reader.end_list();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{ControlFactory, JsonReader, JsonWriter};
    use crate::error::UiError;
    use crate::geometry::{Alignment, AutoSize, EdgeInsets, Rect};
    use crate::view::layout::{Layout, LayoutType};
    use crate::view::{Button, CheckBox, ControlTree, ScrollDirection};

    #[test]
    fn control_tree_survives_a_json_trip() {
        let mut tree = ControlTree::default();
        let panel = tree.create_scroll_container(Layout::vertical(4.0), ScrollDirection::Both);
        tree.set_name(panel, "panel");
        tree.set_bounds(panel, Rect::new(5.0, 6.0, 100.0, 80.0));
        tree.set_padding(panel, EdgeInsets::uniform(2.0));
        let ok = tree.create_widget(Button::new("OK"));
        tree.set_name(ok, "ok");
        tree.set_width_mode(ok, AutoSize::PercentParent);
        tree.set_alignment(ok, Alignment::CENTER);
        let sound = tree.create_widget(CheckBox::new("Sound", true));
        tree.set_enabled(sound, false);
        tree.add_control(panel, ok).unwrap();
        tree.add_control(panel, sound).unwrap();

        let mut writer = JsonWriter::new();
        tree.save_control(panel, "root", &mut writer).unwrap();
        let json = serde_json::to_string_pretty(&writer.finish()).unwrap();

        let mut copy = ControlTree::default();
        let mut reader = JsonReader::parse(&json).unwrap();
        let loaded = copy
            .load_control("root", &mut reader, &ControlFactory::default())
            .unwrap();

        let control = copy.control(loaded).unwrap();
        assert_eq!(control.id(), "panel");
        assert_eq!(control.desired_bounds(), Rect::new(5.0, 6.0, 100.0, 80.0));
        assert_eq!(control.padding(), EdgeInsets::uniform(2.0));
        assert_eq!(copy.layout(loaded).unwrap().kind(), LayoutType::Vertical);
        assert_eq!(copy.layout(loaded).unwrap().spacing(), Vec2::new(0.0, 4.0));
        assert_eq!(copy.scroll_direction(loaded), ScrollDirection::Both);

        let ok = copy.find_control(loaded, "ok").unwrap();
        assert_eq!(copy.text(ok), Some("OK"));
        let ok = copy.control(ok).unwrap();
        assert_eq!(ok.size_modes().width, AutoSize::PercentParent);
        assert_eq!(ok.alignment(), Alignment::CENTER);
        assert_eq!(ok.focus_index(), Some(0));

        let sound = copy.children(loaded)[1];
        assert!(copy.widget::<CheckBox>(sound).unwrap().checked());
        assert!(!copy.control(sound).unwrap().is_enabled());
    }

    #[test]
    fn unknown_types_are_rejected_without_leaking() {
        let mut tree = ControlTree::default();
        let mut reader = JsonReader::parse(
            r#"{ "root": { "$type": "Container", "children": [ { "$type": "Slider" } ] } }"#,
        )
        .unwrap();
        let result = tree.load_control("root", &mut reader, &ControlFactory::default());
        assert!(matches!(result, Err(UiError::UnknownControlType(name)) if name == "Slider"));
        assert!(tree.is_empty());
    }
}
