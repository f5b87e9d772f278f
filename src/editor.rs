// Editor: commands, their pure application and undo/redo history
//
// Apart from adding a duplicate field, commands never fail. An action that
// does not make sense for the current selection leaves the template as it was.

use crate::config::DesignerConfig;
use crate::error::{DesignerError, Result};
use crate::registry;
use crate::template::{FieldPatch, Orientation, Template, TemplatePatch};
use crate::units::Scale;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// ============================================================================
// Selection and command types
// ============================================================================

/// The element currently being positioned or resized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Photo,
    Qr,
    Sign,
    Logo,
    HeaderText,
    Field(String),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delta {
    Increase,
    Decrease,
}

impl Delta {
    fn sign(self) -> f32 {
        match self {
            Delta::Increase => 1.0,
            Delta::Decrease => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    Select {
        element: Selection,
    },
    /// Moves the selection by one step. With snap-to-grid a coarse nudge
    /// also lands on the grid, so only elements already on the grid return
    /// to their start after +1 then -1.
    Nudge {
        axis: Axis,
        delta: Delta,
        #[serde(default)]
        fine: bool,
    },
    /// End of a drag: place the selected element at `x`, `y` (mm)
    MoveTo {
        x: f32,
        y: f32,
    },
    Resize {
        delta: Delta,
        #[serde(default)]
        fine: bool,
    },
    AddField {
        key: String,
    },
    RemoveField {
        key: String,
    },
    UpdateField {
        key: String,
        patch: FieldPatch,
    },
    SetOrientation {
        orientation: Orientation,
    },
    UpdateTemplate {
        patch: TemplatePatch,
    },
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub template: Template,
    pub selection: Selection,
}

// ============================================================================
// Pure command application
// ============================================================================

pub fn apply(
    template: &Template,
    selection: &Selection,
    command: &Command,
    config: &DesignerConfig,
) -> Result<Applied> {
    let unchanged = || Applied {
        template: template.clone(),
        selection: selection.clone(),
    };

    let applied = match command {
        Command::Select { element } => {
            let exists = match element {
                Selection::Field(key) => template.has_field(key),
                _ => true,
            };
            if exists {
                Applied {
                    template: template.clone(),
                    selection: element.clone(),
                }
            } else {
                unchanged()
            }
        }
        Command::Nudge { axis, delta, fine } => {
            let step = if *fine { config.fine_nudge_step } else { config.nudge_step };
            let snap = template.snap_to_grid && !*fine;
            let mut next = template.clone();
            if let Some((x, y)) = position_mut(&mut next, selection) {
                let value = match axis {
                    Axis::X => x,
                    Axis::Y => y,
                };
                *value += delta.sign() * step;
                if snap {
                    *value = snap_to_grid(*value, config.grid_mm);
                }
            }
            Applied {
                template: next,
                selection: selection.clone(),
            }
        }
        Command::MoveTo { x, y } => {
            let snap = template.snap_to_grid;
            let mut next = template.clone();
            if let Some((px, py)) = position_mut(&mut next, selection) {
                *px = if snap { snap_to_grid(*x, config.grid_mm) } else { *x };
                *py = if snap { snap_to_grid(*y, config.grid_mm) } else { *y };
            }
            Applied {
                template: next,
                selection: selection.clone(),
            }
        }
        Command::Resize { delta, fine } => {
            let mut next = template.clone();
            if let Some(size) = size_mut(&mut next, selection, config) {
                let step = if *fine { size.fine_step } else { size.step };
                *size.value = (*size.value + delta.sign() * step).max(size.floor);
            }
            Applied {
                template: next,
                selection: selection.clone(),
            }
        }
        Command::AddField { key } => match registry::add_field(template, key) {
            Ok(next) => Applied {
                template: next,
                selection: Selection::Field(key.clone()),
            },
            Err(DesignerError::UnknownField(_)) => {
                warn!("no catalog entry for '{}', field not added", key);
                unchanged()
            }
            Err(e) => return Err(e),
        },
        Command::RemoveField { key } => {
            let mut next = template.clone();
            next.fields.retain(|f| &f.key != key);
            let selection = match selection {
                Selection::Field(selected) if selected == key => Selection::None,
                other => other.clone(),
            };
            Applied {
                template: next,
                selection,
            }
        }
        Command::UpdateField { key, patch } => {
            let mut next = template.clone();
            if let Some(field) = next.fields.iter_mut().find(|f| &f.key == key) {
                *field = field.merge(patch);
                if patch.font_size.is_some() {
                    field.font_size = field.font_size.max(config.limits.font_size);
                }
            }
            Applied {
                template: next,
                selection: selection.clone(),
            }
        }
        Command::SetOrientation { orientation } => {
            let mut next = template.clone();
            let (width, height) = Template::canonical_dimensions(*orientation);
            next.orientation = *orientation;
            next.width = width;
            next.height = height;
            Applied {
                template: next,
                selection: selection.clone(),
            }
        }
        Command::UpdateTemplate { patch } => {
            let mut next = template.merge(patch);
            if patch.header_text_size.is_some() {
                next.header_text_size = next.header_text_size.max(config.limits.header_text_size);
            }
            Applied {
                template: next,
                selection: selection.clone(),
            }
        }
    };

    Ok(applied)
}

/// The pair of template values an element's position is stored in.
fn position_mut<'a>(template: &'a mut Template, selection: &Selection) -> Option<(&'a mut f32, &'a mut f32)> {
    match selection {
        Selection::None => None,
        Selection::Photo => Some((&mut template.photo_x, &mut template.photo_y)),
        Selection::Qr => Some((&mut template.qr_x, &mut template.qr_y)),
        Selection::Sign => Some((&mut template.sign_x, &mut template.sign_y)),
        Selection::Logo => Some((&mut template.logo_x, &mut template.logo_y)),
        Selection::HeaderText => Some((&mut template.header_text_x, &mut template.header_text_y)),
        Selection::Field(key) => template
            .fields
            .iter_mut()
            .find(|f| &f.key == key)
            .map(|f| (&mut f.x, &mut f.y)),
    }
}

struct SizeSlot<'a> {
    value: &'a mut f32,
    step: f32,
    fine_step: f32,
    floor: f32,
}

fn size_mut<'a>(template: &'a mut Template, selection: &Selection, config: &DesignerConfig) -> Option<SizeSlot<'a>> {
    let limits = &config.limits;
    let length = |value: &'a mut f32, floor: f32| SizeSlot {
        value,
        step: config.size_step,
        fine_step: config.fine_size_step,
        floor,
    };
    let font = |value: &'a mut f32, floor: f32| SizeSlot {
        value,
        step: config.font_step,
        fine_step: config.fine_font_step,
        floor,
    };

    match selection {
        Selection::None => None,
        Selection::Photo => Some(length(&mut template.photo_size, limits.photo_size)),
        Selection::Qr => Some(length(&mut template.qr_size, limits.qr_size)),
        Selection::Sign => Some(length(&mut template.sign_width, limits.sign_width)),
        Selection::Logo => Some(length(&mut template.logo_size, limits.logo_size)),
        Selection::HeaderText => Some(font(&mut template.header_text_size, limits.header_text_size)),
        Selection::Field(key) => template
            .fields
            .iter_mut()
            .find(|f| &f.key == key)
            .map(|f| font(&mut f.font_size, limits.font_size)),
    }
}

fn snap_to_grid(value: f32, grid: f32) -> f32 {
    (value / grid).round() * grid
}

// ============================================================================
// Keyboard mapping
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Plus,
    Minus,
    Delete,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    /// Shift selects the fine step
    pub shift: bool,
}

/// Arrow keys nudge (y grows downwards), `+`/`-` resize, `Delete` removes a
/// selected field and `Escape` clears the selection.
pub fn command_for_key(input: KeyInput, selection: &Selection) -> Option<Command> {
    let fine = input.shift;
    let nudge = |axis, delta| Some(Command::Nudge { axis, delta, fine });
    match input.key {
        Key::Left => nudge(Axis::X, Delta::Decrease),
        Key::Right => nudge(Axis::X, Delta::Increase),
        Key::Up => nudge(Axis::Y, Delta::Decrease),
        Key::Down => nudge(Axis::Y, Delta::Increase),
        Key::Plus => Some(Command::Resize {
            delta: Delta::Increase,
            fine,
        }),
        Key::Minus => Some(Command::Resize {
            delta: Delta::Decrease,
            fine,
        }),
        Key::Delete => match selection {
            Selection::Field(key) => Some(Command::RemoveField { key: key.clone() }),
            _ => None,
        },
        Key::Escape => Some(Command::Select {
            element: Selection::None,
        }),
    }
}

// ============================================================================
// Editor
// ============================================================================

/// Holds the template being designed, the selection and undo/redo history.
#[derive(Debug, Clone)]
pub struct Editor {
    template: Template,
    selection: Selection,
    config: DesignerConfig,
    undo: Vec<Template>,
    redo: Vec<Template>,
}

impl Editor {
    pub fn new(template: Template, config: DesignerConfig) -> Self {
        Editor {
            template,
            selection: Selection::None,
            config,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Applies `command`. Only a template change creates a history entry.
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        let applied = apply(&self.template, &self.selection, command, &self.config)?;
        debug!("applied {:?}", command);
        self.selection = applied.selection;
        if applied.template != self.template {
            let previous = std::mem::replace(&mut self.template, applied.template);
            self.push_undo(previous);
            self.redo.clear();
        }
        Ok(())
    }

    pub fn execute_all(&mut self, commands: &[Command]) -> Result<()> {
        commands.iter().try_for_each(|c| self.execute(c))
    }

    fn execute_total(&mut self, command: Command) {
        if let Err(e) = self.execute(&command) {
            warn!("ignored {:?}: {}", command, e);
        }
    }

    fn push_undo(&mut self, template: Template) {
        self.undo.push(template);
        if self.undo.len() > self.config.history_depth {
            let excess = self.undo.len() - self.config.history_depth;
            self.undo.drain(..excess);
        }
    }

    pub fn select_element(&mut self, element: Selection) {
        self.execute_total(Command::Select { element });
    }

    pub fn nudge(&mut self, axis: Axis, delta: Delta, fine: bool) {
        self.execute_total(Command::Nudge { axis, delta, fine });
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.execute_total(Command::MoveTo { x, y });
    }

    /// Drops the selected element at an on-screen position.
    pub fn drag_to(&mut self, screen_x: f32, screen_y: f32, scale: Scale) {
        let (x, y) = scale.point_to_mm(screen_x, screen_y);
        self.move_to(x, y);
    }

    pub fn resize(&mut self, delta: Delta, fine: bool) {
        self.execute_total(Command::Resize { delta, fine });
    }

    pub fn add_field(&mut self, key: &str) -> Result<()> {
        self.execute(&Command::AddField { key: key.to_string() })
    }

    pub fn remove_field(&mut self, key: &str) {
        self.execute_total(Command::RemoveField { key: key.to_string() });
    }

    pub fn update_field(&mut self, key: &str, patch: FieldPatch) {
        self.execute_total(Command::UpdateField {
            key: key.to_string(),
            patch,
        });
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.execute_total(Command::SetOrientation { orientation });
    }

    pub fn update_template(&mut self, patch: TemplatePatch) {
        self.execute_total(Command::UpdateTemplate { patch });
    }

    pub fn handle_key(&mut self, input: KeyInput) {
        if let Some(command) = command_for_key(input, &self.selection) {
            self.execute_total(command);
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.template, previous);
                self.redo.push(current);
                self.drop_stale_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.template, next);
                self.push_undo(current);
                self.drop_stale_selection();
                true
            }
            None => false,
        }
    }

    fn drop_stale_selection(&mut self) {
        if let Selection::Field(key) = &self.selection {
            if !self.template.has_field(key) {
                self.selection = Selection::None;
            }
        }
    }

    /// Records the id the store assigned. Applied to the history too, so
    /// undoing past a save never produces an unsaved copy.
    pub fn adopt_id(&mut self, id: &str) {
        let id = Some(id.to_string());
        self.template.id = id.clone();
        for template in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            template.id = id.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{CR80_LONG_MM, CR80_SHORT_MM};

    fn editor() -> Editor {
        Editor::new(Template::standard(), DesignerConfig::default())
    }

    #[test]
    fn selecting_does_not_touch_template() {
        let mut ed = editor();
        ed.select_element(Selection::Qr);
        assert_eq!(ed.selection(), &Selection::Qr);
        assert_eq!(ed.template(), &Template::standard());
        assert!(!ed.can_undo());
    }

    #[test]
    fn selecting_unknown_field_is_ignored() {
        let mut ed = editor();
        ed.select_element(Selection::Photo);
        ed.select_element(Selection::Field("nope".to_string()));
        assert_eq!(ed.selection(), &Selection::Photo);
    }

    #[test]
    fn nudge_moves_the_matching_pair() {
        let mut ed = editor();
        ed.select_element(Selection::Photo);
        ed.nudge(Axis::X, Delta::Increase, false);
        ed.nudge(Axis::Y, Delta::Decrease, true);
        assert_eq!(ed.template().photo_x, 6.0);
        assert!((ed.template().photo_y - 14.9).abs() < 1e-4);

        ed.select_element(Selection::Field("rollNo".to_string()));
        ed.nudge(Axis::X, Delta::Decrease, false);
        assert_eq!(ed.template().field("rollNo").unwrap().x, 33.0);

        ed.select_element(Selection::HeaderText);
        ed.nudge(Axis::Y, Delta::Increase, false);
        assert_eq!(ed.template().header_text_y, 1.0);
    }

    #[test]
    fn nudge_without_selection_is_noop() {
        let mut ed = editor();
        ed.nudge(Axis::X, Delta::Increase, false);
        assert_eq!(ed.template(), &Template::standard());
        assert!(!ed.can_undo());
    }

    #[test]
    fn snap_to_grid_rounds_coarse_moves() {
        let mut ed = editor();
        ed.update_template(TemplatePatch {
            snap_to_grid: Some(true),
            ..Default::default()
        });
        ed.select_element(Selection::Qr);
        ed.nudge(Axis::X, Delta::Increase, true);
        assert!((ed.template().qr_x - 68.1).abs() < 1e-4);
        ed.nudge(Axis::X, Delta::Increase, false);
        assert_eq!(ed.template().qr_x, 69.0);
        ed.move_to(10.4, 20.6);
        assert_eq!((ed.template().qr_x, ed.template().qr_y), (10.0, 21.0));
    }

    #[test]
    fn snapped_nudge_round_trips_on_the_grid() {
        let mut ed = editor();
        ed.update_template(TemplatePatch {
            snap_to_grid: Some(true),
            ..Default::default()
        });
        ed.select_element(Selection::Photo);
        ed.nudge(Axis::Y, Delta::Increase, false);
        ed.nudge(Axis::Y, Delta::Decrease, false);
        assert_eq!(ed.template().photo_y, 15.0);

        // off-grid elements land on the grid first
        ed.nudge(Axis::Y, Delta::Decrease, true);
        ed.nudge(Axis::Y, Delta::Increase, false);
        ed.nudge(Axis::Y, Delta::Decrease, false);
        assert_eq!(ed.template().photo_y, 15.0);
    }

    #[test]
    fn drag_maps_screen_position_to_mm() {
        let mut ed = editor();
        let scale = Scale::from_zoom(10);
        ed.select_element(Selection::Logo);
        ed.drag_to(scale.to_screen(12.0), scale.to_screen(3.0), scale);
        assert!((ed.template().logo_x - 12.0).abs() < 1e-4);
        assert!((ed.template().logo_y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn resize_respects_floors() {
        let mut ed = editor();
        ed.select_element(Selection::Qr);
        for _ in 0..20 {
            ed.resize(Delta::Decrease, false);
        }
        assert_eq!(ed.template().qr_size, 5.0);

        ed.select_element(Selection::Field("dob".to_string()));
        for _ in 0..20 {
            ed.resize(Delta::Decrease, true);
        }
        assert_eq!(ed.template().field("dob").unwrap().font_size, 2.0);

        ed.resize(Delta::Increase, false);
        assert_eq!(ed.template().field("dob").unwrap().font_size, 3.0);
    }

    #[test]
    fn floors_come_from_config() {
        let mut config = DesignerConfig::default();
        config.limits.photo_size = 20.0;
        let mut ed = Editor::new(Template::standard(), config);
        ed.select_element(Selection::Photo);
        for _ in 0..5 {
            ed.resize(Delta::Decrease, false);
        }
        assert_eq!(ed.template().photo_size, 20.0);
    }

    #[test]
    fn remove_selected_field_clears_selection() {
        let mut ed = editor();
        ed.select_element(Selection::Field("dob".to_string()));
        ed.remove_field("dob");
        assert!(!ed.template().has_field("dob"));
        assert!(ed.selection().is_none());
    }

    #[test]
    fn remove_other_field_keeps_selection() {
        let mut ed = editor();
        ed.select_element(Selection::Photo);
        ed.remove_field("dob");
        assert_eq!(ed.selection(), &Selection::Photo);
    }

    #[test]
    fn update_field_merges_and_ignores_unknown_keys() {
        let mut ed = editor();
        let patch = FieldPatch {
            color: Some("#ff0000".to_string()),
            align: Some(crate::template::Align::Center),
            ..Default::default()
        };
        ed.update_field("rollNo", patch.clone());
        let field = ed.template().field("rollNo").unwrap();
        assert_eq!(field.color, "#ff0000");
        assert_eq!(field.label, "Roll No");

        let before = ed.template().clone();
        ed.update_field("missing", patch);
        assert_eq!(ed.template(), &before);
    }

    #[test]
    fn patched_sizes_respect_floors() {
        let mut ed = editor();
        ed.update_field(
            "rollNo",
            FieldPatch {
                font_size: Some(-3.0),
                ..Default::default()
            },
        );
        assert_eq!(ed.template().field("rollNo").unwrap().font_size, 2.0);

        ed.update_template(TemplatePatch {
            header_text_size: Some(0.0),
            ..Default::default()
        });
        assert_eq!(ed.template().header_text_size, 4.0);

        ed.update_template(TemplatePatch {
            header_text_size: Some(12.0),
            ..Default::default()
        });
        assert_eq!(ed.template().header_text_size, 12.0);
    }

    #[test]
    fn layer_can_be_set_and_cleared() {
        let mut ed = editor();
        ed.update_field(
            "dob",
            FieldPatch {
                layer: Some(Some(3)),
                ..Default::default()
            },
        );
        assert_eq!(ed.template().field("dob").unwrap().layer, Some(3));

        let clear: FieldPatch = serde_json::from_str(r#"{"layer": null}"#).unwrap();
        assert_eq!(clear.layer, Some(None));
        ed.update_field("dob", clear);
        assert_eq!(ed.template().field("dob").unwrap().layer, None);

        let untouched: FieldPatch = serde_json::from_str(r#"{"bold": true}"#).unwrap();
        assert_eq!(untouched.layer, None);
    }

    #[test]
    fn add_field_selects_it() {
        let mut ed = editor();
        ed.add_field("house").unwrap();
        assert_eq!(ed.selection(), &Selection::Field("house".to_string()));
    }

    #[test]
    fn unknown_field_key_is_ignored() {
        let mut ed = editor();
        ed.select_element(Selection::Photo);
        ed.add_field("favouriteColour").unwrap();
        assert_eq!(ed.template(), &Template::standard());
        assert_eq!(ed.selection(), &Selection::Photo);
        assert!(!ed.can_undo());
    }

    #[test]
    fn orientation_swaps_dimensions() {
        let mut ed = editor();
        ed.set_orientation(Orientation::Vertical);
        assert_eq!((ed.template().width, ed.template().height), (CR80_SHORT_MM, CR80_LONG_MM));
        ed.set_orientation(Orientation::Horizontal);
        assert_eq!((ed.template().width, ed.template().height), (CR80_LONG_MM, CR80_SHORT_MM));
    }

    #[test]
    fn undo_and_redo_walk_history() {
        let mut ed = editor();
        ed.add_field("bloodGroup").unwrap();
        ed.remove_field("name");
        assert!(ed.undo());
        assert!(ed.template().has_field("name"));
        assert!(ed.undo());
        assert!(!ed.template().has_field("bloodGroup"));
        assert!(ed.selection().is_none());
        assert!(!ed.undo());
        assert!(ed.redo());
        assert!(ed.template().has_field("bloodGroup"));
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut ed = editor();
        ed.set_orientation(Orientation::Vertical);
        ed.undo();
        assert!(ed.can_redo());
        ed.select_element(Selection::Photo);
        ed.nudge(Axis::X, Delta::Increase, false);
        assert!(!ed.can_redo());
    }

    #[test]
    fn history_is_bounded() {
        let config = DesignerConfig {
            history_depth: 3,
            ..Default::default()
        };
        let mut ed = Editor::new(Template::standard(), config);
        ed.select_element(Selection::Photo);
        for _ in 0..10 {
            ed.nudge(Axis::X, Delta::Increase, false);
        }
        let mut steps = 0;
        while ed.undo() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(ed.template().photo_x, 12.0);
    }

    #[test]
    fn keys_map_to_commands() {
        let mut ed = editor();
        ed.select_element(Selection::Field("name".to_string()));
        ed.handle_key(KeyInput { key: Key::Right, shift: false });
        ed.handle_key(KeyInput { key: Key::Down, shift: true });
        ed.handle_key(KeyInput { key: Key::Plus, shift: false });
        let field = ed.template().field("name").unwrap();
        assert_eq!(field.x, 35.0);
        assert!((field.y - 15.1).abs() < 1e-4);
        assert_eq!(field.font_size, 10.0);

        ed.handle_key(KeyInput { key: Key::Delete, shift: false });
        assert!(!ed.template().has_field("name"));
        assert!(ed.selection().is_none());

        ed.select_element(Selection::Photo);
        ed.handle_key(KeyInput { key: Key::Escape, shift: false });
        assert!(ed.selection().is_none());
    }

    #[test]
    fn delete_key_ignores_non_field_selection() {
        let selection = Selection::Photo;
        let input = KeyInput { key: Key::Delete, shift: false };
        assert_eq!(command_for_key(input, &selection), None);
    }

    #[test]
    fn adopt_id_reaches_history() {
        let mut ed = editor();
        ed.set_orientation(Orientation::Vertical);
        ed.adopt_id("AB12CD34");
        ed.undo();
        assert_eq!(ed.template().id.as_deref(), Some("AB12CD34"));
    }

    #[test]
    fn commands_parse_from_json() {
        let commands: Vec<Command> = serde_json::from_str(
            r#"[
                {"op": "select", "element": {"kind": "field", "key": "rollNo"}},
                {"op": "nudge", "axis": "x", "delta": "increase"},
                {"op": "resize", "delta": "decrease", "fine": true},
                {"op": "setOrientation", "orientation": "VERTICAL"},
                {"op": "updateField", "key": "rollNo", "patch": {"bold": true}},
                {"op": "select", "element": {"kind": "photo"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(commands.len(), 6);
        assert_eq!(
            commands[0],
            Command::Select {
                element: Selection::Field("rollNo".to_string())
            }
        );
        assert_eq!(
            commands[1],
            Command::Nudge {
                axis: Axis::X,
                delta: Delta::Increase,
                fine: false
            }
        );
    }
}
