use idcard_designer::render::NodeKind;
use idcard_designer::store::{JsonFileStore, LogAuditSink, MemoryStore};
use idcard_designer::template::{BackgroundKind, PhotoShape, TemplatePatch, CR80_LONG_MM, CR80_SHORT_MM};
use idcard_designer::{
    render, resolve_display_value, save, Axis, Delta, DesignerConfig, DesignerError, Editor, Orientation, Scale,
    Selection, Side, Student, Template, TemplateStore,
};
use std::fs;
use std::path::Path;

const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

fn editor() -> Editor {
    Editor::new(Template::standard(), DesignerConfig::default())
}

fn selectables() -> Vec<Selection> {
    vec![
        Selection::Photo,
        Selection::Qr,
        Selection::Sign,
        Selection::Logo,
        Selection::HeaderText,
        Selection::Field("rollNo".to_string()),
    ]
}

#[test]
fn field_keys_stay_unique() {
    let mut ed = editor();
    ed.add_field("fatherMobile").unwrap();
    for key in ["fatherMobile", "name", "dob"] {
        let err = ed.add_field(key).unwrap_err();
        assert!(matches!(err, DesignerError::DuplicateField(k) if k == key));
    }

    let mut keys: Vec<_> = ed.template().fields.iter().map(|f| f.key.clone()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

#[test]
fn nudge_there_and_back_restores_template() {
    for selection in selectables() {
        for axis in [Axis::X, Axis::Y] {
            for fine in [false, true] {
                let mut ed = editor();
                ed.select_element(selection.clone());
                let before = ed.template().clone();
                ed.nudge(axis, Delta::Increase, fine);
                assert_ne!(ed.template(), &before, "{:?} did not move", selection);
                ed.nudge(axis, Delta::Decrease, fine);

                let after = ed.template();
                let (bx, by) = position(&before, &selection);
                let (ax, ay) = position(after, &selection);
                assert!((bx - ax).abs() < 1e-4 && (by - ay).abs() < 1e-4, "{:?} drifted", selection);
            }
        }
    }
}

fn position(t: &Template, selection: &Selection) -> (f32, f32) {
    match selection {
        Selection::Photo => (t.photo_x, t.photo_y),
        Selection::Qr => (t.qr_x, t.qr_y),
        Selection::Sign => (t.sign_x, t.sign_y),
        Selection::Logo => (t.logo_x, t.logo_y),
        Selection::HeaderText => (t.header_text_x, t.header_text_y),
        Selection::Field(key) => {
            let f = t.field(key).unwrap();
            (f.x, f.y)
        }
        Selection::None => (0.0, 0.0),
    }
}

#[test]
fn resizing_never_goes_below_floors() {
    let mut ed = editor();
    for selection in selectables() {
        ed.select_element(selection);
        for _ in 0..100 {
            ed.resize(Delta::Decrease, false);
        }
        for _ in 0..10 {
            ed.resize(Delta::Decrease, true);
        }
    }

    let t = ed.template();
    assert_eq!(t.photo_size, 10.0);
    assert_eq!(t.qr_size, 5.0);
    assert_eq!(t.sign_width, 5.0);
    assert_eq!(t.logo_size, 4.0);
    assert_eq!(t.header_text_size, 4.0);
    assert_eq!(t.field("rollNo").unwrap().font_size, 2.0);
}

#[test]
fn nine_photo_shrinks_stop_at_the_floor() {
    let mut ed = editor();
    ed.select_element(Selection::Photo);
    for _ in 0..9 {
        ed.resize(Delta::Decrease, false);
    }
    assert_eq!(ed.template().photo_size, 10.0);
}

#[test]
fn orientation_round_trip_restores_dimensions() {
    let mut ed = editor();
    ed.set_orientation(Orientation::Vertical);
    assert_eq!((ed.template().width, ed.template().height), (CR80_SHORT_MM, CR80_LONG_MM));
    ed.set_orientation(Orientation::Horizontal);
    assert_eq!((ed.template().width, ed.template().height), (CR80_LONG_MM, CR80_SHORT_MM));
}

#[test]
fn missing_values_render_as_na() {
    let student = Student {
        name: Some("Ravi".to_string()),
        roll_no: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(resolve_display_value("rollNo", &student), "N/A");
    assert_eq!(resolve_display_value("bloodGroup", &student), "N/A");
    assert_eq!(resolve_display_value("notAKey", &student), "N/A");
    assert_eq!(resolve_display_value("classSection", &student), "N/A");

    let tree = render(&Template::standard(), &student, Side::Front, Scale::PRINT);
    let texts: Vec<&str> = tree
        .nodes
        .iter()
        .filter_map(|n| match &n.kind {
            NodeKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(texts.contains(&"Roll No: N/A"));
    assert!(texts.contains(&"Ravi"));
}

#[test]
fn added_father_mobile_is_selectable_and_rendered() {
    let mut ed = editor();
    ed.add_field("fatherMobile").unwrap();
    let target = Selection::Field("fatherMobile".to_string());
    assert_eq!(ed.selection(), &target);
    let field = ed.template().field("fatherMobile").unwrap().clone();
    assert_eq!(field.label, "Father Mobile");

    // adding it again is rejected and changes nothing
    let before = ed.template().clone();
    let err = ed.add_field("fatherMobile").unwrap_err();
    assert!(matches!(err, DesignerError::DuplicateField(ref k) if k == "fatherMobile"));
    assert_eq!(ed.template(), &before);
    assert_eq!(ed.selection(), &target);

    let student = Student {
        father_mobile: Some("9876543210".to_string()),
        ..Student::sample()
    };
    let scale = Scale::from_zoom(10);
    let tree = render(ed.template(), &student, Side::Front, scale);
    let node = tree.nodes_for(&target).next().expect("field not rendered");
    match &node.kind {
        NodeKind::Text { text, .. } => assert_eq!(text, "Father Mobile: 9876543210"),
        other => panic!("unexpected node {:?}", other),
    }

    let (cx, cy) = (node.bounds.x + 1.0, node.bounds.y + 1.0);
    assert_eq!(tree.hit_test(cx, cy), target);

    ed.select_element(tree.hit_test(cx, cy));
    ed.nudge(Axis::Y, Delta::Increase, false);
    assert_eq!(ed.template().field("fatherMobile").unwrap().y, field.y + 1.0);
}

#[test]
fn json_store_round_trip_keeps_every_element() {
    fs::create_dir_all("tests/output").unwrap();
    let path = Path::new("tests/output/test-round-trip.json");
    fs::remove_file(path).ok();

    let mut ed = editor();
    ed.add_field("fatherMobile").unwrap();
    ed.update_template(TemplatePatch {
        background_kind: Some(BackgroundKind::Image),
        background_image: Some(TINY_PNG.into()),
        logo_image: Some(TINY_PNG.into()),
        sign_image: Some(TINY_PNG.into()),
        photo_shape: Some(PhotoShape::Circle),
        back_text: Some("If found, please return to the school office.".to_string()),
        snap_to_grid: Some(true),
        ..Default::default()
    });
    ed.set_orientation(Orientation::Vertical);

    let mut store = JsonFileStore::new(path);
    let saved = save(&mut ed, &mut store, &LogAuditSink, "admin").unwrap();

    let loaded = store.get_templates().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], saved);
    assert_eq!(&loaded[0], ed.template());
    fs::remove_file(path).ok();
}

#[test]
fn failed_save_can_be_retried() {
    let mut store = MemoryStore {
        reject_writes: true,
        ..Default::default()
    };
    let mut ed = editor();
    ed.add_field("house").unwrap();

    assert!(matches!(
        save(&mut ed, &mut store, &LogAuditSink, "admin"),
        Err(DesignerError::SaveFailure(_))
    ));
    assert!(ed.template().has_field("house"));

    store.reject_writes = false;
    let saved = save(&mut ed, &mut store, &LogAuditSink, "admin").unwrap();
    assert!(saved.has_field("house"));
}
