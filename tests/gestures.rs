//! Gesture sessions driven through the public designer API

use layout_designer::layout::SnapTarget;
use layout_designer::{
    save_form, Bounds, DesignError, LayoutDesigner, LayoutModel, NewComponent, PaddingKind, Point,
    PositionKind, ResizeEdge, TableMetrics,
};
use pretty_assertions::assert_eq;

fn empty_form() -> LayoutDesigner {
    let mut model = LayoutModel::new();
    model.add_component("Form", true);
    model.set_form_size("Form", Some((400, 300)));
    let metrics = TableMetrics::new()
        .with_component("jButton1", 80, 24)
        .with_component("jButton2", 80, 24);
    LayoutDesigner::new(model, metrics)
}

fn start_adding(designer: &mut LayoutDesigner, id: &str) {
    designer
        .start_adding(
            vec![NewComponent::new(id)],
            &[Bounds::new(0, 0, 80, 24)],
            Point::new(0, 0),
            Some("Form"),
        )
        .unwrap();
}

/// Empty form with jButton1 snapped to the leading border at y = 100
fn form_with_button() -> LayoutDesigner {
    let mut designer = empty_form();
    start_adding(&mut designer, "jButton1");
    designer
        .move_to(Point::new(17, 100), Some("Form"), true, false)
        .unwrap();
    assert!(designer.end_moving(true).unwrap());
    designer
}

#[test_log::test]
fn test_snap_tolerance_boundary() {
    let mut designer = empty_form();
    start_adding(&mut designer, "jButton1");

    // the border padding is 10: 7 px away snaps, 8 px away does not
    let far = designer
        .move_to(Point::new(18, 100), Some("Form"), true, false)
        .unwrap();
    assert!(!far.positions[0].is_snapped());
    assert_eq!(far.bounds[0].1, Bounds::new(18, 100, 80, 24));

    let near = designer
        .move_to(Point::new(17, 100), Some("Form"), true, false)
        .unwrap();
    assert_eq!(
        near.positions[0].kind,
        PositionKind::NextTo {
            target: SnapTarget::Border,
            padding: PaddingKind::Related,
        }
    );
    assert_eq!(near.bounds[0].1, Bounds::new(10, 100, 80, 24));
    assert!(!near.positions[1].is_snapped());

    assert!(designer.end_moving(true).unwrap());
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 80, 24)));
    insta::assert_snapshot!(save_form(designer.model()), @r###"
    container Form [width: 400, height: 300] {
        horizontal parallel {
            sequential {
                gap
                component jButton1
                gap [min: 0, max: unbounded]
            }
        }
        vertical parallel {
            sequential {
                gap [pref: 100]
                component jButton1
                gap [min: 0, max: unbounded]
            }
        }
    }
    "###);
}

#[test_log::test]
fn test_preview_is_idempotent() {
    let mut designer = form_with_button();
    let saved = save_form(designer.model());
    let mark = designer.change_mark();

    designer
        .start_moving(&["jButton1"], &[Bounds::new(10, 100, 80, 24)], Point::new(50, 110))
        .unwrap();
    let first = designer
        .move_to(Point::new(143, 61), Some("Form"), true, false)
        .unwrap();
    let second = designer
        .move_to(Point::new(143, 61), Some("Form"), true, false)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(save_form(designer.model()), saved);

    assert!(!designer.end_moving(false).unwrap());
    assert_eq!(save_form(designer.model()), saved);
    assert_eq!(designer.change_mark(), mark);
}

#[test_log::test]
fn test_add_then_undo_restores_model() {
    let mut designer = form_with_button();
    let saved = save_form(designer.model());
    let bounds: Vec<(String, Bounds)> = designer
        .layout()
        .iter()
        .map(|(id, b)| (id.to_string(), *b))
        .collect();
    let mark = designer.change_mark();

    start_adding(&mut designer, "jButton2");
    designer
        .move_to(Point::new(120, 100), Some("Form"), true, false)
        .unwrap();
    assert!(designer.end_moving(true).unwrap());
    assert!(designer.model().contains("jButton2"));

    designer.undo_to(mark).unwrap();
    assert_eq!(save_form(designer.model()), saved);
    let restored: Vec<(String, Bounds)> = designer
        .layout()
        .iter()
        .map(|(id, b)| (id.to_string(), *b))
        .collect();
    assert_eq!(restored, bounds);
    assert!(!designer.model().contains("jButton2"));

    // a new change drops the undone one
    assert!(designer.redo().unwrap());
    designer.undo().unwrap();
    designer.resize_container("Form", 420, 300).unwrap();
    assert!(!designer.redo().unwrap());
}

#[test_log::test]
fn test_resize_to_border_makes_resizable() {
    let mut designer = form_with_button();
    designer
        .start_resizing(
            &["jButton1"],
            &[Bounds::new(10, 100, 80, 24)],
            Point::new(90, 112),
            [ResizeEdge::Trailing, ResizeEdge::None],
            true,
        )
        .unwrap();
    let preview = designer
        .move_to(Point::new(385, 112), None, true, false)
        .unwrap();
    assert_eq!(preview.bounds[0].1, Bounds::new(10, 100, 380, 24));
    assert_eq!(preview.inclusions[1], None);
    assert!(designer.end_moving(true).unwrap());
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 380, 24)));

    designer.resize_container("Form", 500, 300).unwrap();
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 480, 24)));
}

#[test_log::test]
fn test_session_errors() {
    let mut designer = form_with_button();
    assert_eq!(designer.end_moving(true), Err(DesignError::NoSession));

    let err = designer
        .start_adding(
            vec![NewComponent::new("jButton2")],
            &[Bounds::new(0, 0, 80, 24)],
            Point::new(0, 0),
            Some("Frm"),
        )
        .unwrap_err();
    assert!(matches!(err, DesignError::UnknownContainer { .. }));
    assert_eq!(err.suggestions(), Some(&["Form".to_string()][..]));

    let err = designer
        .start_adding(
            vec![NewComponent::new("jButton1")],
            &[Bounds::new(0, 0, 80, 24)],
            Point::new(0, 0),
            None,
        )
        .unwrap_err();
    assert_eq!(
        err,
        DesignError::DuplicateComponent {
            id: "jButton1".to_string()
        }
    );

    designer
        .start_moving(&["jButton1"], &[Bounds::new(10, 100, 80, 24)], Point::new(0, 0))
        .unwrap();
    assert_eq!(
        designer.start_moving(&["jButton1"], &[Bounds::new(10, 100, 80, 24)], Point::new(0, 0)),
        Err(DesignError::SessionActive)
    );
    assert_eq!(designer.undo(), Err(DesignError::SessionActive));
    assert!(!designer.end_moving(false).unwrap());
    let err = designer.set_default_size("jButon1").unwrap_err();
    assert_eq!(err.suggestions(), Some(&["jButton1".to_string()][..]));
}

#[test_log::test]
fn test_indent_snap_commits_indent_gap() {
    let mut designer = form_with_button();
    start_adding(&mut designer, "jButton2");
    let preview = designer
        .move_to(Point::new(22, 160), Some("Form"), true, false)
        .unwrap();
    assert_eq!(
        preview.positions[0].kind,
        PositionKind::Indented {
            target: "jButton1".to_string(),
        }
    );
    assert_eq!(preview.bounds[0].1, Bounds::new(20, 160, 80, 24));
    assert!(designer.end_moving(true).unwrap());

    assert_eq!(designer.bounds("jButton2"), Some(Bounds::new(20, 160, 80, 24)));
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 80, 24)));
    assert!(save_form(designer.model()).contains("gap [padding: indent]"));
}

#[test_log::test]
fn test_default_size_after_resize_is_undoable() {
    let mut designer = form_with_button();
    designer
        .start_resizing(
            &["jButton1"],
            &[Bounds::new(10, 100, 80, 24)],
            Point::new(90, 112),
            [ResizeEdge::Trailing, ResizeEdge::None],
            true,
        )
        .unwrap();
    designer
        .move_to(Point::new(110, 112), None, false, false)
        .unwrap();
    assert!(designer.end_moving(true).unwrap());
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 100, 24)));

    designer.set_default_size("jButton1").unwrap();
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 80, 24)));

    assert!(designer.undo().unwrap());
    assert_eq!(designer.bounds("jButton1"), Some(Bounds::new(10, 100, 100, 24)));

    // nothing left to reset: no extra undo step
    designer.redo().unwrap();
    let mark = designer.change_mark();
    designer.set_default_size("jButton1").unwrap();
    assert_eq!(designer.change_mark(), mark);
}
