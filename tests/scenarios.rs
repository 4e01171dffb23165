//! Recorded designer sessions replayed against the engine

use layout_designer::MetricsProvider;
use layout_designer::layout::lint;
use layout_designer::{
    load_form, save_form, Alignment, Axis, Bounds, DesignError, Inclusion, LayoutDesigner,
    NewComponent, Placement, Point, PositionKind, Preview, SizeDef, TableMetrics,
};
use pretty_assertions::assert_eq;

/// Two label/field rows and a checkbox; the fields take any extra width
const RESIZING_FORM: &str = r#"
container Form [width: 301, height: 143] {
    horizontal parallel {
        sequential {
            gap [pref: 12]
            parallel {
                sequential {
                    component jLabel1
                    gap [pref: 6]
                    component jTextField1 [max: unbounded]
                }
                sequential {
                    component jLabel2
                    gap [pref: 6]
                    component jTextField2 [max: unbounded]
                }
                component jCheckBox1
            }
            gap [pref: 12]
        }
    }
    vertical parallel {
        sequential {
            gap [pref: 12]
            parallel {
                component jLabel1
                component jTextField1
            }
            gap [pref: 6]
            parallel {
                component jLabel2
                component jTextField2
            }
            gap [pref: 6]
            component jCheckBox1
            gap [min: 0, max: unbounded]
        }
    }
}
"#;

fn resizing_designer() -> LayoutDesigner {
    let model = load_form(RESIZING_FORM).expect("Should load");
    let metrics = TableMetrics::new()
        .with_component("jLabel1", 40, 14)
        .with_component("jLabel2", 40, 14)
        .with_component("jTextField1", 231, 20)
        .with_component("jTextField2", 231, 20)
        .with_component("jCheckBox1", 100, 23);
    LayoutDesigner::new(model, metrics)
}

#[test_log::test]
fn test_drop_near_corner_snaps_to_border() {
    let mut model = layout_designer::LayoutModel::new();
    model.add_component("Form", true);
    model.set_form_size("Form", Some((400, 300)));
    let metrics = TableMetrics::new()
        .with_component("jPanel1", 100, 100)
        .with_parent_padding_all("Form", "jPanel1", 0);
    let mut designer = LayoutDesigner::new(model, metrics);

    designer
        .start_adding(
            vec![NewComponent::container("jPanel1")],
            &[Bounds::new(0, 0, 100, 100)],
            Point::new(50, 50),
            Some("Form"),
        )
        .unwrap();
    let preview = designer
        .move_to(Point::new(53, 55), Some("Form"), true, false)
        .unwrap();
    assert_eq!(preview.bounds[0].1, Bounds::new(0, 0, 100, 100));
    assert!(designer.end_moving(true).unwrap());

    assert_eq!(designer.bounds("jPanel1"), Some(Bounds::new(0, 0, 100, 100)));
    assert!(designer.model().component("jPanel1").unwrap().is_container());
    assert!(lint::check(designer.model()).is_empty());
}

#[test_log::test]
fn test_align_with_field_keeps_other_labels() {
    let model = load_form(
        r#"
        container Form [width: 300, height: 200] {
            horizontal parallel {
                sequential {
                    gap [pref: 10]
                    parallel {
                        component l1
                        component l2
                        component l3
                    }
                    gap [pref: 20]
                    component field
                    gap [min: 0, max: unbounded]
                }
            }
            vertical parallel {
                sequential {
                    gap [pref: 10]
                    component l1
                    gap [pref: 10]
                    component l2
                    gap [pref: 10]
                    component l3
                    gap [min: 0, max: unbounded]
                }
                sequential {
                    gap [pref: 37]
                    component field
                    gap [min: 0, max: unbounded]
                }
            }
        }
        "#,
    )
    .unwrap();
    let metrics = TableMetrics::new()
        .with_component("l1", 60, 15)
        .with_component("l2", 60, 15)
        .with_component("l3", 60, 15)
        .with_component("field", 100, 20);
    let mut designer = LayoutDesigner::new(model, metrics);
    assert_eq!(designer.bounds("l2"), Some(Bounds::new(10, 35, 60, 15)));
    assert_eq!(designer.bounds("field"), Some(Bounds::new(90, 37, 100, 20)));

    designer
        .start_moving(&["l2"], &[Bounds::new(10, 35, 60, 15)], Point::new(20, 40))
        .unwrap();
    let preview = designer
        .move_to(Point::new(20, 43), Some("Form"), true, false)
        .unwrap();
    assert_eq!(
        preview.positions[1].kind,
        PositionKind::Aligned {
            target: "field".to_string(),
            alignment: Alignment::Leading,
        }
    );
    assert_eq!(preview.inclusions[0], None);
    assert!(matches!(
        preview.inclusions[1],
        Some(Inclusion::AlignWith {
            alignment: Alignment::Leading,
            ..
        })
    ));
    assert!(designer.end_moving(true).unwrap());

    assert_eq!(designer.bounds("l2"), Some(Bounds::new(10, 37, 60, 15)));
    assert_eq!(designer.bounds("l1"), Some(Bounds::new(10, 10, 60, 15)));
    assert_eq!(designer.bounds("l3"), Some(Bounds::new(10, 60, 60, 15)));
    assert_eq!(designer.bounds("field"), Some(Bounds::new(90, 37, 100, 20)));
    assert!(lint::check(designer.model()).is_empty());
}

#[test_log::test]
fn test_form_growth_goes_to_resizable_fields() {
    let mut designer = resizing_designer();
    assert_eq!(designer.bounds("jTextField1"), Some(Bounds::new(58, 12, 231, 20)));
    assert_eq!(designer.bounds("jTextField2"), Some(Bounds::new(58, 38, 231, 20)));

    designer.resize_container("Form", 350, 143).unwrap();

    assert_eq!(designer.bounds("jTextField1"), Some(Bounds::new(58, 12, 280, 20)));
    assert_eq!(designer.bounds("jTextField2"), Some(Bounds::new(58, 38, 280, 20)));
    assert_eq!(designer.bounds("jLabel1"), Some(Bounds::new(12, 12, 40, 14)));
    assert_eq!(designer.bounds("jLabel2"), Some(Bounds::new(12, 38, 40, 14)));
    assert_eq!(designer.bounds("jCheckBox1"), Some(Bounds::new(12, 64, 100, 23)));
}

#[test_log::test]
fn test_metrics_change_needs_refresh() {
    let mut designer = resizing_designer();
    designer
        .metrics_mut()
        .set_sizes("jLabel1", (50, 14), (50, 14));
    assert_eq!(designer.bounds("jTextField1").map(|b| b.x), Some(58));
    designer.update_current_state();
    assert_eq!(designer.bounds("jTextField1").map(|b| b.x), Some(68));
}

#[test_log::test]
fn test_leaving_suppressed_group_fixes_size() {
    let model = load_form(
        r#"
        container Form [width: 300, height: 200] {
            horizontal parallel {
                sequential {
                    gap [pref: 10]
                    parallel [max: preferred] {
                        component a [max: unbounded]
                        component b [max: unbounded]
                        component c [max: unbounded]
                    }
                    gap [min: 0, max: unbounded]
                }
            }
            vertical parallel {
                sequential {
                    gap [pref: 10]
                    component a
                    gap [pref: 10]
                    component b
                    gap [pref: 10]
                    component c
                    gap [min: 0, max: unbounded]
                }
            }
        }
        "#,
    )
    .unwrap();
    let metrics = TableMetrics::new()
        .with_component("a", 100, 20)
        .with_component("b", 80, 20)
        .with_component("c", 60, 20);
    let mut designer = LayoutDesigner::new(model, metrics);
    // the group is as wide as its widest member and stretches the others
    assert_eq!(designer.bounds("c"), Some(Bounds::new(10, 70, 100, 20)));

    designer
        .start_moving(&["c"], &[Bounds::new(10, 70, 100, 20)], Point::new(20, 80))
        .unwrap();
    designer
        .move_to(Point::new(160, 160), Some("Form"), false, false)
        .unwrap();
    assert!(designer.end_moving(true).unwrap());

    assert_eq!(designer.bounds("c"), Some(Bounds::new(150, 150, 100, 20)));
    assert_eq!(designer.bounds("a"), Some(Bounds::new(10, 10, 100, 20)));
    assert_eq!(designer.bounds("b"), Some(Bounds::new(10, 40, 100, 20)));

    let model = designer.model();
    let size = |id: &str| {
        let interval = model.component_interval(id, Axis::Horizontal).unwrap();
        model.interval(interval).size
    };
    assert_eq!(size("c"), SizeDef::fixed(100));
    assert!(size("a").is_resizing());
    assert!(size("b").is_resizing());
}

#[test_log::test]
fn test_delete_collapses_singleton_group() {
    let source = r#"container Form [width: 200, height: 100] {
    horizontal parallel {
        sequential {
            gap [pref: 10]
            component a
            gap [pref: 10]
            component b
            gap [min: 0, max: unbounded]
        }
    }
    vertical parallel {
        sequential {
            gap [pref: 10]
            parallel {
                component a
                component b
            }
            gap [min: 0, max: unbounded]
        }
    }
}
"#;
    let metrics = TableMetrics::new()
        .with_component("a", 40, 20)
        .with_component("b", 30, 20);
    let mut designer = LayoutDesigner::new(load_form(source).unwrap(), metrics);
    assert_eq!(designer.bounds("b"), Some(Bounds::new(60, 10, 30, 20)));

    designer.remove_component("b", true).unwrap();

    assert!(!designer.model().contains("b"));
    assert_eq!(designer.bounds("a"), Some(Bounds::new(10, 10, 40, 20)));
    assert!(lint::check(designer.model()).is_empty());
    insta::assert_snapshot!(save_form(designer.model()), @r###"
    container Form [width: 200, height: 100] {
        horizontal parallel {
            sequential {
                gap [pref: 10]
                component a
                gap [min: 0, max: unbounded]
            }
        }
        vertical parallel {
            sequential {
                gap [pref: 10]
                component a
                gap [min: 0, max: unbounded]
            }
        }
    }
    "###);

    designer.undo().unwrap();
    assert_eq!(save_form(designer.model()), source);
}

/// Rows [a b] at y = 10 and [c d] at y = 50 with room between the columns
const TWO_ROWS: &str = r#"
container Form [width: 200, height: 100] {
    horizontal parallel {
        sequential {
            gap [pref: 10]
            component a
            gap [pref: 100]
            component b
            gap [min: 0, max: unbounded]
        }
        sequential {
            gap [pref: 10]
            component c
            gap [pref: 100]
            component d
            gap [min: 0, max: unbounded]
        }
    }
    vertical parallel {
        sequential {
            gap [pref: 10]
            parallel {
                component a
                component b
            }
            gap [pref: 20]
            parallel {
                component c
                component d
            }
            gap [min: 0, max: unbounded]
        }
    }
}
"#;

fn two_rows(source: &str) -> LayoutDesigner {
    let metrics = TableMetrics::new()
        .with_component("a", 40, 20)
        .with_component("b", 30, 20)
        .with_component("c", 40, 20)
        .with_component("d", 30, 20)
        .with_component("m", 30, 50);
    LayoutDesigner::new(load_form(source).expect("Should load"), metrics)
}

fn add_free(designer: &mut LayoutDesigner, id: &str, at: Point) -> Preview {
    let size = designer.metrics().preferred_size(id).unwrap();
    designer
        .start_adding(
            vec![NewComponent::new(id)],
            &[Bounds::new(0, 0, size.0, size.1)],
            Point::new(0, 0),
            Some("Form"),
        )
        .unwrap();
    let preview = designer.move_to(at, Some("Form"), false, false).unwrap();
    assert!(designer.end_moving(true).unwrap());
    preview
}

#[test_log::test]
fn test_component_spanning_two_rows_merges_them() {
    let mut designer = two_rows(TWO_ROWS);
    let preview = add_free(&mut designer, "m", Point::new(85, 10));
    assert!(matches!(preview.inclusions[0], Some(Inclusion::Merge { .. })));

    let expected = [
        ("a", Bounds::new(10, 10, 40, 20)),
        ("b", Bounds::new(150, 10, 30, 20)),
        ("c", Bounds::new(10, 50, 40, 20)),
        ("d", Bounds::new(150, 50, 30, 20)),
        ("m", Bounds::new(85, 10, 30, 50)),
    ];
    for (id, bounds) in expected {
        assert_eq!(designer.bounds(id), Some(bounds), "{id}");
    }
    assert!(lint::check(designer.model()).is_empty());

    designer.resize_container("Form", 300, 100).unwrap();
    for (id, bounds) in expected {
        assert_eq!(designer.bounds(id), Some(bounds), "{id} after resize");
    }
    assert!(lint::check(designer.model()).is_empty());
}

#[test_log::test]
fn test_overlapping_part_of_row_goes_parallel_with_range() {
    let source = r#"
    container Form [width: 300, height: 100] {
        horizontal parallel {
            sequential {
                gap [pref: 10]
                component a
                gap [pref: 20]
                component b
                gap [min: 0, max: unbounded]
            }
        }
        vertical parallel {
            sequential {
                gap [pref: 10]
                parallel {
                    component a
                    component b
                }
                gap [min: 0, max: unbounded]
            }
        }
    }
    "#;
    let mut designer = two_rows(source);
    let preview = add_free(&mut designer, "c", Point::new(30, 20));
    assert!(matches!(
        preview.inclusions[0],
        Some(Inclusion::ParallelWithRange { first: 1, last: 1, .. })
    ));

    assert_eq!(designer.bounds("a"), Some(Bounds::new(10, 10, 40, 20)));
    assert_eq!(designer.bounds("b"), Some(Bounds::new(70, 10, 30, 20)));
    assert_eq!(designer.bounds("c"), Some(Bounds::new(30, 20, 40, 20)));
    assert!(lint::check(designer.model()).is_empty());
}

#[test_log::test]
fn test_beside_lone_component_goes_next_to_it() {
    let source = r#"
    container Form [width: 200, height: 100] {
        horizontal parallel {
            component a
        }
        vertical parallel {
            component a
        }
    }
    "#;
    let mut designer = two_rows(source);
    assert_eq!(designer.bounds("a"), Some(Bounds::new(0, 0, 40, 20)));

    let preview = add_free(&mut designer, "b", Point::new(60, 0));
    let a = designer.model().component_interval("a", Axis::Horizontal).unwrap();
    assert_eq!(
        preview.inclusions[0],
        Some(Inclusion::NextTo {
            target: a,
            after: true,
        })
    );
    assert_eq!(designer.bounds("a"), Some(Bounds::new(0, 0, 40, 20)));
    assert_eq!(designer.bounds("b"), Some(Bounds::new(60, 0, 30, 20)));
    assert!(lint::check(designer.model()).is_empty());
}

#[test_log::test]
fn test_closed_align_lines_up_only_the_selection() {
    let source = TWO_ROWS.replace(
        "gap [pref: 10]\n            component c\n            gap [pref: 100]",
        "gap [pref: 14]\n            component c\n            gap [pref: 96]",
    );
    let mut designer = two_rows(&source);
    assert_eq!(designer.bounds("c"), Some(Bounds::new(14, 50, 40, 20)));
    assert!(designer.can_align(&["a", "c"]));
    assert!(!designer.can_align(&["a"]));
    assert!(!designer.can_align(&["a", "a"]));

    designer
        .align(&["a", "c"], true, Axis::Horizontal, Alignment::Leading)
        .unwrap();

    assert_eq!(designer.bounds("a"), Some(Bounds::new(10, 10, 40, 20)));
    assert_eq!(designer.bounds("c"), Some(Bounds::new(10, 50, 40, 20)));
    assert_eq!(designer.bounds("b"), Some(Bounds::new(150, 10, 30, 20)));
    assert_eq!(designer.bounds("d"), Some(Bounds::new(150, 50, 30, 20)));
    let model = designer.model();
    let parent = |id: &str| model.parent(model.component_interval(id, Axis::Horizontal).unwrap());
    assert_eq!(parent("a"), parent("c"));
    assert_ne!(parent("a"), parent("b"));
    assert!(lint::check(model).is_empty());

    designer.undo().unwrap();
    assert_eq!(designer.bounds("c"), Some(Bounds::new(14, 50, 40, 20)));
}

#[test_log::test]
fn test_open_align_keeps_rows_together() {
    let mut designer = two_rows(TWO_ROWS);
    designer
        .align(&["b", "d"], false, Axis::Horizontal, Alignment::Trailing)
        .unwrap();

    assert_eq!(designer.bounds("a"), Some(Bounds::new(10, 10, 40, 20)));
    assert_eq!(designer.bounds("b"), Some(Bounds::new(150, 10, 30, 20)));
    assert_eq!(designer.bounds("d"), Some(Bounds::new(150, 50, 30, 20)));
    let model = designer.model();
    let parent = |id: &str| model.parent(model.component_interval(id, Axis::Horizontal).unwrap());
    assert_eq!(parent("a"), parent("b"));
    assert_eq!(parent("c"), parent("d"));
    assert_ne!(parent("b"), parent("d"));
    assert!(lint::check(model).is_empty());

    assert!(matches!(
        designer.align(&["a", "c"], true, Axis::Vertical, Alignment::Baseline),
        Err(DesignError::InvalidStructure { .. })
    ));
}

#[test_log::test]
fn test_removed_container_is_not_a_form() {
    let source = r#"
    container Form [width: 300, height: 120] {
        horizontal parallel {
            sequential {
                gap [pref: 10]
                component jPanel1
                gap [min: 0, max: unbounded]
            }
        }
        vertical parallel {
            sequential {
                gap [pref: 10]
                component jPanel1
                gap [min: 0, max: unbounded]
            }
        }
    }

    container jPanel1 {
        horizontal parallel {
            component jLabel1
        }
        vertical parallel {
            component jLabel1
        }
    }
    "#;
    let metrics = TableMetrics::new().with_component("jLabel1", 40, 14);
    let mut designer = LayoutDesigner::new(load_form(source).unwrap(), metrics);
    assert_eq!(designer.bounds("jLabel1"), Some(Bounds::new(10, 10, 40, 14)));

    designer.remove_component("jPanel1", false).unwrap();

    let model = designer.model();
    assert_eq!(model.top_level_containers().collect::<Vec<_>>(), vec!["Form"]);
    assert_eq!(model.component("jLabel1").unwrap().parent.as_deref(), Some("jPanel1"));
    assert_eq!(designer.placement("jPanel1").unwrap(), Placement::Unpositioned);
    assert_eq!(designer.placement("jLabel1").unwrap(), Placement::Unpositioned);
    assert!(lint::check(model).is_empty());

    designer.undo().unwrap();
    assert_eq!(designer.bounds("jLabel1"), Some(Bounds::new(10, 10, 40, 14)));
}
