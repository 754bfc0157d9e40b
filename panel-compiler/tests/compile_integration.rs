//! Integration tests for the compiler and reparser (panel-compiler).
//!
//! Covers full multi-page compiles for every target, procedural round trips
//! through the reparser, and degradation on bad input.

use panel_compiler::{
    CompileReport, Compiler, Diagnostic, DrawInstruction, Reparser, Target,
};
use panel_core::{Layout, Page, VisibilityCondition, Widget};
use proptest::prelude::*;

fn titled(mut widget: Widget, title: &str) -> Widget {
    widget.title = Some(title.to_string());
    widget
}

/// A two-page layout touching every procedural widget type.
fn dashboard() -> Layout {
    let mut layout = Layout::new();
    {
        let main = layout.page_mut(0).expect("page 0");
        main.name = "Main \"hall\"".to_string();
        main.add_widget(
            Widget::with_id("clock", "datetime")
                .with_geometry(10.0, 10.0, 100.0, 30.0)
                .with_prop("format", "time_only"),
        )
        .expect("clock");
        let mut temp = Widget::with_id("temp", "text")
            .with_geometry(10.0, 50.0, 200.0, 24.0)
            .with_entity("sensor.living_temp")
            .with_prop("text", "Temp: ")
            .with_prop("color", "blue");
        temp.condition = VisibilityCondition {
            condition_entity: Some("sensor.living_temp".into()),
            condition_operator: Some(">".into()),
            condition_min: Some(20.5),
            ..VisibilityCondition::default()
        };
        main.add_widget(temp).expect("temp");
        main.add_widget(
            Widget::with_id("frame", "shape_rect")
                .with_geometry(0.0, 0.0, 296.0, 128.0)
                .with_prop("border_width", 3)
                .with_prop("bg_color", "#ff8800")
                .with_prop("fill", true),
        )
        .expect("frame");
    }

    let mut stats = Page::new(1).with_name("Stats");
    stats.refresh_s = Some(60);
    stats
        .add_widget(
            Widget::with_id("dot", "shape_circle")
                .with_geometry(20.0, 20.0, 40.0, 40.0)
                .with_prop("border_width", 2),
        )
        .expect("dot");
    stats
        .add_widget(
            Widget::with_id("rule", "line")
                .with_geometry(0.0, 70.0, 296.0, 4.0)
                .with_prop("stroke_width", 4)
                .with_prop("color", "red"),
        )
        .expect("rule");
    stats
        .add_widget(titled(
            Widget::with_id("history", "chart")
                .with_geometry(0.0, 80.0, 296.0, 48.0)
                .with_entity("sensor.living_temp")
                .with_prop("type", "BAR"),
            "History",
        ))
        .expect("history");
    layout.pages.push(stats);
    layout
}

fn procedural(report: &CompileReport) -> &str {
    report.output.as_procedural().expect("procedural output")
}

// ==========================================================================
// Procedural round trips
// ==========================================================================

#[test]
fn test_procedural_round_trip_is_stable() {
    let compiler = Compiler::default();
    let layout = dashboard();
    let first = compiler.compile(&layout, Target::Procedural);
    assert!(first.is_clean(), "{:?}", first.diagnostics);
    assert_eq!(first.widgets_emitted, 6);

    let reparsed = Reparser::default().reparse(procedural(&first));
    assert!(reparsed.warnings.is_empty(), "{:?}", reparsed.warnings);

    let rebuilt = &reparsed.layout;
    assert_eq!(rebuilt.pages.len(), 2);
    assert_eq!(rebuilt.pages[0].name, "Main \"hall\"");
    assert_eq!(rebuilt.pages[1].name, "Stats");
    assert_eq!(rebuilt.pages[1].refresh_s, Some(60));
    for (original, recovered) in layout.widgets().zip(rebuilt.widgets()) {
        assert_eq!(original.id, recovered.id);
        assert_eq!(original.kind, recovered.kind);
        assert_eq!(original.rect(), recovered.rect());
        assert_eq!(original.title, recovered.title);
        assert_eq!(original.entity_id, recovered.entity_id);
        assert_eq!(original.condition, recovered.condition);
        let descriptor = compiler
            .registry()
            .get(&original.kind)
            .expect("registered")
            .descriptor();
        assert_eq!(
            descriptor.merged_props(original),
            descriptor.merged_props(recovered),
            "{}",
            original.id
        );
    }

    let second = compiler.compile(rebuilt, Target::Procedural);
    assert_eq!(procedural(&first), procedural(&second));
}

fn text_layout(texts: &[&str]) -> Layout {
    let mut layout = Layout::new();
    let page = layout.page_mut(0).expect("page");
    for (i, text) in (0u32..).zip(texts) {
        page.add_widget(
            Widget::with_id(format!("t{i}"), "text")
                .with_geometry(0.0, f64::from(i) * 30.0, 200.0, 24.0)
                .with_prop("text", *text),
        )
        .expect("text");
    }
    page.add_widget(Widget::with_id("r1", "shape_rect").with_geometry(0.0, 200.0, 20.0, 20.0))
        .expect("rect");
    layout
}

#[test]
fn test_statement_like_text_round_trips() {
    let layout = text_layout(&[
        "if (page == 3)",
        "} else if (id(display_page) == 7) {",
        "case 2: interval = 5;",
        "// widget:line id:x",
        "// page:name \"Other\"",
        "it.rectangle(0, 0, 5, 5);",
    ]);
    let compiler = Compiler::default();
    let first = compiler.compile(&layout, Target::Procedural);
    let reparsed = Reparser::default().reparse(procedural(&first));
    assert!(reparsed.warnings.is_empty(), "{:?}", reparsed.warnings);

    let rebuilt = &reparsed.layout;
    assert_eq!(rebuilt.pages.len(), 1);
    assert_eq!(rebuilt.pages[0].name, layout.pages[0].name);
    assert_eq!(rebuilt.pages[0].refresh_s, None);
    let ids: Vec<&str> = rebuilt.widgets().map(|w| w.id.as_str()).collect();
    let expected: Vec<&str> = layout.widgets().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, expected);
    for (original, recovered) in layout.widgets().zip(rebuilt.widgets()) {
        assert_eq!(original.props.get("text"), recovered.props.get("text"));
    }

    let second = compiler.compile(rebuilt, Target::Procedural);
    assert_eq!(procedural(&first), procedural(&second));
}

#[test]
fn test_chart_type_survives_round_trip() {
    let compiler = Compiler::default();
    let report = compiler.compile(&dashboard(), Target::Procedural);
    let layout = Reparser::default().reparse(procedural(&report)).layout;
    let chart = layout.pages[1].widget("history").expect("chart");
    assert_eq!(chart.kind, "chart");
    assert_eq!(chart.props.get("type"), Some(&serde_json::json!("BAR")));
}

#[test]
fn test_time_only_clock_output() {
    let mut layout = Layout::new();
    layout
        .page_mut(0)
        .expect("page")
        .add_widget(
            Widget::with_id("w1", "datetime")
                .with_geometry(10.0, 10.0, 100.0, 30.0)
                .with_prop("format", "time_only"),
        )
        .expect("add");
    let report = Compiler::default().compile(&layout, Target::Procedural);
    let text = procedural(&report);
    assert!(text.contains(
        "it.strftime(60, 25, id(font_roboto_700_28), color_black, TextAlign::CENTER, \"%H:%M\", now);"
    ));
    assert!(text.contains("id: font_roboto_700_28"));
    assert!(text.contains("// widget:datetime id:w1 type:datetime x:10 y:10 w:100 h:30"));
}

#[test]
fn test_compile_is_deterministic() {
    let compiler = Compiler::default();
    let layout = dashboard();
    for target in Target::ALL {
        let a = compiler.compile(&layout, target).output.to_text().expect("text");
        let b = compiler.compile(&layout, target).output.to_text().expect("text");
        assert_eq!(a, b, "{target:?}");
    }
}

#[test]
fn test_explicit_colors_ignore_theme() {
    let mut layout = Layout::new();
    let page = layout.page_mut(0).expect("page");
    page.add_widget(
        Widget::with_id("l1", "line")
            .with_geometry(0.0, 10.0, 100.0, 2.0)
            .with_prop("color", "red"),
    )
    .expect("line");
    page.add_widget(
        Widget::with_id("t1", "text")
            .with_prop("text", "Hello")
            .with_prop("color", "blue"),
    )
    .expect("text");

    let compiler = Compiler::default();
    let light = compiler.compile(&layout, Target::Procedural);
    let dark = compiler.compile(&layout.clone().with_dark_mode(true), Target::Procedural);
    assert_eq!(procedural(&light), procedural(&dark));
}

/// Color fields masked, so light and dark compiles can be compared.
fn mask_theme(text: &str) -> String {
    text.lines()
        .filter(|line| !line.contains("= Color("))
        .map(|line| {
            line.replace("0xFFFFFF", "THEME")
                .replace("0x000000", "THEME")
                .replace("white", "THEME")
                .replace("black", "THEME")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_theme_only_changes_colors() {
    let mut light = dashboard();
    light
        .page_mut(0)
        .expect("page")
        .add_widget(
            Widget::with_id("note", "text")
                .with_geometry(0.0, 100.0, 120.0, 20.0)
                .with_prop("text", "Note")
                .with_prop("color", "theme_auto"),
        )
        .expect("note");
    let dark = light.clone().with_dark_mode(true);

    let compiler = Compiler::default();
    for target in Target::ALL {
        let a = compiler.compile(&light, target).output.to_text().expect("text");
        let b = compiler.compile(&dark, target).output.to_text().expect("text");
        assert_ne!(a, b, "{target:?}");
        assert_eq!(mask_theme(&a), mask_theme(&b), "{target:?}");
    }

    for (layout, expected) in [(&light, "black"), (&dark, "white")] {
        let report = compiler.compile(layout, Target::DeclarativeOepl);
        let doc = report.output.as_declarative().expect("declarative");
        let note = doc
            .instructions()
            .find_map(|instruction| match instruction {
                DrawInstruction::Text { value, color, .. } if value == "Note" => Some(color),
                _ => None,
            })
            .expect("note text");
        assert_eq!(note, expected);
    }
}

// ==========================================================================
// Other targets
// ==========================================================================

#[test]
fn test_dark_circle_fills_white() {
    let mut layout = Layout::new().with_dark_mode(true);
    layout
        .page_mut(0)
        .expect("page")
        .add_widget(
            Widget::with_id("c1", "shape_circle")
                .with_geometry(0.0, 0.0, 50.0, 50.0)
                .with_prop("fill", true),
        )
        .expect("add");

    let compiler = Compiler::default();
    for target in [Target::DeclarativeOepl, Target::DeclarativeOpenDisplay] {
        let report = compiler.compile(&layout, target);
        let doc = report.output.as_declarative().expect("declarative");
        match doc.instructions().next() {
            Some(DrawInstruction::Circle {
                x, y, radius, fill, ..
            }) => {
                assert_eq!((*x, *y, *radius), (25, 25, 25));
                assert_eq!(fill.as_deref(), Some("white"));
            }
            other => panic!("unexpected instruction: {other:?}"),
        };
    }
}

#[test]
fn test_declarative_preserves_paint_order() {
    let mut layout = Layout::new();
    let page = layout.page_mut(0).expect("page");
    page.add_widget(Widget::with_id("a", "shape_rect")).expect("a");
    page.add_widget(Widget::with_id("b", "text")).expect("b");
    page.add_widget(Widget::with_id("c", "line")).expect("c");
    page.add_widget(Widget::with_id("d", "odp_ellipse")).expect("d");

    let report = Compiler::default().compile(&layout, Target::DeclarativeOpenDisplay);
    assert!(report.is_clean(), "{:?}", report.diagnostics);
    let doc = report.output.as_declarative().expect("declarative");
    let kinds: Vec<&str> = doc.instructions().map(DrawInstruction::kind).collect();
    assert_eq!(kinds, vec!["rectangle", "text", "line", "ellipse"]);

    let json = report.output.to_text().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["flavor"], "opendisplay");
}

#[test]
fn test_retained_pages_reparse_as_structure() {
    let compiler = Compiler::default();
    let report = compiler.compile(&dashboard(), Target::RetainedGui);
    let doc = report.output.as_retained().expect("retained");
    assert_eq!(doc.pages.len(), 2);

    let yaml = report.output.to_text().expect("yaml");
    let layout = Reparser::default().reparse(&yaml).layout;
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.widget_count(), 0);
}

// ==========================================================================
// Degradation
// ==========================================================================

#[test]
fn test_unknown_widget_type_is_skipped() {
    let mut layout = Layout::new();
    let page = layout.page_mut(0).expect("page");
    page.add_widget(Widget::with_id("s1", "sparkle")).expect("s1");
    page.add_widget(Widget::with_id("r1", "shape_rect")).expect("r1");

    let report = Compiler::default().compile(&layout, Target::Procedural);
    assert_eq!(report.widgets_emitted, 1);
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::UnknownWidgetType {
            page: 0,
            widget: "s1".into(),
            widget_type: "sparkle".into(),
        }]
    );
    assert!(procedural(&report).contains("// widget:shape_rect id:r1"));
    assert!(!procedural(&report).contains("sparkle"));
}

#[test]
fn test_huge_font_size_does_not_abort_compile() {
    let mut layout = Layout::new();
    let page = layout.page_mut(0).expect("page");
    page.add_widget(
        Widget::with_id("clock", "datetime")
            .with_geometry(0.0, 0.0, 100.0, 60.0)
            .with_prop("format", "time_date")
            .with_prop("time_font_size", 4_000_000_000u32),
    )
    .expect("clock");
    page.add_widget(Widget::with_id("r1", "shape_rect")).expect("r1");

    for report in Compiler::default().compile_all(&layout) {
        assert_eq!(report.widgets_emitted, 2, "{}", report.target);
    }
}

#[test]
fn test_empty_layout_compiles_everywhere() {
    let compiler = Compiler::default();
    for report in compiler.compile_all(&Layout::new()) {
        assert!(report.is_clean());
        assert_eq!(report.widgets_emitted, 0);
        assert!(report.output.to_text().is_ok());
    }
}

proptest! {
    #[test]
    fn prop_rect_round_trip(
        x in 0i32..400,
        y in 0i32..300,
        w in 1i32..200,
        h in 1i32..200,
        border in 1u32..6,
        fill in any::<bool>(),
    ) {
        let mut layout = Layout::new();
        layout
            .page_mut(0)
            .expect("page")
            .add_widget(
                Widget::with_id("r", "shape_rect")
                    .with_geometry(x.into(), y.into(), w.into(), h.into())
                    .with_prop("border_width", border)
                    .with_prop("fill", fill),
            )
            .expect("add");
        let compiler = Compiler::default();
        let first = compiler.compile(&layout, Target::Procedural);
        let rebuilt = Reparser::default().reparse(procedural(&first)).layout;
        prop_assert_eq!(rebuilt.widget_count(), 1);
        let second = compiler.compile(&rebuilt, Target::Procedural);
        prop_assert_eq!(procedural(&first), procedural(&second));
    }

    #[test]
    fn prop_text_round_trip(text in "\\PC*") {
        let layout = text_layout(&[text.as_str()]);
        let compiler = Compiler::default();
        let first = compiler.compile(&layout, Target::Procedural);
        let rebuilt = Reparser::default().reparse(procedural(&first)).layout;
        prop_assert_eq!(rebuilt.widget_count(), 2);
        let recovered = rebuilt.pages[0].widget("t0").expect("text widget");
        prop_assert_eq!(recovered.props.get("text"), Some(&serde_json::json!(text)));
        prop_assert!(rebuilt.pages[0].widget("r1").is_some());
        let second = compiler.compile(&rebuilt, Target::Procedural);
        prop_assert_eq!(procedural(&first), procedural(&second));
    }
}
