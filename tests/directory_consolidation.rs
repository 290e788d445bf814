//! Integration tests for directory consolidation (SPEC_FULL §6): ST output
//! from multiple L5X documents is concatenated in caller-supplied order,
//! and each gets independent extraction state.

use l5x_st_compiler::compiler::Compiler;
use l5x_st_compiler::dom::Element;

fn controller_with_tag(name: &str, tag_name: &str) -> Element {
    Element::new("RSLogix5000Content").child(
        Element::new("Controller").attr("Name", name).child(
            Element::new("Tags").child(
                Element::new("Tag")
                    .attr("Name", tag_name)
                    .attr("DataType", "DINT"),
            ),
        ),
    )
}

#[test]
fn consolidate_directory_preserves_file_order_and_per_file_reports() {
    let files = vec![
        ("controller_a.l5x".to_string(), controller_with_tag("ControllerA", "TagA")),
        ("controller_b.l5x".to_string(), controller_with_tag("ControllerB", "TagB")),
    ];

    let compiler = Compiler::new();
    let (st, reports) = compiler.consolidate_directory(&files);

    assert!(st.find("controller_a.l5x").unwrap() < st.find("controller_b.l5x").unwrap());
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].0, "controller_a.l5x");
    assert_eq!(reports[1].0, "controller_b.l5x");
}

#[test]
fn consolidate_directory_continues_past_a_failing_file() {
    let good = controller_with_tag("Good", "X");
    let bad = Element::new("RSLogix5000Content"); // no <Controller> child: fatal per-file

    let files = vec![
        ("bad.l5x".to_string(), bad),
        ("good.l5x".to_string(), good),
    ];

    let compiler = Compiler::new();
    let (st, reports) = compiler.consolidate_directory(&files);

    assert!(reports[0].1.has_errors());
    assert!(st.contains("good.l5x"));
    assert!(!st.contains("// source: bad.l5x"));
}
