//! Integration tests for the L5X -> ST pipeline.
//!
//! These exercise `Compiler::l5x_to_st` end-to-end against hand-built
//! `Element` trees standing in for parsed L5X documents, covering the
//! end-to-end scenarios from SPEC_FULL §8.

use l5x_st_compiler::compiler::Compiler;
use l5x_st_compiler::dom::Element;

fn ld_routine(name: &str, rungs: &[&str]) -> Element {
    let mut routine_el = Element::new("Routine")
        .attr("Name", name)
        .attr("Type", "RLL");
    for rung in rungs {
        routine_el.push_child(Element::new("Rung").child(Element::with_text("Text", *rung)));
    }
    routine_el
}

fn project_with_routine(routine: Element) -> Element {
    Element::new("RSLogix5000Content").child(
        Element::new("Controller").attr("Name", "Demo").child(
            Element::new("Programs").child(
                Element::new("Program")
                    .attr("Name", "Main")
                    .attr("MainRoutineName", "MainRoutine")
                    .child(Element::new("Routines").child(routine)),
            ),
        ),
    )
}

#[test]
fn xic_xio_ote_rung_produces_guarded_assignment() {
    let root = project_with_routine(ld_routine(
        "MainRoutine",
        &["XIC(Start),XIO(Stop)OTE(Run)"],
    ));
    let compiler = Compiler::new();
    let (st, report) = compiler.l5x_to_st(&root).unwrap();

    assert!(st.contains("IF ((Start = 1) AND (Stop = 0)) THEN"));
    assert!(st.contains("Run := 1;"));
    assert!(st.contains("ELSE"));
    assert!(st.contains("Run := 0;"));
    assert!(st.contains("END_IF;"));
    assert!(!report.has_errors(), "unexpected errors: {:?}", report.diagnostics);
}

#[test]
fn ton_with_enable_sets_timer_fields_and_elapsed() {
    let root = project_with_routine(ld_routine("MainRoutine", &["XIC(Go)TON(T1,T#5s,Elapsed)"]));
    let compiler = Compiler::new();
    let (st, _report) = compiler.l5x_to_st(&root).unwrap();

    assert!(st.contains("T1.PT := T#5s;"));
    assert!(st.contains("T1.IN := 1;"));
    assert!(st.contains("Elapsed := T1.ET;"));
    assert!(st.contains("T1.IN := 0;"));
    assert!(st.contains("T1.ET := 0;"));
    assert!(st.contains("Elapsed := 0;"));
}

fn fbd_routine() -> Element {
    let sheet = Element::new("Sheet")
        .child(Element::new("IRef").attr("ID", "1").attr("Operand", "I1"))
        .child(Element::new("ORef").attr("ID", "4").attr("Operand", "O1"))
        .child(
            Element::new("AddOnInstruction")
                .attr("ID", "2")
                .attr("Operand", "A"),
        )
        .child(
            Element::new("AddOnInstruction")
                .attr("ID", "3")
                .attr("Operand", "B"),
        )
        .child(
            Element::new("Wire")
                .attr("FromID", "1")
                .attr("ToID", "2")
                .attr("ToParam", "in"),
        )
        .child(
            Element::new("Wire")
                .attr("FromID", "2")
                .attr("ToID", "3")
                .attr("FromParam", "out")
                .attr("ToParam", "in"),
        )
        .child(
            Element::new("Wire")
                .attr("FromID", "3")
                .attr("ToID", "4")
                .attr("FromParam", "out"),
        );
    Element::new("Routine")
        .attr("Name", "MainRoutine")
        .attr("Type", "FBD")
        .child(sheet)
}

#[test]
fn fbd_three_block_chain_orders_calls_before_output_assignment() {
    let root = project_with_routine(fbd_routine());
    let compiler = Compiler::new();
    let (st, _report) = compiler.l5x_to_st(&root).unwrap();

    let a_pos = st.find("A(in := I1);").expect("A(...) call missing");
    let b_pos = st.find("B(in := A.out);").expect("B(...) call missing");
    let o_pos = st.find("O1 := B.out;").expect("output assignment missing");
    assert!(a_pos < b_pos);
    assert!(b_pos < o_pos);
}

#[test]
fn missing_controller_element_is_fatal() {
    let root = Element::new("RSLogix5000Content");
    let compiler = Compiler::new();
    assert!(compiler.l5x_to_st(&root).is_err());
}

#[test]
fn l5x_to_st_via_ir_reports_validation_diagnostics_for_tagless_controller() {
    let root = project_with_routine(ld_routine("MainRoutine", &["OTE(Run)"]));
    let compiler = Compiler::new();
    let (_st, report) = compiler.l5x_to_st_via_ir(&root).unwrap();
    assert!(report.has_errors(), "expected 'no controller tags' diagnostic");
}
