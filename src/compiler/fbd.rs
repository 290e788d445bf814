//! FBD sheet → ST translator (SPEC_FULL §4.4).
//!
//! Grounded on `fbd_translator.py`'s `_parse_input_refs`/`_parse_output_refs`/
//! `_parse_function_blocks`/`_parse_wires`/`_determine_execution_order`/
//! `_generate_fb_code`/`_generate_output_assignments`.

use std::collections::{HashMap, HashSet};

use crate::compiler::types::ConversionReport;
use crate::dom::Element;

#[derive(Debug, Clone)]
struct Wire {
    from_id: String,
    to_id: String,
    from_param: String,
    to_param: String,
}

struct Sheet {
    input_refs: HashMap<String, String>,
    output_refs: Vec<(String, String)>,
    instance_order: Vec<String>,
    instances: HashMap<String, String>,
    wires: Vec<Wire>,
}

fn parse_sheet(sheet_el: &Element) -> Sheet {
    let mut input_refs = HashMap::new();
    let mut output_refs = Vec::new();
    let mut instance_order = Vec::new();
    let mut instances = HashMap::new();
    let mut wires = Vec::new();

    for iref in sheet_el.children_named("IRef") {
        if let (Some(id), Some(operand)) = (iref.get_attr("ID"), iref.get_attr("Operand")) {
            input_refs.insert(id.to_string(), operand.to_string());
        }
    }
    for oref in sheet_el.children_named("ORef") {
        if let (Some(id), Some(operand)) = (oref.get_attr("ID"), oref.get_attr("Operand")) {
            output_refs.push((id.to_string(), operand.to_string()));
        }
    }
    for fb in sheet_el.children_named("AddOnInstruction") {
        if let (Some(id), Some(operand)) = (fb.get_attr("ID"), fb.get_attr("Operand")) {
            instance_order.push(id.to_string());
            instances.insert(id.to_string(), operand.to_string());
        }
    }
    for wire in sheet_el.children_named("Wire") {
        if let (Some(from_id), Some(to_id)) = (wire.get_attr("FromID"), wire.get_attr("ToID")) {
            wires.push(Wire {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
                from_param: wire.get_attr("FromParam").unwrap_or_default().to_string(),
                to_param: wire.get_attr("ToParam").unwrap_or_default().to_string(),
            });
        }
    }

    Sheet {
        input_refs,
        output_refs,
        instance_order,
        instances,
        wires,
    }
}

/// Depth-first topological sort with temporary-mark cycle detection. On a
/// cycle, the sort emits a diagnostic and keeps the node where it is
/// (the edge that closes the cycle is simply skipped).
fn topological_order(sheet: &Sheet, report: &mut ConversionReport) -> Vec<String> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for wire in &sheet.wires {
        if sheet.instances.contains_key(&wire.from_id) && sheet.instances.contains_key(&wire.to_id)
        {
            edges
                .entry(wire.from_id.as_str())
                .or_default()
                .push(wire.to_id.as_str());
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut temp_marked: HashSet<&str> = HashSet::new();
    let mut order: Vec<String> = Vec::new();

    fn visit<'a>(
        node: &'a str,
        edges: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        temp_marked: &mut HashSet<&'a str>,
        order: &mut Vec<String>,
        report: &mut ConversionReport,
    ) {
        if visited.contains(node) {
            return;
        }
        if temp_marked.contains(node) {
            report.warn(format!("FBD dataflow cycle detected at instance '{node}'"));
            return;
        }
        temp_marked.insert(node);
        if let Some(targets) = edges.get(node) {
            for target in targets {
                visit(target, edges, visited, temp_marked, order, report);
            }
        }
        temp_marked.remove(node);
        visited.insert(node);
        order.push(node.to_string());
    }

    for id in &sheet.instance_order {
        visit(
            id.as_str(),
            &edges,
            &mut visited,
            &mut temp_marked,
            &mut order,
            report,
        );
    }

    order
}

fn resolve_source(
    from_id: &str,
    from_param: &str,
    sheet: &Sheet,
    report: &mut ConversionReport,
) -> String {
    if let Some(operand) = sheet.input_refs.get(from_id) {
        return operand.clone();
    }
    if let Some(operand) = sheet.instances.get(from_id) {
        return format!("{operand}.{from_param}");
    }
    if let Some((_, operand)) = sheet.output_refs.iter().find(|(id, _)| id == from_id) {
        return operand.clone();
    }
    report.warn(format!("FBD wire references unknown source id '{from_id}'"));
    format!("(* unresolved:{from_id} *)")
}

fn emit_sheet(sheet: &Sheet, report: &mut ConversionReport) -> String {
    let order = topological_order(sheet, report);
    let mut lines = Vec::new();

    for instance_id in &order {
        let operand = &sheet.instances[instance_id];
        let bindings: Vec<String> = sheet
            .wires
            .iter()
            .filter(|w| w.to_id == *instance_id)
            .map(|w| {
                let src = resolve_source(&w.from_id, &w.from_param, sheet, report);
                format!("{} := {}", w.to_param, src)
            })
            .collect();

        if bindings.is_empty() {
            lines.push(format!("{operand}();"));
        } else {
            lines.push(format!("{operand}({});", bindings.join(", ")));
        }
    }

    for (output_id, output_operand) in &sheet.output_refs {
        for wire in sheet.wires.iter().filter(|w| w.to_id == *output_id) {
            if sheet.instances.contains_key(&wire.from_id) {
                let src = resolve_source(&wire.from_id, &wire.from_param, sheet, report);
                lines.push(format!("{output_operand} := {src};"));
            }
        }
    }

    lines.join("\n")
}

/// Translate every `Sheet` child of an FBD routine element into ST, joined
/// with a `// Sheet N` comment preceding each.
pub fn translate_sheet_routine(routine_el: &Element, report: &mut ConversionReport) -> String {
    let mut out = Vec::new();
    for (idx, sheet_el) in routine_el.find_all("Sheet").into_iter().enumerate() {
        let sheet = parse_sheet(sheet_el);
        let body = emit_sheet(&sheet, report);
        out.push(format!("// Sheet {}\n{}", idx + 1, body));
    }
    out.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_block_sheet() -> Element {
        Element::new("Sheet")
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
            )
    }

    #[test]
    fn topological_order_respects_wires() {
        let mut report = ConversionReport::new();
        let sheet = parse_sheet(&three_block_sheet());
        let order = topological_order(&sheet, &mut report);
        let pos_a = order.iter().position(|id| id == "2").unwrap();
        let pos_b = order.iter().position(|id| id == "3").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn three_block_chain_emits_expected_calls() {
        let mut report = ConversionReport::new();
        let sheet = parse_sheet(&three_block_sheet());
        let st = emit_sheet(&sheet, &mut report);
        let a_pos = st.find("A(in := I1);").unwrap();
        let b_pos = st.find("B(in := A.out);").unwrap();
        let o_pos = st.find("O1 := B.out;").unwrap();
        assert!(a_pos < b_pos);
        assert!(b_pos < o_pos);
    }

    #[test]
    fn instance_with_no_wires_emits_empty_call() {
        let sheet_el = Element::new("Sheet").child(
            Element::new("AddOnInstruction")
                .attr("ID", "1")
                .attr("Operand", "Standalone"),
        );
        let mut report = ConversionReport::new();
        let sheet = parse_sheet(&sheet_el);
        let st = emit_sheet(&sheet, &mut report);
        assert_eq!(st, "Standalone();");
    }

    #[test]
    fn cycle_reports_diagnostic_without_panicking() {
        let sheet_el = Element::new("Sheet")
            .child(
                Element::new("AddOnInstruction")
                    .attr("ID", "1")
                    .attr("Operand", "A"),
            )
            .child(
                Element::new("AddOnInstruction")
                    .attr("ID", "2")
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
                    .attr("ToID", "1")
                    .attr("ToParam", "in"),
            );
        let mut report = ConversionReport::new();
        let sheet = parse_sheet(&sheet_el);
        let _ = topological_order(&sheet, &mut report);
        assert!(report.diagnostics.iter().any(|d| d.message.contains("cycle")));
    }
}
