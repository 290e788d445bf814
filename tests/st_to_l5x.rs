//! Integration tests for the ST -> L5X pipeline and its `--use-ir` guardrail.

use l5x_st_compiler::compiler::Compiler;

#[test]
fn scope_partition_by_name_prefix() {
    let src = "VAR\n\
               HMI_Status : INT;\n\
               Global_Mode : DINT;\n\
               Local_Flag : BOOL;\n\
               END_VAR\n\
               Local_Flag := TRUE;\n";
    let compiler = Compiler::new();
    let (xml, _report) = compiler.st_to_l5x(src);

    let root = l5x_st_compiler::xml_io::parse(&xml).unwrap();
    let controller = root.child_named("Controller").unwrap();
    let controller_tags: Vec<&str> = controller
        .child_named("Tags")
        .unwrap()
        .children_named("Tag")
        .filter_map(|t| t.get_attr("Name"))
        .collect();
    assert!(controller_tags.contains(&"HMI_Status"));
    assert!(controller_tags.contains(&"Global_Mode"));
    assert!(!controller_tags.contains(&"Local_Flag"));

    let program = controller
        .child_named("Programs")
        .unwrap()
        .child_named("Program")
        .unwrap();
    let program_tags: Vec<&str> = program
        .child_named("Tags")
        .unwrap()
        .children_named("Tag")
        .filter_map(|t| t.get_attr("Name"))
        .collect();
    assert_eq!(program_tags, vec!["Local_Flag"]);
}

#[test]
fn array_declaration_round_trips_dimension_attribute() {
    let src = "VAR\nBuf : ARRAY [0..9] OF INT := 0;\nEND_VAR\n";
    let compiler = Compiler::new();
    let (xml, _report) = compiler.st_to_l5x(src);
    let root = l5x_st_compiler::xml_io::parse(&xml).unwrap();

    let tag = root
        .find_all("Tag")
        .into_iter()
        .find(|t| t.get_attr("Name") == Some("Buf"))
        .expect("Buf tag not found");
    assert_eq!(tag.get_attr("Dimension"), Some("0..9"));
    assert_eq!(tag.get_attr("DataType"), Some("INT"));
}

#[test]
fn use_ir_rejects_when_no_controller_tags_survive() {
    // An ST source with no VAR declarations at all lifts to a controller
    // with zero tags, which the structural validator rejects.
    let compiler = Compiler::new();
    let result = compiler.st_to_l5x_via_ir("X := 1;\n");
    assert!(result.is_err(), "expected validation failure for tagless IR");
}

#[test]
fn use_ir_accepts_well_formed_program_and_writes_equivalent_xml() {
    let src = "VAR\nGlobal_X : DINT := 0;\nEND_VAR\nGlobal_X := 1;\n";
    let compiler = Compiler::new();
    let (xml, report) = compiler.st_to_l5x_via_ir(src).unwrap();
    assert!(!report.has_errors());
    let root = l5x_st_compiler::xml_io::parse(&xml).unwrap();
    assert_eq!(root.name, "RSLogix5000Content");
}
