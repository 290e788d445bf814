//! IR → L5X element tree serializer (SPEC_FULL §4.6).
//!
//! Fixed processor/task metadata is grounded on
//! `ir_converter.py::ir_to_l5x` and reproduced here as constants; this is a
//! deliberate normalization (SPEC_FULL §9), not an attempt at fidelity to
//! the source document's own metadata.

use crate::dom::Element;
use crate::ir::{Direction, FunctionBlock, Program, Project, RoutineKind, Scope, Tag, UserType};

const BASE_TYPES: &[&str] = &[
    "BOOL", "SINT", "INT", "DINT", "LINT", "USINT", "UINT", "UDINT", "ULINT", "REAL", "LREAL",
    "TIME", "DATE", "TOD", "DT", "STRING", "BYTE", "WORD", "DWORD", "LWORD",
];

pub fn serialize(project: &Project) -> Element {
    let controller_el = build_controller(project);

    Element::new("RSLogix5000Content")
        .attr("SchemaRevision", "1.0")
        .attr("SoftwareRevision", "20.01")
        .attr("TargetName", project.controller.name.clone())
        .attr("TargetType", "Controller")
        .attr("ContainsContext", "false")
        .child(controller_el)
}

fn build_controller(project: &Project) -> Element {
    let controller = &project.controller;
    let mut el = Element::new("Controller")
        .attr("Name", controller.name.clone())
        .attr("ProcessorType", "Logix5580")
        .attr("MajorRev", "20")
        .attr("MinorRev", "1")
        .attr("TimeSlice", "20")
        .attr("ShareUnusedTimeSlice", "1")
        .attr("ProjectCreationDate", "Thu Jan 01 00:00:00 1970")
        .attr("LastModifiedDate", "Thu Jan 01 00:00:00 1970")
        .attr("SFCExecutionControl", "CurrentActive")
        .attr("SFCRestartPosition", "MostRecent")
        .attr("ProjectSN", "16#0000_0000");

    el.push_child(build_data_types(&controller.user_types));
    el.push_child(build_aois(&controller.function_blocks));
    el.push_child(build_tags(&controller.tags));
    el.push_child(build_programs(&project.programs));

    el.push_child(build_tasks(project));

    el
}

fn build_data_types(user_types: &[UserType]) -> Element {
    let mut el = Element::new("DataTypes");
    for base in BASE_TYPES {
        el.push_child(Element::new("DataType").attr("Name", *base).attr("Use", "Target"));
    }
    for ut in user_types {
        let mut type_el = Element::new("DataType").attr("Name", ut.name.clone());
        if let Some(base) = &ut.base_type {
            type_el = type_el.attr("Use", base.clone());
        }
        let mut members_el = Element::new("Members");
        for m in &ut.members {
            let mut member_el = Element::new("Member")
                .attr("Name", m.name.clone())
                .attr("DataType", m.data_type.clone());
            if let Some(radix) = &m.radix {
                member_el = member_el.attr("Radix", radix.clone());
            }
            if let Some(ea) = &m.external_access {
                member_el = member_el.attr("ExternalAccess", ea.clone());
            }
            if let Some(desc) = &m.description {
                member_el.push_child(Element::with_text("Description", desc.clone()));
            }
            members_el.push_child(member_el);
        }
        type_el.push_child(members_el);
        el.push_child(type_el);
    }
    el
}

fn build_aois(function_blocks: &[FunctionBlock]) -> Element {
    let mut el = Element::new("AddOnInstructionDefinitions");
    for fb in function_blocks {
        let mut fb_el = Element::new("AddOnInstructionDefinition").attr("Name", fb.name.clone());
        if let Some(desc) = &fb.description {
            fb_el.push_child(Element::with_text("Description", desc.clone()));
        }
        let mut params_el = Element::new("Parameters");
        for p in &fb.parameters {
            let usage = match p.direction {
                Some(Direction::Input) => "Input",
                Some(Direction::Output) => "Output",
                Some(Direction::InOut) => "InOut",
                _ => "Local",
            };
            params_el.push_child(
                Element::new("Parameter")
                    .attr("Name", p.name.clone())
                    .attr("DataType", p.data_type.clone())
                    .attr("Usage", usage)
                    .attr("Required", p.required.to_string()),
            );
        }
        fb_el.push_child(params_el);
        if !fb.local_tags.is_empty() {
            let mut locals_el = Element::new("LocalTags");
            for t in &fb.local_tags {
                locals_el.push_child(build_tag_named(t, "LocalTag"));
            }
            fb_el.push_child(locals_el);
        }
        el.push_child(fb_el);
    }
    el
}

fn build_tag(tag: &Tag) -> Element {
    build_tag_named(tag, "Tag")
}

/// `LocalTags` sections (routine-local and AOI-local variables) use the
/// element name `LocalTag` rather than `Tag`; the two share every other
/// attribute and child shape.
fn build_tag_named(tag: &Tag, element_name: &str) -> Element {
    let mut el = Element::new(element_name)
        .attr("Name", tag.name.clone())
        .attr("DataType", tag.base_type.clone());
    if let Some(dims) = &tag.array_dimensions {
        el = el.attr("Dimension", dims.clone());
    }
    if let Some(radix) = &tag.radix {
        el = el.attr("Radix", radix.clone());
    }
    if let Some(ea) = &tag.external_access {
        el = el.attr("ExternalAccess", ea.clone());
    }
    if tag.constant {
        el = el.attr("Constant", "true");
    }
    if let Some(alias) = &tag.alias_for {
        el = el.attr("AliasFor", alias.clone());
    }
    if let Some(desc) = &tag.description {
        el.push_child(Element::with_text("Description", desc.clone()));
    }
    let value = tag.value.clone().unwrap_or_else(|| "0".to_string());
    el.push_child(
        Element::new("Data")
            .attr("Format", "Decorated")
            .child(Element::with_text("Value", value)),
    );
    el
}

fn build_tags(tags: &[Tag]) -> Element {
    let mut el = Element::new("Tags");
    for tag in tags {
        el.push_child(build_tag(tag));
    }
    el
}

fn build_programs(programs: &[Program]) -> Element {
    let mut el = Element::new("Programs");
    for program in programs {
        let mut program_el = Element::new("Program").attr("Name", program.name.clone());
        if let Some(main) = &program.main_routine_name {
            program_el = program_el.attr("MainRoutineName", main.clone());
        }
        program_el.push_child(build_tags(&program.tags));

        let mut routines_el = Element::new("Routines");
        for routine in &program.routines {
            let type_attr = match routine.kind {
                Some(RoutineKind::St) | None => "ST",
                Some(RoutineKind::Ld) => "RLL",
                Some(RoutineKind::Fbd) => "FBD",
                Some(RoutineKind::Sfc) => "SFC",
            };
            let mut routine_el = Element::new("Routine")
                .attr("Name", routine.name.clone())
                .attr("Type", type_attr)
                .child(
                    Element::new("Text")
                        .child(Element::with_text("CDATAContent", routine.content.clone())),
                );
            if !routine.local_variables.is_empty() {
                let mut locals_el = Element::new("LocalTags");
                for t in &routine.local_variables {
                    locals_el.push_child(build_tag_named(t, "LocalTag"));
                }
                routine_el.push_child(locals_el);
            }
            routines_el.push_child(routine_el);
        }
        program_el.push_child(routines_el);
        el.push_child(program_el);
    }
    el
}

fn build_tasks(project: &Project) -> Element {
    let mut main_task = Element::new("Task")
        .attr("Name", "MainTask")
        .attr("Type", "CONTINUOUS")
        .attr("Priority", "10")
        .attr("Watchdog", "500");
    let mut scheduled = Element::new("ScheduledPrograms");
    if let Some(first) = project.programs.first() {
        scheduled.push_child(Element::new("ScheduledProgram").attr("Name", first.name.clone()));
    }
    main_task.push_child(scheduled);
    Element::new("Tasks").child(main_task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Controller;

    #[test]
    fn serializes_controller_name_as_target_name() {
        let project = Project::new(Controller {
            name: "Acme".to_string(),
            ..Default::default()
        });
        let root = serialize(&project);
        assert_eq!(root.get_attr("TargetName"), Some("Acme"));
        assert_eq!(
            root.child_named("Controller").unwrap().get_attr("Name"),
            Some("Acme")
        );
    }

    #[test]
    fn base_types_always_present() {
        let project = Project::new(Controller::default());
        let root = serialize(&project);
        let types = root
            .child_named("Controller")
            .unwrap()
            .child_named("DataTypes")
            .unwrap();
        let names: Vec<&str> = types
            .children_named("DataType")
            .filter_map(|d| d.get_attr("Name"))
            .collect();
        assert!(names.contains(&"DINT"));
        assert!(names.contains(&"BOOL"));
    }

    #[test]
    fn array_tag_gets_dimension_attribute() {
        let mut tag = Tag::new("Buf", "INT", Scope::Program);
        tag.array_dimensions = Some("0..9".to_string());
        let el = build_tag(&tag);
        assert_eq!(el.get_attr("Dimension"), Some("0..9"));
    }

    #[test]
    fn tag_with_no_value_still_gets_placeholder_data_element() {
        let tag = Tag::new("Foo", "DINT", Scope::Controller);
        let el = build_tag(&tag);
        let value = el.child_named("Data").unwrap().child_named("Value").unwrap();
        assert_eq!(value.text.as_deref(), Some("0"));
    }

    #[test]
    fn routine_local_variables_emit_as_local_tag_elements() {
        use crate::ir::{Program, Routine, RoutineKind};

        let mut project = Project::new(Controller::default());
        project.programs.push(Program {
            name: "Main".to_string(),
            tags: Vec::new(),
            routines: vec![Routine {
                name: "R1".to_string(),
                kind: Some(RoutineKind::St),
                content: String::new(),
                local_variables: vec![Tag::new("Scratch", "DINT", Scope::Program)],
            }],
            main_routine_name: None,
        });
        let root = serialize(&project);
        let routine_el = root
            .find_all("Routine")
            .into_iter()
            .find(|r| r.get_attr("Name") == Some("R1"))
            .unwrap();
        let local = routine_el
            .child_named("LocalTags")
            .unwrap()
            .child_named("LocalTag")
            .unwrap();
        assert_eq!(local.get_attr("Name"), Some("Scratch"));
    }
}
