//! L5X element tree → IR (SPEC_FULL §4.2).

use crate::compiler::ld::translate_rung;
use crate::compiler::fbd::translate_sheet_routine;
use crate::compiler::types::ConversionReport;
use crate::dom::Element;
use crate::ident::{base_type_of, sanitize};
use crate::ir::{
    Controller, Direction, FunctionBlock, FunctionBlockParameter, Program, Project, Routine,
    RoutineKind, Scope, Tag, UserType, UserTypeMember,
};

use super::errors::CoreError;

/// Extract a [`Project`] from the root of an L5X document.
///
/// Only a missing `Controller` element is fatal; every other extraction
/// failure is recorded on the returned report and the offending entity is
/// skipped.
pub fn extract(root: &Element) -> Result<(Project, ConversionReport), CoreError> {
    let mut report = ConversionReport::new();

    let controller_el = root
        .child_named("Controller")
        .or_else(|| (root.name == "Controller").then_some(root))
        .ok_or(CoreError::MissingController)?;

    let controller = extract_controller(controller_el, &mut report);
    let mut project = Project::new(controller);

    if let Some(programs_el) = controller_el.child_named("Programs") {
        for program_el in programs_el.children_named("Program") {
            match extract_program(program_el, &mut report) {
                Some(program) => project.programs.push(program),
                None => report.warn(format!(
                    "skipped program '{}': extraction failed",
                    program_el.get_attr("Name").unwrap_or("<unnamed>")
                )),
            }
        }
    }

    Ok((project, report))
}

fn extract_controller(el: &Element, report: &mut ConversionReport) -> Controller {
    let name = el
        .get_attr("Name")
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown_Controller")
        .to_string();

    let mut controller = Controller {
        name,
        ..Default::default()
    };

    if let Some(tags_el) = el.child_named("Tags") {
        for tag_el in tags_el.children_named("Tag") {
            match extract_tag(tag_el, Scope::Controller) {
                Some(tag) => controller.tags.push(tag),
                None => report.warn(format!(
                    "skipped controller tag '{}': extraction failed",
                    tag_el.get_attr("Name").unwrap_or("<unnamed>")
                )),
            }
        }
    }

    if let Some(types_el) = el.child_named("DataTypes") {
        for type_el in types_el.children_named("DataType") {
            match extract_user_type(type_el) {
                Some(ut) => controller.user_types.push(ut),
                None => report.warn(format!(
                    "skipped data type '{}': extraction failed",
                    type_el.get_attr("Name").unwrap_or("<unnamed>")
                )),
            }
        }
    }

    if let Some(aoi_el) = el.child_named("AddOnInstructionDefinitions") {
        for fb_el in aoi_el.children_named("AddOnInstructionDefinition") {
            match extract_function_block(fb_el, report) {
                Some(fb) => controller.function_blocks.push(fb),
                None => report.warn(format!(
                    "skipped Add-On Instruction '{}': extraction failed",
                    fb_el.get_attr("Name").unwrap_or("<unnamed>")
                )),
            }
        }
    }

    controller
}

fn extract_tag(el: &Element, scope: Scope) -> Option<Tag> {
    let name = sanitize(el.get_attr("Name")?);
    let raw_type = el.get_attr("DataType").unwrap_or("DINT");
    let base_type = base_type_of(raw_type);

    let value = el
        .child_named("Data")
        .and_then(|d| d.child_named("Value").and_then(|v| v.text.clone()).or_else(|| d.text.clone()))
        .or_else(|| el.get_attr("Value").map(str::to_string))
        .map(|v| decode_value(&v));

    Some(Tag {
        name,
        base_type,
        scope: Some(scope),
        value,
        description: el.child_named("Description").map(|d| d.text_or_empty().to_string()),
        radix: el.get_attr("Radix").map(str::to_string),
        external_access: el.get_attr("ExternalAccess").map(str::to_string),
        constant: el.get_attr("Constant").map(|v| v == "true").unwrap_or(false),
        alias_for: el.get_attr("AliasFor").map(str::to_string),
        array_dimensions: el.get_attr("Dimension").map(str::to_string),
    })
}

/// Decode hex-literal tag values of the form `'$00$00$00$1E'` to a decimal
/// string; other values pass through unchanged (SPEC_FULL §4.2 / §8 scenario 5).
fn decode_value(raw: &str) -> String {
    let trimmed = raw.trim_matches('\'');
    if !trimmed.starts_with('$') {
        return raw.to_string();
    }
    let mut bytes = Vec::new();
    for chunk in trimmed.split('$').filter(|s| !s.is_empty()) {
        match u8::from_str_radix(chunk, 16) {
            Ok(b) => bytes.push(b),
            Err(_) => return raw.to_string(),
        }
    }
    if bytes.is_empty() {
        return raw.to_string();
    }
    let mut value: u64 = 0;
    for b in bytes.iter() {
        value = (value << 8) | *b as u64;
    }
    value.to_string()
}

fn extract_user_type(el: &Element) -> Option<UserType> {
    let name = sanitize(el.get_attr("Name")?);
    let base_type = el.get_attr("Use").map(str::to_string);
    let mut members = Vec::new();
    if let Some(members_el) = el.child_named("Members") {
        for member_el in members_el.children_named("Member") {
            let Some(member_name) = member_el.get_attr("Name") else {
                continue;
            };
            members.push(UserTypeMember {
                name: member_name.to_string(),
                data_type: base_type_of(member_el.get_attr("DataType").unwrap_or("DINT")),
                description: member_el
                    .child_named("Description")
                    .map(|d| d.text_or_empty().to_string()),
                radix: member_el.get_attr("Radix").map(str::to_string),
                external_access: member_el.get_attr("ExternalAccess").map(str::to_string),
            });
        }
    }
    Some(UserType {
        name,
        base_type,
        members,
    })
}

fn extract_function_block(el: &Element, report: &mut ConversionReport) -> Option<FunctionBlock> {
    let name = sanitize(el.get_attr("Name")?);
    let description = el
        .child_named("Description")
        .map(|d| d.text_or_empty().to_string());

    let mut parameters = Vec::new();
    if let Some(params_el) = el.child_named("Parameters") {
        for param_el in params_el.children_named("Parameter") {
            let Some(param_name) = param_el.get_attr("Name") else {
                continue;
            };
            let direction = match param_el.get_attr("Usage") {
                Some("Input") => Some(Direction::Input),
                Some("Output") => Some(Direction::Output),
                Some("InOut") => Some(Direction::InOut),
                _ => Some(Direction::Local),
            };
            parameters.push(FunctionBlockParameter {
                name: param_name.to_string(),
                data_type: base_type_of(param_el.get_attr("DataType").unwrap_or("BOOL")),
                direction,
                required: param_el.get_attr("Required").map(|v| v == "true").unwrap_or(false),
            });
        }
    }

    let mut local_tags = Vec::new();
    if let Some(locals_el) = el.child_named("LocalTags") {
        for tag_el in locals_el.children_named("LocalTag") {
            match extract_tag(tag_el, Scope::Controller) {
                Some(tag) => local_tags.push(tag),
                None => report.warn(format!(
                    "skipped local tag '{}' in Add-On Instruction '{name}': extraction failed",
                    tag_el.get_attr("Name").unwrap_or("<unnamed>")
                )),
            }
        }
    }

    Some(FunctionBlock {
        name,
        description,
        parameters,
        local_tags,
        implementation: None,
    })
}

fn extract_program(el: &Element, report: &mut ConversionReport) -> Option<Program> {
    let name = sanitize(el.get_attr("Name")?);
    let mut program = Program {
        name,
        main_routine_name: el.get_attr("MainRoutineName").map(str::to_string),
        ..Default::default()
    };

    if let Some(tags_el) = el.child_named("Tags") {
        for tag_el in tags_el.children_named("Tag") {
            match extract_tag(tag_el, Scope::Program) {
                Some(tag) => program.tags.push(tag),
                None => report.warn(format!(
                    "skipped program tag '{}' in program '{}': extraction failed",
                    tag_el.get_attr("Name").unwrap_or("<unnamed>"),
                    program.name
                )),
            }
        }
    }

    for routine_el in find_routines(el) {
        match extract_routine(routine_el, report) {
            Some(routine) => program.routines.push(routine),
            None => report.warn(format!(
                "skipped routine '{}' in program '{}': extraction failed",
                routine_el.get_attr("Name").unwrap_or("<unnamed>"),
                program.name
            )),
        }
    }

    Some(program)
}

/// Two extraction paths: a high-level accessor (a direct `Routines` child)
/// and a direct element walk, used when the accessor finds nothing
/// (SPEC_FULL §4.2 "two extraction paths").
fn find_routines(program_el: &Element) -> Vec<&Element> {
    if let Some(routines_el) = program_el.child_named("Routines") {
        let direct: Vec<&Element> = routines_el.children_named("Routine").collect();
        if !direct.is_empty() {
            return direct;
        }
    }
    program_el.find_all("Routine")
}

fn extract_routine(el: &Element, report: &mut ConversionReport) -> Option<Routine> {
    let name = sanitize(el.get_attr("Name")?);
    let kind = match el.get_attr("Type") {
        Some("RLL") => RoutineKind::Ld,
        Some("FBD") => RoutineKind::Fbd,
        Some("SFC") => RoutineKind::Sfc,
        _ => RoutineKind::St,
    };

    let content = match kind {
        RoutineKind::St => el
            .find_all("CDATAContent")
            .first()
            .map(|c| c.text_or_empty().to_string())
            .unwrap_or_default(),
        RoutineKind::Ld => {
            let mut lines = Vec::new();
            for rung_el in el.find_all("Rung") {
                let text = rung_el
                    .child_named("Text")
                    .map(|t| t.text_or_empty())
                    .unwrap_or("");
                lines.push(translate_rung(text, report));
            }
            lines.join("\n")
        }
        RoutineKind::Fbd => translate_sheet_routine(el, report),
        RoutineKind::Sfc => {
            report.warn(format!("routine '{name}': SFC translation is not supported"));
            String::new()
        }
    };

    let mut local_variables = Vec::new();
    if let Some(locals_el) = el.child_named("LocalTags") {
        for tag_el in locals_el.children_named("LocalTag") {
            match extract_tag(tag_el, Scope::Program) {
                Some(tag) => local_variables.push(tag),
                None => report.warn(format!(
                    "skipped local variable '{}' in routine '{name}': extraction failed",
                    tag_el.get_attr("Name").unwrap_or("<unnamed>")
                )),
            }
        }
    }

    Some(Routine {
        name,
        kind: Some(kind),
        content,
        local_variables,
    })
}
