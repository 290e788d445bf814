//! Structural IR validator (SPEC_FULL §4.8).
//!
//! Grounded on `cli.py::validate_ir`; function-per-rule style grounded on
//! the teacher's `interpreter::validator` free functions.

use crate::ir::Project;

/// Controller must be present and named.
fn validate_controller_named(project: &Project, errors: &mut Vec<String>) {
    if project.controller.name.trim().is_empty() {
        errors.push("controller has no name".to_string());
    }
}

/// Controller must have at least one tag.
fn validate_has_tags(project: &Project, errors: &mut Vec<String>) {
    if project.controller.tags.is_empty() {
        errors.push("controller has no tags".to_string());
    }
}

/// Project must have at least one program.
fn validate_has_programs(project: &Project, errors: &mut Vec<String>) {
    if project.programs.is_empty() {
        errors.push("project has no programs".to_string());
    }
}

/// Every program must have at least one routine.
fn validate_programs_have_routines(project: &Project, errors: &mut Vec<String>) {
    for program in &project.programs {
        if program.routines.is_empty() {
            errors.push(format!("program '{}' has no routines", program.name));
        }
    }
}

/// Run all structural checks, returning the accumulated error messages.
/// An empty result means the IR is structurally valid.
pub fn validate_ir(project: &Project) -> Vec<String> {
    let mut errors = Vec::new();
    validate_controller_named(project, &mut errors);
    validate_has_tags(project, &mut errors);
    validate_has_programs(project, &mut errors);
    validate_programs_have_routines(project, &mut errors);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Controller, Program, Scope, Tag};

    #[test]
    fn empty_project_reports_all_violations() {
        let project = Project::new(Controller::default());
        let errors = validate_ir(&project);
        assert_eq!(errors.len(), 3); // unnamed, no tags, no programs (routines check is vacuous)
    }

    #[test]
    fn well_formed_project_has_no_errors() {
        let mut controller = Controller {
            name: "C".to_string(),
            ..Default::default()
        };
        controller.tags.push(Tag::new("A", "DINT", Scope::Controller));
        let mut project = Project::new(controller);
        project.programs.push(Program {
            name: "Main".to_string(),
            tags: Vec::new(),
            routines: vec![crate::ir::Routine {
                name: "R1".into(),
                kind: Some(crate::ir::RoutineKind::St),
                content: String::new(),
                local_variables: Vec::new(),
            }],
            main_routine_name: None,
        });
        assert!(validate_ir(&project).is_empty());
    }

    #[test]
    fn program_without_routines_is_flagged() {
        let mut controller = Controller {
            name: "C".to_string(),
            ..Default::default()
        };
        controller.tags.push(Tag::new("A", "DINT", Scope::Controller));
        let mut project = Project::new(controller);
        project.programs.push(Program {
            name: "Empty".to_string(),
            tags: Vec::new(),
            routines: Vec::new(),
            main_routine_name: None,
        });
        let errors = validate_ir(&project);
        assert_eq!(errors, vec!["program 'Empty' has no routines".to_string()]);
    }
}
