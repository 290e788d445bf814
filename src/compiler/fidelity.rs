//! Round-trip fidelity scoring (SPEC_FULL §4.7).
//!
//! Grounded on `ir_converter.py::calculate_fidelity_score`.

use crate::ir::Project;

/// Component-match ratio between an original IR and a round-tripped one.
/// Returns `1.0` when the original has no components to compare.
pub fn calculate_fidelity_score(original: &Project, converted: &Project) -> f64 {
    let total = original.controller.tags.len()
        + original.controller.user_types.len()
        + original.programs.len();

    if total == 0 {
        return 1.0;
    }

    let mut matched = 0usize;

    for tag in &original.controller.tags {
        if converted.controller.tags.iter().any(|c| {
            c.name == tag.name && c.base_type == tag.base_type && c.scope == tag.scope
        }) {
            matched += 1;
        }
    }

    for ut in &original.controller.user_types {
        if converted
            .controller
            .user_types
            .iter()
            .any(|c| c.name == ut.name && c.members.len() == ut.members.len())
        {
            matched += 1;
        }
    }

    for program in &original.programs {
        if converted
            .programs
            .iter()
            .any(|c| c.name == program.name && c.routines.len() == program.routines.len())
        {
            matched += 1;
        }
    }

    matched as f64 / total as f64
}
