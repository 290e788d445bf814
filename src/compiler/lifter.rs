//! ST → IR lifter (SPEC_FULL §4.5).
//!
//! Grounded on `st2l5x.py::_parse_variable_declarations`/`_parse_program_logic`.

use crate::compiler::types::ConversionReport;
use crate::ident::{base_type_of, sanitize};
use crate::ir::{Controller, Program, Project, Routine, RoutineKind, Scope, Tag};

const BASE_TYPES: &[&str] = &[
    "BOOL", "SINT", "INT", "DINT", "LINT", "USINT", "UINT", "UDINT", "ULINT", "REAL", "LREAL",
    "TIME", "DATE", "TOD", "DT", "STRING", "BYTE", "WORD", "DWORD", "LWORD",
];

/// Strip `//` line comments and `(* ... *)` block comments (including ones
/// spanning multiple lines).
fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '(' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&')')) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }
        if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn scope_for(name: &str) -> Scope {
    let all_uppercase = name.chars().any(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit());
    if name.starts_with("HMI_") || name.starts_with("Global_") || all_uppercase {
        Scope::Controller
    } else {
        Scope::Program
    }
}

/// Parse one `name : type [:= init];` or `name : ARRAY [range] OF type [:= init];` line.
fn parse_declaration_line(line: &str) -> Option<Tag> {
    let line = line.trim().trim_end_matches(';').trim();
    if line.is_empty() {
        return None;
    }
    let (name, rest) = line.split_once(':')?;
    let name = name.trim().to_string();
    let rest = rest.trim();

    if let Some(after_array) = rest.strip_prefix("ARRAY") {
        let after_array = after_array.trim_start();
        let open = after_array.find('[')?;
        let close = after_array.find(']')?;
        let dims = after_array[open + 1..close].to_string();
        let remainder = after_array[close + 1..].trim();
        let remainder = remainder.strip_prefix("OF").unwrap_or(remainder).trim();
        let (type_part, init) = match remainder.split_once(":=") {
            Some((t, i)) => (t.trim(), Some(i.trim().to_string())),
            None => (remainder.trim(), None),
        };
        let mut tag = Tag::new(sanitize(&name), base_type_of(type_part), scope_for(&name));
        tag.array_dimensions = Some(dims);
        tag.value = init;
        return Some(tag);
    }

    let (type_part, init) = match rest.split_once(":=") {
        Some((t, i)) => (t.trim(), Some(i.trim().to_string())),
        None => (rest, None),
    };
    let mut tag = Tag::new(sanitize(&name), base_type_of(type_part), scope_for(&name));
    tag.value = init;
    Some(tag)
}

fn is_user_type(base_type: &str) -> bool {
    !BASE_TYPES.contains(&base_type)
}

struct ParsedVars {
    tags: Vec<Tag>,
    user_type_names: Vec<String>,
}

fn parse_variable_declarations(src: &str) -> ParsedVars {
    let mut tags = Vec::new();
    let mut user_type_names = Vec::new();
    let upper = src.to_ascii_uppercase();

    let mut search_from = 0;
    while let Some(var_rel) = upper[search_from..].find("VAR") {
        let var_start = search_from + var_rel;
        let body_start = var_start + 3;
        let Some(end_rel) = upper[body_start..].find("END_VAR") else {
            break;
        };
        let body = &src[body_start..body_start + end_rel];
        for line in body.split(';') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(tag) = parse_declaration_line(&format!("{line};")) {
                if is_user_type(&tag.base_type) && !user_type_names.contains(&tag.base_type) {
                    user_type_names.push(tag.base_type.clone());
                }
                tags.push(tag);
            }
        }
        search_from = body_start + end_rel + "END_VAR".len();
    }

    ParsedVars {
        tags,
        user_type_names,
    }
}

/// Everything not inside a `VAR ... END_VAR` block, after comment stripping.
fn program_body(src: &str) -> String {
    let mut out = Vec::new();
    let upper = src.to_ascii_uppercase();
    let mut pos = 0;
    loop {
        match upper[pos..].find("VAR") {
            Some(rel) => {
                let var_start = pos + rel;
                out.push(&src[pos..var_start]);
                let body_start = var_start + 3;
                match upper[body_start..].find("END_VAR") {
                    Some(end_rel) => {
                        pos = body_start + end_rel + "END_VAR".len();
                    }
                    None => {
                        pos = src.len();
                        break;
                    }
                }
            }
            None => {
                out.push(&src[pos..]);
                break;
            }
        }
    }
    out.join("")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lift a Structured Text source into an IR [`Project`] with a synthetic
/// `Generated_Controller` / `MainProgram` / `MainRoutine`.
pub fn lift(source: &str, report: &mut ConversionReport) -> Project {
    let cleaned = strip_comments(source);
    let parsed = parse_variable_declarations(&cleaned);
    let body = program_body(&cleaned);

    if parsed.tags.is_empty() {
        report.warn("no variable declarations found in ST source");
    }

    let mut controller = Controller {
        name: "Generated_Controller".to_string(),
        ..Default::default()
    };
    let mut program = Program {
        name: "MainProgram".to_string(),
        ..Default::default()
    };

    for tag in parsed.tags {
        match tag.scope {
            Some(Scope::Controller) => controller.tags.push(tag),
            _ => program.tags.push(tag),
        }
    }

    program.routines.push(Routine {
        name: "MainRoutine".to_string(),
        kind: Some(RoutineKind::St),
        content: body,
        local_variables: Vec::new(),
    });
    program.main_routine_name = Some("MainRoutine".to_string());

    let mut project = Project::new(controller);
    project.programs.push(program);
    project
}
