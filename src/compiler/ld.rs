//! LD (rung text) → ST translator (SPEC_FULL §4.3).
//!
//! Grounded on `ladder_logic.py`'s `CONDITIONAL_FUNCTIONS`/`REGULAR_FUNCTIONS`
//! split and per-mnemonic emitters, with TON/TOF/TONR field names taken from
//! the spec's explicit `.PT`/`.IN`/`.ET`/`.Q` contract rather than the
//! original's `.PRE`/`.TimerEnable`/`TONR()` shape.

use crate::compiler::types::ConversionReport;

const CONDITIONAL: &[&str] = &["XIC", "XIO", "EQU", "NEQ", "GRT", "GEQ", "LES", "LEQ"];

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Open,
    Close,
    Comma,
    Call { name: String, args: Vec<String> },
}

/// Replace `[`/`]` with their interior bracket surrogates and tokenize the
/// rung into `Open`/`Close`/`Comma`/`Call` tokens.
fn tokenize(text: &str) -> Vec<Tok> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '[' => '<',
            ']' => '>',
            other => other,
        })
        .collect();

    let chars: Vec<char> = normalized.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '<' => {
                tokens.push(Tok::Open);
                i += 1;
            }
            '>' => {
                tokens.push(Tok::Close);
                i += 1;
            }
            ',' => {
                tokens.push(Tok::Comma);
                i += 1;
            }
            ';' => {
                i += 1;
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                let mut args = Vec::new();
                if i < chars.len() && chars[i] == '(' {
                    i += 1;
                    let arg_start = i;
                    let mut depth = 1;
                    while i < chars.len() && depth > 0 {
                        match chars[i] {
                            '(' => depth += 1,
                            ')' => depth -= 1,
                            _ => {}
                        }
                        if depth > 0 {
                            i += 1;
                        }
                    }
                    let arg_text: String = chars[arg_start..i].iter().collect();
                    args = split_top_level_commas(&arg_text);
                    if i < chars.len() {
                        i += 1; // consume closing ')'
                    }
                }
                tokens.push(Tok::Call { name, args });
            }
            _ => {
                i += 1;
            }
        }
    }
    tokens
}

fn split_top_level_commas(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    let chars: Vec<char> = s.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(chars[start..i].iter().collect());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(chars[start..].iter().collect());
    parts
}

fn cond_to_st(name: &str, args: &[String]) -> Option<String> {
    Some(match (name, args) {
        ("XIC", [x]) => format!("({x} = 1)"),
        ("XIO", [x]) => format!("({x} = 0)"),
        ("EQU", [a, b]) => format!("({a} = {b})"),
        ("NEQ", [a, b]) => format!("({a} <> {b})"),
        ("GRT", [a, b]) => format!("({a} > {b})"),
        ("GEQ", [a, b]) => format!("({a} >= {b})"),
        ("LES", [a, b]) => format!("({a} < {b})"),
        ("LEQ", [a, b]) => format!("({a} <= {b})"),
        _ => return None,
    })
}

/// Parse the guard (condition prefix) of a rung starting at `pos`, returning
/// its ST boolean expression (or `None` if the rung has no guard) and the
/// token index of the first non-condition token.
fn parse_guard(tokens: &[Tok]) -> (Option<String>, usize) {
    let mut factors = Vec::new();
    let mut i = 0;
    loop {
        match tokens.get(i) {
            Some(Tok::Comma) => {
                i += 1;
            }
            Some(Tok::Open) => {
                let mut disjuncts = Vec::new();
                i += 1;
                loop {
                    match tokens.get(i) {
                        Some(Tok::Call { name, args }) if CONDITIONAL.contains(&name.as_str()) => {
                            if let Some(rendered) = cond_to_st(name, args) {
                                disjuncts.push(rendered);
                            }
                            i += 1;
                        }
                        Some(Tok::Comma) => {
                            i += 1;
                        }
                        Some(Tok::Close) => {
                            i += 1;
                            break;
                        }
                        _ => break,
                    }
                }
                if !disjuncts.is_empty() {
                    factors.push(format!("({})", disjuncts.join(" OR ")));
                }
            }
            Some(Tok::Call { name, args }) if CONDITIONAL.contains(&name.as_str()) => {
                if let Some(rendered) = cond_to_st(name, args) {
                    factors.push(rendered);
                }
                i += 1;
            }
            _ => break,
        }
    }
    if factors.is_empty() {
        (None, i)
    } else {
        (Some(factors.join(" AND ")), i)
    }
}

struct ActionEmit {
    then_lines: Vec<String>,
    else_lines: Vec<String>,
}

fn emit_action(name: &str, args: &[String]) -> ActionEmit {
    let then_only = |lines: Vec<String>| ActionEmit {
        then_lines: lines,
        else_lines: Vec::new(),
    };

    match (name, args) {
        ("OTE", [y]) => ActionEmit {
            then_lines: vec![format!("{y} := 1;")],
            else_lines: vec![format!("{y} := 0;")],
        },
        ("OTL", [y]) => then_only(vec![format!("{y} := 1;")]),
        ("OTU", [y]) | ("CLR", [y]) => then_only(vec![format!("{y} := 0;")]),
        ("NOP", []) => then_only(vec![]),
        ("MOV", [src, dst]) => then_only(vec![format!("{dst} := {src};")]),
        ("COP", [src, dst, len]) | ("CPS", [src, dst, len]) => {
            then_only(vec![format!("{dst} := {src}; // length {len}")])
        }
        ("FLL", [val, dst, len]) => then_only(vec![format!("{dst} := {val}; // fill length {len}")]),
        ("ADD", [a, b, dst]) => then_only(vec![format!("{dst} := {a} + {b};")]),
        ("SUB", [a, b, dst]) => then_only(vec![format!("{dst} := {a} - {b};")]),
        ("MUL", [a, b, dst]) => then_only(vec![format!("{dst} := {a} * {b};")]),
        ("DIV", [a, b, dst]) => then_only(vec![format!("{dst} := {a} / {b};")]),
        ("MOD", [a, b, dst]) => then_only(vec![format!("{dst} := MOD({a}, {b});")]),
        ("SQR", [a, dst]) => then_only(vec![format!("{dst} := SQRT({a});")]),
        ("ABS", [a, dst]) => then_only(vec![format!("{dst} := ABS({a});")]),
        ("TON", [t, pre, acc]) | ("TOF", [t, pre, acc]) | ("TONR", [t, pre, acc]) => ActionEmit {
            then_lines: vec![
                format!("{t}.PT := {pre};"),
                format!("{t}.IN := 1;"),
                format!("{t}.Q := ({t}.ET >= {t}.PT);"),
                format!("{acc} := {t}.ET;"),
            ],
            else_lines: vec![
                format!("{t}.IN := 0;"),
                format!("{t}.ET := 0;"),
                format!("{t}.Q := 0;"),
                format!("{acc} := 0;"),
            ],
        },
        ("RES", [t]) => then_only(vec![format!("{t}.ET := 0;"), format!("{t}.Q := 0;")]),
        ("CTU", [c, pre, rst]) => then_only(vec![
            format!("{c}.PRE := {pre};"),
            format!("{c}.CU := 1;"),
            format!("{c}.RES := {rst};"),
            format!("CTU({c});"),
        ]),
        ("CTD", [c, pre, rst]) => then_only(vec![
            format!("{c}.PRE := {pre};"),
            format!("{c}.CD := 1;"),
            format!("{c}.RES := {rst};"),
            format!("CTD({c});"),
        ]),
        ("CTUD", [c, pre, up, down]) => then_only(vec![
            format!("{c}.PRE := {pre};"),
            format!("{c}.CU := {up};"),
            format!("{c}.CD := {down};"),
            format!("CTUD({c});"),
        ]),
        ("GSV", [cls, inst, attr, dst]) => then_only(vec![format!(
            "GSV({});",
            gsv_fields(cls, inst, attr, dst).join(", ")
        )]),
        ("SSV", [cls, inst, attr, src]) => then_only(vec![format!("SSV({cls}, {inst}, {attr}, {src});")]),
        ("MSG", args) => then_only(vec![format!(
            "// MSG({}) -- message instruction not modeled",
            args.join(", ")
        )]),
        ("JSR", args) => then_only(vec![format!("// JSR {}", args.join(", "))]),
        ("RTRIG", [a]) => then_only(vec![format!("RTRIG({a});")]),
        ("FTRIG", [a]) => then_only(vec![format!("FTRIG({a});")]),
        ("OSR", [a, b]) => then_only(vec![format!("OSR({a}, {b});")]),
        ("OSF", [a, b]) => then_only(vec![format!("OSF({a}, {b});")]),
        ("BTD", [a, b]) => then_only(vec![format!("{b} := BCD_TO_INT({a});")]),
        ("DTB", [a, b]) => then_only(vec![format!("{b} := INT_TO_BCD({a});")]),
        ("FRD", [a, b]) => then_only(vec![format!("{b} := REAL_TO_INT({a});")]),
        ("TOD", [a, b]) => then_only(vec![format!("{b} := INT_TO_REAL({a});")]),
        _ if is_known_mnemonic(name) => then_only(vec![format!(
            "// ERROR: {name} expects a different number of arguments, got {}: {name}({})",
            args.len(),
            args.join(", ")
        )]),
        _ => then_only(vec![format!(
            "// ERROR: unknown instruction {name}({})",
            args.join(", ")
        )]),
    }
}

/// GSV's named, `?`-skipping argument list (`ladder_logic.py::gsv`). SSV has
/// no equivalent of its own: it is purely positional and never skips an
/// argument (`ladder_logic.py::ssv`).
fn gsv_fields(cls: &str, inst: &str, attr: &str, dst: &str) -> Vec<String> {
    let mut fields = Vec::new();
    if cls != "?" {
        fields.push(format!("ClassName := {cls}"));
    }
    if inst != "?" {
        fields.push(format!("InstanceName := {inst}"));
    }
    if attr != "?" {
        fields.push(format!("AttributeName := {attr}"));
    }
    if dst != "?" {
        fields.push(format!("Dest := {dst}"));
    }
    fields
}

fn is_known_mnemonic(name: &str) -> bool {
    const KNOWN: &[&str] = &[
        "OTE", "OTL", "OTU", "CLR", "NOP", "MOV", "COP", "CPS", "FLL", "ADD", "SUB", "MUL", "DIV",
        "MOD", "SQR", "ABS", "TON", "TOF", "TONR", "RES", "CTU", "CTD", "CTUD", "GSV", "SSV",
        "MSG", "JSR", "OSR", "OSF", "RTRIG", "FTRIG", "BTD", "DTB", "FRD", "TOD",
    ];
    KNOWN.contains(&name)
}

/// Whether `tok` can open a fresh condition guard: the start of a bracketed
/// OR-group, or a bare conditional mnemonic call.
fn starts_condition(tok: &Tok) -> bool {
    match tok {
        Tok::Open => true,
        Tok::Call { name, .. } => CONDITIONAL.contains(&name.as_str()),
        _ => false,
    }
}

fn render_segment(guard: Option<String>, then_lines: &[String], else_lines: &[String]) -> String {
    match guard {
        Some(cond) => {
            let mut out = String::new();
            out.push_str(&format!("IF ({cond}) THEN\n"));
            for line in then_lines {
                out.push_str(&format!("\t{line}\n"));
            }
            if !else_lines.is_empty() {
                out.push_str("ELSE\n");
                for line in else_lines {
                    out.push_str(&format!("\t{line}\n"));
                }
            }
            out.push_str("END_IF;");
            out
        }
        None => then_lines.join("\n"),
    }
}

/// Translate one rung's text into an ST fragment.
///
/// A rung is a sequence of one or more guard/action segments: once the
/// action stream that follows a guard runs back into a fresh condition
/// (an interleaved branch, e.g. `XIC(A)OTE(B)XIC(C)OTE(D)`), that starts a
/// new `IF ... THEN ... END_IF;` segment rather than folding into the first
/// (SPEC_FULL §4.3 "actions ... guarded by interleaved conditions").
pub fn translate_rung(text: &str, report: &mut ConversionReport) -> String {
    let tokens = tokenize(text);
    let mut segments = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let (guard, consumed) = parse_guard(&tokens[i..]);
        i += consumed;

        let mut then_lines = Vec::new();
        let mut else_lines = Vec::new();
        while i < tokens.len() && !starts_condition(&tokens[i]) {
            match &tokens[i] {
                Tok::Call { name, args } => {
                    let emit = emit_action(name, args);
                    if emit.then_lines.iter().any(|l| l.starts_with("// ERROR")) {
                        report.warn(format!("rung translation issue: {}", emit.then_lines[0]));
                    }
                    then_lines.extend(emit.then_lines);
                    else_lines.extend(emit.else_lines);
                    i += 1;
                }
                _ => i += 1,
            }
        }

        segments.push(render_segment(guard, &then_lines, &else_lines));
    }

    segments.join("\n")
}
