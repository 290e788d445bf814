//! Lexical helpers: reserved-word remapping, identifier sanitation, and
//! base-type extraction (SPEC_FULL §4.1).
//!
//! These are pure functions. `sanitize` is idempotent: `sanitize(sanitize(s))
//! == sanitize(s)` for all `s`.

/// Reserved ST keywords (and a few vendor-specific collisions) that must be
/// remapped before an L5X name can be used as an ST identifier.
const RESERVED_WORDS: &[(&str, &str)] = &[
    ("ON", "ON1"),
    ("TYPE", "TYPE1"),
    ("EN", "EN1"),
    ("SCALE", "scl1"),
    ("ALM", "alarm1"),
    ("ALARM", "alert"),
    ("TON", "TON1"),
    ("R_TRIG", "R_TRIG1"),
    ("TO", "TO1"),
    ("SHUTODWN1", "SHUTDOWN1"),
    ("SHUTODWN2", "SHUTDOWN2"),
    ("SHUTODWN3", "SHUTDOWN3"),
    ("SHUTODWN4", "SHUTDOWN4"),
    ("SHUTODWN5", "SHUTDOWN5"),
    ("SHUTDOWN", "Shutdown"),
    ("STATUS", "Status"),
    ("HTY", "Hty"),
    ("AVL", "Avl"),
];

fn reserved_replacement(ident: &str) -> Option<&'static str> {
    let upper = ident.to_ascii_uppercase();
    RESERVED_WORDS
        .iter()
        .find(|(k, _)| *k == upper)
        .map(|(_, v)| *v)
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`, then prefix
/// `var_` if the result starts with a digit.
fn clean_identifier(ident: &str) -> String {
    let replaced: String = ident
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match replaced.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("var_{replaced}"),
        _ => replaced,
    }
}

/// The full identifier policy: reserved-word substitution, then
/// character cleaning, then leading-digit prefixing.
pub fn sanitize(ident: &str) -> String {
    if let Some(replacement) = reserved_replacement(ident) {
        return replacement.to_string();
    }
    clean_identifier(ident)
}

/// Strip array-bracket (`Foo[10]`) and angle-bracket (`Foo<bar>`) decorations
/// from a type string, returning the bare base type name.
pub fn base_type_of(type_str: &str) -> String {
    let without_brackets = match type_str.find('[') {
        Some(idx) => &type_str[..idx],
        None => type_str,
    };
    let without_angles = match without_brackets.find('<') {
        Some(idx) => &without_brackets[..idx],
        None => without_brackets,
    };
    without_angles.trim().to_string()
}
