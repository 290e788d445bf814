//! The intermediate representation (SPEC_FULL §3).
//!
//! Cross-references are by name only; there are no pointer cycles. Every
//! component is owned by its parent.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Controller,
    Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    St,
    Ld,
    Fbd,
    Sfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    InOut,
    Local,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub name: String,
    pub base_type: String,
    pub scope: ScopeOpt,
    pub value: Option<String>,
    pub description: Option<String>,
    pub radix: Option<String>,
    pub external_access: Option<String>,
    pub constant: bool,
    pub alias_for: Option<String>,
    pub array_dimensions: Option<String>,
}

/// `Scope` has no sensible zero value, so `Tag::default()` carries an
/// `Option`-shaped wrapper instead of forcing a bogus default variant.
pub type ScopeOpt = Option<Scope>;

impl Tag {
    pub fn new(name: impl Into<String>, base_type: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            base_type: base_type.into(),
            scope: Some(scope),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserTypeMember {
    pub name: String,
    pub data_type: String,
    pub description: Option<String>,
    pub radix: Option<String>,
    pub external_access: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserType {
    pub name: String,
    pub base_type: Option<String>,
    pub members: Vec<UserTypeMember>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionBlockParameter {
    pub name: String,
    pub data_type: String,
    pub direction: DirectionOpt,
    pub required: bool,
}

pub type DirectionOpt = Option<Direction>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionBlock {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<FunctionBlockParameter>,
    pub local_tags: Vec<Tag>,
    pub implementation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Routine {
    pub name: String,
    pub kind: RoutineKindOpt,
    pub content: String,
    pub local_variables: Vec<Tag>,
}

pub type RoutineKindOpt = Option<RoutineKind>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub name: String,
    pub tags: Vec<Tag>,
    pub routines: Vec<Routine>,
    pub main_routine_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Controller {
    pub name: String,
    pub tags: Vec<Tag>,
    pub user_types: Vec<UserType>,
    pub function_blocks: Vec<FunctionBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    pub controller: Controller,
    pub programs: Vec<Program>,
}

impl Project {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            programs: Vec::new(),
        }
    }
}
