//! The intermediate representation shared by every pipeline (SPEC_FULL §3).

mod model;

pub use model::{
    Controller, Direction, FunctionBlock, FunctionBlockParameter, Program, Project, Routine,
    RoutineKind, Scope, Tag, UserType, UserTypeMember,
};
