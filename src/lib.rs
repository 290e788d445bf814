//! A bidirectional translator between Rockwell L5X and consolidated IEC
//! 61131-3 Structured Text.
//!
//! [`compiler::Compiler`] ties together the L5X extractor, the LD/FBD-to-ST
//! translators, the ST lifter, the L5X serializer, the fidelity scorer, and
//! the structural validator into the five conversion pipelines described in
//! SPEC_FULL §2/§6. [`dom`] and [`xml_io`] keep the core's L5X handling
//! generic over the XML library; [`ir`] is the shared in-memory model
//! everything else operates on.

pub mod cli;
pub mod compiler;
pub mod dom;
pub mod ident;
pub mod ir;
pub mod xml_io;
