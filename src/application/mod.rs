//! Orchestration layer: wallet allocation and registration, the assignment
//! gate, the transfer engine itself, and post-commit notification fan-out.

pub mod allocator;
pub mod dispatch;
pub mod engine;
pub mod gate;
pub mod registry;
