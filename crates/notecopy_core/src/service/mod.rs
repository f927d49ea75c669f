//! Copy use-case services.
//!
//! # Responsibility
//! - Orchestrate collection store calls into the note copy workflow.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod card_duplicator;
pub mod copy_service;
pub mod field_blanking;
pub mod id_allocator;
pub mod note_duplicator;
pub mod relation;
