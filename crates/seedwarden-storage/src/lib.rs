//! Local persistence for seed material: exclusive, owner-only files that are
//! only allowed to land on a memory-backed filesystem.

pub mod fs_inspector;
pub mod secure_file_writer;
