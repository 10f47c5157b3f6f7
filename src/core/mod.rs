pub mod columns;
pub mod manager;
pub mod render;
pub mod submission;
