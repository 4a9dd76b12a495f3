pub mod commands;
pub mod help;
pub mod render;
