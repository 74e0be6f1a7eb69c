pub mod admin;
pub mod project;
