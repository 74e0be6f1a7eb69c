pub mod image_store;
pub mod project;
pub mod sqlx_repo;
