pub mod debounce;
pub mod project_wizard;
pub mod projects;
