pub mod resume_loader;
pub mod toml_loader;

pub use resume_loader::{is_supported_resume, load_resume_files};
pub use toml_loader::load_job_config;
