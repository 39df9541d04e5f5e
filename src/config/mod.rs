// src/config/mod.rs
pub mod app;
pub mod sections;

pub use app::{AppConfig, PipelineSettings, SmtpConfig};
pub use sections::{default_sections, load_sections_default, load_sections_from, SectionConfig};
