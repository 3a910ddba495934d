pub mod revision_config;
