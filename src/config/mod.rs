pub mod registry_config;

pub use registry_config::RegistryConfig;
