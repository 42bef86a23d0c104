pub mod lens_env;
pub mod service;
