pub mod services;

pub use services::TaskServicesHook;
