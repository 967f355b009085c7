pub mod discovery;
pub mod health;

pub use health::HealthStatus;
