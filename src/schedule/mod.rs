pub mod generator;
pub mod policy;

pub use generator::{generate, generate_now};
pub use policy::SchedulePolicy;
