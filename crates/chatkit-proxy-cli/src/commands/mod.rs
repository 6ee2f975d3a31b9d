pub mod doctor;
pub mod serve;

pub use doctor::DoctorCommand;
pub use serve::ServeArgs;
