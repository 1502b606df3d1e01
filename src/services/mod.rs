pub mod api;
pub mod faults;
pub mod retry;

pub use api::{CourseApi, CourseService, LatencyProfile};
pub use faults::{FaultPolicy, NoFaults, RandomFaults, ScriptedFaults};
pub use retry::{RetryOptions, with_retry};
