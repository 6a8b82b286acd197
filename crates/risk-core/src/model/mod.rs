pub mod benchmark;
pub mod employment;
pub mod occupation;
pub mod sector;
pub mod tool;

pub use benchmark::{ByOccupationWinRate, BySectorWinRate, Model, ModelRelease};
pub use employment::EmploymentRecord;
pub use occupation::{Occupation, Task, TaskType};
pub use sector::NaicsSector;
pub use tool::{Tool, ToolSource};
