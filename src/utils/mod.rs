pub mod fs;
pub mod month;
