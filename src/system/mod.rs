pub mod memory;
pub mod process;
