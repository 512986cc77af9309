pub mod command;
pub mod generate;
pub mod info;
pub mod progress;
pub mod transform;
