pub mod inputs;
pub mod lines;
pub mod output;

pub use inputs::{expand_input, expand_inputs};
pub use lines::{LineSource, LineStream, LocalFs, MemorySource, read_lines};
pub use output::{SUCCESS_MARKER, part_file_name, write_parts};
