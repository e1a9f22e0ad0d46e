mod convert_command;
mod formats_command;

pub use convert_command::command_convert;
pub use formats_command::command_formats;
