mod script;

pub use script::{generate_script, write_script, ScriptOptions};
