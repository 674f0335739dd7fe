//! Command pattern interfaces
//!
//! Every CLI mode is a `Command`; the factory picks one from the parsed
//! arguments so `main` only has to run it.

use crate::utils::logger::Logger;
use crate::errors::ScaleResult;

/// One runnable CLI mode
pub trait Command {
    /// Run the command to completion
    fn execute(&self) -> ScaleResult<()>;
}

/// Builds the command matching the parsed CLI arguments
pub trait CommandFactory<'a> {
    /// Pick and construct a command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Run log shared with the command
    ///
    /// # Returns
    /// The command to execute, or an error if the arguments are unusable
    fn create_command(&self, args: &clap::ArgMatches, logger: &'a Logger) -> ScaleResult<Box<dyn Command + 'a>>;
}
