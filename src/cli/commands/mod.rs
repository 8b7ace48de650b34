//! Command execution.
//!
//! Commands report failures here: the error is printed with its recovery
//! suggestions and turned into a non-zero exit code.

mod publish;

use crate::cli::{Args, Command, OutputManager};
use crate::config::EnvConfig;
use crate::error::Result;

use publish::execute_publish;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args, env: &EnvConfig) -> Result<i32> {
    // Validation errors are never quiet
    let output = OutputManager::new(false, false);

    if let Err(validation_error) = args.validate() {
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let result = match &args.command {
        Command::Publish { .. } => execute_publish(&args, env).await,
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            output.error(&format!("Command '{}' failed: {}", args.command.name(), e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
