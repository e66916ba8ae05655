//! Check command implementation.

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::Formatter;
use jsondoc_domain::QueryEngine;
use jsondoc_query::JqEngine;

/// Execute the check command.
pub fn execute_check(args: CheckArgs, formatter: &Formatter) -> Result<String> {
    JqEngine::new().compile(&args.query)?;
    Ok(formatter.success(&format!("Query is valid: {}", args.query)))
}
