use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use strata_graphql::GraphQLError;
use strata_graphql::config::validate_graphql_config;

use crate::output::print_success;

pub fn check(path: &Path) -> Result<()> {
    let config = crate::config::load_json(path)?;
    match validate_graphql_config(&config) {
        Ok(()) => {
            print_success(&format!("{} is a valid GraphQL config", path.display()));
            Ok(())
        }
        Err(GraphQLError::InvalidConfig(problems)) => {
            for problem in &problems {
                eprintln!("  {} {problem}", "-".red());
            }
            anyhow::bail!("{} has {} problem(s)", path.display(), problems.len())
        }
        Err(e) => Err(e.into()),
    }
}
