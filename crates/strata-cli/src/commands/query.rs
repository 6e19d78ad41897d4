use anyhow::{Context, Result};
use async_graphql::{Request, Variables};
use strata_graphql::ClassSchemaBuilder;

use crate::cli::{OutputFormat, QueryArgs};
use crate::output::print_value;

pub async fn execute(builder: &ClassSchemaBuilder, args: &QueryArgs, format: OutputFormat) -> Result<()> {
    let schema = builder.load().await?;

    let mut request = Request::new(args.query.as_str());
    if let Some(variables) = &args.variables {
        let variables: serde_json::Value =
            serde_json::from_str(variables).context("--variables must be a JSON object")?;
        request = request.variables(Variables::from_json(variables));
    }

    let response = schema.execute(request, builder.context("cli")).await;
    let error_count = response.errors.len();
    print_value(&serde_json::to_value(&response)?, format)?;
    if error_count > 0 {
        anyhow::bail!("Operation returned {error_count} error(s)");
    }
    Ok(())
}
