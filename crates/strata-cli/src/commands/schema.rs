use anyhow::Result;
use serde_json::{Value, json};
use strata_graphql::ClassSchemaBuilder;

use crate::cli::OutputFormat;
use crate::output::print_value;

pub async fn sdl(builder: &ClassSchemaBuilder) -> Result<()> {
    let schema = builder.load().await?;
    println!("{}", schema.sdl());
    Ok(())
}

pub async fn types(builder: &ClassSchemaBuilder, format: OutputFormat) -> Result<()> {
    let schema = builder.load().await?;
    let rows: Vec<Value> = schema
        .model()
        .types
        .values()
        .map(|ty| {
            json!({
                "name": ty.name(),
                "kind": ty.kind(),
                "fields": ty.fields().map(|f| f.len()),
            })
        })
        .collect();
    print_value(&Value::Array(rows), format)
}
