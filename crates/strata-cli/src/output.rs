use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print_as_table(value)?,
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Prints an array of flat objects as a table, anything else as JSON.
fn print_as_table(value: &Value) -> Result<()> {
    let Some(rows) = value.as_array().filter(|rows| !rows.is_empty()) else {
        println!("{}", serde_json::to_string_pretty(value)?);
        return Ok(());
    };
    let Some(columns) = rows[0].as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()) else {
        println!("{}", serde_json::to_string_pretty(value)?);
        return Ok(());
    };

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for row in rows {
        builder.push_record(columns.iter().map(|c| match row.get(c) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "-".to_string(),
            Some(other) => other.to_string(),
        }));
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!("Total: {}", rows.len());
    Ok(())
}
