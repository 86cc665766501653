use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print an API payload: raw JSON, or `key: value` lines for text output
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value.as_object() {
            Some(fields) => {
                for (key, field) in fields {
                    println!("{:<12} {}", format!("{}:", key), display(field));
                }
            }
            None => println!("{}", display(value)),
        },
    }
    Ok(())
}

/// Print a list of workspaces as a table (text) or an array (JSON)
pub fn output_workspaces(output_format: &OutputFormat, workspaces: &[Value]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "workspaces": workspaces }))?);
        }
        OutputFormat::Text => {
            if workspaces.is_empty() {
                println!("No workspaces");
                return Ok(());
            }

            println!("{:<38} {:<20} {:<25} {}", "ID", "SLUG", "NAME", "IMAGE");
            println!("{}", "-".repeat(100));
            for ws in workspaces {
                println!(
                    "{:<38} {:<20} {:<25} {}",
                    display(&ws["id"]),
                    display(&ws["slug"]),
                    display(&ws["name"]),
                    display(&ws["image"]),
                );
            }
        }
    }
    Ok(())
}

/// Scalar rendering without JSON quotes; null shows as "-"
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strips_quotes() {
        assert_eq!(display(&json!("acme")), "acme");
        assert_eq!(display(&Value::Null), "-");
        assert_eq!(display(&json!(true)), "true");
    }
}
