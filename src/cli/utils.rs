use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. Object `data` is merged
/// into the JSON envelope; anything else lands under `"data"`.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            match data {
                Some(Value::Object(fields)) => {
                    if let Value::Object(envelope) = &mut response {
                        envelope.extend(fields);
                    }
                }
                Some(other) => response["data"] = other,
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a list, one line per item in text mode
pub fn output_list(
    output_format: &OutputFormat,
    collection_name: &str,
    items: &[String],
    empty_message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: items }))?);
        }
        OutputFormat::Text if items.is_empty() => println!("{}", empty_message),
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
    }
    Ok(())
}
