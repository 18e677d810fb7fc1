use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format.
///
/// Object data is merged into the JSON envelope; anything else lands under `data`.
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

/// Report a failure and any work finished before it.
pub fn output_error(output_format: &OutputFormat, message: &str, completed: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message,
                "completed": completed,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            // the binary prints the error itself on exit
            for name in completed {
                eprintln!("  completed before failure: {}", name);
            }
        }
    }
    Ok(())
}

/// Print one line per name, or `empty` when there are none.
pub fn output_names(output_format: &OutputFormat, verb: &str, names: &[String], empty: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            if names.is_empty() { empty } else { verb },
            Some(json!({ "migrations": names })),
        ),
        OutputFormat::Text => {
            if names.is_empty() {
                println!("{}", empty);
            }
            for name in names {
                println!("{}: {}", verb, name);
            }
            Ok(())
        }
    }
}
