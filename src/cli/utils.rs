use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(obj), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                obj.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Prompt on stderr and read one trimmed line from stdin.
pub fn prompt_line(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask a yes/no question; anything but `y`/`yes` means no.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt_line(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
