use serde_json::Value;

use crate::types::ChatMessage;

const MISSING_PAYLOAD: &str =
    "The catalog data is not available yet, but feel free to rerun the request.";

/// Writes the assistant's reply to a tool result the plain chat endpoint cannot script.
///
/// Known catalog tools get a short summary. Anything else, including payloads
/// that are not JSON, is echoed back verbatim.
pub fn summarize_tool_payload(message: &ChatMessage) -> String {
    let Some(payload) = message.text() else {
        return MISSING_PAYLOAD.to_string();
    };
    let tool = message
        .tool_name
        .as_deref()
        .map(|name| name.trim().to_lowercase())
        .unwrap_or_default();

    match serde_json::from_str::<Value>(payload) {
        Ok(root) => {
            if let Some(summary) = summarize_known_tool(&tool, &root) {
                return summary;
            }
        }
        Err(error) => {
            tracing::warn!(tool = %tool, %error, "failed to parse tool payload");
        }
    }

    format!("Here is what the tool returned: {payload}")
}

fn summarize_known_tool(tool: &str, root: &Value) -> Option<String> {
    match tool {
        "list_products" => {
            let products = root.get("products")?;
            let names: Vec<&str> = products
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.get("name").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default();
            if names.is_empty() {
                return Some("The catalog is empty right now.".to_string());
            }
            let top: Vec<&str> = names.into_iter().take(2).collect();
            Some(format!(
                "According to the catalog we currently have: {}.",
                top.join(", ")
            ))
        }
        "get_product_snapshot" => {
            root.get("name")?;
            Some(format!(
                "Snapshot for {}: priced at {}.",
                scalar_text(root.get("name")),
                scalar_text(root.get("price"))
            ))
        }
        _ => None,
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}
