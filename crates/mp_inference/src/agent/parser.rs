use serde_json::Value;
use mp_core::{Error, RawArticle, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    Final(String),
    Invalid(String),
}

/// Reads one model turn. A final answer wins over an action in the same turn.
pub fn parse_step(output: &str) -> AgentStep {
    if let Some(idx) = output.find("Final Answer:") {
        return AgentStep::Final(output[idx + "Final Answer:".len()..].trim().to_string());
    }

    if let Some(action_idx) = output.find("Action:") {
        let after_action = &output[action_idx + "Action:".len()..];
        if let Some(input_idx) = after_action.find("Action Input:") {
            let tool = after_action[..input_idx].trim().to_string();
            let input = after_action[input_idx + "Action Input:".len()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .trim_matches('"')
                .to_string();
            if !tool.is_empty() {
                return AgentStep::Action { tool, input };
            }
        }
        return AgentStep::Invalid(
            "Invalid Format: Missing 'Action Input:' after 'Action:'".to_string(),
        );
    }

    // Models often skip the protocol and reply with the article list directly.
    if let Some(json) = extract_json(output) {
        if json.starts_with('[') && serde_json::from_str::<Vec<Value>>(&json).is_ok() {
            return AgentStep::Final(json);
        }
    }

    AgentStep::Invalid(
        "Invalid Format: Missing 'Action:' or 'Final Answer:'".to_string(),
    )
}

/// Pulls a JSON document out of free text: fenced block first, then the
/// outermost brackets.
pub fn extract_json(text: &str) -> Option<String> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }

    None
}

/// Decodes the agent's final answer into articles. Entries that are not
/// objects are skipped; anything other than an array is a parse error.
pub fn parse_articles(answer: &str) -> Result<Vec<RawArticle>> {
    let trimmed = answer.trim();
    let json = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(_) => {
            let extracted = extract_json(trimmed)
                .ok_or_else(|| Error::Parse(format!("No JSON in agent output: {}", trimmed)))?;
            serde_json::from_str::<Value>(&extracted)
                .map_err(|e| Error::Parse(format!("Invalid JSON in agent output: {}", e)))?
        }
    };

    let Value::Array(items) = json else {
        return Err(Error::Parse("Agent output is not a JSON array".to_string()));
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<RawArticle>(item).ok())
        .collect())
}
