use std::sync::Arc;
use mp_core::{CompletionRequest, Error, LanguageModel, NewsSource, Result};
use tracing::{debug, info, warn};

pub mod parser;

pub use parser::{extract_json, parse_articles, parse_step, AgentStep};

pub const DEFAULT_MAX_ITERATIONS: usize = 3;
const OBSERVATION_STOP: &str = "\nObservation:";

const PROMPT_TEMPLATE: &str = r#"You are a financial analyst agent. Your task is to {input} Use the provided tools to fetch data and return results in JSON format.

Available tools: {tool_names}

Tool descriptions:
{tools}

Use the following format:

Thought: what to do next
Action: the tool to use, one of [{tool_names}]
Action Input: the input to the tool
Observation: the tool result
... (Thought/Action/Action Input/Observation may repeat)
Thought: I now have the articles
Final Answer: the articles as a JSON list

Example final answer:
```json
[
  {"title": "Article 1", "text": "Content", "source": "Source", "timestamp": "ISO_date"},
  {"title": "Article 2", "text": "Content", "source": "Source", "timestamp": "ISO_date"}
]
```

If no data is found or an error occurs, the final answer is an empty list `[]`.

Agent Scratchpad:
{agent_scratchpad}"#;

/// ReAct loop letting the model pick among news sources.
pub struct ToolAgent {
    model: Arc<dyn LanguageModel>,
    tools: Vec<Arc<dyn NewsSource>>,
    max_iterations: usize,
}

impl ToolAgent {
    pub fn new(model: Arc<dyn LanguageModel>, tools: Vec<Arc<dyn NewsSource>>) -> Self {
        Self {
            model,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn tools(&self) -> &[Arc<dyn NewsSource>] {
        &self.tools
    }

    fn tool(&self, name: &str) -> Option<&Arc<dyn NewsSource>> {
        self.tools.iter().find(|tool| tool.name().eq_ignore_ascii_case(name))
    }

    fn render_prompt(&self, task: &str, scratchpad: &str) -> String {
        let tool_names = self
            .tools
            .iter()
            .map(|tool| tool.name())
            .collect::<Vec<_>>()
            .join(", ");
        let tools = self
            .tools
            .iter()
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n");

        PROMPT_TEMPLATE
            .replace("{input}", task)
            .replace("{tool_names}", &tool_names)
            .replace("{tools}", &tools)
            .replace("{agent_scratchpad}", scratchpad)
    }

    async fn observe(&self, tool: &str, input: &str) -> String {
        let Some(source) = self.tool(tool) else {
            return format!(
                "{} is not a valid tool, try one of [{}].",
                tool,
                self.tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
            );
        };

        match source.fetch(input).await {
            Ok(articles) => {
                info!("{} returned {} articles for '{}'", source.name(), articles.len(), input);
                serde_json::to_string(&articles).unwrap_or_else(|_| "[]".to_string())
            }
            Err(e) => {
                warn!("{} failed for '{}': {}", source.name(), input, e);
                format!("Error: {}", e)
            }
        }
    }

    /// Runs the loop and returns the raw final answer text. Model errors
    /// propagate unchanged so callers can tell rate limiting apart.
    pub async fn run(&self, task: &str) -> Result<String> {
        let mut scratchpad = String::new();

        for iteration in 1..=self.max_iterations {
            let prompt = self.render_prompt(task, &scratchpad);
            let request = CompletionRequest::new(prompt).with_stop(OBSERVATION_STOP);
            let mut output = self.model.complete(request).await?;
            if let Some(idx) = output.find(OBSERVATION_STOP) {
                output.truncate(idx);
            }
            debug!("Agent iteration {}: {}", iteration, output);

            let observation = match parse_step(&output) {
                AgentStep::Final(answer) => return Ok(answer),
                AgentStep::Action { tool, input } => self.observe(&tool, &input).await,
                AgentStep::Invalid(message) => {
                    debug!("Agent produced unparseable output: {}", message);
                    message
                }
            };

            scratchpad.push_str(output.trim_end());
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");
        }

        Err(Error::Agent(format!(
            "Agent stopped due to iteration limit ({})",
            self.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScriptedModel, ScriptedReply};
    use crate::test_support::{article, StaticSource};

    fn scrape_tool() -> Arc<dyn NewsSource> {
        Arc::new(StaticSource::new(
            "ScrapeNews",
            vec![article("Acme beats", "Acme Corp reported record profit", "2024-05-01T10:00:00")],
        ))
    }

    fn text(s: &str) -> ScriptedReply {
        ScriptedReply::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_tool_call_then_final_answer() {
        let model = Arc::new(ScriptedModel::new(vec![
            text("Thought: search\nAction: ScrapeNews\nAction Input: Acme Corp"),
            text("Final Answer: [{\"title\": \"Acme beats\"}]"),
        ]));
        let agent = ToolAgent::new(model.clone(), vec![scrape_tool()]);

        let answer = agent.run("Fetch financial news for Acme Corp.").await.unwrap();
        assert_eq!(answer, "[{\"title\": \"Acme beats\"}]");

        let prompts = model.prompts();
        assert!(prompts[0].contains("ScrapeNews: Returns canned articles."));
        assert!(prompts[1].contains("Observation: [{\"title\":\"Acme beats\""));
    }

    #[tokio::test]
    async fn test_output_after_stop_sequence_is_ignored() {
        let model = Arc::new(ScriptedModel::always(text(
            "Action: ScrapeNews\nAction Input: Acme\nObservation: hallucinated\nFinal Answer: []",
        )));
        let agent = ToolAgent::new(model.clone(), vec![scrape_tool()]);

        assert!(agent.run("task").await.is_err());
        assert_eq!(model.calls(), DEFAULT_MAX_ITERATIONS);
    }

    #[tokio::test]
    async fn test_invalid_output_is_fed_back() {
        let model = Arc::new(ScriptedModel::new(vec![
            text("The market looks good."),
            text("Final Answer: []"),
        ]));
        let agent = ToolAgent::new(model.clone(), vec![scrape_tool()]);

        assert_eq!(agent.run("task").await.unwrap(), "[]");
        assert!(model.prompts()[1].contains("Invalid Format"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported() {
        let model = Arc::new(ScriptedModel::new(vec![
            text("Action: Bloomberg\nAction Input: Acme"),
            text("Final Answer: []"),
        ]));
        let agent = ToolAgent::new(model.clone(), vec![scrape_tool()]);

        agent.run("task").await.unwrap();
        assert!(model.prompts()[1].contains("Bloomberg is not a valid tool"));
    }

    #[tokio::test]
    async fn test_iteration_limit_is_an_agent_error() {
        let model = Arc::new(ScriptedModel::always(text("hmm")));
        let agent = ToolAgent::new(model.clone(), vec![scrape_tool()]).with_max_iterations(2);

        let err = agent.run("task").await.unwrap_err();
        assert!(matches!(err, Error::Agent(_)));
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        let model = Arc::new(ScriptedModel::always(ScriptedReply::RateLimited));
        let agent = ToolAgent::new(model, vec![scrape_tool()]);
        assert!(agent.run("task").await.unwrap_err().is_rate_limited());
    }
}
