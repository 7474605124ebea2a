use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use async_trait::async_trait;
use mp_core::{CompletionRequest, Error, LanguageModel, Result, TOGETHER_RATE_LIMIT_MESSAGE};

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    RateLimited,
    Fail(String),
}

/// Replays canned completions in order. Once the script runs out, the last
/// reply repeats.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel").finish()
    }
}

impl ScriptedModel {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: ScriptedReply) -> Self {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.prompt);
        match self.next_reply() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::RateLimited) => Err(Error::RateLimited(TOGETHER_RATE_LIMIT_MESSAGE.to_string())),
            Some(ScriptedReply::Fail(message)) => Err(Error::Inference(message)),
            None => Err(Error::Inference("Scripted model has no replies".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_model_replays_in_order() {
        let model = ScriptedModel::new(vec![
            ScriptedReply::RateLimited,
            ScriptedReply::Text("done".to_string()),
        ]);

        let first = model.complete(CompletionRequest::new("a")).await;
        assert!(first.unwrap_err().is_rate_limited());
        assert_eq!(model.complete(CompletionRequest::new("b")).await.unwrap(), "done");
        assert_eq!(model.complete(CompletionRequest::new("c")).await.unwrap(), "done");
        assert_eq!(model.calls(), 3);
        assert_eq!(model.prompts()[1], "b");
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let model = ScriptedModel::new(vec![]);
        assert!(model.complete(CompletionRequest::new("a")).await.is_err());
    }
}
