use std::str::FromStr;
use std::sync::Arc;
use mp_core::{Error, LanguageModel, Result};
use crate::Config;

pub mod scripted;
pub mod together;

#[cfg(feature = "ollama")]
pub mod langchain;

pub use scripted::{ScriptedModel, ScriptedReply};
pub use together::TogetherModel;

#[cfg(feature = "ollama")]
pub use langchain::{OllamaModel, OllamaModelConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Together,
    Ollama,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "together" => Ok(ModelKind::Together),
            "ollama" => Ok(ModelKind::Ollama),
            other => Err(Error::Config(format!(
                "Unknown model '{}'. Available models: together (default), ollama",
                other
            ))),
        }
    }
}

pub fn create_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    match config.model {
        ModelKind::Together => {
            let mut model = TogetherModel::new(config.api_key.clone())?;
            if let Some(url) = &config.model_url {
                model = model.with_base_url(url.clone());
            }
            if let Some(name) = &config.model_name {
                model = model.with_model(name.clone());
            }
            Ok(Arc::new(model))
        }
        #[cfg(feature = "ollama")]
        ModelKind::Ollama => {
            let model_config = OllamaModelConfig::from_url(config.model_url.as_deref())?;
            Ok(Arc::new(OllamaModel::new(model_config)))
        }
        #[cfg(not(feature = "ollama"))]
        ModelKind::Ollama => Err(Error::Config(
            "Ollama support requires building with the `ollama` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("Together".parse::<ModelKind>().unwrap(), ModelKind::Together);
        assert_eq!("ollama".parse::<ModelKind>().unwrap(), ModelKind::Ollama);
        assert!("deepseek".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_create_together_model() {
        let config = Config {
            api_key: Some("key".to_string()),
            model_name: Some("mistralai/Mistral-7B-Instruct-v0.2".to_string()),
            ..Config::default()
        };
        let model = create_model(&config).unwrap();
        assert_eq!(model.name(), "Together");

        let missing_key = Config::default();
        assert!(create_model(&missing_key).is_err());
    }
}
