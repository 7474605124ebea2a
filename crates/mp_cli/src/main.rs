use std::sync::Arc;
use anyhow::Context;
use clap::{Parser, Subcommand};
use mp_core::logging::init_logging;
use mp_core::{ArticleStore, MarketOverview, NewsSource};
use mp_inference::models::ModelKind;
use mp_inference::{
    create_classifier, create_model, Config, GeneralResolver, QueryResolver, SentimentCache,
    SentimentScorer,
};
use mp_sources::{default_sources, ApiSource};
use mp_storage::{create_store, StorageKind};
use mp_web::{create_app, AppState, DEFAULT_CORS_ORIGIN};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Financial news sentiment service", long_about = None)]
pub struct Cli {
    #[arg(long, env = "MP_STORAGE", default_value = "memory", help = "Storage backend. Available backends: memory (default), sqlite")]
    storage: StorageKind,
    #[arg(long, env = "MP_DATABASE_URL", help = "SQLite database file")]
    database_url: Option<String>,
    #[arg(long, env = "MP_MODEL", default_value = "together", help = "Language model. Available models: together (default), ollama")]
    model: ModelKind,
    #[arg(long, env = "MP_MODEL_URL")]
    model_url: Option<String>,
    #[arg(long, env = "MP_MODEL_NAME")]
    model_name: Option<String>,
    #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
    together_api_key: Option<String>,
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true, default_value = "")]
    newsapi_key: String,
    #[arg(long, env = "HF_API_KEY", hide_env_values = true, help = "Hugging Face key for FinBERT; keyword sentiment is used without it")]
    hf_api_key: Option<String>,
    #[arg(long, env = "MP_LOG_LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "MP_BIND", default_value = "0.0.0.0:8000")]
        bind: String,
        #[arg(long, env = "MP_CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
        cors_origin: String,
    },
    /// Fetch and score news for each query, printing the articles as JSON
    Resolve {
        #[arg(required = true)]
        queries: Vec<String>,
        /// Also save the articles to the store
        #[arg(long)]
        save: bool,
    },
    /// Ask the general assistant a question
    Ask { query: String },
    /// Print every stored article as JSON
    News,
    /// Summarize stored sentiment, optionally for one topic
    Overview {
        #[arg(long)]
        query: Option<String>,
    },
}

struct Services {
    resolver: Arc<QueryResolver>,
    general: Arc<GeneralResolver>,
}

fn build_services(cli: &Cli) -> anyhow::Result<Services> {
    let config = Config {
        model: cli.model,
        api_key: cli.together_api_key.clone(),
        model_url: cli.model_url.clone(),
        model_name: cli.model_name.clone(),
    };
    let model = create_model(&config)?;
    info!("🧠 Language model initialized (using {})", model.name());

    let tools = default_sources(cli.newsapi_key.clone())?;
    let fallback: Arc<dyn NewsSource> = tools
        .iter()
        .find(|tool| tool.name() == ApiSource::NAME)
        .cloned()
        .context("NewsAPI source missing from the tool pool")?;
    info!(
        "🦗 News sources ready: {}",
        tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    );

    let classifier = create_classifier(cli.hf_api_key.clone())?;
    info!("📈 Sentiment classifier ready (using {})", classifier.name());
    let scorer = SentimentScorer::new(classifier, Arc::new(SentimentCache::default()));

    let resolver = QueryResolver::new(model.clone(), tools, fallback, scorer);
    let general = GeneralResolver::new(model);

    Ok(Services {
        resolver: Arc::new(resolver),
        general: Arc::new(general),
    })
}

async fn open_store(cli: &Cli) -> anyhow::Result<Arc<dyn ArticleStore>> {
    let store = create_store(cli.storage, cli.database_url.as_deref()).await?;
    info!("💾 Storage initialized (using {:?})", cli.storage);
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.command {
        Commands::Serve { bind, cors_origin } => {
            let services = build_services(&cli)?;
            let store = open_store(&cli).await?;
            let state = AppState::new(services.resolver, services.general, store);
            let app = create_app(state, cors_origin)?;

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {}", bind))?;
            info!("🚀 Listening on {}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Resolve { queries, save } => {
            let services = build_services(&cli)?;
            let result = services.resolver.resolve(queries).await;
            if *save {
                let store = open_store(&cli).await?;
                for article in &result.articles {
                    if let Err(e) = store.save(article).await {
                        error!("Error saving '{}': {}", article.title, e);
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Ask { query } => {
            let services = build_services(&cli)?;
            println!("{}", services.general.answer(query).await);
        }
        Commands::News => {
            let store = open_store(&cli).await?;
            let news = store.list_all().await?;
            println!("{}", serde_json::to_string_pretty(&news)?);
        }
        Commands::Overview { query } => {
            let store = open_store(&cli).await?;
            let news = store.list_all().await?;
            let overview =
                MarketOverview::from_articles(news.iter().map(|s| &s.article), query.as_deref());
            println!("{}", overview.summary());
        }
    }

    Ok(())
}
