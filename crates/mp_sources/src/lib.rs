pub mod sources;

pub use sources::{default_sources, ApiSource, ScrapeSource, SourceKind};

pub mod prelude {
    pub use super::sources::{ApiSource, ScrapeSource, SourceKind};
    pub use mp_core::{NewsSource, RawArticle, Result, Error};
}
