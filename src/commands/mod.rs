pub mod admin;
pub mod channel;
pub mod config;
pub mod cycle;
pub mod schedule;
pub mod serve;
pub mod settings;
pub mod status;

use std::sync::Arc;

use anyhow::Result;
use ctfpost_core::config::AppConfig;
use ctfpost_core::cycle::Syncer;
use ctfpost_core::reconcile::Reconciler;
use ctfpost_core::source::CtftimeSource;
use ctfpost_core::store::Store;
use ctfpost_telegram::TelegramPublisher;

/// Config plus the store it points at. Enough for commands that only touch
/// the document.
pub struct Context {
    pub config: AppConfig,
    pub store: Arc<Store>,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = AppConfig::load()?;
        let store = Arc::new(Store::open(config.data_file.clone()));
        Ok(Context { config, store })
    }

    pub fn publisher(&self) -> Result<Arc<TelegramPublisher>> {
        Ok(Arc::new(TelegramPublisher::from_config(&self.config)?))
    }

    /// Wire the CTFtime source and Telegram publisher into a syncer.
    pub fn syncer(&self) -> Result<Arc<Syncer>> {
        let source = Arc::new(CtftimeSource::from_config(&self.config)?);
        let reconciler = Reconciler::new(self.publisher()?);
        let syncer = Syncer::new(self.store.clone(), source, reconciler)
            .with_fetch_limit(self.config.fetch_limit);
        Ok(Arc::new(syncer))
    }
}
