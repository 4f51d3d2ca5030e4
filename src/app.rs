use crate::adapters::inbound::graphql::{build_schema, AppSchema, RequestContext};
use crate::adapters::outbound::asset_store::init_asset_store;
use crate::adapters::outbound::card_store::init_card_store;
use crate::config::Config;
use crate::ports::outbound::asset_store::AssetStore;
use crate::ports::outbound::card_store::{CardStore, StoreError};
use std::process;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct Services {
    pub schema: AppSchema,
    pub store: Arc<dyn CardStore>,
    pub assets: Arc<dyn AssetStore>,
}

impl Services {
    pub fn new(store: Arc<dyn CardStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            schema: build_schema(),
            store,
            assets,
        }
    }

    pub async fn init(config: &Config) -> Result<Self, StoreError> {
        let store = init_card_store(config).await?;
        let assets = init_asset_store(config);
        Ok(Self::new(Arc::new(store), Arc::new(assets)))
    }
}

/// Shared application state. Services are built on first use and never rebuilt.
#[derive(Clone)]
pub struct App {
    config: Arc<Config>,
    services: Arc<OnceCell<Services>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_services(config: Config, services: Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(OnceCell::new_with(Some(services))),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A failed initialisation ends the process.
    pub async fn services(&self) -> &Services {
        self.services
            .get_or_init(|| async {
                match Services::init(&self.config).await {
                    Ok(services) => {
                        log::info!("Services ready on the {:?} store", self.config.data_store);
                        services
                    }
                    Err(why) => {
                        log::error!("Failed to initialise services - {why}");
                        process::exit(1)
                    }
                }
            })
            .await
    }

    pub async fn request_context(&self) -> RequestContext {
        let services = self.services().await;
        RequestContext::new(services.store.clone(), self.config.request_timeout)
    }
}
