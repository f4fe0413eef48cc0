//! Lazy construction and caching of one executor per strategy type.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ragline_core::config::OrchestratorSettings;
use ragline_core::traits::Generator;
use ragline_retrieval::Retriever;

use crate::executor::StrategyExecutor;
use crate::strategy::{builtin_configs, StrategyConfig, StrategyKind};

pub struct StrategyRegistry {
    configs: HashMap<StrategyKind, StrategyConfig>,
    executors: Mutex<HashMap<StrategyKind, Arc<StrategyExecutor>>>,
    retriever: Arc<Retriever>,
    generator: Arc<dyn Generator>,
    settings: OrchestratorSettings,
}

impl StrategyRegistry {
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Arc<dyn Generator>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            configs: builtin_configs(),
            executors: Mutex::new(HashMap::new()),
            retriever,
            generator,
            settings,
        }
    }

    /// First use of a strategy type constructs its executor; later calls
    /// return the cached instance.
    pub fn get_or_create(&self, kind: StrategyKind) -> Arc<StrategyExecutor> {
        let mut executors = self.executors.lock().expect("registry lock poisoned");
        executors
            .entry(kind)
            .or_insert_with(|| {
                tracing::info!("created strategy executor: {}", kind);
                let config = self
                    .configs
                    .get(&kind)
                    .cloned()
                    .expect("builtin config for every strategy kind");
                Arc::new(StrategyExecutor::new(
                    config,
                    self.retriever.clone(),
                    self.generator.clone(),
                    self.settings.clone(),
                ))
            })
            .clone()
    }

    pub fn config_for(&self, kind: StrategyKind) -> Option<&StrategyConfig> {
        self.configs.get(&kind)
    }

    /// Strategy types that have been instantiated so far.
    pub fn instantiated(&self) -> Vec<StrategyKind> {
        let executors = self.executors.lock().expect("registry lock poisoned");
        let mut kinds: Vec<StrategyKind> = executors.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}
