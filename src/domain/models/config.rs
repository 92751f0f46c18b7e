use std::collections::HashMap;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{AccessParams, EngineEndpoint},
    value_objects::Engine,
};

/// Access parameters of every configured engine.
///
/// The first configured engine is the default one.
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    engines: Vec<Engine>,
    params: HashMap<Engine, AccessParams>,
}

impl S3Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the access parameters for an engine, replacing any previous ones
    pub fn setup(&mut self, params: AccessParams) -> StorageResult<()> {
        Self::validate(&params)?;

        let engine = params.engine();
        if !self.engines.contains(&engine) {
            self.engines.push(engine);
        }
        self.params.insert(engine, params);

        Ok(())
    }

    /// Configured engines, default first
    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Parameters of `engine`, or of the default engine when `None`
    pub fn params(&self, engine: Option<Engine>) -> Option<&AccessParams> {
        let engine = engine.or_else(|| self.engines.first().copied())?;
        self.params.get(&engine)
    }

    /// Validate `engine` against the configured engines, falling back to the default
    pub fn resolve_engine(&self, engine: Option<Engine>) -> StorageResult<Engine> {
        match engine {
            None => self
                .engines
                .first()
                .copied()
                .ok_or_else(|| StorageError::EngineNotConfigured {
                    engine: "<default>".to_string(),
                }),
            Some(engine) if self.params.contains_key(&engine) => Ok(engine),
            Some(engine) => Err(StorageError::EngineNotConfigured {
                engine: engine.to_string(),
            }),
        }
    }

    /// Same as [`S3Config::resolve_engine`], from an engine name
    pub fn resolve_engine_name(&self, name: Option<&str>) -> StorageResult<Engine> {
        match name.map(str::trim).filter(|name| !name.is_empty()) {
            None => self.resolve_engine(None),
            Some(name) => {
                let engine = name
                    .parse::<Engine>()
                    .map_err(|_| StorageError::EngineNotConfigured {
                        engine: name.to_string(),
                    })?;
                self.resolve_engine(Some(engine))
            }
        }
    }

    /// Access parameters of an already resolved engine
    pub fn engine_params(&self, engine: Engine) -> StorageResult<&AccessParams> {
        self.params
            .get(&engine)
            .ok_or_else(|| StorageError::EngineNotConfigured {
                engine: engine.to_string(),
            })
    }

    fn validate(params: &AccessParams) -> StorageResult<()> {
        let mut missing = Vec::new();
        if params.access_key.trim().is_empty() {
            missing.push("access key");
        }
        if params.secret_key.trim().is_empty() {
            missing.push("secret key");
        }
        if params.temp_folder.as_os_str().is_empty() {
            missing.push("temp folder");
        }
        match &params.endpoint {
            EngineEndpoint::Aws { region } if region.trim().is_empty() => {
                missing.push("region name")
            }
            EngineEndpoint::Minio { endpoint_url, .. } if endpoint_url.trim().is_empty() => {
                missing.push("endpoint url")
            }
            _ => {}
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::InvalidSetup {
                message: format!(
                    "missing {} for engine '{}'",
                    missing.join(", "),
                    params.engine()
                ),
            })
        }
    }
}
