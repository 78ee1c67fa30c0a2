//! Catalog registry and loaded-instrument table.

use crate::catalog::Catalog;
use crate::instrument::LoadedInstrument;
use crate::{Error, Result};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use toid_core::{Instrument, InstrumentProvider, Retired};
use tracing::{debug, info};

type LoadedMap = HashMap<String, Arc<dyn Instrument>>;

/// Registers catalogs and loads their instruments.
///
/// Instruments are addressed as `"<catalog>.<instrument>"`. Loading decodes
/// outside any lock and then publishes a new table; render-side lookups
/// through [`InstrumentProvider`] only do an `ArcSwap` load.
///
/// Replaced tables and unloaded instruments are kept until the render side
/// has let go of them, and freed by a later load or unload.
pub struct ResourceManager {
    sample_rate: u32,
    catalogs: DashMap<String, Arc<Catalog>>,
    loaded: ArcSwap<LoadedMap>,
    retired_tables: Retired<LoadedMap>,
    retired_instruments: Retired<dyn Instrument>,
}

impl ResourceManager {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            catalogs: DashMap::new(),
            loaded: ArcSwap::from_pointee(HashMap::new()),
            retired_tables: Retired::new(),
            retired_instruments: Retired::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Read a catalog file and register it under its `name`. Returns that
    /// name. Registering a catalog name again replaces the earlier one;
    /// instruments already loaded from it stay loaded.
    pub fn register(&self, path: impl AsRef<Path>) -> Result<String> {
        let catalog = Catalog::from_file(path)?;
        Ok(self.register_catalog(catalog))
    }

    /// Register an already parsed catalog.
    pub fn register_catalog(&self, catalog: Catalog) -> String {
        let name = catalog.name().to_string();
        info!(
            catalog = %name,
            instruments = catalog.len(),
            source = %catalog.source().display(),
            "registered instrument catalog"
        );
        self.catalogs.insert(name.clone(), Arc::new(catalog));
        name
    }

    pub fn catalog(&self, name: &str) -> Option<Arc<Catalog>> {
        self.catalogs.get(name).map(|entry| entry.value().clone())
    }

    /// Registered catalog names, sorted.
    pub fn catalogs(&self) -> Vec<String> {
        let mut names: Vec<_> = self.catalogs.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Decode and activate `"<catalog>.<instrument>"`.
    pub fn load(&self, name: &str) -> Result<()> {
        let (catalog_name, key) = name
            .split_once('.')
            .ok_or_else(|| Error::InvalidName(name.to_string()))?;
        let catalog = self
            .catalog(catalog_name)
            .ok_or_else(|| Error::UnknownInstrument(name.to_string()))?;
        let spec = catalog
            .instrument(key)
            .ok_or_else(|| Error::UnknownInstrument(name.to_string()))?;

        let instrument: Arc<dyn Instrument> =
            Arc::new(LoadedInstrument::from_spec(catalog_name, spec, self.sample_rate)?);
        self.insert(name, instrument);

        info!(instrument = %name, kind = ?spec.kind, "loaded instrument");
        Ok(())
    }

    /// Load every instrument of a registered catalog.
    pub fn load_catalog(&self, catalog_name: &str) -> Result<usize> {
        let catalog = self
            .catalog(catalog_name)
            .ok_or_else(|| Error::UnknownInstrument(catalog_name.to_string()))?;
        let mut count = 0;
        for key in catalog.instrument_keys() {
            self.load(&format!("{catalog_name}.{key}"))?;
            count += 1;
        }
        Ok(count)
    }

    /// Make an instrument available under `name` without a catalog.
    pub fn insert(&self, name: &str, instrument: Arc<dyn Instrument>) {
        let previous = self.loaded.rcu(|current| {
            let mut next = LoadedMap::clone(current);
            next.insert(name.to_string(), Arc::clone(&instrument));
            next
        });
        self.retire(previous, name);
    }

    /// Deactivate an instrument. Returns whether it was loaded. Renders
    /// that selected it fall silent and count misses.
    pub fn unload(&self, name: &str) -> bool {
        if !self.is_loaded(name) {
            return false;
        }
        let previous = self.loaded.rcu(|current| {
            let mut next = LoadedMap::clone(current);
            next.remove(name);
            next
        });
        self.retire(previous, name);
        debug!(instrument = %name, "unloaded instrument");
        true
    }

    /// Park the table a swap replaced, and the instrument `name` had in it.
    /// The table goes first so an instrument only it referenced is freed
    /// right away.
    fn retire(&self, previous: Arc<LoadedMap>, name: &str) {
        let replaced = previous.get(name).cloned();
        self.retired_tables.retire(previous);
        if let Some(instrument) = replaced {
            self.retired_instruments.retire(instrument);
        }
    }

    /// Tables and instruments replaced while a render still held them.
    pub fn retired(&self) -> usize {
        self.retired_tables.collect() + self.retired_instruments.collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.load().contains_key(name)
    }

    /// Loaded instrument names, sorted.
    pub fn loaded(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loaded.load().keys().cloned().collect();
        names.sort();
        names
    }
}

impl InstrumentProvider for ResourceManager {
    #[inline]
    fn instrument(&self, name: &str) -> Option<Arc<dyn Instrument>> {
        self.loaded.load().get(name).cloned()
    }
}
