use std::collections::HashMap;
use std::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use kube::runtime::reflector::{self, ObjectRef, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, CustomResource};
use log::*;
use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A topping the restaurant offers. Cluster scoped.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "restaurant.programming-kubernetes.info",
    version = "v1alpha1",
    kind = "Topping"
)]
pub struct ToppingSpec {
    /// Cost of one portion
    #[serde(default)]
    pub cost: f64,
}

/// Read-only access to the set of known toppings
pub trait ToppingCatalog: Send + Sync {
    /// Returns whether the initial list of toppings has been loaded.
    /// While this is false, lookups must not be trusted.
    fn has_synced(&self) -> bool;

    /// Looks up a topping by name. `Ok(None)` means the topping does not exist.
    fn get(&self, name: &str) -> Result<Option<Arc<Topping>>>;

    /// Returns the name of the catalog
    fn name(&self) -> &str;
}

/// A catalog backed by a watch on Topping objects
#[derive(Clone)]
pub struct ReflectorCatalog {
    store: Store<Topping>,
    synced: Arc<AtomicBool>,
}

impl ReflectorCatalog {
    /// Starts watching Toppings in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(client: Client) -> Self {
        let api: Api<Topping> = Api::all(client);
        let (store, writer) = reflector::store();

        let watch = reflector::reflector(writer, watcher(api, watcher::Config::default()))
            .default_backoff()
            .for_each(|event| {
                if let Err(e) = event {
                    warn!("Topping watch error: {}", e);
                }
                future::ready(())
            });
        tokio::spawn(watch);

        let synced = Arc::new(AtomicBool::new(false));
        let flag = synced.clone();
        let ready = store.clone();
        tokio::spawn(async move {
            match ready.wait_until_ready().await {
                Ok(()) => {
                    info!("Topping cache synced with {} toppings", ready.state().len());
                    flag.store(true, Ordering::Release);
                }
                Err(e) => error!("Topping watch stopped before initial sync: {}", e),
            }
        });

        Self { store, synced }
    }
}

impl ToppingCatalog for ReflectorCatalog {
    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    fn get(&self, name: &str) -> Result<Option<Arc<Topping>>> {
        Ok(self.store.get(&ObjectRef::new(name)))
    }

    fn name(&self) -> &str {
        "ReflectorCatalog"
    }
}

/// A catalog with fixed contents and controllable readiness
#[derive(Clone, Default)]
pub struct StaticCatalog {
    toppings: Arc<RwLock<HashMap<String, Arc<Topping>>>>,
    synced: Arc<AtomicBool>,
}

impl StaticCatalog {
    /// Creates a synced catalog holding the given toppings
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let catalog = Self::default();
        for name in names {
            catalog.insert(name);
        }
        catalog.set_synced(true);
        catalog
    }

    pub fn insert(&self, name: impl Into<String>) {
        let name = name.into();
        let topping = Topping::new(&name, ToppingSpec::default());
        self.toppings.write().insert(name, Arc::new(topping));
    }

    pub fn remove(&self, name: &str) {
        self.toppings.write().remove(name);
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::Release);
    }
}

impl ToppingCatalog for StaticCatalog {
    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    fn get(&self, name: &str) -> Result<Option<Arc<Topping>>> {
        Ok(self.toppings.read().get(name).cloned())
    }

    fn name(&self) -> &str {
        "StaticCatalog"
    }
}
