//! Plot registry
//!
//! Keeps live plots addressable by id so callers holding only a handle
//! string can keep polling the same engine across requests. Owned by the
//! embedding application and passed where needed; there is no global.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::plot::Plot;

#[derive(Default)]
pub struct PlotRegistry {
    plots: Mutex<HashMap<Uuid, Plot>>,
}

impl PlotRegistry {
    pub fn new() -> Self {
        PlotRegistry::default()
    }

    /// Register a plot and return its id
    pub fn insert(&self, plot: Plot) -> Uuid {
        let id = Uuid::new_v4();
        self.plots.lock().unwrap().insert(id, plot);
        id
    }

    /// Run `f` against the plot with this id, if it is still registered
    pub fn with_plot<R>(&self, id: Uuid, f: impl FnOnce(&mut Plot) -> R) -> Option<R> {
        self.plots.lock().unwrap().get_mut(&id).map(f)
    }

    /// Deregister and return the plot
    pub fn remove(&self, id: Uuid) -> Option<Plot> {
        self.plots.lock().unwrap().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.plots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::source::SArray;

    fn sample_plot() -> Plot {
        Plot::histogram(
            SArray::from_ints(0..10),
            "h",
            "v",
            "n",
            EngineConfig::with_chunk_size(4),
        )
    }

    #[test]
    fn test_insert_poll_remove() {
        let registry = PlotRegistry::new();
        let id = registry.insert(sample_plot());
        assert_eq!(registry.len(), 1);

        // poll through the registry until the engine drains
        loop {
            let done = registry
                .with_plot(id, |p| {
                    p.get_next_data().unwrap();
                    p.finished_streaming()
                })
                .unwrap();
            if done {
                break;
            }
        }
        let plot = registry.remove(id).unwrap();
        assert_eq!(plot.percent_complete(), 1.0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_id_is_none() {
        let registry = PlotRegistry::new();
        assert!(registry.with_plot(Uuid::new_v4(), |_| ()).is_none());
        assert!(registry.remove(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_ids_are_distinct() {
        let registry = PlotRegistry::new();
        let a = registry.insert(sample_plot());
        let b = registry.insert(sample_plot());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
