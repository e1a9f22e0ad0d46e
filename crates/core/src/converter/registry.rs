//! The fixed set of available converters and lookup helpers.

use std::cmp::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use super::traits::Converter;

/// Comparator preferring converters for which `ext` is a native format.
///
/// This is a pure ordering usable with a stable sort, not a filter: all
/// capable converters remain candidates, native ones simply sort first.
pub fn by_native<'a>(
    ext: &'a str,
) -> impl Fn(&Arc<dyn Converter>, &Arc<dyn Converter>) -> Ordering + 'a {
    move |a, b| {
        let a_key = !a.is_native_for(ext);
        let b_key = !b.is_native_for(ext);
        a_key.cmp(&b_key)
    }
}

/// The fixed set of available converters.
///
/// Built once at context construction; never dynamically extended at
/// runtime.
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new(converters: Vec<Arc<dyn Converter>>) -> Self {
        Self { converters }
    }

    /// All registered converters, in registration order.
    pub fn converters(&self) -> &[Arc<dyn Converter>] {
        &self.converters
    }

    /// Looks up a converter by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Converter>> {
        self.converters
            .iter()
            .find(|c| c.name() == name)
            .map(Arc::clone)
    }

    /// Converters whose format strings include `ext`, stably sorted so
    /// that native handlers of `ext` come first.
    pub fn candidates_for(&self, ext: &str) -> Vec<Arc<dyn Converter>> {
        let mut candidates: Vec<Arc<dyn Converter>> = self
            .converters
            .iter()
            .filter(|c| c.supports(ext))
            .map(Arc::clone)
            .collect();
        candidates.sort_by(by_native(ext));
        candidates
    }

    /// Initializes every converter concurrently.
    ///
    /// A failed init leaves that converter in its error state; it is
    /// reported through readiness, never retried here.
    pub async fn init_all(&self) {
        let inits = self.converters.iter().map(|converter| {
            let converter = Arc::clone(converter);
            async move {
                match converter.init().await {
                    Ok(()) => info!(converter = converter.name(), "converter initialized"),
                    Err(e) => {
                        warn!(converter = converter.name(), error = %e, "converter failed to initialize")
                    }
                }
            }
        });
        join_all(inits).await;
    }
}
