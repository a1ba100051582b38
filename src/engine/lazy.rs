use super::Engine;
use crate::error::Result;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// An engine that is constructed on first use and reused afterwards.
///
/// Wrap it in an `Arc` to share one instance between readers. Construction
/// happens at most once per handle; a failed construction is retried on the
/// next `open`.
pub struct LazyEngine<E, F> {
    cell: OnceLock<E>,
    init: F,
}

impl<E, F> LazyEngine<E, F>
where
    E: Engine,
    F: Fn() -> Result<E>,
{
    pub fn new(init: F) -> Self {
        Self {
            cell: OnceLock::new(),
            init,
        }
    }

    pub fn get(&self) -> Result<&E> {
        if let Some(engine) = self.cell.get() {
            return Ok(engine);
        }
        debug!("initializing document engine");
        let engine = (self.init)()?;
        Ok(self.cell.get_or_init(|| engine))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<E, F> Engine for LazyEngine<E, F>
where
    E: Engine,
    F: Fn() -> Result<E>,
{
    type Doc = E::Doc;

    fn open(&self, path: &Path) -> Result<Self::Doc> {
        self.get()?.open(path)
    }
}
