/// Catalog-ready notifications
///
/// The notifier is owned by the caller and handed to the crawl and restore
/// operations, which announce a catalog once it is complete.
use tokio::sync::broadcast;

/// How the announced catalog was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadySource {
    /// Every crawl worker has finished
    Crawl,
    /// The catalog was restored from disk
    Restore,
}

/// Announcement that a complete catalog is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogReady {
    pub source: ReadySource,
    /// Number of registered species
    pub species: usize,
}

/// Broadcasts `CatalogReady` to every subscriber
#[derive(Debug, Clone)]
pub struct ReadyNotifier {
    sender: broadcast::Sender<CatalogReady>,
}

impl ReadyNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogReady> {
        self.sender.subscribe()
    }

    /// Announces a catalog; having no subscribers is fine
    pub fn notify(&self, event: CatalogReady) {
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!("Catalog ready ({:?}) sent to {} subscribers", event.source, receivers)
            }
            Err(_) => tracing::trace!("Catalog ready ({:?}) with no subscribers", event.source),
        }
    }
}

impl Default for ReadyNotifier {
    fn default() -> Self {
        Self::new()
    }
}
