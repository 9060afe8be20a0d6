//! Last-request-wins reload requests.
//!
//! Anything may post a [`ReloadRequest`] (a file watcher thread, a host
//! state load, an async task). Requests go through a `tokio::sync::watch`
//! channel, which holds only the newest one: the editor picks it up on its
//! next tick, so a burst of requests results in one rebuild of the last.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::description::NodeDescription;

/// A new description, optionally with new stylesheet text.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadRequest {
    pub description: NodeDescription,
    pub stylesheet: Option<String>,
}

impl ReloadRequest {
    pub fn new(description: NodeDescription) -> Self {
        Self { description, stylesheet: None }
    }

    /// Replace the stylesheet as well (builder).
    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = Some(css.into());
        self
    }
}

type Slot = Option<Arc<ReloadRequest>>;

/// Posts reload requests. `Send + Sync`; clones post to the same queue.
#[derive(Clone)]
pub struct ReloadSender {
    tx: Arc<watch::Sender<Slot>>,
}

impl ReloadSender {
    /// Post a request, replacing any that has not been applied yet.
    pub fn request(&self, request: ReloadRequest) {
        self.tx.send_replace(Some(Arc::new(request)));
    }

    /// A listener that wakes on requests posted after this call.
    pub fn listen(&self) -> ReloadListener {
        ReloadListener { rx: self.tx.subscribe() }
    }
}

impl fmt::Debug for ReloadSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadSender").field("receivers", &self.tx.receiver_count()).finish()
    }
}

/// The editor's end of the queue.
pub struct ReloadQueue {
    sender: ReloadSender,
    rx: watch::Receiver<Slot>,
}

impl ReloadQueue {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self { sender: ReloadSender { tx: Arc::new(tx) }, rx }
    }

    pub fn sender(&self) -> ReloadSender {
        self.sender.clone()
    }

    pub fn request(&self, request: ReloadRequest) {
        self.sender.request(request);
    }

    /// The newest request not yet taken, if any.
    pub fn take(&mut self) -> Option<Arc<ReloadRequest>> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }

    /// Whether a request is waiting.
    pub fn is_pending(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

impl Default for ReloadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReloadQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadQueue").field("pending", &self.is_pending()).finish()
    }
}

/// Awaits reload requests from async code.
pub struct ReloadListener {
    rx: watch::Receiver<Slot>,
}

impl ReloadListener {
    /// Wait for the next request. `None` once every sender is gone.
    pub async fn changed(&mut self) -> Option<Arc<ReloadRequest>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn request(id: &str) -> ReloadRequest {
        ReloadRequest::new(NodeDescription::new("View").with_id(id))
    }

    #[test]
    fn newest_request_wins() {
        let mut queue = ReloadQueue::new();
        assert!(queue.take().is_none());
        queue.request(request("a"));
        queue.request(request("b"));
        queue.request(request("c"));
        assert!(queue.is_pending());
        let taken = queue.take().unwrap();
        assert_eq!(taken.description.id.as_deref(), Some("c"));
        assert!(queue.take().is_none());
    }

    #[test]
    fn requests_from_another_thread() {
        let mut queue = ReloadQueue::new();
        let sender = queue.sender();
        thread::spawn(move || {
            for i in 0..10 {
                sender.request(request(&format!("r{i}")));
            }
        })
        .join()
        .unwrap();
        assert_eq!(queue.take().unwrap().description.id.as_deref(), Some("r9"));
    }

    #[test]
    fn listener_wakes_on_request() {
        let queue = ReloadQueue::new();
        let mut listener = queue.sender().listen();
        queue.request(request("next").with_stylesheet(".a { margin: 1; }"));
        let got = tokio_test::block_on(listener.changed()).unwrap();
        assert_eq!(got.description.id.as_deref(), Some("next"));
        assert!(got.stylesheet.is_some());
    }

    #[test]
    fn listener_ends_when_senders_drop() {
        let queue = ReloadQueue::new();
        let mut listener = queue.sender().listen();
        drop(queue);
        assert!(tokio_test::block_on(listener.changed()).is_none());
    }
}
