use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{api::ThreadId, CommentService, SyncEngine};

/// Live thread views, one engine per thread, all sharing one comment service.
///
/// Keeping an engine per thread means navigating between threads never mixes
/// their comments: a response that completes after its view was closed only
/// lands in the closed view's engine.
pub struct ThreadViews<S> {
    service: Arc<S>,
    views: Mutex<HashMap<ThreadId, Arc<SyncEngine<Arc<S>>>>>,
}

impl<S: CommentService> ThreadViews<S> {
    pub fn new(service: S) -> ThreadViews<S> {
        ThreadViews {
            service: Arc::new(service),
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live view of this thread, opening and loading it if needed
    pub async fn open(&self, thread_id: ThreadId) -> Arc<SyncEngine<Arc<S>>> {
        if let Some(engine) = self.get(&thread_id) {
            return engine;
        }
        tracing::debug!(thread = %thread_id, "opening thread view");
        let engine = Arc::new(SyncEngine::open(self.service.clone(), thread_id.clone()).await);
        // Another open of the same thread may have completed during the load
        self.views
            .lock()
            .entry(thread_id)
            .or_insert(engine)
            .clone()
    }

    pub fn get(&self, thread_id: &ThreadId) -> Option<Arc<SyncEngine<Arc<S>>>> {
        self.views.lock().get(thread_id).cloned()
    }

    pub fn close(&self, thread_id: &ThreadId) -> Option<Arc<SyncEngine<Arc<S>>>> {
        tracing::debug!(thread = %thread_id, "closing thread view");
        self.views.lock().remove(thread_id)
    }

    pub fn len(&self) -> usize {
        self.views.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.lock().is_empty()
    }
}
