//! Local list state kept in step with a remote collection.
//!
//! Every screen that shows a server list follows the same cycle: fetch on
//! open, re-fetch after a successful create or delete, and replace the local
//! list wholesale with whatever the server returned. `ListSync` is that cycle
//! once, parameterized by a [`ListSource`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::Result;

pub const DEFAULT_LOAD_FAILURE: &str = "목록을 불러오지 못했습니다.";
pub const DEFAULT_DELETE_PROMPT: &str = "정말 삭제하시겠습니까?";

/// A remote collection a screen can list, add to and remove from.
#[allow(async_fn_in_trait)]
pub trait ListSource {
    type Item: Clone;
    type Draft;
    type Key: ?Sized;

    async fn fetch(&self) -> Result<Vec<Self::Item>>;

    async fn create(&self, draft: &Self::Draft) -> Result<()>;

    async fn delete(&self, key: &Self::Key) -> Result<()>;

    /// Shown when a fetch fails without a readable message.
    fn load_failure_message(&self) -> &'static str {
        DEFAULT_LOAD_FAILURE
    }

    fn delete_prompt(&self) -> &'static str {
        DEFAULT_DELETE_PROMPT
    }
}

/// Blocking yes/no question put to the user before a destructive call.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What a view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub phase: Phase,
    pub items: Vec<T>,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            items: Vec::new(),
            error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Loaded successfully and nothing came back.
    pub fn is_empty(&self) -> bool {
        self.phase == Phase::Ready && self.items.is_empty()
    }
}

pub struct ListSync<S: ListSource> {
    source: S,
    state: watch::Sender<ListState<S::Item>>,
    generation: AtomicU64,
    closed: AtomicBool,
}

impl<S: ListSource> ListSync<S> {
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            source,
            state,
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<S::Item>> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ListState<S::Item> {
        self.state.borrow().clone()
    }

    /// Stops applying results. Requests already in flight still finish but
    /// their outcome is dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Closes this list when the returned guard is dropped.
    pub fn close_on_drop(&self) -> CloseGuard<'_> {
        CloseGuard {
            closed: &self.closed,
        }
    }

    /// Re-fetches the whole list.
    ///
    /// Previous items stay visible while loading. Only the most recently
    /// started refresh may write its result.
    pub async fn refresh(&self) -> Result<()> {
        if self.is_closed() {
            tracing::debug!("refresh requested on a closed list");
            return Ok(());
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.phase = Phase::Loading;
        });

        let result = self.source.fetch().await;
        if !self.accepts(generation) {
            tracing::debug!(generation, "discarding superseded list result");
            return Ok(());
        }

        match result {
            Ok(items) => {
                tracing::debug!(generation, count = items.len(), "list refreshed");
                self.state.send_modify(|state| {
                    state.phase = Phase::Ready;
                    state.items = items;
                    state.error = None;
                });
                Ok(())
            }
            Err(error) => {
                let message = error.user_message(self.source.load_failure_message());
                self.state.send_modify(|state| {
                    state.phase = Phase::Error;
                    state.error = Some(message);
                });
                Err(error)
            }
        }
    }

    /// Submits a new item and re-fetches on success. Nothing is inserted
    /// locally.
    pub async fn create(&self, draft: &S::Draft) -> Result<()> {
        self.source.create(draft).await?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Deletes after the user confirms, then re-fetches.
    pub async fn delete(&self, key: &S::Key, confirm: &impl Confirm) -> Result<DeleteOutcome> {
        if !confirm.confirm(self.source.delete_prompt()) {
            return Ok(DeleteOutcome::Cancelled);
        }
        self.source.delete(key).await?;
        self.refresh_after_mutation().await;
        Ok(DeleteOutcome::Deleted)
    }

    // The mutation already succeeded; a failed reload lives in the state.
    async fn refresh_after_mutation(&self) {
        if let Err(error) = self.refresh().await {
            tracing::debug!(%error, "reload after mutation failed");
        }
    }

    fn accepts(&self, generation: u64) -> bool {
        !self.is_closed() && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl<S: ListSource> std::fmt::Debug for ListSync<S> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ListSync")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Marks a list closed when the owning view goes away.
#[derive(Debug)]
pub struct CloseGuard<'a> {
    closed: &'a AtomicBool,
}

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::Error;

    struct Scripted {
        gate: Option<Arc<Notify>>,
        result: std::result::Result<Vec<i64>, String>,
    }

    #[derive(Default)]
    struct FakeSource {
        fetches: Mutex<VecDeque<Scripted>>,
        fetch_count: Mutex<usize>,
        created: Mutex<Vec<i64>>,
        deleted: Mutex<Vec<i64>>,
        fail_mutations: bool,
    }

    impl FakeSource {
        fn with_results(results: Vec<std::result::Result<Vec<i64>, String>>) -> Self {
            let fetches = results
                .into_iter()
                .map(|result| Scripted { gate: None, result })
                .collect();
            Self {
                fetches: Mutex::new(fetches),
                ..Self::default()
            }
        }

        fn push_gated(&self, gate: Arc<Notify>, items: Vec<i64>) {
            self.fetches.lock().unwrap().push_back(Scripted {
                gate: Some(gate),
                result: Ok(items),
            });
        }

        fn fetch_count(&self) -> usize {
            *self.fetch_count.lock().unwrap()
        }
    }

    fn server_error(message: &str) -> Error {
        Error::Api {
            status: 500,
            message: message.to_string(),
        }
    }

    impl ListSource for FakeSource {
        type Item = i64;
        type Draft = i64;
        type Key = i64;

        async fn fetch(&self) -> Result<Vec<i64>> {
            *self.fetch_count.lock().unwrap() += 1;
            let next = self.fetches.lock().unwrap().pop_front();
            let Some(next) = next else {
                return Ok(Vec::new());
            };
            if let Some(gate) = next.gate {
                gate.notified().await;
            }
            next.result.map_err(|message| server_error(&message))
        }

        async fn create(&self, draft: &i64) -> Result<()> {
            if self.fail_mutations {
                return Err(server_error("create failed"));
            }
            self.created.lock().unwrap().push(*draft);
            Ok(())
        }

        async fn delete(&self, key: &i64) -> Result<()> {
            if self.fail_mutations {
                return Err(server_error("delete failed"));
            }
            self.deleted.lock().unwrap().push(*key);
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refresh_replaces_items_and_marks_ready() {
        let sync = ListSync::new(FakeSource::with_results(vec![Ok(vec![3, 1, 2])]));
        let receiver = sync.subscribe();
        assert_eq!(receiver.borrow().phase, Phase::Idle);

        sync.refresh().await.unwrap();

        let state = sync.state();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.items, vec![3, 1, 2]);
        assert_eq!(state.error, None);
        assert!(!state.is_loading());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_refresh_keeps_previous_items() {
        let sync = ListSync::new(FakeSource::with_results(vec![
            Ok(vec![1, 2]),
            Err("리뷰를 불러오지 못했습니다.".to_string()),
        ]));
        sync.refresh().await.unwrap();
        assert!(sync.refresh().await.is_err());

        let state = sync.state();
        assert_eq!(state.phase, Phase::Error);
        assert_eq!(state.items, vec![1, 2]);
        assert_eq!(state.error.as_deref(), Some("리뷰를 불러오지 못했습니다."));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blank_error_falls_back_to_source_message() {
        let sync = ListSync::new(FakeSource::with_results(vec![Err("  ".to_string())]));
        assert!(sync.refresh().await.is_err());
        assert_eq!(sync.state().error.as_deref(), Some(DEFAULT_LOAD_FAILURE));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn superseded_refresh_is_discarded() {
        let gate = Arc::new(Notify::new());
        let source = FakeSource::default();
        source.push_gated(gate.clone(), vec![1]);
        source.fetches.lock().unwrap().push_back(Scripted {
            gate: None,
            result: Ok(vec![2]),
        });
        let sync = ListSync::new(source);

        let (first, ()) = futures::join!(sync.refresh(), async {
            sync.refresh().await.unwrap();
            gate.notify_one();
        });

        first.unwrap();
        assert_eq!(sync.state().items, vec![2]);
        assert_eq!(sync.state().phase, Phase::Ready);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn result_after_close_is_discarded() {
        let gate = Arc::new(Notify::new());
        let source = FakeSource::default();
        source.push_gated(gate.clone(), vec![9]);
        let sync = ListSync::new(source);

        let (first, ()) = futures::join!(sync.refresh(), async {
            let guard = sync.close_on_drop();
            drop(guard);
            gate.notify_one();
        });

        first.unwrap();
        assert!(sync.is_closed());
        assert!(sync.state().items.is_empty());
        sync.refresh().await.unwrap();
        assert_eq!(sync.source().fetch_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn repeated_refresh_converges() {
        let sync = ListSync::new(FakeSource::with_results(vec![
            Ok(vec![4, 5]),
            Ok(vec![4, 5]),
        ]));
        sync.refresh().await.unwrap();
        let first = sync.state();
        sync.refresh().await.unwrap();
        assert_eq!(sync.state(), first);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn create_refetches_instead_of_inserting() {
        let sync = ListSync::new(FakeSource::with_results(vec![
            Ok(vec![1]),
            Ok(vec![7, 1]),
        ]));
        sync.refresh().await.unwrap();

        sync.create(&7).await.unwrap();

        assert_eq!(sync.source().created.lock().unwrap().as_slice(), &[7]);
        assert_eq!(sync.state().items, vec![7, 1]);
        assert_eq!(sync.source().fetch_count(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_create_leaves_state_untouched() {
        let source = FakeSource {
            fail_mutations: true,
            ..FakeSource::with_results(vec![Ok(vec![1])])
        };
        let sync = ListSync::new(source);
        sync.refresh().await.unwrap();
        let before = sync.state();

        let error = sync.create(&2).await.unwrap_err();

        assert_eq!(error.user_message("등록 실패"), "create failed");
        assert_eq!(sync.state(), before);
        assert_eq!(sync.source().fetch_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn declined_delete_does_nothing() {
        let sync = ListSync::new(FakeSource::with_results(vec![Ok(vec![1, 2])]));
        sync.refresh().await.unwrap();

        let outcome = sync.delete(&2, &|_: &str| false).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(sync.source().deleted.lock().unwrap().is_empty());
        assert_eq!(sync.source().fetch_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn confirmed_delete_takes_server_list_as_is() {
        // The server still returns the deleted id; the local list mirrors it.
        let sync = ListSync::new(FakeSource::with_results(vec![
            Ok(vec![1, 2]),
            Ok(vec![1, 2, 3]),
        ]));
        sync.refresh().await.unwrap();
        let asked = Mutex::new(Vec::new());

        let outcome = sync
            .delete(&2, &|prompt: &str| {
                asked.lock().unwrap().push(prompt.to_string());
                true
            })
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(asked.lock().unwrap().as_slice(), &[DEFAULT_DELETE_PROMPT.to_string()]);
        assert_eq!(sync.state().items, vec![1, 2, 3]);
    }
}
