//! Collection synchronizer.
//!
//! # Design
//! `Synchronizer` owns the client-side view of the beer collection and is the
//! only writer of it. State lives in a `tokio::sync::watch` channel: every
//! write goes through `send_modify`, which serializes writers and wakes
//! subscribers; readers `subscribe()` or take a `snapshot()`.
//!
//! The list is only ever what the server last said. Mutations never patch it
//! locally; a successful add, update or remove is followed by a full refresh.
//! Sorting and filtering rearrange the current list in place and do no I/O.
//!
//! Operations are not queued or cancelled. Two fetches in flight race and,
//! under `StalePolicy::LastWriteWins`, whichever lands last overwrites the
//! list. `StalePolicy::DiscardStale` tags each fetch with a generation and
//! drops results older than what is already applied.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::BeerApi;
use crate::config::StalePolicy;
use crate::draft::BeerDraft;
use crate::error::{ApiError, SubmitError};
use crate::types::Beer;

/// Observable state of the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    /// Beers in presentation order.
    pub beers: Vec<Beer>,
    /// True while at least one list fetch is in flight.
    pub is_loading: bool,
    /// Empty after a success, otherwise the most recent failure.
    pub error_message: String,
}

impl CollectionState {
    pub fn find(&self, id: i32) -> Option<&Beer> {
        self.beers.iter().find(|b| b.id == id)
    }

    /// Beers in the current list that belong to `user`.
    pub fn owned_by<'a>(&'a self, user: &'a str) -> impl Iterator<Item = &'a Beer> + 'a {
        self.beers.iter().filter(move |b| b.user == user)
    }

    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}

enum Scope<'a> {
    All,
    User(&'a str),
}

struct Inner<A> {
    api: A,
    state: watch::Sender<CollectionState>,
    policy: StalePolicy,
    /// Last generation handed out to a fetch.
    issued: AtomicU64,
    /// Newest generation whose result is reflected in `beers`.
    applied: AtomicU64,
    in_flight: AtomicUsize,
}

/// Counts one list fetch as in flight until released or dropped, so a fetch
/// abandoned mid-await (timeout, `select!`, aborted task) still lowers
/// `is_loading`.
struct InFlight<'a, A> {
    inner: &'a Inner<A>,
    armed: bool,
}

impl<'a, A> InFlight<'a, A> {
    fn enter(inner: &'a Inner<A>) -> Self {
        inner.state.send_modify(|state| {
            inner.in_flight.fetch_add(1, Ordering::SeqCst);
            state.is_loading = true;
        });
        Self { inner, armed: true }
    }

    /// Release inside an ongoing `send_modify`.
    fn release(&mut self, state: &mut CollectionState) {
        if std::mem::replace(&mut self.armed, false) {
            let remaining = self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            state.is_loading = remaining > 0;
        }
    }
}

impl<A> Drop for InFlight<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            debug!("list fetch abandoned");
            let inner = self.inner;
            inner.state.send_modify(|state| self.release(state));
        }
    }
}

pub struct Synchronizer<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Synchronizer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: BeerApi> Synchronizer<A> {
    /// Start with an empty collection. Nothing is fetched until asked.
    pub fn new(api: A) -> Self {
        Self::with_policy(api, StalePolicy::default())
    }

    pub fn with_policy(api: A, policy: StalePolicy) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                policy,
                issued: AtomicU64::new(0),
                applied: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> CollectionState {
        self.inner.state.borrow().clone()
    }

    /// The beer with `id`, or the "No beer" placeholder.
    pub fn find(&self, id: i32) -> Beer {
        self.inner
            .state
            .borrow()
            .find(id)
            .cloned()
            .unwrap_or_else(Beer::placeholder)
    }

    /// Replace the list with every beer on the server.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.fetch(Scope::All).await
    }

    /// Replace the list with `username`'s beers. Without an identity the
    /// list is cleared locally and no request is made.
    pub async fn refresh_for_user(&self, username: Option<&str>) -> Result<(), ApiError> {
        match username {
            Some(username) => self.fetch(Scope::User(username)).await,
            None => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Empty the list. Fetches issued before this point count as stale.
    pub fn clear(&self) {
        let inner = &self.inner;
        inner.state.send_modify(|state| {
            state.beers.clear();
            inner
                .applied
                .fetch_max(inner.issued.load(Ordering::SeqCst), Ordering::SeqCst);
        });
        debug!("collection cleared");
    }

    pub async fn add(&self, beer: &Beer) -> Result<Beer, ApiError> {
        let result = self.inner.api.create(beer).await;
        self.reconcile("add", result).await
    }

    /// Validate `draft` and add it on behalf of `user`. Validation failures
    /// are returned without any request and without touching the state.
    pub async fn add_draft(&self, draft: &BeerDraft, user: Option<&str>) -> Result<Beer, SubmitError> {
        let beer = draft.validate(user)?;
        Ok(self.add(&beer).await?)
    }

    pub async fn update(&self, id: i32, beer: &Beer) -> Result<Beer, ApiError> {
        let result = self.inner.api.update(id, beer).await;
        self.reconcile("update", result).await
    }

    pub async fn remove(&self, beer: &Beer) -> Result<Option<Beer>, ApiError> {
        let result = self.inner.api.delete(beer.id).await;
        self.reconcile("remove", result).await
    }

    /// Case-sensitive ordering by name. Stable, so equal names keep their
    /// relative order.
    pub fn sort_by_name(&self, ascending: bool) {
        self.inner.state.send_modify(|state| {
            if ascending {
                state.beers.sort_by(|a, b| a.name.cmp(&b.name));
            } else {
                state.beers.sort_by(|a, b| b.name.cmp(&a.name));
            }
        });
    }

    pub fn sort_by_abv(&self, ascending: bool) {
        self.inner.state.send_modify(|state| {
            if ascending {
                state.beers.sort_by(|a, b| a.abv.total_cmp(&b.abv));
            } else {
                state.beers.sort_by(|a, b| b.abv.total_cmp(&a.abv));
            }
        });
    }

    /// Narrow the list to names containing `fragment`, ignoring case. The
    /// dropped beers are gone until the next refresh. An empty fragment
    /// refreshes instead.
    pub async fn filter_by_name(&self, fragment: &str) -> Result<(), ApiError> {
        if fragment.is_empty() {
            return self.refresh().await;
        }
        let needle = fragment.to_lowercase();
        self.inner.state.send_modify(|state| {
            state
                .beers
                .retain(|b| b.name.to_lowercase().contains(&needle));
        });
        Ok(())
    }

    pub fn spawn_refresh(&self) -> JoinHandle<Result<(), ApiError>> {
        let this = self.clone();
        tokio::spawn(async move { this.refresh().await })
    }

    pub fn spawn_refresh_for_user(&self, username: Option<String>) -> JoinHandle<Result<(), ApiError>> {
        let this = self.clone();
        tokio::spawn(async move { this.refresh_for_user(username.as_deref()).await })
    }

    pub fn spawn_add(&self, beer: Beer) -> JoinHandle<Result<Beer, ApiError>> {
        let this = self.clone();
        tokio::spawn(async move { this.add(&beer).await })
    }

    pub fn spawn_update(&self, id: i32, beer: Beer) -> JoinHandle<Result<Beer, ApiError>> {
        let this = self.clone();
        tokio::spawn(async move { this.update(id, &beer).await })
    }

    pub fn spawn_remove(&self, beer: Beer) -> JoinHandle<Result<Option<Beer>, ApiError>> {
        let this = self.clone();
        tokio::spawn(async move { this.remove(&beer).await })
    }

    /// Track the signed-in identity: each present value triggers a user
    /// refresh on its own task, an absent one clears the list immediately.
    /// Ends when the identity sender is dropped.
    pub fn follow_identity(&self, mut identity: watch::Receiver<Option<String>>) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                let current = identity.borrow_and_update().clone();
                match current {
                    Some(user) => {
                        debug!(%user, "identity changed");
                        this.spawn_refresh_for_user(Some(user));
                    }
                    None => this.clear(),
                }
                if identity.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    async fn fetch(&self, scope: Scope<'_>) -> Result<(), ApiError> {
        let inner = &self.inner;
        let generation = inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let mut in_flight = InFlight::enter(inner);

        let result = match scope {
            Scope::All => inner.api.list_all().await,
            Scope::User(username) => inner.api.list_by_user(username).await,
        };
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);

        inner.state.send_modify(|state| {
            in_flight.release(state);

            if inner.policy == StalePolicy::DiscardStale
                && inner.applied.load(Ordering::SeqCst) >= generation
            {
                debug!(generation, "discarding stale list");
                return;
            }

            match result {
                Ok(beers) => {
                    debug!(generation, count = beers.len(), "list applied");
                    state.beers = beers;
                    state.error_message.clear();
                    inner.applied.fetch_max(generation, Ordering::SeqCst);
                }
                Err(err) => {
                    warn!(generation, error = %err, "list fetch failed");
                    state.error_message = err.to_string();
                }
            }
        });

        outcome
    }

    /// After a mutation: refresh on success, record the failure otherwise.
    /// A failed follow-up refresh shows up in `error_message` only; the
    /// mutation itself still succeeded.
    async fn reconcile<T>(&self, op: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.inner.state.send_modify(|state| state.error_message.clear());
                let _ = self.refresh().await;
                Ok(value)
            }
            Err(err) => {
                warn!(op, error = %err, "mutation failed");
                self.inner
                    .state
                    .send_modify(|state| state.error_message = err.to_string());
                Err(err)
            }
        }
    }
}
