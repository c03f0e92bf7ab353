use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;
use whispr_types::api::{
    CreateCommentRequest, CreateConfessionRequest, CreateMarketItemRequest, SendCrushRequest,
    UpdateProfileRequest,
};
use whispr_types::events::{CrushNotice, EventKind, GatewayEvent};
use whispr_types::models::{Comment, Confession, Crush, MarketItem, Profile, Snapshot};

use crate::clock::{Clock, SystemClock};
use crate::content::{
    Author, CommentParent, ConfessionQuery, ContentStore, MarketQuery, ReactionOutcome,
};
use crate::error::{Result, StoreError};
use crate::ledger::{KarmaAction, ProfileLedger, ProfileUpdate};
use crate::notifier::{Notifier, NullNotifier};
use crate::persist::SnapshotStore;
use crate::random::{Randomness, ThreadRandom};

pub const DEFAULT_FLUSH_DEBOUNCE: Duration = Duration::from_millis(250);

struct State {
    content: ContentStore,
    ledger: ProfileLedger,
}

struct Inner {
    state: Mutex<State>,
    backend: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn Randomness>,
    notifier: Arc<dyn Notifier>,
    debounce: Duration,
    dirty: AtomicBool,
    /// Serializes flushes so saves land in order
    flush_lock: Mutex<()>,
    pending_flush: StdMutex<Option<JoinHandle<()>>>,
}

/// Shared handle to the content store. Cheap to clone.
#[derive(Clone)]
pub struct Whispr {
    inner: Arc<Inner>,
}

pub struct WhisprBuilder {
    backend: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn Randomness>,
    notifier: Arc<dyn Notifier>,
    debounce: Duration,
    seed_samples: bool,
}

impl WhisprBuilder {
    pub fn new(backend: impl SnapshotStore) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
            notifier: Arc::new(NullNotifier),
            debounce: DEFAULT_FLUSH_DEBOUNCE,
            seed_samples: false,
        }
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn random(mut self, random: impl Randomness + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn seed_samples(mut self, seed: bool) -> Self {
        self.seed_samples = seed;
        self
    }

    /// Load persisted state and start serving.
    pub async fn open(self) -> anyhow::Result<Whispr> {
        let backend = self.backend.clone();
        let snapshot = tokio::task::spawn_blocking(move || backend.load()).await??;

        let ledger = ProfileLedger::from_profiles(snapshot.profiles.clone());
        let content = ContentStore::from_snapshot(snapshot);
        info!(
            "Loaded {} confessions, {} crushes, {} listings, {} comments, {} profiles",
            content.confession_count(),
            content.crush_count(),
            content.market_count(),
            content.comment_count(),
            ledger.len()
        );

        let whispr = Whispr {
            inner: Arc::new(Inner {
                state: Mutex::new(State { content, ledger }),
                backend: self.backend,
                clock: self.clock,
                random: self.random,
                notifier: self.notifier,
                debounce: self.debounce,
                dirty: AtomicBool::new(false),
                flush_lock: Mutex::new(()),
                pending_flush: StdMutex::new(None),
            }),
        };

        if self.seed_samples {
            whispr.seed_samples().await;
        }
        Ok(whispr)
    }
}

impl Whispr {
    pub fn builder(backend: impl SnapshotStore) -> WhisprBuilder {
        WhisprBuilder::new(backend)
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.clock.now()
    }

    // -- Confessions --

    pub async fn list_confessions(&self, query: ConfessionQuery) -> Vec<Confession> {
        let now = self.now();
        let state = self.inner.state.lock().await;
        state.content.list_confessions(&query, now)
    }

    pub async fn create_confession(&self, req: CreateConfessionRequest) -> Result<Confession> {
        let now = self.now();
        let confession = {
            let mut state = self.inner.state.lock().await;
            let State { content, ledger } = &mut *state;
            let author = Author::resolve(
                ledger.get(req.author_id.trim()),
                &req.author_alias,
                req.author_avatar_index,
                req.author_karma,
            );
            let confession = content.create_confession(&req, author, now)?;
            ledger.grant(&confession.author_id, KarmaAction::Confession);
            confession
        };
        debug!("Confession {} created", confession.id);
        self.changed(EventKind::ConfessionCreate(confession.clone()));
        Ok(confession)
    }

    pub async fn delete_confession(&self, id: Uuid, author_id: &str) -> Result<()> {
        self.inner
            .state
            .lock()
            .await
            .content
            .delete_confession(id, author_id.trim())?;
        self.changed(EventKind::ConfessionDelete { id });
        Ok(())
    }

    /// Toggle one reaction. Throttled and self-reactions come back unchanged
    /// and publish nothing.
    pub async fn toggle_reaction(
        &self,
        confession_id: Uuid,
        user_id: &str,
        reaction_type: &str,
    ) -> Result<ReactionOutcome> {
        let now = self.now();
        let outcome = {
            let mut state = self.inner.state.lock().await;
            let State { content, ledger } = &mut *state;
            let outcome = content.toggle_reaction(confession_id, user_id, reaction_type, now)?;
            if outcome.applied() {
                ledger.record_reaction(user_id.trim(), now, outcome.added());
            }
            outcome
        };

        if outcome.applied() {
            self.changed(EventKind::ConfessionReaction {
                confession_id,
                reaction_type: outcome.kind,
                added: outcome.added(),
            });
        }
        Ok(outcome)
    }

    // -- Crushes --

    pub async fn list_crushes(&self, user_id: &str) -> Vec<Crush> {
        self.inner.state.lock().await.content.list_crushes(user_id.trim())
    }

    pub async fn send_crush(&self, req: SendCrushRequest) -> Result<Crush> {
        let now = self.now();
        let crush = {
            let mut state = self.inner.state.lock().await;
            let State { content, ledger } = &mut *state;
            let crush = content.send_crush(&req, now, self.inner.random.as_ref())?;
            ledger.grant(&crush.from_user_id, KarmaAction::Crush);
            crush
        };
        // Observers only learn that someone has a crush on an alias
        self.changed(EventKind::CrushCreate(CrushNotice::from(&crush)));
        Ok(crush)
    }

    pub async fn reveal_crush(&self, id: Uuid, user_id: &str) -> Result<Crush> {
        let user_id = user_id.trim();
        let crush = {
            let mut state = self.inner.state.lock().await;
            let State { content, ledger } = &mut *state;
            let (crush, first_reveal) = content.reveal_crush(id, user_id)?;
            if !first_reveal {
                return Ok(crush);
            }
            ledger.record_reveal(user_id);
            crush
        };
        self.mark_dirty();
        Ok(crush)
    }

    pub async fn delete_crush(&self, id: Uuid, user_id: &str) -> Result<()> {
        self.inner
            .state
            .lock()
            .await
            .content
            .delete_crush(id, user_id.trim())?;
        self.mark_dirty();
        Ok(())
    }

    // -- Marketplace --

    pub async fn list_market_items(&self, query: MarketQuery) -> Vec<MarketItem> {
        self.inner.state.lock().await.content.list_market_items(&query)
    }

    pub async fn create_market_item(&self, req: CreateMarketItemRequest) -> Result<MarketItem> {
        let now = self.now();
        let item = {
            let mut state = self.inner.state.lock().await;
            let State { content, ledger } = &mut *state;
            let seller = Author::resolve(
                ledger.get(req.seller_id.trim()),
                &req.seller_alias,
                req.seller_avatar_index,
                req.seller_karma,
            );
            let item = content.create_market_item(&req, seller, now)?;
            ledger.grant(&item.seller_id, KarmaAction::MarketListing);
            item
        };
        self.changed(EventKind::MarketCreate(item.clone()));
        Ok(item)
    }

    pub async fn toggle_sold(&self, id: Uuid, seller_id: &str) -> Result<MarketItem> {
        let item = self
            .inner
            .state
            .lock()
            .await
            .content
            .toggle_sold(id, seller_id.trim())?;
        self.changed(EventKind::MarketUpdate(item.clone()));
        Ok(item)
    }

    pub async fn delete_market_item(&self, id: Uuid, seller_id: &str) -> Result<()> {
        self.inner
            .state
            .lock()
            .await
            .content
            .delete_market_item(id, seller_id.trim())?;
        self.changed(EventKind::MarketDelete { id });
        Ok(())
    }

    // -- Comments --

    pub async fn list_comments(&self, parent: CommentParent, limit: Option<i64>) -> Vec<Comment> {
        self.inner.state.lock().await.content.list_comments(parent, limit)
    }

    pub async fn create_comment(&self, req: CreateCommentRequest) -> Result<Comment> {
        let now = self.now();
        let comment = {
            let mut state = self.inner.state.lock().await;
            let State { content, ledger } = &mut *state;
            let author = Author::resolve(
                ledger.get(req.author_id.trim()),
                &req.author_alias,
                req.author_avatar_index,
                req.author_karma,
            );
            let comment = content.create_comment(&req, author, now)?;
            ledger.grant(&comment.author_id, KarmaAction::Comment);
            comment
        };
        self.changed(EventKind::CommentCreate(comment.clone()));
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: Uuid, author_id: &str) -> Result<()> {
        let removed = self
            .inner
            .state
            .lock()
            .await
            .content
            .delete_comment(id, author_id.trim())?;
        self.changed(EventKind::CommentDelete {
            id,
            parent_id: removed.parent_id,
        });
        Ok(())
    }

    // -- Profiles --

    pub async fn create_profile(&self) -> Profile {
        let now = self.now();
        let profile = {
            let mut state = self.inner.state.lock().await;
            state.ledger.create(now, self.inner.random.as_ref())
        };
        debug!("Profile {} created", profile.id);
        self.mark_dirty();
        profile
    }

    pub async fn get_profile(&self, id: &str) -> Result<Profile> {
        let state = self.inner.state.lock().await;
        state.ledger.get(id.trim()).cloned().ok_or(StoreError::NotFound)
    }

    pub async fn update_profile(&self, id: &str, req: UpdateProfileRequest) -> Result<Profile> {
        let update = ProfileUpdate {
            alias: req.alias,
            avatar_index: req.avatar_index,
            karma: None,
        };
        let profile = self
            .inner
            .state
            .lock()
            .await
            .ledger
            .update(id.trim(), update)
            .ok_or(StoreError::NotFound)?;
        self.mark_dirty();
        Ok(profile)
    }

    pub async fn regenerate_alias(&self, id: &str) -> Result<Profile> {
        let profile = self
            .inner
            .state
            .lock()
            .await
            .ledger
            .regenerate_alias(id.trim(), self.inner.random.as_ref())
            .ok_or(StoreError::NotFound)?;
        self.mark_dirty();
        Ok(profile)
    }

    // -- Lifecycle --

    /// Insert demo content when the feed is empty.
    pub async fn seed_samples(&self) -> bool {
        let now = self.now();
        let seeded = self.inner.state.lock().await.content.seed_if_empty(now);
        if seeded {
            info!("Seeded sample content");
            self.mark_dirty();
        }
        seeded
    }

    /// Copy of everything that gets persisted.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.inner.state.lock().await;
        Snapshot {
            profiles: state.ledger.profiles(),
            ..state.content.snapshot()
        }
    }

    /// Write the current state now if anything changed since the last save.
    pub async fn flush(&self) -> Result<()> {
        let _guard = self.inner.flush_lock.lock().await;
        if !self.inner.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let snapshot = self.snapshot().await;
        let backend = self.inner.backend.clone();
        let saved = tokio::task::spawn_blocking(move || backend.save(&snapshot))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|result| result);

        if let Err(e) = saved {
            // Keep the changes queued for the next attempt
            self.inner.dirty.store(true, Ordering::Release);
            error!("Failed to persist state: {:#}", e);
            return Err(StoreError::Persistence(e.to_string()));
        }
        debug!("State persisted");
        Ok(())
    }

    /// Cancel any pending save and write outstanding changes.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(handle) = self.take_pending() {
            handle.abort();
        }
        self.flush().await
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    fn changed(&self, kind: EventKind) {
        self.mark_dirty();
        self.inner
            .notifier
            .publish(GatewayEvent::new(kind, self.now()));
    }

    /// Flag unsaved changes and restart the debounce timer.
    fn mark_dirty(&self) {
        self.inner.dirty.store(true, Ordering::Release);

        let this = self.clone();
        let delay = self.inner.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so cancelling the timer can't interrupt a write
            tokio::spawn(async move {
                if let Err(e) = this.flush().await {
                    error!("Debounced flush failed: {}", e);
                }
            });
        });

        let mut pending = self
            .inner
            .pending_flush
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    fn take_pending(&self) -> Option<JoinHandle<()>> {
        self.inner
            .pending_flush
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}
