//! In-memory marketplace store for testing.
//!
//! All tables sit behind one mutex, so the multi-row operations
//! (`append_message`, `mark_read`, `settle_payment`) are atomic the same way
//! their PostgreSQL transactions are.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::analytics::BehaviorEvent;
use crate::domain::booking::{Booking, BookingStatus, PaymentStatus};
use crate::domain::foundation::{
    BookingId, ConversationId, DomainError, ErrorCode, MessageId, Money, Timestamp, UserId,
    UserType,
};
use crate::domain::messaging::{Conversation, Message};
use crate::domain::profile::{ParticipantSummary, Profile};
use crate::ports::{
    BehaviorRepository, BookingRepository, ConversationRepository, ProfileRepository, Settlement,
};

#[derive(Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    companion_rates: HashMap<UserId, Money>,
    bookings: HashMap<BookingId, Booking>,
    conversations: HashMap<ConversationId, Conversation>,
    /// Insertion order doubles as the message sequence.
    messages: Vec<Message>,
    events: Vec<BehaviorEvent>,
    /// Tables whose next write fails, for error-path tests.
    failing: HashSet<&'static str>,
}

impl Tables {
    fn check(&self, table: &'static str) -> Result<(), DomainError> {
        if self.failing.contains(table) {
            return Err(DomainError::database(format!("simulated {} failure", table)));
        }
        Ok(())
    }
}

/// Implements every repository port over shared in-memory tables.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryStore::new();
/// let companion = store.seed_companion("ana@example.com", Money::from_cents(10_000));
/// let bookings: Arc<dyn BookingRepository> = Arc::new(store.clone());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a client profile and returns its id.
    pub fn seed_client(&self, email: &str) -> UserId {
        let profile = Profile::for_new_user(UserId::new(), email, UserType::Client);
        let id = profile.id;
        self.tables().profiles.insert(id, profile);
        id
    }

    /// Inserts a companion profile with an hourly rate and returns its id.
    pub fn seed_companion(&self, email: &str, hourly_rate: Money) -> UserId {
        let profile = Profile::for_new_user(
            UserId::new(),
            email,
            UserType::Companion,
        );
        let id = profile.id;
        let mut tables = self.tables();
        tables.profiles.insert(id, profile);
        tables.companion_rates.insert(id, hourly_rate);
        id
    }

    /// Sets the display name of a stored profile.
    pub fn set_display_name(&self, id: &UserId, name: &str) {
        if let Some(profile) = self.tables().profiles.get_mut(id) {
            profile.display_name = Some(name.to_string());
        }
    }

    /// Makes writes to `table` fail until cleared. Table names follow the
    /// PostgreSQL schema (`profiles`, `bookings`, `conversations`, `user_behavior`).
    pub fn fail_writes_to(&self, table: &'static str) {
        self.tables().failing.insert(table);
    }

    pub fn clear_failures(&self) {
        self.tables().failing.clear();
    }

    pub fn profile(&self, id: &UserId) -> Option<Profile> {
        self.tables().profiles.get(id).cloned()
    }

    pub fn booking(&self, id: &BookingId) -> Option<Booking> {
        self.tables().bookings.get(id).cloned()
    }

    /// Bookings where the user is client or companion, in no particular order.
    pub fn bookings_for(&self, user_id: &UserId) -> Vec<Booking> {
        self.tables()
            .bookings
            .values()
            .filter(|b| b.is_participant(user_id))
            .cloned()
            .collect()
    }

    pub fn conversation(&self, id: &ConversationId) -> Option<Conversation> {
        self.tables().conversations.get(id).cloned()
    }

    pub fn messages_in(&self, id: &ConversationId) -> Vec<Message> {
        self.tables()
            .messages
            .iter()
            .filter(|m| m.conversation_id == *id)
            .cloned()
            .collect()
    }

    pub fn events(&self) -> Vec<BehaviorEvent> {
        self.tables().events.clone()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn insert(&self, profile: &Profile) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("profiles")?;
        if tables.profiles.contains_key(&profile.id) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Profile {} already exists", profile.id),
            ));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, DomainError> {
        Ok(self.tables().profiles.get(id).cloned())
    }

    async fn find_summaries(&self, ids: &[UserId]) -> Result<Vec<ParticipantSummary>, DomainError> {
        let tables = self.tables();
        Ok(ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| tables.profiles.get(id).map(Profile::summary))
            .collect())
    }

    async fn companion_rate(&self, companion_id: &UserId) -> Result<Option<Money>, DomainError> {
        Ok(self.tables().companion_rates.get(companion_id).copied())
    }
}

fn stored_booking<'a>(tables: &'a mut Tables, id: &BookingId) -> Result<&'a mut Booking, DomainError> {
    tables.bookings.get_mut(id).ok_or_else(|| {
        DomainError::new(ErrorCode::BookingNotFound, format!("Booking {} not found", id))
    })
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("bookings")?;
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update_lifecycle(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("bookings")?;
        let stored = stored_booking(&mut tables, &booking.id)?;
        if stored.status != expected {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Booking is no longer {}", expected),
            ));
        }
        stored.notes = booking.notes.clone();
        stored.status = booking.status;
        stored.cancellation_reason = booking.cancellation_reason.clone();
        stored.cancelled_by = booking.cancelled_by;
        stored.cancelled_at = booking.cancelled_at;
        stored.updated_at = booking.updated_at;
        Ok(())
    }

    async fn record_authorization(
        &self,
        id: &BookingId,
        payment_intent_id: &str,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("bookings")?;
        let stored = stored_booking(&mut tables, id)?;
        if stored.payment_status != PaymentStatus::Pending {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Booking payment is no longer pending",
            ));
        }
        stored.record_authorization(payment_intent_id);
        Ok(())
    }

    async fn record_refund(&self, booking: &Booking) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("bookings")?;
        let stored = stored_booking(&mut tables, &booking.id)?;
        if stored.payment_status != PaymentStatus::Paid {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Booking payment is no longer paid",
            ));
        }
        stored.payment_status = PaymentStatus::Refunded;
        stored.status = BookingStatus::Cancelled;
        stored.cancellation_reason = booking.cancellation_reason.clone();
        stored.cancelled_at = stored.cancelled_at.or(booking.cancelled_at);
        stored.updated_at = booking.updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.tables().bookings.get(id).cloned())
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Booking>, DomainError> {
        Ok(self
            .tables()
            .bookings
            .values()
            .find(|b| b.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }

    async fn list_for_participant(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError> {
        let mut bookings: Vec<Booking> = self
            .tables()
            .bookings
            .values()
            .filter(|b| b.is_participant(user_id))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(bookings)
    }

    async fn list_created_since(
        &self,
        since: Timestamp,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Vec<Booking>, DomainError> {
        Ok(self
            .tables()
            .bookings
            .values()
            .filter(|b| b.created_at >= since)
            .filter(|b| payment_status.map_or(true, |status| b.payment_status == status))
            .cloned()
            .collect())
    }

    async fn settle_payment(&self, payment_intent_id: &str) -> Result<Settlement, DomainError> {
        let mut tables = self.tables();
        tables.check("bookings")?;
        let Some(booking) = tables
            .bookings
            .values_mut()
            .find(|b| b.payment_intent_id.as_deref() == Some(payment_intent_id))
        else {
            return Ok(Settlement::NoMatchingBooking);
        };
        if !booking.settle_payment() {
            return Ok(Settlement::AlreadySettled);
        }
        let (booking_id, companion_id, credited) =
            (booking.id, booking.companion_id, booking.companion_earnings);
        if let Some(profile) = tables.profiles.get_mut(&companion_id) {
            profile.total_earnings = profile.total_earnings + credited;
        }
        Ok(Settlement::Settled {
            booking_id,
            companion_id,
            credited,
        })
    }
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn insert(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("conversations")?;
        let pair_taken = tables.conversations.values().any(|c| {
            c.is_participant(&conversation.participant_1)
                && c.is_participant(&conversation.participant_2)
        });
        if pair_taken {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Conversation between these participants already exists",
            ));
        }
        tables
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError> {
        Ok(self.tables().conversations.get(id).cloned())
    }

    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .tables()
            .conversations
            .values()
            .find(|c| c.is_participant(a) && c.other_participant(a) == Some(*b))
            .cloned())
    }

    async fn list_for_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, DomainError> {
        let mut conversations: Vec<Conversation> = self
            .tables()
            .conversations
            .values()
            .filter(|c| c.is_participant(user_id))
            .cloned()
            .collect();
        // None sorts before Some, so reversing puts silent conversations last
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(conversations)
    }

    async fn append_message(&self, message: &Message) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("conversations")?;
        let Some(conversation) = tables.conversations.get_mut(&message.conversation_id) else {
            return Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("Conversation {} not found", message.conversation_id),
            ));
        };
        conversation.record_message(message);
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        reader: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut tables = self.tables();
        tables.check("conversations")?;
        let Some(conversation) = tables.conversations.get_mut(conversation_id) else {
            return Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("Conversation {} not found", conversation_id),
            ));
        };
        conversation.clear_unread(reader);

        let changed = tables
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == *conversation_id && m.recipient_id == *reader)
            .map(|m| m.mark_read(at))
            .filter(|changed| *changed)
            .count();
        Ok(changed as u64)
    }

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, DomainError> {
        Ok(self.tables().messages.iter().find(|m| m.id == *id).cloned())
    }

    async fn messages_after(
        &self,
        conversation_id: &ConversationId,
        after: &Message,
    ) -> Result<Vec<Message>, DomainError> {
        let tables = self.tables();
        let Some(position) = tables.messages.iter().position(|m| m.id == after.id) else {
            return Ok(Vec::new());
        };
        Ok(tables.messages[position + 1..]
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BehaviorRepository for InMemoryStore {
    async fn append(&self, event: &BehaviorEvent) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check("user_behavior")?;
        tables.events.push(event.clone());
        Ok(())
    }

    async fn created_since(&self, since: Timestamp) -> Result<Vec<BehaviorEvent>, DomainError> {
        Ok(self
            .tables()
            .events
            .iter()
            .filter(|e| e.created_at >= since)
            .cloned()
            .collect())
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<BehaviorEvent>, DomainError> {
        Ok(self
            .tables()
            .events
            .iter()
            .rev()
            .filter(|e| e.user_id.as_ref() == Some(user_id))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingRequest, DurationHours};

    fn pending_booking(store: &InMemoryStore) -> Booking {
        let client = store.seed_client("c@example.com");
        let companion = store.seed_companion("p@example.com", Money::from_cents(10_000));
        let mut booking = Booking::create(
            BookingRequest {
                client_id: client,
                companion_id: companion,
                start_time: Timestamp::now().plus_hours(24),
                duration: DurationHours::try_new(2).unwrap(),
                service_type: "dinner".to_string(),
                location: None,
                special_requests: None,
            },
            Money::from_cents(10_000),
        )
        .unwrap();
        booking.record_authorization("pi_1");
        booking
    }

    #[tokio::test]
    async fn settle_credits_companion_once() {
        let store = InMemoryStore::new();
        let booking = pending_booking(&store);
        BookingRepository::insert(&store, &booking).await.unwrap();

        let first = store.settle_payment("pi_1").await.unwrap();
        let second = store.settle_payment("pi_1").await.unwrap();

        assert!(first.is_settled());
        assert_eq!(second, Settlement::AlreadySettled);
        let companion = store.profile(&booking.companion_id).unwrap();
        assert_eq!(companion.total_earnings, Money::from_cents(17_000));
        assert_eq!(
            store.booking(&booking.id).unwrap().status,
            BookingStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn settle_unknown_intent_matches_nothing() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.settle_payment("pi_missing").await.unwrap(),
            Settlement::NoMatchingBooking
        );
    }

    #[tokio::test]
    async fn lifecycle_write_to_missing_booking_is_not_found() {
        let store = InMemoryStore::new();
        let booking = pending_booking(&store);
        let err = store
            .update_lifecycle(&booking, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingNotFound);
    }

    #[tokio::test]
    async fn stale_cancel_after_settlement_cannot_reopen_payment() {
        let store = InMemoryStore::new();
        let booking = pending_booking(&store);
        BookingRepository::insert(&store, &booking).await.unwrap();

        let mut snapshot = BookingRepository::find_by_id(&store, &booking.id).await.unwrap().unwrap();
        assert!(store.settle_payment("pi_1").await.unwrap().is_settled());

        snapshot
            .cancel(Some(booking.client_id), "plans changed")
            .unwrap();
        let err = store
            .update_lifecycle(&snapshot, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        assert_eq!(
            store.settle_payment("pi_1").await.unwrap(),
            Settlement::AlreadySettled
        );
        let stored = store.booking(&booking.id).unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.status, BookingStatus::Confirmed);
        let companion = store.profile(&booking.companion_id).unwrap();
        assert_eq!(companion.total_earnings, Money::from_cents(17_000));
    }

    #[tokio::test]
    async fn authorization_requires_pending_payment() {
        let store = InMemoryStore::new();
        let booking = pending_booking(&store);
        BookingRepository::insert(&store, &booking).await.unwrap();
        store.settle_payment("pi_1").await.unwrap();

        let err = store
            .record_authorization(&booking.id, "pi_2")
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(
            store.booking(&booking.id).unwrap().payment_intent_id.as_deref(),
            Some("pi_1")
        );
    }

    #[tokio::test]
    async fn refund_requires_paid_booking() {
        let store = InMemoryStore::new();
        let booking = pending_booking(&store);
        BookingRepository::insert(&store, &booking).await.unwrap();

        let err = store.record_refund(&booking).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        store.settle_payment("pi_1").await.unwrap();
        store.record_refund(&booking).await.unwrap();
        let stored = store.booking(&booking.id).unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Refunded);
        assert_eq!(stored.status, BookingStatus::Cancelled);

        let again = store.record_refund(&booking).await.unwrap_err();
        assert_eq!(again.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn append_increments_only_recipient_counter() {
        let store = InMemoryStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        let conversation = Conversation::start(a, b).unwrap();
        ConversationRepository::insert(&store, &conversation)
            .await
            .unwrap();

        let message = Message::compose(conversation.id, a, b, "hi", None).unwrap();
        store.append_message(&message).await.unwrap();

        let stored = store.conversation(&conversation.id).unwrap();
        assert_eq!(stored.unread_for(&b), 1);
        assert_eq!(stored.unread_for(&a), 0);
        assert_eq!(stored.last_message_preview.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let store = InMemoryStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        let conversation = Conversation::start(a, b).unwrap();
        ConversationRepository::insert(&store, &conversation)
            .await
            .unwrap();
        for text in ["one", "two"] {
            let message = Message::compose(conversation.id, a, b, text, None).unwrap();
            store.append_message(&message).await.unwrap();
        }

        let first = store
            .mark_read(&conversation.id, &b, Timestamp::now())
            .await
            .unwrap();
        let second = store
            .mark_read(&conversation.id, &b, Timestamp::now())
            .await
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(store.conversation(&conversation.id).unwrap().unread_for(&b), 0);
    }

    #[tokio::test]
    async fn messages_after_returns_later_messages_in_order() {
        let store = InMemoryStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        let conversation = Conversation::start(a, b).unwrap();
        ConversationRepository::insert(&store, &conversation)
            .await
            .unwrap();
        let mut sent = Vec::new();
        for text in ["one", "two", "three"] {
            let message = Message::compose(conversation.id, a, b, text, None).unwrap();
            store.append_message(&message).await.unwrap();
            sent.push(message);
        }

        let later = store
            .messages_after(&conversation.id, &sent[0])
            .await
            .unwrap();

        let contents: Vec<_> = later.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn conversations_without_messages_sort_last() {
        let store = InMemoryStore::new();
        let me = UserId::new();
        let quiet = Conversation::start(me, UserId::new()).unwrap();
        let active = Conversation::start(me, UserId::new()).unwrap();
        ConversationRepository::insert(&store, &quiet).await.unwrap();
        ConversationRepository::insert(&store, &active).await.unwrap();
        let message =
            Message::compose(active.id, active.participant_2, me, "ping", None).unwrap();
        store.append_message(&message).await.unwrap();

        let listed = ConversationRepository::list_for_participant(&store, &me)
            .await
            .unwrap();

        assert_eq!(listed[0].id, active.id);
        assert_eq!(listed[1].id, quiet.id);
    }

    #[tokio::test]
    async fn failing_table_surfaces_database_error() {
        let store = InMemoryStore::new();
        store.fail_writes_to("profiles");
        let profile = Profile::for_new_user(
            UserId::new(),
            "x@example.com",
            UserType::Client,
        );
        let err = ProfileRepository::insert(&store, &profile).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
