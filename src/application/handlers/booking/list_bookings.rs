//! ListBookingsHandler - Query handler for the caller's bookings.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::booking::{BookingError, BookingWithParties};
use crate::domain::foundation::{AuthenticatedUser, UserId};
use crate::ports::{BookingRepository, ProfileRepository};

/// Query for the caller's bookings.
#[derive(Debug, Clone)]
pub struct ListBookingsQuery {
    pub caller: Option<AuthenticatedUser>,
}

/// Bookings newest start first, each with both parties' display profile.
#[derive(Debug, Clone)]
pub struct ListBookingsResult {
    pub bookings: Vec<BookingWithParties>,
}

/// Handler for listing bookings as client or companion.
pub struct ListBookingsHandler {
    bookings: Arc<dyn BookingRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ListBookingsHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { bookings, profiles }
    }

    pub async fn handle(&self, query: ListBookingsQuery) -> Result<ListBookingsResult, BookingError> {
        let caller = query.caller.ok_or(BookingError::NotAuthenticated)?;

        let bookings = self.bookings.list_for_participant(&caller.id).await?;

        let mut ids: Vec<UserId> = bookings
            .iter()
            .flat_map(|b| [b.client_id, b.companion_id])
            .collect();
        ids.sort();
        ids.dedup();

        let summaries: HashMap<_, _> = self
            .profiles
            .find_summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let bookings = bookings
            .into_iter()
            .map(|booking| BookingWithParties {
                client: summaries.get(&booking.client_id).cloned(),
                companion: summaries.get(&booking.companion_id).cloned(),
                booking,
            })
            .collect();

        Ok(ListBookingsResult { bookings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::booking::{Booking, BookingRequest, DurationHours};
    use crate::domain::foundation::{Money, Timestamp, UserType};

    async fn book(store: &InMemoryStore, client: UserId, companion: UserId, in_hours: i64) -> Booking {
        let booking = Booking::create(
            BookingRequest {
                client_id: client,
                companion_id: companion,
                start_time: Timestamp::now().plus_hours(in_hours),
                duration: DurationHours::try_new(1).unwrap(),
                service_type: "lunch".to_string(),
                location: None,
                special_requests: None,
            },
            Money::from_cents(1_000),
        )
        .unwrap();
        BookingRepository::insert(store, &booking).await.unwrap();
        booking
    }

    #[tokio::test]
    async fn lists_client_and_companion_bookings_newest_start_first() {
        let store = InMemoryStore::new();
        let client = store.seed_client("client@example.com");
        let companion = store.seed_companion("companion@example.com", Money::from_cents(1_000));
        let other = store.seed_client("other@example.com");
        store.set_display_name(&companion, "Mia");

        let early = book(&store, client, companion, 1).await;
        let late = book(&store, client, companion, 10).await;
        book(&store, other, companion, 5).await;

        let handler = ListBookingsHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let result = handler
            .handle(ListBookingsQuery {
                caller: Some(AuthenticatedUser::new(client, "client@example.com", UserType::Client)),
            })
            .await
            .unwrap();

        let ids: Vec<_> = result.bookings.iter().map(|b| b.booking.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
        let companion_summary = result.bookings[0].companion.as_ref().unwrap();
        assert_eq!(companion_summary.display_name.as_deref(), Some("Mia"));
        assert_eq!(result.bookings[0].client.as_ref().unwrap().id, client);

        let as_companion = handler
            .handle(ListBookingsQuery {
                caller: Some(AuthenticatedUser::new(companion, "companion@example.com", UserType::Companion)),
            })
            .await
            .unwrap();
        assert_eq!(as_companion.bookings.len(), 3);
    }

    #[tokio::test]
    async fn missing_caller_is_not_authenticated() {
        let store = InMemoryStore::new();
        let handler = ListBookingsHandler::new(Arc::new(store.clone()), Arc::new(store));

        let err = handler.handle(ListBookingsQuery { caller: None }).await.unwrap_err();

        assert_eq!(err, BookingError::NotAuthenticated);
    }
}
