//! Events service: one row per (venue, band, date)

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::event::{CreateEvent, EventDetails},
    repository::Repository,
};

use super::ensure_active;

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
}

impl EventsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Return the event for the show, creating it on first sight.
    /// The boolean is `true` when this call created the row.
    pub async fn resolve_or_create(&self, data: &CreateEvent, created_by: Option<Uuid>) -> AppResult<(EventDetails, bool)> {
        data.validate()?;
        if let Some(user_id) = created_by {
            ensure_active(&self.repository, user_id).await?;
        }

        if let Some(event) = self
            .repository
            .events
            .find_by_show(data.venue_id, data.band_id, data.event_date)
            .await?
        {
            return Ok((self.repository.events.get_details(event.id).await?, false));
        }

        self.repository.venues.get_by_id(data.venue_id).await?;
        self.repository.bands.get_by_id(data.band_id).await?;

        let name = data.event_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let inserted = self
            .repository
            .events
            .insert_if_absent(data.venue_id, data.band_id, data.event_date, name, created_by)
            .await?;

        let (id, created) = match inserted {
            Some(event) => {
                tracing::info!(
                    event_id = %event.id,
                    venue_id = %event.venue_id,
                    band_id = %event.band_id,
                    event_date = %event.event_date,
                    "Event created"
                );
                (event.id, true)
            }
            // Lost the race to a concurrent insert of the same show
            None => {
                let event = self
                    .repository
                    .events
                    .find_by_show(data.venue_id, data.band_id, data.event_date)
                    .await?
                    .ok_or_else(|| AppError::Internal("Event vanished after conflicting insert".to_string()))?;
                (event.id, false)
            }
        };

        Ok((self.repository.events.get_details(id).await?, created))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<EventDetails> {
        self.repository.events.get_details(id).await
    }

    pub async fn by_venue(&self, venue_id: Uuid, upcoming: bool, limit: i64) -> AppResult<Vec<EventDetails>> {
        self.repository.venues.get_by_id(venue_id).await?;
        self.repository.events.list_by_venue(venue_id, upcoming, limit).await
    }

    pub async fn by_band(&self, band_id: Uuid, upcoming: bool, limit: i64) -> AppResult<Vec<EventDetails>> {
        self.repository.bands.get_by_id(band_id).await?;
        self.repository.events.list_by_band(band_id, upcoming, limit).await
    }

    /// Hard delete, refused while check-ins reference the event
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.repository.events.checkin_count(id).await? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete event with existing check-ins".to_string(),
            ));
        }
        self.repository.events.delete(id).await?;
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    pub async fn trending(&self, limit: i64) -> AppResult<Vec<EventDetails>> {
        self.repository.events.trending(limit).await
    }
}
