//! Check-ins, toasts, comments and the activity feed

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        checkin::{Checkin, CheckinComment, CheckinDetails, CreateCheckin, FeedFilter, FeedQuery, Toast},
        event::{CreateEvent, Event},
        validate_coordinates,
    },
    repository::{checkins::Proximity, Repository},
};

use super::{
    ensure_active,
    events::EventsService,
    ratings::{RatingJob, RatingQueue},
    venues::resolve_radius,
};

pub const MAX_COMMENT_LENGTH: usize = 1000;

#[derive(Clone)]
pub struct CheckinsService {
    repository: Repository,
    events: EventsService,
    ratings: RatingQueue,
}

impl CheckinsService {
    pub fn new(repository: Repository, events: EventsService, ratings: RatingQueue) -> Self {
        Self {
            repository,
            events,
            ratings,
        }
    }

    /// Record attendance at a show, creating the event if needed.
    /// Supplied ratings are folded into the venue/band aggregates in the
    /// background; the check-in succeeds regardless of that outcome.
    pub async fn create(&self, user_id: Uuid, data: CreateCheckin) -> AppResult<CheckinDetails> {
        data.validate()?;
        ensure_active(&self.repository, user_id).await?;

        let show = CreateEvent {
            venue_id: data.venue_id,
            band_id: data.band_id,
            event_date: data.event_date,
            event_name: None,
        };
        let (event, _) = self.events.resolve_or_create(&show, Some(user_id)).await?;
        let event_id = event.event.id;

        if self.repository.checkins.exists_for_user_event(user_id, event_id).await? {
            return Err(AppError::Conflict("Already checked into this event".to_string()));
        }

        let checkin = self.repository.checkins.create(user_id, event_id, &data).await?;
        tracing::info!(checkin_id = %checkin.id, user_id = %user_id, event_id = %event_id, "Checked in");

        for job in rating_jobs(&checkin, &event.event) {
            self.ratings.dispatch(job);
        }

        self.repository.checkins.get_details(checkin.id, Some(user_id)).await
    }

    pub async fn get(&self, id: Uuid, viewer: Option<Uuid>) -> AppResult<CheckinDetails> {
        self.repository.checkins.get_details(id, viewer).await
    }

    /// Delete an own check-in; toasts and comments go with it
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let checkin = self.repository.checkins.get_by_id(id).await?;
        if checkin.user_id != user_id {
            return Err(AppError::Authorization(
                "You can only delete your own check-ins".to_string(),
            ));
        }

        // Resolve the show first; once the row is gone the delete must not fail
        let event = self.repository.events.get_details(checkin.event_id).await?;
        let jobs = rating_jobs(&checkin, &event.event);

        self.repository.checkins.delete(id).await?;
        tracing::info!(checkin_id = %id, user_id = %user_id, "Check-in deleted");

        for job in jobs {
            self.ratings.dispatch(job);
        }
        Ok(())
    }

    pub async fn feed(&self, viewer: Uuid, query: &FeedQuery) -> AppResult<Vec<CheckinDetails>> {
        let filter = query.filter.unwrap_or_default();
        let (limit, offset) = query.window();

        // Without coordinates the nearby feed has nothing to filter on and
        // behaves like the global one.
        let proximity = match (filter, query.lat, query.lng) {
            (FeedFilter::Nearby, Some(lat), Some(lng)) => {
                validate_coordinates(lat, lng)?;
                Some(Proximity {
                    lat,
                    lng,
                    radius_km: resolve_radius(query.radius)?,
                })
            }
            _ => None,
        };

        self.repository
            .checkins
            .feed(Some(viewer), filter, proximity, limit, offset)
            .await
    }

    pub async fn by_user(&self, user_id: Uuid, viewer: Option<Uuid>, limit: i64, offset: i64) -> AppResult<Vec<CheckinDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository
            .checkins
            .list_by_user(user_id, viewer, limit, offset)
            .await
    }

    pub async fn toast(&self, user_id: Uuid, checkin_id: Uuid) -> AppResult<()> {
        ensure_active(&self.repository, user_id).await?;
        self.repository.checkins.get_by_id(checkin_id).await?;
        if self.repository.checkins.toast_exists(checkin_id, user_id).await? {
            return Err(AppError::Conflict(
                "You have already toasted this check-in".to_string(),
            ));
        }
        self.repository.checkins.add_toast(checkin_id, user_id).await
    }

    /// Remove a toast; succeeds whether or not one existed
    pub async fn untoast(&self, user_id: Uuid, checkin_id: Uuid) -> AppResult<()> {
        self.repository.checkins.get_by_id(checkin_id).await?;
        self.repository.checkins.remove_toast(checkin_id, user_id).await
    }

    pub async fn toasts(&self, checkin_id: Uuid) -> AppResult<Vec<Toast>> {
        self.repository.checkins.get_by_id(checkin_id).await?;
        self.repository.checkins.list_toasts(checkin_id).await
    }

    pub async fn add_comment(&self, user_id: Uuid, checkin_id: Uuid, text: &str) -> AppResult<CheckinComment> {
        let text = validate_comment(text)?;
        ensure_active(&self.repository, user_id).await?;
        self.repository.checkins.get_by_id(checkin_id).await?;
        let comment = self.repository.checkins.add_comment(checkin_id, user_id, text).await?;
        tracing::debug!(comment_id = %comment.id, checkin_id = %checkin_id, "Comment added");
        Ok(comment)
    }

    pub async fn comments(&self, checkin_id: Uuid) -> AppResult<Vec<CheckinComment>> {
        self.repository.checkins.get_by_id(checkin_id).await?;
        self.repository.checkins.list_comments(checkin_id).await
    }

    /// Delete a comment; only its author may
    pub async fn delete_comment(&self, user_id: Uuid, checkin_id: Uuid, comment_id: Uuid) -> AppResult<()> {
        let comment = self.repository.checkins.get_comment(checkin_id, comment_id).await?;
        if comment.user.id != user_id {
            return Err(AppError::Authorization(
                "You can only delete your own comments".to_string(),
            ));
        }
        self.repository.checkins.delete_comment(comment_id).await
    }
}

/// Aggregates touched by the ratings a check-in carries
pub fn rating_jobs(checkin: &Checkin, event: &Event) -> Vec<RatingJob> {
    let mut jobs = Vec::with_capacity(2);
    if checkin.venue_rating.is_some() {
        jobs.push(RatingJob::Venue(event.venue_id));
    }
    if checkin.band_rating.is_some() {
        jobs.push(RatingJob::Band(event.band_id));
    }
    jobs
}

/// Trimmed comment text, rejecting blank or oversized input
pub fn validate_comment(text: &str) -> AppResult<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(venue_rating: Option<i32>, band_rating: Option<i32>) -> (Checkin, Event) {
        let now = chrono::Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            band_id: Uuid::new_v4(),
            event_date: now.date_naive(),
            event_name: None,
            description: None,
            is_verified: false,
            created_by_user_id: None,
            created_at: now,
            updated_at: now,
        };
        let checkin = Checkin {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            event_id: event.id,
            venue_rating,
            band_rating,
            review_text: None,
            image_urls: vec![],
            created_at: now,
            updated_at: now,
        };
        (checkin, event)
    }

    #[test]
    fn test_rating_jobs_follow_supplied_ratings() {
        let (checkin, event) = sample(None, None);
        assert!(rating_jobs(&checkin, &event).is_empty());

        let (checkin, event) = sample(Some(4), None);
        assert_eq!(rating_jobs(&checkin, &event), vec![RatingJob::Venue(event.venue_id)]);

        let (checkin, event) = sample(Some(2), Some(5));
        assert_eq!(
            rating_jobs(&checkin, &event),
            vec![RatingJob::Venue(event.venue_id), RatingJob::Band(event.band_id)]
        );
    }

    #[test]
    fn test_validate_comment() {
        assert_eq!(validate_comment("  great set!  ").unwrap(), "great set!");
        assert!(matches!(validate_comment(""), Err(AppError::Validation(_))));
        assert!(matches!(validate_comment(" \t\n "), Err(AppError::Validation(_))));
        assert!(validate_comment(&"a".repeat(MAX_COMMENT_LENGTH)).is_ok());
        assert!(validate_comment(&"a".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
    }
}
