// Request desk service - the lifecycle of a member request.
//
// This service handles:
// - Validating and filing submissions (limits, cooldowns, categories)
// - Status transitions: open -> claimed -> closed, closed -> open
// - Who may perform which transition
// - Aggregate counts for the HTTP side channel
//
// NO Discord dependencies here - just pure domain logic.

use super::request_models::{
    Actor, DeskRequest, NewRequest, RequestAction, RequestStatus, RequestSummary, Submission,
    MAX_DETAILS_LEN, MAX_SUBJECT_LEN,
};
use super::request_store::RequestStore;
use crate::core::settings::{GuildSettings, MAX_SUBMISSION_COOLDOWN_SECS};
use crate::core::store_error::StoreError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Requests are not set up on this server yet")]
    NoReviewChannel,

    #[error("Unknown category `{0}`")]
    UnknownCategory(String),

    #[error("{field} {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("You already have {limit} open request(s)")]
    TooManyOpen { limit: u32 },

    #[error("Please wait {remaining_secs}s before submitting again")]
    OnCooldown { remaining_secs: i64 },

    #[error("Request #{0} does not exist")]
    NotFound(u64),

    #[error("You are not allowed to {0} this request")]
    NotPermitted(RequestAction),

    #[error("Cannot {action} a request that is {from}")]
    InvalidTransition {
        from: RequestStatus,
        action: RequestAction,
    },
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct RequestService<S: RequestStore> {
    store: Arc<S>,
    // (guild_id, user_id) -> time of the last accepted submission
    last_submission: DashMap<(u64, u64), DateTime<Utc>>,
    // Serialises check-then-write sequences (limits, transitions).
    write_lock: Mutex<()>,
}

impl<S: RequestStore> RequestService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            last_submission: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn submit(
        &self,
        settings: &GuildSettings,
        submission: Submission,
    ) -> Result<DeskRequest, RequestError> {
        self.submit_at(settings, submission, Utc::now()).await
    }

    /// File a submission as of `now`.
    ///
    /// Checks, in order: review channel configured, category known, fields
    /// valid, cooldown elapsed, member under the open-request limit.
    pub async fn submit_at(
        &self,
        settings: &GuildSettings,
        submission: Submission,
        now: DateTime<Utc>,
    ) -> Result<DeskRequest, RequestError> {
        if settings.review_channel_id.is_none() {
            return Err(RequestError::NoReviewChannel);
        }

        let category_key = submission.category_key.trim().to_lowercase();
        if settings.category(&category_key).is_none() {
            return Err(RequestError::UnknownCategory(category_key));
        }

        let subject = validate_field("Subject", &submission.subject, MAX_SUBJECT_LEN)?;
        let details = validate_field("Details", &submission.details, MAX_DETAILS_LEN)?;

        let guild_id = settings.guild_id;
        let author_id = submission.author_id;

        let _guard = self.write_lock.lock().await;

        if settings.submission_cooldown_secs > 0 {
            if let Some(last) = self.last_submission.get(&(guild_id, author_id)) {
                let ready_at = *last + Duration::seconds(settings.submission_cooldown_secs as i64);
                if now < ready_at {
                    return Err(RequestError::OnCooldown {
                        remaining_secs: (ready_at - now).num_seconds().max(1),
                    });
                }
            }
        }

        if settings.max_open_per_user > 0 {
            let active = self
                .store
                .list_requests(guild_id)
                .await?
                .iter()
                .filter(|r| r.author_id == author_id && r.status.is_active())
                .count();
            if active >= settings.max_open_per_user as usize {
                return Err(RequestError::TooManyOpen {
                    limit: settings.max_open_per_user,
                });
            }
        }

        let request = self
            .store
            .insert_request(NewRequest {
                guild_id,
                author_id,
                category_key,
                subject,
                details,
                created_at: now,
            })
            .await?;

        self.record_submission(guild_id, author_id, settings.submission_cooldown_secs, now);

        tracing::info!(
            guild_id,
            author_id,
            number = request.number,
            category = %request.category_key,
            "Request filed"
        );

        Ok(request)
    }

    /// Remember `now` for the cooldown and drop entries whose cooldown has
    /// run out. Other guilds' entries are kept for the longest allowed cooldown.
    fn record_submission(
        &self,
        guild_id: u64,
        author_id: u64,
        cooldown_secs: u64,
        now: DateTime<Utc>,
    ) {
        self.last_submission.retain(|&(guild, _), last| {
            let window = if guild == guild_id {
                cooldown_secs
            } else {
                MAX_SUBMISSION_COOLDOWN_SECS
            };
            now - *last < Duration::seconds(window as i64)
        });

        if cooldown_secs > 0 {
            self.last_submission.insert((guild_id, author_id), now);
        }
    }

    /// Staff take ownership of an open request.
    pub async fn claim(
        &self,
        guild_id: u64,
        number: u64,
        actor: Actor,
    ) -> Result<DeskRequest, RequestError> {
        self.transition(guild_id, number, actor, RequestAction::Claim)
            .await
    }

    /// Staff or the author close a request that is not closed yet.
    pub async fn close(
        &self,
        guild_id: u64,
        number: u64,
        actor: Actor,
    ) -> Result<DeskRequest, RequestError> {
        self.transition(guild_id, number, actor, RequestAction::Close)
            .await
    }

    /// Staff reopen a closed request. The previous claim is dropped.
    pub async fn reopen(
        &self,
        guild_id: u64,
        number: u64,
        actor: Actor,
    ) -> Result<DeskRequest, RequestError> {
        self.transition(guild_id, number, actor, RequestAction::Reopen)
            .await
    }

    async fn transition(
        &self,
        guild_id: u64,
        number: u64,
        actor: Actor,
        action: RequestAction,
    ) -> Result<DeskRequest, RequestError> {
        let _guard = self.write_lock.lock().await;

        let mut request = self
            .store
            .get_request(guild_id, number)
            .await?
            .ok_or(RequestError::NotFound(number))?;

        apply_action(&mut request, actor, action, Utc::now())?;
        self.store.save_request(request.clone()).await?;

        tracing::info!(
            guild_id,
            number,
            actor = actor.user_id,
            %action,
            status = %request.status,
            "Request updated"
        );

        Ok(request)
    }

    /// Remember where the review embed for a request was posted.
    pub async fn attach_review_message(
        &self,
        guild_id: u64,
        number: u64,
        channel_id: u64,
        message_id: u64,
    ) -> Result<(), RequestError> {
        let _guard = self.write_lock.lock().await;

        let mut request = self
            .store
            .get_request(guild_id, number)
            .await?
            .ok_or(RequestError::NotFound(number))?;
        request.review_channel_id = Some(channel_id);
        request.review_message_id = Some(message_id);
        self.store.save_request(request).await?;
        Ok(())
    }

    pub async fn get(&self, guild_id: u64, number: u64) -> Result<DeskRequest, RequestError> {
        self.store
            .get_request(guild_id, number)
            .await?
            .ok_or(RequestError::NotFound(number))
    }

    /// Requests of a guild, newest first, optionally filtered by status.
    pub async fn list(
        &self,
        guild_id: u64,
        status: Option<RequestStatus>,
    ) -> Result<Vec<DeskRequest>, RequestError> {
        let mut requests: Vec<DeskRequest> = self
            .store
            .list_requests(guild_id)
            .await?
            .into_iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        requests.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(requests)
    }

    pub async fn summary(&self) -> Result<RequestSummary, RequestError> {
        let requests = self.store.all_requests().await?;
        let guilds: HashSet<u64> = requests.iter().map(|r| r.guild_id).collect();

        let mut summary = RequestSummary {
            guilds: guilds.len(),
            total: requests.len(),
            ..Default::default()
        };
        for request in &requests {
            match request.status {
                RequestStatus::Open => summary.open += 1,
                RequestStatus::Claimed => summary.claimed += 1,
                RequestStatus::Closed => summary.closed += 1,
            }
        }
        Ok(summary)
    }
}

/// Apply a status change in place after checking permissions and the current state.
pub fn apply_action(
    request: &mut DeskRequest,
    actor: Actor,
    action: RequestAction,
    now: DateTime<Utc>,
) -> Result<(), RequestError> {
    let allowed = match action {
        RequestAction::Claim | RequestAction::Reopen => actor.is_staff,
        RequestAction::Close => actor.is_staff || actor.user_id == request.author_id,
    };
    if !allowed {
        return Err(RequestError::NotPermitted(action));
    }

    let invalid = RequestError::InvalidTransition {
        from: request.status,
        action,
    };

    match (action, request.status) {
        (RequestAction::Claim, RequestStatus::Open) => {
            request.status = RequestStatus::Claimed;
            request.claimed_by = Some(actor.user_id);
        }
        (RequestAction::Close, RequestStatus::Open | RequestStatus::Claimed) => {
            request.status = RequestStatus::Closed;
            request.closed_by = Some(actor.user_id);
        }
        (RequestAction::Reopen, RequestStatus::Closed) => {
            request.status = RequestStatus::Open;
            request.claimed_by = None;
            request.closed_by = None;
        }
        _ => return Err(invalid),
    }

    request.updated_at = now;
    Ok(())
}

fn validate_field(field: &'static str, raw: &str, max: usize) -> Result<String, RequestError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RequestError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(RequestError::InvalidField {
            field,
            reason: format!("must be at most {max} characters"),
        });
    }
    Ok(value.to_string())
}
