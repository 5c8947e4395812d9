//! Creation forms as small state machines.
//!
//! # Design
//! A form owns its input fields and a `FormStatus`. The submit handler calls
//! [`CreateForm::begin_submit`], which is the only gate: it refuses while a
//! required field is empty or while a submission is already in flight, so a
//! double invocation can never issue two creates. The dashboard performs the
//! network call and reports back through `submit_succeeded` /
//! `submit_failed`.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use uuid::Uuid;

use crate::types::{CreateHorseRequest, CreateRaceRequest, CreateUserRequest, User};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Failed(String),
}

impl FormStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, FormStatus::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FormStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

pub trait CreateForm {
    type Request;

    fn status(&self) -> &FormStatus;

    fn status_mut(&mut self) -> &mut FormStatus;

    fn has_required_fields(&self) -> bool;

    /// Turn the fields into a request payload. An `Err` message fails the
    /// form without contacting the backend.
    fn build_request(&self) -> Result<Self::Request, String>;

    fn clear_fields(&mut self);

    fn can_submit(&self) -> bool {
        self.has_required_fields() && !self.status().is_submitting()
    }

    /// Enter `Submitting` and hand out the payload, or `None` if the form is
    /// gated.
    fn begin_submit(&mut self) -> Option<Self::Request> {
        if !self.can_submit() {
            return None;
        }
        match self.build_request() {
            Ok(request) => {
                *self.status_mut() = FormStatus::Submitting;
                Some(request)
            }
            Err(message) => {
                *self.status_mut() = FormStatus::Failed(message);
                None
            }
        }
    }

    fn submit_succeeded(&mut self) {
        self.clear_fields();
        *self.status_mut() = FormStatus::Idle;
    }

    /// Keep the fields so the user can correct and resubmit.
    fn submit_failed(&mut self, message: String) {
        *self.status_mut() = FormStatus::Failed(message);
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub username: String,
    status: FormStatus,
}

impl UserForm {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            status: FormStatus::Idle,
        }
    }
}

impl CreateForm for UserForm {
    type Request = CreateUserRequest;

    fn status(&self) -> &FormStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut FormStatus {
        &mut self.status
    }

    fn has_required_fields(&self) -> bool {
        !self.username.is_empty()
    }

    fn build_request(&self) -> Result<CreateUserRequest, String> {
        Ok(CreateUserRequest {
            username: self.username.clone(),
        })
    }

    fn clear_fields(&mut self) {
        self.username.clear();
    }
}

/// The owner must come from the loaded user collection; there is no search.
#[derive(Debug, Clone, Default)]
pub struct HorseForm {
    pub name: String,
    owner_id: Option<Uuid>,
    pub sire_id: Option<Uuid>,
    pub dam_id: Option<Uuid>,
    status: FormStatus,
}

impl HorseForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        self.owner_id
    }

    /// Select an owner from `users`. Returns `false` and leaves the current
    /// selection alone when `id` is not one of them.
    pub fn select_owner(&mut self, users: &[User], id: Uuid) -> bool {
        if !users.iter().any(|u| u.id == id) {
            return false;
        }
        self.owner_id = Some(id);
        true
    }

    pub fn clear_owner(&mut self) {
        self.owner_id = None;
    }
}

impl CreateForm for HorseForm {
    type Request = CreateHorseRequest;

    fn status(&self) -> &FormStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut FormStatus {
        &mut self.status
    }

    fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && self.owner_id.is_some()
    }

    fn build_request(&self) -> Result<CreateHorseRequest, String> {
        let owner_id = self.owner_id.ok_or_else(|| "select an owner".to_string())?;
        Ok(CreateHorseRequest {
            name: self.name.clone(),
            owner_id,
            sire_id: self.sire_id,
            dam_id: self.dam_id,
        })
    }

    fn clear_fields(&mut self) {
        self.name.clear();
        self.owner_id = None;
        self.sire_id = None;
        self.dam_id = None;
    }
}

/// `scheduled_at` holds wall-clock input (`YYYY-MM-DDTHH:MM`, seconds
/// optional). It is read in the pinned offset when one is set, otherwise in
/// the host's zone as of the scheduled date.
#[derive(Debug, Clone)]
pub struct RaceForm {
    pub name: String,
    pub scheduled_at: String,
    offset: Option<FixedOffset>,
    status: FormStatus,
}

impl Default for RaceForm {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl RaceForm {
    /// Form interpreting times in the host's local zone.
    pub fn new(name: impl Into<String>, scheduled_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheduled_at: scheduled_at.into(),
            offset: None,
            status: FormStatus::Idle,
        }
    }

    pub fn with_offset(
        name: impl Into<String>,
        scheduled_at: impl Into<String>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            offset: Some(offset),
            ..Self::new(name, scheduled_at)
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }
}

impl CreateForm for RaceForm {
    type Request = CreateRaceRequest;

    fn status(&self) -> &FormStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut FormStatus {
        &mut self.status
    }

    fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.scheduled_at.is_empty()
    }

    fn build_request(&self) -> Result<CreateRaceRequest, String> {
        let at = local_to_instant(&self.scheduled_at, self.offset)?;
        Ok(CreateRaceRequest::new(self.name.clone(), at))
    }

    fn clear_fields(&mut self) {
        self.name.clear();
        self.scheduled_at.clear();
    }
}

/// Convert wall-clock input to an absolute instant, in `offset` when given
/// and in the host's local zone otherwise.
pub fn local_to_instant(
    input: &str,
    offset: Option<FixedOffset>,
) -> Result<DateTime<Utc>, String> {
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("invalid scheduled time {input:?}: {e}"))?;
    Ok(match offset {
        Some(offset) => resolve_wall_clock(&offset, naive),
        None => resolve_wall_clock(&Local, naive),
    })
}

/// Resolve a wall-clock time in `tz` using the offset in force on that date.
///
/// A time repeated by a backward transition takes the earlier instant. A time
/// skipped by a forward transition is read with the offset in force before
/// the gap, which lands it past the gap by the gap's length.
pub fn resolve_wall_clock<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at.with_timezone(&Utc),
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
                .fix();
            (naive - before).and_utc()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn user_form_gates_on_empty_username() {
        let mut form = UserForm::default();
        assert!(!form.can_submit());
        assert!(form.begin_submit().is_none());
        assert_eq!(form.status(), &FormStatus::Idle);
    }

    #[test]
    fn in_flight_submission_blocks_second_submit() {
        let mut form = UserForm::new("alice");
        let request = form.begin_submit().unwrap();
        assert_eq!(request.username, "alice");
        assert!(form.status().is_submitting());
        assert!(form.begin_submit().is_none());
    }

    #[test]
    fn success_clears_fields_and_failure_keeps_them() {
        let mut form = UserForm::new("alice");
        form.begin_submit();
        form.submit_failed("HTTP 400: ".to_string());
        assert_eq!(form.username, "alice");
        assert_eq!(form.status().error(), Some("HTTP 400: "));

        // Resubmitting clears the previous error.
        form.begin_submit();
        assert_eq!(form.status(), &FormStatus::Submitting);
        form.submit_succeeded();
        assert!(form.username.is_empty());
        assert_eq!(form.status(), &FormStatus::Idle);
    }

    #[test]
    fn horse_form_requires_owner_from_loaded_users() {
        let users = vec![alice()];
        let mut form = HorseForm::new("Comet");
        assert!(!form.can_submit());
        assert!(form.begin_submit().is_none());

        assert!(!form.select_owner(&users, Uuid::new_v4()));
        assert_eq!(form.owner_id(), None);

        assert!(form.select_owner(&users, users[0].id));
        let request = form.begin_submit().unwrap();
        assert_eq!(request.owner_id, users[0].id);
        assert_eq!(request.name, "Comet");

        form.submit_succeeded();
        assert!(form.name.is_empty());
        assert_eq!(form.owner_id(), None);
    }

    #[test]
    fn race_form_converts_local_time_to_instant() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let mut form = RaceForm::with_offset("Spring Cup", "2025-04-06T15:40", tokyo);
        let request = form.begin_submit().unwrap();
        assert_eq!(
            request.scheduled_at,
            Utc.with_ymd_and_hms(2025, 4, 6, 6, 40, 0).unwrap()
        );
    }

    #[test]
    fn race_form_accepts_seconds() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let at = local_to_instant("2025-04-06T15:40:30", Some(utc)).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 4, 6, 15, 40, 30).unwrap());
    }

    #[test]
    fn race_form_rejects_garbage_without_submitting() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let mut form = RaceForm::with_offset("Spring Cup", "next tuesday", utc);
        assert!(form.begin_submit().is_none());
        assert!(form.status().error().unwrap().contains("invalid scheduled time"));
        assert_eq!(form.name, "Spring Cup");
    }

    /// US Eastern for 2026: EDT from 03-08 07:00Z until 11-01 06:00Z.
    #[derive(Debug, Clone, Copy)]
    struct NewYork2026;

    impl NewYork2026 {
        fn edt() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn est() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }
    }

    impl TimeZone for NewYork2026 {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            NewYork2026
        }

        fn offset_from_local_date(&self, local: &chrono::NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let fits = |offset: FixedOffset| self.offset_from_utc_datetime(&(*local - offset)) == offset;
            match (fits(Self::edt()), fits(Self::est())) {
                (true, true) => LocalResult::Ambiguous(Self::edt(), Self::est()),
                (true, false) => LocalResult::Single(Self::edt()),
                (false, true) => LocalResult::Single(Self::est()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &chrono::NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let start = Utc.with_ymd_and_hms(2026, 3, 8, 7, 0, 0).unwrap().naive_utc();
            let end = Utc.with_ymd_and_hms(2026, 11, 1, 6, 0, 0).unwrap().naive_utc();
            if (start..end).contains(utc) {
                Self::edt()
            } else {
                Self::est()
            }
        }
    }

    fn wall(input: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn wall_clock_uses_offset_of_scheduled_date() {
        // Winter and summer noon resolve with their own offsets, whatever
        // the offset is today.
        assert_eq!(
            resolve_wall_clock(&NewYork2026, wall("2026-12-01T12:00")),
            Utc.with_ymd_and_hms(2026, 12, 1, 17, 0, 0).unwrap()
        );
        assert_eq!(
            resolve_wall_clock(&NewYork2026, wall("2026-07-01T12:00")),
            Utc.with_ymd_and_hms(2026, 7, 1, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn repeated_wall_clock_takes_earlier_instant() {
        assert_eq!(
            resolve_wall_clock(&NewYork2026, wall("2026-11-01T01:30")),
            Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap()
        );
    }

    #[test]
    fn skipped_wall_clock_moves_forward() {
        // 02:30 does not exist on 03-08; it becomes 03:30 EDT.
        assert_eq!(
            resolve_wall_clock(&NewYork2026, wall("2026-03-08T02:30")),
            Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap()
        );
    }

    #[test]
    fn unpinned_race_form_follows_local_zone() {
        let mut form = RaceForm::new("Winter Cup", "2026-12-01T12:00");
        assert_eq!(form.offset(), None);
        let request = form.begin_submit().unwrap();
        assert_eq!(
            request.scheduled_at,
            resolve_wall_clock(&Local, wall("2026-12-01T12:00"))
        );
    }
}
