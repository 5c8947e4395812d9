//! Root-view orchestration: loading, refreshing and game actions.
//!
//! # Design
//! `Dashboard` owns the `Api` and the `AppState`. Every side effect ends in an
//! `AppState::apply` call. The refresh strategy is pessimistic: after any
//! successful mutation the three collections are reloaded from the backend;
//! nothing is patched locally. A failed mutation records its message and
//! reloads nothing.

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::api::Api;
use crate::error::{ApiError, Result};
use crate::forms::{CreateForm, HorseForm, RaceForm, UserForm};
use crate::state::{Action, AppState, Snapshot};
use crate::transport::Transport;
use crate::types::{
    BreedHorsesRequest, Horse, Race, RaceResult, RestOutcome, StatType, TrainHorseRequest,
    TrainingOutcome, User,
};

pub struct Dashboard<T> {
    api: Api<T>,
    state: AppState,
}

impl<T: Transport> Dashboard<T> {
    pub fn new(api: Api<T>) -> Self {
        Self {
            api,
            state: AppState::new(),
        }
    }

    pub fn api(&self) -> &Api<T> {
        &self.api
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply a pure UI transition (tab switch, horse selection, cancel).
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.state.apply(action)
    }

    /// Fetch users, horses and races concurrently. The first failure fails the
    /// whole round and none of the three results is applied.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let ticket = self.state.begin_load();
        let users = self.api.users();
        let horses = self.api.horses();
        let races = self.api.races();

        match tokio::try_join!(users.list(), horses.list(), races.list()) {
            Ok((users, horses, races)) => {
                debug!(
                    users = users.len(),
                    horses = horses.len(),
                    races = races.len(),
                    "load complete"
                );
                self.state.apply(Action::LoadSucceeded(
                    ticket,
                    Snapshot {
                        users,
                        horses,
                        races,
                    },
                ));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "load failed");
                self.state.apply(Action::LoadFailed(ticket, err.to_string()));
                Err(err)
            }
        }
    }

    /// Reload after a successful mutation. A reload failure is already in the
    /// state's error slot, so it is only logged here.
    async fn refresh(&mut self) {
        if let Err(err) = self.load().await {
            debug!(error = %err, "refresh after mutation failed");
        }
    }

    fn action_failed(&mut self, err: &ApiError) {
        warn!(error = %err, "action failed");
        self.state.apply(Action::ActionFailed(err.to_string()));
    }

    /// Simulate a race, keep its ranked results for display, then reload.
    #[instrument(skip(self))]
    pub async fn simulate_race(&mut self, race_id: Uuid) -> Result<Vec<RaceResult>> {
        match self.api.game().simulate_race(race_id).await {
            Ok(results) => {
                self.state.apply(Action::RaceSimulated(results.clone()));
                self.refresh().await;
                Ok(results)
            }
            Err(err) => {
                self.action_failed(&err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn train_horse(
        &mut self,
        horse_id: Uuid,
        stat_type: StatType,
        points: i32,
    ) -> Result<TrainingOutcome> {
        let request = TrainHorseRequest { stat_type, points };
        match self.api.game().train_horse(horse_id, &request).await {
            Ok(outcome) => {
                self.refresh().await;
                Ok(outcome)
            }
            Err(err) => {
                self.action_failed(&err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn rest_horse(&mut self, horse_id: Uuid) -> Result<RestOutcome> {
        match self.api.game().rest_horse(horse_id).await {
            Ok(outcome) => {
                self.refresh().await;
                Ok(outcome)
            }
            Err(err) => {
                self.action_failed(&err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn breed_horses(&mut self, request: BreedHorsesRequest) -> Result<Horse> {
        match self.api.game().breed_horses(&request).await {
            Ok(foal) => {
                self.refresh().await;
                Ok(foal)
            }
            Err(err) => {
                self.action_failed(&err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&mut self, id: Uuid) -> Result<()> {
        let outcome = self.api.users().delete(id).await;
        self.after_delete(outcome).await
    }

    #[instrument(skip(self))]
    pub async fn delete_horse(&mut self, id: Uuid) -> Result<()> {
        let outcome = self.api.horses().delete(id).await;
        self.after_delete(outcome).await
    }

    #[instrument(skip(self))]
    pub async fn delete_race(&mut self, id: Uuid) -> Result<()> {
        let outcome = self.api.races().delete(id).await;
        self.after_delete(outcome).await
    }

    async fn after_delete(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                self.action_failed(&err);
                Err(err)
            }
        }
    }

    /// Submit the user form. `None` means the form was gated or the create
    /// failed; the form's status says which.
    #[instrument(skip(self, form))]
    pub async fn submit_user(&mut self, form: &mut UserForm) -> Option<User> {
        let request = form.begin_submit()?;
        match self.api.users().create(&request).await {
            Ok(user) => {
                form.submit_succeeded();
                self.refresh().await;
                Some(user)
            }
            Err(err) => {
                form.submit_failed(err.to_string());
                None
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn submit_horse(&mut self, form: &mut HorseForm) -> Option<Horse> {
        let request = form.begin_submit()?;
        match self.api.horses().create(&request).await {
            Ok(horse) => {
                form.submit_succeeded();
                self.refresh().await;
                Some(horse)
            }
            Err(err) => {
                form.submit_failed(err.to_string());
                None
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn submit_race(&mut self, form: &mut RaceForm) -> Option<Race> {
        let request = form.begin_submit()?;
        match self.api.races().create(&request).await {
            Ok(race) => {
                form.submit_succeeded();
                self.refresh().await;
                Some(race)
            }
            Err(err) => {
                form.submit_failed(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::client::PaddockClient;
    use crate::forms::FormStatus;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::state::Tab;

    const BASE: &str = "http://backend/api/v1";

    const ALICE: &str = r#"{"id":"00000000-0000-0000-0000-000000000001","username":"alice","createdAt":"2025-03-01T09:30:00Z"}"#;
    const BOB: &str = r#"{"id":"00000000-0000-0000-0000-000000000002","username":"bob","createdAt":"2025-03-01T09:30:00Z"}"#;
    const HORSE_ID: &str = "00000000-0000-0000-0000-0000000000a1";
    const RACE_ID: &str = "00000000-0000-0000-0000-0000000000b1";

    fn horse(speed: i32) -> String {
        format!(
            r#"{{"id":"{HORSE_ID}","name":"Comet","owner":{ALICE},"speed":{speed},"trainingPoints":4,"createdAt":"2025-03-01T09:30:00Z"}}"#
        )
    }

    fn race() -> String {
        format!(
            r#"{{"id":"{RACE_ID}","name":"Derby","scheduledAt":"2025-05-01T12:00:00Z","createdAt":"2025-03-01T09:30:00Z"}}"#
        )
    }

    fn result(position: u32) -> String {
        format!(
            r#"{{"id":"{}","race":{},"horse":{},"position":{position},"earnings":100,"raceTime":118.2,"performanceScore":61.5,"createdAt":"2025-05-01T12:05:00Z"}}"#,
            Uuid::new_v4(),
            race(),
            horse(50)
        )
    }

    /// Canned backend keyed by "METHOD path"; records every request.
    #[derive(Default)]
    struct FakeBackend {
        routes: Mutex<HashMap<String, HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeBackend {
        fn route(&self, method: HttpMethod, path: &str, status: u16, body: impl Into<String>) {
            self.routes
                .lock()
                .unwrap()
                .insert(format!("{method} {BASE}{path}"), HttpResponse::new(status, body));
        }

        fn requests(&self) -> Vec<(HttpMethod, String)> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| (r.method, r.path.trim_start_matches(BASE).to_string()))
                .collect()
        }

        fn clear_requests(&self) {
            self.requests.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl Transport for FakeBackend {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            let key = format!("{} {}", request.method, request.path);
            self.requests.lock().unwrap().push(request);
            let response = self.routes.lock().unwrap().get(&key).cloned();
            Ok(response.unwrap_or_else(|| HttpResponse::new(404, "no route")))
        }
    }

    fn seeded() -> Arc<FakeBackend> {
        let backend = Arc::new(FakeBackend::default());
        backend.route(HttpMethod::Get, "/users", 200, format!("[{ALICE}]"));
        backend.route(HttpMethod::Get, "/horses", 200, format!("[{}]", horse(50)));
        backend.route(HttpMethod::Get, "/races", 200, format!("[{}]", race()));
        backend
    }

    fn dashboard(backend: &Arc<FakeBackend>) -> Dashboard<Arc<FakeBackend>> {
        Dashboard::new(Api::new(PaddockClient::new(BASE), Arc::clone(backend)))
    }

    fn list_calls() -> Vec<(HttpMethod, String)> {
        vec![
            (HttpMethod::Get, "/users".to_string()),
            (HttpMethod::Get, "/horses".to_string()),
            (HttpMethod::Get, "/races".to_string()),
        ]
    }

    fn sorted(mut calls: Vec<(HttpMethod, String)>) -> Vec<String> {
        calls.sort_by(|a, b| a.1.cmp(&b.1));
        calls.into_iter().map(|(m, p)| format!("{m} {p}")).collect()
    }

    #[tokio::test]
    async fn load_fills_all_three_collections() {
        let backend = seeded();
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();

        let state = dash.state();
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(state.users().len(), 1);
        assert_eq!(state.users()[0].username, "alice");
        assert_eq!(state.horses()[0].name, "Comet");
        assert_eq!(state.races()[0].name, "Derby");
        assert_eq!(sorted(backend.requests()), sorted(list_calls()));
    }

    #[tokio::test]
    async fn one_failed_list_applies_nothing() {
        let backend = seeded();
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();

        backend.route(HttpMethod::Get, "/users", 200, format!("[{ALICE},{BOB}]"));
        backend.route(HttpMethod::Get, "/races", 500, "database down");
        let err = dash.load().await.unwrap_err();

        let state = dash.state();
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some(err.to_string().as_str()));
        assert_eq!(state.error(), Some("HTTP 500: database down"));
        assert_eq!(state.users().len(), 1, "users from the failed round must not apply");
    }

    #[tokio::test]
    async fn first_load_failure_leaves_collections_empty() {
        let backend = seeded();
        backend.route(HttpMethod::Get, "/horses", 503, "");
        let mut dash = dashboard(&backend);
        assert!(dash.load().await.is_err());
        assert!(dash.state().users().is_empty());
        assert!(dash.state().horses().is_empty());
        assert!(dash.state().error().unwrap().starts_with("HTTP 503"));
    }

    #[tokio::test]
    async fn created_user_appears_after_reload() {
        let backend = seeded();
        backend.route(HttpMethod::Post, "/users", 201, BOB);
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();

        // The backend now lists bob too.
        backend.route(HttpMethod::Get, "/users", 200, format!("[{ALICE},{BOB}]"));
        let mut form = UserForm::new("bob");
        let created = dash.submit_user(&mut form).await.unwrap();

        assert_eq!(created.username, "bob");
        assert!(form.username.is_empty());
        assert!(dash.state().users().iter().any(|u| u.username == "bob"));
    }

    #[tokio::test]
    async fn horse_form_without_owner_sends_nothing() {
        let backend = seeded();
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();
        backend.clear_requests();

        let mut form = HorseForm::new("Comet II");
        assert!(dash.submit_horse(&mut form).await.is_none());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn horse_form_submits_once_then_reloads_once() {
        let backend = seeded();
        backend.route(HttpMethod::Post, "/horses", 201, horse(50));
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();
        backend.clear_requests();

        let mut form = HorseForm::new("Comet");
        let owner = dash.state().users()[0].id;
        assert!(form.select_owner(dash.state().users(), owner));
        assert!(dash.submit_horse(&mut form).await.is_some());

        let calls = backend.requests();
        assert_eq!(calls[0], (HttpMethod::Post, "/horses".to_string()));
        assert_eq!(sorted(calls[1..].to_vec()), sorted(list_calls()));
        assert_eq!(calls.len(), 4);
    }

    #[tokio::test]
    async fn failed_create_keeps_form_and_skips_reload() {
        let backend = seeded();
        backend.route(HttpMethod::Post, "/users", 400, "username taken");
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();
        backend.clear_requests();

        let mut form = UserForm::new("alice");
        assert!(dash.submit_user(&mut form).await.is_none());
        assert_eq!(form.username, "alice");
        assert_eq!(
            form.status(),
            &FormStatus::Failed("HTTP 400: username taken".to_string())
        );
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn simulate_stores_results_and_standings_are_ranked() {
        let backend = seeded();
        backend.route(
            HttpMethod::Post,
            &format!("/game/races/{RACE_ID}/simulate"),
            200,
            format!("[{},{},{}]", result(3), result(1), result(2)),
        );
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();
        backend.clear_requests();

        let race_id: Uuid = RACE_ID.parse().unwrap();
        let results = dash.simulate_race(race_id).await.unwrap();
        assert_eq!(results.len(), 3);

        let positions: Vec<u32> = dash.state().standings().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        // one simulate + one full reload
        assert_eq!(backend.requests().len(), 4);
    }

    #[tokio::test]
    async fn failed_training_keeps_selected_horse_and_skips_reload() {
        let backend = seeded();
        let horse_id: Uuid = HORSE_ID.parse().unwrap();
        backend.route(
            HttpMethod::Post,
            &format!("/game/horses/{horse_id}/train"),
            404,
            "horse not found",
        );
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();
        dash.dispatch(Action::SelectTab(Tab::Training));
        assert!(dash.dispatch(Action::SelectHorse(horse_id)));

        // Even if the backend changed, no reload may pick it up.
        backend.route(HttpMethod::Get, "/horses", 200, format!("[{}]", horse(99)));
        backend.clear_requests();

        let err = dash
            .train_horse(horse_id, StatType::Speed, 2)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(dash.state().selected_horse().unwrap().speed, 50);
        assert_eq!(dash.state().error(), Some("HTTP 404: horse not found"));
    }

    #[tokio::test]
    async fn successful_training_reloads_selected_horse() {
        let backend = seeded();
        let horse_id: Uuid = HORSE_ID.parse().unwrap();
        backend.route(
            HttpMethod::Post,
            &format!("/game/horses/{horse_id}/train"),
            200,
            r#"{"success":true,"message":"Training successful!"}"#,
        );
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();
        dash.dispatch(Action::SelectHorse(horse_id));

        backend.route(HttpMethod::Get, "/horses", 200, format!("[{}]", horse(52)));
        let outcome = dash.train_horse(horse_id, StatType::Speed, 2).await.unwrap();
        assert!(outcome.success);
        assert_eq!(dash.state().selected_horse().unwrap().speed, 52);
    }

    #[tokio::test]
    async fn rest_reloads_even_when_reload_then_fails() {
        let backend = seeded();
        let horse_id: Uuid = HORSE_ID.parse().unwrap();
        backend.route(
            HttpMethod::Post,
            &format!("/game/horses/{horse_id}/rest"),
            200,
            r#"{"success":true,"message":"Horse rested and recovered!","trainingPointsGained":3}"#,
        );
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();

        backend.route(HttpMethod::Get, "/races", 500, "");
        let outcome = dash.rest_horse(horse_id).await.unwrap();
        assert_eq!(outcome.training_points_gained, 3);
        assert!(dash.state().error().unwrap().starts_with("HTTP 500"));
        assert_eq!(dash.state().horses().len(), 1);
    }

    #[tokio::test]
    async fn list_twice_is_stable() {
        let backend = seeded();
        let dash = dashboard(&backend);
        let first = dash.api().horses().list().await.unwrap();
        let second = dash.api().horses().list().await.unwrap();
        assert_eq!(first, second);
    }

    /// Records each new span's name and field names.
    #[derive(Clone, Default)]
    struct SpanLog(Arc<Mutex<Vec<(String, Vec<String>)>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanLog {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _: &tracing::span::Id,
            _: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let meta = attrs.metadata();
            let fields = meta.fields().iter().map(|f| f.name().to_string()).collect();
            self.0.lock().unwrap().push((meta.name().to_string(), fields));
        }
    }

    #[tokio::test]
    async fn form_submissions_open_spans_without_form_fields() {
        use tracing_subscriber::layer::SubscriberExt;

        let log = SpanLog::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));

        let backend = seeded();
        backend.route(HttpMethod::Post, "/users", 201, BOB);
        backend.route(HttpMethod::Post, "/horses", 201, horse(50));
        backend.route(HttpMethod::Post, "/races", 201, race());
        let mut dash = dashboard(&backend);
        dash.load().await.unwrap();

        let mut user = UserForm::new("bob");
        assert!(dash.submit_user(&mut user).await.is_some());
        let mut horse_form = HorseForm::new("Comet");
        let owner = dash.state().users()[0].id;
        assert!(horse_form.select_owner(dash.state().users(), owner));
        assert!(dash.submit_horse(&mut horse_form).await.is_some());
        let utc = chrono::FixedOffset::east_opt(0).unwrap();
        let mut race_form = RaceForm::with_offset("Derby", "2025-05-01T12:00", utc);
        assert!(dash.submit_race(&mut race_form).await.is_some());

        let spans = log.0.lock().unwrap().clone();
        for name in ["submit_user", "submit_horse", "submit_race"] {
            let (_, fields) = spans
                .iter()
                .find(|(span, _)| span == name)
                .unwrap_or_else(|| panic!("no {name} span in {spans:?}"));
            assert!(!fields.iter().any(|f| f == "form"));
        }
    }
}
