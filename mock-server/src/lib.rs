//! In-memory stand-in for the paddock REST backend.
//!
//! Serves every `/api/v1` route the client uses. Game endpoints behave
//! deterministically (no randomness) so tests can assert exact outcomes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub mod game;

pub const API_PREFIX: &str = "/api/v1";

/// Stats and balances a freshly registered horse starts with.
const STARTING_STAT: i32 = 50;
const STARTING_TRAINING_POINTS: i32 = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A horse as stored: owner and parents by id.
#[derive(Clone, Debug)]
pub struct HorseRecord {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub speed: i32,
    pub stamina: i32,
    pub power: i32,
    pub guts: i32,
    pub intelligence: i32,
    pub level: i32,
    pub experience: i32,
    pub training_points: i32,
    pub races_won: i32,
    pub races_run: i32,
    pub total_earnings: i64,
    pub sire_id: Option<Uuid>,
    pub dam_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl HorseRecord {
    pub fn new(name: String, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            owner_id,
            speed: STARTING_STAT,
            stamina: STARTING_STAT,
            power: STARTING_STAT,
            guts: STARTING_STAT,
            intelligence: STARTING_STAT,
            level: 1,
            experience: 0,
            training_points: STARTING_TRAINING_POINTS,
            races_won: 0,
            races_run: 0,
            total_earnings: 0,
            sire_id: None,
            dam_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn total_stats(&self) -> i32 {
        self.speed + self.stamina + self.power + self.guts + self.intelligence
    }
}

/// A horse as served: owner and parents embedded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Horse {
    pub id: Uuid,
    pub name: String,
    pub owner: User,
    pub speed: i32,
    pub stamina: i32,
    pub power: i32,
    pub guts: i32,
    pub intelligence: i32,
    pub level: i32,
    pub experience: i32,
    pub training_points: i32,
    pub races_won: i32,
    pub races_run: i32,
    pub total_earnings: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sire: Option<Box<Horse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dam: Option<Box<Horse>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: Uuid,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub base_prize: i32,
    pub min_level: i32,
    pub max_level: i32,
    pub max_participants: i32,
    pub race_type: String,
    pub distance: i32,
    pub track_condition: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub id: Uuid,
    pub race: Race,
    pub horse: Horse,
    pub position: u32,
    pub earnings: i64,
    pub race_time: f64,
    pub performance_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UserInput {
    pub username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorseInput {
    pub name: String,
    pub owner_id: Uuid,
    pub sire_id: Option<Uuid>,
    pub dam_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceInput {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub base_prize: Option<i32>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    pub max_participants: Option<i32>,
    pub race_type: Option<String>,
    pub distance: Option<i32>,
    pub track_condition: Option<String>,
}

/// Everything the server knows, in insertion order.
#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub horses: Vec<HorseRecord>,
    pub races: Vec<Race>,
    pub results: Vec<RaceResult>,
}

impl Store {
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn horse(&self, id: Uuid) -> Option<&HorseRecord> {
        self.horses.iter().find(|h| h.id == id)
    }

    pub fn horse_mut(&mut self, id: Uuid) -> Option<&mut HorseRecord> {
        self.horses.iter_mut().find(|h| h.id == id)
    }

    pub fn race(&self, id: Uuid) -> Option<&Race> {
        self.races.iter().find(|r| r.id == id)
    }

    /// Embed owner and pedigree into a servable `Horse`.
    pub fn render_horse(&self, record: &HorseRecord) -> Result<Horse, Rejection> {
        let owner = self
            .user(record.owner_id)
            .cloned()
            .ok_or_else(|| Rejection::internal("horse owner missing"))?;
        let sire = self.render_parent(record.sire_id)?;
        let dam = self.render_parent(record.dam_id)?;
        Ok(Horse {
            id: record.id,
            name: record.name.clone(),
            owner,
            speed: record.speed,
            stamina: record.stamina,
            power: record.power,
            guts: record.guts,
            intelligence: record.intelligence,
            level: record.level,
            experience: record.experience,
            training_points: record.training_points,
            races_won: record.races_won,
            races_run: record.races_run,
            total_earnings: record.total_earnings,
            sire,
            dam,
            created_at: record.created_at,
        })
    }

    fn render_parent(&self, id: Option<Uuid>) -> Result<Option<Box<Horse>>, Rejection> {
        match id.and_then(|id| self.horse(id)) {
            Some(parent) => Ok(Some(Box::new(self.render_horse(parent)?))),
            None => Ok(None),
        }
    }

    /// A small roster so a fresh server has something to show.
    pub fn demo() -> Self {
        let mut store = Store::default();
        let now = Utc::now();
        let owner = User {
            id: Uuid::new_v4(),
            username: "trainer".to_string(),
            created_at: now,
        };
        for (name, bonus) in [("Silence Suzuka", 20), ("Special Week", 10), ("Oguri Cap", 15)] {
            let mut horse = HorseRecord::new(name.to_string(), owner.id);
            horse.speed += bonus;
            horse.stamina += bonus / 2;
            store.horses.push(horse);
        }
        store.users.push(owner);
        store.races.push(new_race(
            RaceInput {
                name: "Maiden Stakes".to_string(),
                scheduled_at: now + chrono::Duration::days(1),
                base_prize: None,
                min_level: None,
                max_level: None,
                max_participants: None,
                race_type: None,
                distance: None,
                track_condition: None,
            },
            now,
        ));
        store
    }
}

pub type Db = Arc<RwLock<Store>>;

/// An error response: status plus a plain-text body.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    message: String,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub type ApiResult<T> = Result<T, Rejection>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .nest(API_PREFIX, routes())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

fn routes() -> Router<Db> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/horses", get(list_horses).post(create_horse))
        .route("/horses/owner/{owner_id}", get(horses_by_owner))
        .route("/horses/{id}", get(get_horse).put(update_horse).delete(delete_horse))
        .route("/races", get(list_races).post(create_race))
        .route("/races/upcoming", get(upcoming_races))
        .route("/races/{id}", get(get_race).put(update_race).delete(delete_race))
        .route("/game/races/{race_id}/simulate", post(game::simulate_race))
        .route("/game/races/{race_id}/statistics", get(game::race_statistics))
        .route("/game/horses/breed", post(game::breed_horses))
        .route("/game/horses/{horse_id}/train", post(game::train_horse))
        .route("/game/horses/{horse_id}/rest", post(game::rest_horse))
        .route(
            "/game/horses/{horse_id}/training-recommendations",
            get(game::training_recommendations),
        )
        .route("/game/horses/{horse_id}/stats", get(game::horse_stats))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

// --- users ---

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    Json(db.read().await.users.clone())
}

async fn get_user(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<User>> {
    let store = db.read().await;
    store
        .user(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found("user"))
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<UserInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let mut store = db.write().await;
    if store.users.iter().any(|u| u.username == input.username) {
        return Err(Rejection::bad_request("username already taken"));
    }
    let user = User {
        id: Uuid::new_v4(),
        username: input.username,
        created_at: Utc::now(),
    };
    store.users.push(user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UserInput>,
) -> ApiResult<Json<User>> {
    let mut store = db.write().await;
    let user = store
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| Rejection::not_found("user"))?;
    user.username = input.username;
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    if store.user(id).is_none() {
        return Err(Rejection::not_found("user"));
    }
    if store.horses.iter().any(|h| h.owner_id == id) {
        return Err(Rejection::new(StatusCode::CONFLICT, "user still owns horses"));
    }
    store.users.retain(|u| u.id != id);
    Ok(StatusCode::NO_CONTENT)
}

// --- horses ---

async fn list_horses(State(db): State<Db>) -> ApiResult<Json<Vec<Horse>>> {
    let store = db.read().await;
    let horses = store
        .horses
        .iter()
        .map(|h| store.render_horse(h))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(horses))
}

async fn get_horse(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Horse>> {
    let store = db.read().await;
    let record = store.horse(id).ok_or_else(|| Rejection::not_found("horse"))?;
    Ok(Json(store.render_horse(record)?))
}

async fn horses_by_owner(
    State(db): State<Db>,
    Path(owner_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Horse>>> {
    let store = db.read().await;
    let horses = store
        .horses
        .iter()
        .filter(|h| h.owner_id == owner_id)
        .map(|h| store.render_horse(h))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(horses))
}

async fn create_horse(
    State(db): State<Db>,
    Json(input): Json<HorseInput>,
) -> ApiResult<(StatusCode, Json<Horse>)> {
    let mut store = db.write().await;
    if store.user(input.owner_id).is_none() {
        return Err(Rejection::bad_request("owner not found"));
    }
    for parent in [input.sire_id, input.dam_id].into_iter().flatten() {
        if store.horse(parent).is_none() {
            return Err(Rejection::bad_request("parent horse not found"));
        }
    }
    let mut record = HorseRecord::new(input.name, input.owner_id);
    record.sire_id = input.sire_id;
    record.dam_id = input.dam_id;
    let horse = store.render_horse(&record)?;
    store.horses.push(record);
    Ok((StatusCode::CREATED, Json(horse)))
}

/// Renames and/or re-homes a horse; pedigree is fixed at creation.
async fn update_horse(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<HorseInput>,
) -> ApiResult<Json<Horse>> {
    let mut store = db.write().await;
    if store.horse(id).is_none() {
        return Err(Rejection::not_found("horse"));
    }
    if store.user(input.owner_id).is_none() {
        return Err(Rejection::bad_request("owner not found"));
    }
    let record = store
        .horse_mut(id)
        .ok_or_else(|| Rejection::not_found("horse"))?;
    record.name = input.name;
    record.owner_id = input.owner_id;
    let record = record.clone();
    Ok(Json(store.render_horse(&record)?))
}

async fn delete_horse(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    if store.horse(id).is_none() {
        return Err(Rejection::not_found("horse"));
    }
    store.horses.retain(|h| h.id != id);
    for horse in &mut store.horses {
        if horse.sire_id == Some(id) {
            horse.sire_id = None;
        }
        if horse.dam_id == Some(id) {
            horse.dam_id = None;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- races ---

fn new_race(input: RaceInput, now: DateTime<Utc>) -> Race {
    Race {
        id: Uuid::new_v4(),
        name: input.name,
        scheduled_at: input.scheduled_at,
        base_prize: input.base_prize.unwrap_or(1000),
        min_level: input.min_level.unwrap_or(1),
        max_level: input.max_level.unwrap_or(10),
        max_participants: input.max_participants.unwrap_or(8),
        race_type: input.race_type.unwrap_or_else(|| "NORMAL".to_string()),
        distance: input.distance.unwrap_or(1200),
        track_condition: input.track_condition.unwrap_or_else(|| "GOOD".to_string()),
        is_completed: false,
        created_at: now,
    }
}

async fn list_races(State(db): State<Db>) -> Json<Vec<Race>> {
    Json(db.read().await.races.clone())
}

async fn get_race(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Race>> {
    let store = db.read().await;
    store
        .race(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found("race"))
}

async fn upcoming_races(State(db): State<Db>) -> Json<Vec<Race>> {
    let now = Utc::now();
    let store = db.read().await;
    Json(
        store
            .races
            .iter()
            .filter(|r| r.scheduled_at > now && !r.is_completed)
            .cloned()
            .collect(),
    )
}

async fn create_race(
    State(db): State<Db>,
    Json(input): Json<RaceInput>,
) -> (StatusCode, Json<Race>) {
    let race = new_race(input, Utc::now());
    db.write().await.races.push(race.clone());
    (StatusCode::CREATED, Json(race))
}

async fn update_race(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<RaceInput>,
) -> ApiResult<Json<Race>> {
    let mut store = db.write().await;
    let race = store
        .races
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| Rejection::not_found("race"))?;
    race.name = input.name;
    race.scheduled_at = input.scheduled_at;
    if let Some(v) = input.base_prize {
        race.base_prize = v;
    }
    if let Some(v) = input.min_level {
        race.min_level = v;
    }
    if let Some(v) = input.max_level {
        race.max_level = v;
    }
    if let Some(v) = input.max_participants {
        race.max_participants = v;
    }
    if let Some(v) = input.race_type {
        race.race_type = v;
    }
    if let Some(v) = input.distance {
        race.distance = v;
    }
    if let Some(v) = input.track_condition {
        race.track_condition = v;
    }
    Ok(Json(race.clone()))
}

async fn delete_race(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    if store.race(id).is_none() {
        return Err(Rejection::not_found("race"));
    }
    store.races.retain(|r| r.id != id);
    store.results.retain(|r| r.race.id != id);
    Ok(StatusCode::NO_CONTENT)
}
