//! Stateless HTTP request builder and response parser for the paddock API.
//!
//! # Design
//! `PaddockClient` holds only a `base_url` and carries no mutable state between
//! calls. Operations are grouped per resource (`users()`, `horses()`,
//! `races()`, `game()`); every operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round trip, keeping the
//! core deterministic and free of I/O.
//!
//! The three CRUD resources share one generic group, `Resource`, keyed by the
//! DTO and request types; resource-specific extras (`by_owner`, `upcoming`)
//! are inherent impls on the concrete instantiation.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    BreedHorsesRequest, CreateHorseRequest, CreateRaceRequest, CreateUserRequest, Horse,
    HorseStats, Race, RaceResult, RaceStatistics, RestOutcome, TrainHorseRequest,
    TrainingOutcome, TrainingRecommendations, User,
};

/// Path prefix every backend route lives under.
pub const API_PREFIX: &str = "/api/v1";

pub(crate) const USERS: &str = "users";
pub(crate) const HORSES: &str = "horses";
pub(crate) const RACES: &str = "races";

/// Synchronous, stateless client for the paddock API.
///
/// `base_url` includes the API prefix, e.g. `http://localhost:3000/api/v1`.
#[derive(Debug, Clone)]
pub struct PaddockClient {
    base_url: String,
}

impl PaddockClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for a server origin such as `http://localhost:3000`; appends
    /// [`API_PREFIX`].
    pub fn for_origin(origin: &str) -> Self {
        Self::new(&format!("{}{API_PREFIX}", origin.trim_end_matches('/')))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn users(&self) -> Resource<'_, User, CreateUserRequest> {
        self.resource(USERS)
    }

    pub fn horses(&self) -> Resource<'_, Horse, CreateHorseRequest> {
        self.resource(HORSES)
    }

    pub fn races(&self) -> Resource<'_, Race, CreateRaceRequest> {
        self.resource(RACES)
    }

    pub(crate) fn resource<T, Req>(&self, collection: &'static str) -> Resource<'_, T, Req>
    where
        T: DeserializeOwned,
        Req: Serialize,
    {
        Resource::new(self, collection)
    }

    pub fn game(&self) -> Game<'_> {
        Game { client: self }
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &B,
    ) -> Result<HttpRequest> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(method, path, Some(body)))
    }
}

/// CRUD operations for one collection (`/users`, `/horses`, `/races`).
#[derive(Debug)]
pub struct Resource<'a, T, Req> {
    client: &'a PaddockClient,
    collection: &'static str,
    _marker: PhantomData<fn() -> (T, Req)>,
}

impl<'a, T, Req> Resource<'a, T, Req>
where
    T: DeserializeOwned,
    Req: Serialize,
{
    fn new(client: &'a PaddockClient, collection: &'static str) -> Self {
        Self {
            client,
            collection,
            _marker: PhantomData,
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, &format!("/{}", self.collection), None)
    }

    pub fn build_get(&self, id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, &format!("/{}/{id}", self.collection), None)
    }

    pub fn build_create(&self, input: &Req) -> Result<HttpRequest> {
        self.client
            .json_request(HttpMethod::Post, &format!("/{}", self.collection), input)
    }

    pub fn build_update(&self, id: Uuid, input: &Req) -> Result<HttpRequest> {
        self.client
            .json_request(HttpMethod::Put, &format!("/{}/{id}", self.collection), input)
    }

    pub fn build_delete(&self, id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Delete, &format!("/{}/{id}", self.collection), None)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<T>> {
        parse_json(response)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<T> {
        parse_json(response)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<T> {
        parse_json(response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<T> {
        parse_json(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }
}

impl Resource<'_, Horse, CreateHorseRequest> {
    pub fn build_by_owner(&self, owner_id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, &format!("/horses/owner/{owner_id}"), None)
    }

    pub fn parse_by_owner(&self, response: HttpResponse) -> Result<Vec<Horse>> {
        parse_json(response)
    }
}

impl Resource<'_, Race, CreateRaceRequest> {
    pub fn build_upcoming(&self) -> HttpRequest {
        self.client.request(HttpMethod::Get, "/races/upcoming", None)
    }

    pub fn parse_upcoming(&self, response: HttpResponse) -> Result<Vec<Race>> {
        parse_json(response)
    }
}

/// Game actions under `/game`.
#[derive(Debug, Clone, Copy)]
pub struct Game<'a> {
    client: &'a PaddockClient,
}

impl Game<'_> {
    pub fn build_simulate_race(&self, race_id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Post, &format!("/game/races/{race_id}/simulate"), None)
    }

    pub fn parse_simulate_race(&self, response: HttpResponse) -> Result<Vec<RaceResult>> {
        parse_json(response)
    }

    pub fn build_train_horse(
        &self,
        horse_id: Uuid,
        input: &TrainHorseRequest,
    ) -> Result<HttpRequest> {
        self.client.json_request(
            HttpMethod::Post,
            &format!("/game/horses/{horse_id}/train"),
            input,
        )
    }

    pub fn parse_train_horse(&self, response: HttpResponse) -> Result<TrainingOutcome> {
        parse_json(response)
    }

    pub fn build_rest_horse(&self, horse_id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Post, &format!("/game/horses/{horse_id}/rest"), None)
    }

    pub fn parse_rest_horse(&self, response: HttpResponse) -> Result<RestOutcome> {
        parse_json(response)
    }

    pub fn build_training_recommendations(&self, horse_id: Uuid) -> HttpRequest {
        self.client.request(
            HttpMethod::Get,
            &format!("/game/horses/{horse_id}/training-recommendations"),
            None,
        )
    }

    pub fn parse_training_recommendations(
        &self,
        response: HttpResponse,
    ) -> Result<TrainingRecommendations> {
        parse_json(response)
    }

    pub fn build_breed_horses(&self, input: &BreedHorsesRequest) -> Result<HttpRequest> {
        self.client
            .json_request(HttpMethod::Post, "/game/horses/breed", input)
    }

    pub fn parse_breed_horses(&self, response: HttpResponse) -> Result<Horse> {
        parse_json(response)
    }

    pub fn build_race_statistics(&self, race_id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, &format!("/game/races/{race_id}/statistics"), None)
    }

    pub fn parse_race_statistics(&self, response: HttpResponse) -> Result<RaceStatistics> {
        parse_json(response)
    }

    pub fn build_horse_stats(&self, horse_id: Uuid) -> HttpRequest {
        self.client
            .request(HttpMethod::Get, &format!("/game/horses/{horse_id}/stats"), None)
    }

    pub fn parse_horse_stats(&self, response: HttpResponse) -> Result<HorseStats> {
        parse_json(response)
    }
}

/// Map any non-2xx status to `ApiError::Http`, falling back to the reason
/// phrase when the body is empty.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let body = if response.body.is_empty() {
        response.status_text.clone()
    } else {
        response.body.clone()
    };
    Err(ApiError::Http {
        status: response.status,
        body,
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
