//! Async facade: one call per backend operation.
//!
//! # Design
//! `Api` pairs a `PaddockClient` with a `Transport` and runs
//! build → execute → parse for each operation, so callers see
//! `api.horses().list().await` instead of the three steps. It adds no
//! retries, timeouts or caching: every call is a fresh round trip, and every
//! failure comes back as an `ApiError` for the caller to surface.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::{PaddockClient, Resource, HORSES, RACES, USERS};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    BreedHorsesRequest, CreateHorseRequest, CreateRaceRequest, CreateUserRequest, Horse,
    HorseStats, Race, RaceResult, RaceStatistics, RestOutcome, TrainHorseRequest,
    TrainingOutcome, TrainingRecommendations, User,
};

pub struct Api<T> {
    client: PaddockClient,
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(client: PaddockClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PaddockClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn users(&self) -> ResourceApi<'_, T, User, CreateUserRequest> {
        ResourceApi::new(self, USERS)
    }

    pub fn horses(&self) -> ResourceApi<'_, T, Horse, CreateHorseRequest> {
        ResourceApi::new(self, HORSES)
    }

    pub fn races(&self) -> ResourceApi<'_, T, Race, CreateRaceRequest> {
        ResourceApi::new(self, RACES)
    }

    pub fn game(&self) -> GameApi<'_, T> {
        GameApi { api: self }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

/// Async CRUD operations for one collection.
pub struct ResourceApi<'a, T, Dto, Req> {
    api: &'a Api<T>,
    collection: &'static str,
    _marker: PhantomData<fn() -> (Dto, Req)>,
}

impl<'a, T, Dto, Req> ResourceApi<'a, T, Dto, Req>
where
    T: Transport,
    Dto: DeserializeOwned,
    Req: Serialize,
{
    fn new(api: &'a Api<T>, collection: &'static str) -> Self {
        Self {
            api,
            collection,
            _marker: PhantomData,
        }
    }

    fn resource(&self) -> Resource<'a, Dto, Req> {
        self.api.client.resource(self.collection)
    }

    #[instrument(skip(self), fields(collection = self.collection))]
    pub async fn list(&self) -> Result<Vec<Dto>> {
        let resource = self.resource();
        let response = self.api.send(resource.build_list()).await?;
        resource.parse_list(response)
    }

    #[instrument(skip(self), fields(collection = self.collection))]
    pub async fn get(&self, id: Uuid) -> Result<Dto> {
        let resource = self.resource();
        let response = self.api.send(resource.build_get(id)).await?;
        resource.parse_get(response)
    }

    #[instrument(skip(self, body), fields(collection = self.collection))]
    pub async fn create(&self, body: &Req) -> Result<Dto> {
        let resource = self.resource();
        let response = self.api.send(resource.build_create(body)?).await?;
        resource.parse_create(response)
    }

    #[instrument(skip(self, body), fields(collection = self.collection))]
    pub async fn update(&self, id: Uuid, body: &Req) -> Result<Dto> {
        let resource = self.resource();
        let response = self.api.send(resource.build_update(id, body)?).await?;
        resource.parse_update(response)
    }

    #[instrument(skip(self), fields(collection = self.collection))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let resource = self.resource();
        let response = self.api.send(resource.build_delete(id)).await?;
        resource.parse_delete(response)
    }
}

impl<T: Transport> ResourceApi<'_, T, Horse, CreateHorseRequest> {
    #[instrument(skip(self))]
    pub async fn by_owner(&self, owner_id: Uuid) -> Result<Vec<Horse>> {
        let horses = self.api.client.horses();
        let response = self.api.send(horses.build_by_owner(owner_id)).await?;
        horses.parse_by_owner(response)
    }
}

impl<T: Transport> ResourceApi<'_, T, Race, CreateRaceRequest> {
    #[instrument(skip(self))]
    pub async fn upcoming(&self) -> Result<Vec<Race>> {
        let races = self.api.client.races();
        let response = self.api.send(races.build_upcoming()).await?;
        races.parse_upcoming(response)
    }
}

/// Async game actions.
pub struct GameApi<'a, T> {
    api: &'a Api<T>,
}

impl<T: Transport> GameApi<'_, T> {
    /// Run the race on the backend; results come back ranked.
    #[instrument(skip(self))]
    pub async fn simulate_race(&self, race_id: Uuid) -> Result<Vec<RaceResult>> {
        let game = self.api.client.game();
        let response = self.api.send(game.build_simulate_race(race_id)).await?;
        game.parse_simulate_race(response)
    }

    #[instrument(skip(self))]
    pub async fn train_horse(
        &self,
        horse_id: Uuid,
        body: &TrainHorseRequest,
    ) -> Result<TrainingOutcome> {
        let game = self.api.client.game();
        let response = self
            .api
            .send(game.build_train_horse(horse_id, body)?)
            .await?;
        game.parse_train_horse(response)
    }

    #[instrument(skip(self))]
    pub async fn rest_horse(&self, horse_id: Uuid) -> Result<RestOutcome> {
        let game = self.api.client.game();
        let response = self.api.send(game.build_rest_horse(horse_id)).await?;
        game.parse_rest_horse(response)
    }

    #[instrument(skip(self))]
    pub async fn training_recommendations(
        &self,
        horse_id: Uuid,
    ) -> Result<TrainingRecommendations> {
        let game = self.api.client.game();
        let response = self
            .api
            .send(game.build_training_recommendations(horse_id))
            .await?;
        game.parse_training_recommendations(response)
    }

    #[instrument(skip(self))]
    pub async fn breed_horses(&self, body: &BreedHorsesRequest) -> Result<Horse> {
        let game = self.api.client.game();
        let response = self.api.send(game.build_breed_horses(body)?).await?;
        game.parse_breed_horses(response)
    }

    #[instrument(skip(self))]
    pub async fn race_statistics(&self, race_id: Uuid) -> Result<RaceStatistics> {
        let game = self.api.client.game();
        let response = self.api.send(game.build_race_statistics(race_id)).await?;
        game.parse_race_statistics(response)
    }

    #[instrument(skip(self))]
    pub async fn horse_stats(&self, horse_id: Uuid) -> Result<HorseStats> {
        let game = self.api.client.game();
        let response = self.api.send(game.build_horse_stats(horse_id)).await?;
        game.parse_horse_stats(response)
    }
}
