//! Client core for the paddock horse-racing game.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and layers the front-end's
//! behaviour on top: an async facade over a pluggable `Transport`, a single
//! reducer-driven `AppState`, the `Dashboard` that loads and refreshes it, and
//! the creation forms.
//!
//! # Design
//! - `PaddockClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `Api` joins the two halves through a `Transport` supplied by the host.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//! - Refresh is always a full reload; entities are never patched locally.

pub mod api;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod http;
pub mod state;
pub mod transport;
pub mod types;

pub use api::Api;
pub use client::{PaddockClient, API_PREFIX};
pub use dashboard::Dashboard;
pub use error::ApiError;
pub use forms::{CreateForm, FormStatus, HorseForm, RaceForm, UserForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use state::{Action, AppState, Tab};
pub use transport::Transport;
pub use types::{
    BreedHorsesRequest, CreateHorseRequest, CreateRaceRequest, CreateUserRequest, Horse,
    HorseStats, Race, RaceResult, RaceStatistics, RaceSummary, RestOutcome, StatType,
    TrainHorseRequest, TrainingOutcome, TrainingRecommendations, UpdateHorseRequest,
    UpdateRaceRequest, UpdateUserRequest, User,
};
