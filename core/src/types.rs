//! Domain DTOs for the paddock API.
//!
//! # Design
//! These types mirror the backend's JSON schema (camelCase field names) but
//! are defined independently from the mock-server crate; integration tests
//! catch schema drift. Entities are immutable snapshots: the client never
//! patches them locally, it re-fetches.
//!
//! The game endpoints get concrete response types instead of open JSON maps
//! so the front-end can render them without guessing at keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A horse with its ability stats, progression counters and pedigree.
///
/// The game fields default to zero because some backend builds return a slim
/// horse (id, name, owner, createdAt) from the CRUD endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Horse {
    pub id: Uuid,
    pub name: String,
    pub owner: User,
    #[serde(default)]
    pub speed: i32,
    #[serde(default)]
    pub stamina: i32,
    #[serde(default)]
    pub power: i32,
    #[serde(default)]
    pub guts: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub training_points: i32,
    #[serde(default)]
    pub races_won: i32,
    #[serde(default)]
    pub races_run: i32,
    #[serde(default)]
    pub total_earnings: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sire: Option<Box<Horse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dam: Option<Box<Horse>>,
    pub created_at: DateTime<Utc>,
}

impl Horse {
    pub fn stat(&self, stat: StatType) -> i32 {
        match stat {
            StatType::Speed => self.speed,
            StatType::Stamina => self.stamina,
            StatType::Power => self.power,
            StatType::Guts => self.guts,
            StatType::Intelligence => self.intelligence,
        }
    }

    /// Sum of the five ability stats.
    pub fn total_stats(&self) -> i32 {
        self.speed + self.stamina + self.power + self.guts + self.intelligence
    }

    /// Fraction of races won, 0.0 for a horse that has never raced.
    pub fn win_rate(&self) -> f64 {
        if self.races_run == 0 {
            return 0.0;
        }
        f64::from(self.races_won) / f64::from(self.races_run)
    }

    /// Number of generations in the known pedigree, counting this horse.
    pub fn lineage_depth(&self) -> usize {
        let sire = self.sire.as_ref().map_or(0, |h| h.lineage_depth());
        let dam = self.dam.as_ref().map_or(0, |h| h.lineage_depth());
        1 + sire.max(dam)
    }
}

/// A scheduled or completed race.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: Uuid,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_base_prize")]
    pub base_prize: i32,
    #[serde(default = "default_min_level")]
    pub min_level: i32,
    #[serde(default = "default_max_level")]
    pub max_level: i32,
    #[serde(default = "default_max_participants")]
    pub max_participants: i32,
    #[serde(default = "default_race_type")]
    pub race_type: String,
    #[serde(default = "default_distance")]
    pub distance: i32,
    #[serde(default = "default_track_condition")]
    pub track_condition: String,
    pub created_at: DateTime<Utc>,
}

fn default_base_prize() -> i32 {
    1000
}

fn default_min_level() -> i32 {
    1
}

fn default_max_level() -> i32 {
    10
}

fn default_max_participants() -> i32 {
    8
}

fn default_race_type() -> String {
    "NORMAL".to_string()
}

fn default_distance() -> i32 {
    1200
}

fn default_track_condition() -> String {
    "GOOD".to_string()
}

/// One horse's finish in a simulated race.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub id: Uuid,
    pub race: Race,
    pub horse: Horse,
    /// 1-based finishing rank.
    pub position: u32,
    pub earnings: i64,
    /// Elapsed time in seconds.
    pub race_time: f64,
    pub performance_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Results ordered by finishing position, winner first, whatever order the
/// backend returned them in.
pub fn by_position(results: &[RaceResult]) -> Vec<&RaceResult> {
    let mut ranked: Vec<&RaceResult> = results.iter().collect();
    ranked.sort_by_key(|r| r.position);
    ranked
}

/// The trainable ability stats.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatType {
    Speed,
    Stamina,
    Power,
    Guts,
    Intelligence,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub username: String,
}

pub type UpdateUserRequest = CreateUserRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateHorseRequest {
    pub name: String,
    pub owner_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sire_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dam_id: Option<Uuid>,
}

pub type UpdateHorseRequest = CreateHorseRequest;

/// Only `name` and `scheduledAt` are required; omitted fields take the
/// backend's defaults and are left out of the JSON entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRaceRequest {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_prize: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_condition: Option<String>,
}

impl CreateRaceRequest {
    pub fn new(name: impl Into<String>, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            scheduled_at,
            base_prize: None,
            min_level: None,
            max_level: None,
            max_participants: None,
            race_type: None,
            distance: None,
            track_condition: None,
        }
    }
}

pub type UpdateRaceRequest = CreateRaceRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrainHorseRequest {
    pub stat_type: StatType,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreedHorsesRequest {
    pub sire_id: Uuid,
    pub dam_id: Uuid,
    pub foal_name: String,
    pub owner_id: Uuid,
}

// ---------------------------------------------------------------------------
// Game responses
// ---------------------------------------------------------------------------

/// Acknowledgement of a training request. `success == false` means the horse
/// lacked the points; the two point fields are then populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_points: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RestOutcome {
    pub success: bool,
    pub message: String,
    pub training_points_gained: i32,
}

/// Which stat the backend suggests training next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecommendations {
    pub recommended_stat: StatType,
    pub current_value: i32,
    pub points_needed: i32,
    pub training_points_available: i32,
    pub can_train: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceSummary {
    pub total_participants: u32,
    pub average_time: f64,
    pub fastest_time: f64,
    pub total_prize_pool: i64,
}

/// Aggregate numbers for a race, or a message when it has no results yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RaceStatistics {
    Summary(RaceSummary),
    NoResults { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HorseStats {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub experience: i32,
    pub training_points: i32,
    pub speed: i32,
    pub stamina: i32,
    pub power: i32,
    pub guts: i32,
    pub intelligence: i32,
    pub total_stats: i32,
    pub race_performance: f64,
    pub races_won: i32,
    pub races_run: i32,
    pub total_earnings: i64,
    pub win_rate: f64,
}
