//! Game endpoints: simulation, training, resting, breeding and statistics.
//!
//! Outcomes are a pure function of the stored stats so that tests can
//! predict them. Faster horses are the ones with the higher stat total.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{ApiResult, Db, Horse, HorseRecord, RaceResult, Rejection, Store};

/// Share of the base prize paid per finishing position.
const PRIZE_SHARES: [f64; 8] = [1.0, 0.3, 0.2, 0.1, 0.05, 0.02, 0.01, 0.005];
const MIN_PARTICIPANTS: usize = 2;
const STAT_CAP: i32 = 100;
const REST_POINTS: i32 = 3;

const STAT_NAMES: [&str; 5] = ["speed", "stamina", "power", "guts", "intelligence"];

fn stat_mut<'a>(horse: &'a mut HorseRecord, stat: &str) -> Option<&'a mut i32> {
    match stat {
        "speed" => Some(&mut horse.speed),
        "stamina" => Some(&mut horse.stamina),
        "power" => Some(&mut horse.power),
        "guts" => Some(&mut horse.guts),
        "intelligence" => Some(&mut horse.intelligence),
        _ => None,
    }
}

fn stat(horse: &HorseRecord, stat: &str) -> Option<i32> {
    match stat {
        "speed" => Some(horse.speed),
        "stamina" => Some(horse.stamina),
        "power" => Some(horse.power),
        "guts" => Some(horse.guts),
        "intelligence" => Some(horse.intelligence),
        _ => None,
    }
}

fn performance(horse: &HorseRecord) -> f64 {
    f64::from(horse.total_stats()) / 5.0 + f64::from(horse.level) * 2.0
}

fn win_rate(horse: &HorseRecord) -> f64 {
    if horse.races_run == 0 {
        0.0
    } else {
        f64::from(horse.races_won) / f64::from(horse.races_run)
    }
}

fn horse_or_404(store: &Store, id: Uuid) -> ApiResult<&HorseRecord> {
    store.horse(id).ok_or_else(|| Rejection::not_found("horse"))
}

pub async fn simulate_race(
    State(db): State<Db>,
    Path(race_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RaceResult>>> {
    let mut store = db.write().await;
    let race = store
        .race(race_id)
        .cloned()
        .ok_or_else(|| Rejection::not_found("race"))?;
    if race.is_completed {
        return Err(Rejection::bad_request("race already completed"));
    }

    let mut field: Vec<&HorseRecord> = store
        .horses
        .iter()
        .filter(|h| h.level >= race.min_level && h.level <= race.max_level)
        .collect();
    field.sort_by(|a, b| {
        performance(b)
            .total_cmp(&performance(a))
            .then_with(|| a.name.cmp(&b.name))
    });
    field.truncate(usize::try_from(race.max_participants).unwrap_or(0));
    if field.len() < MIN_PARTICIPANTS {
        return Err(Rejection::bad_request("race needs at least 2 participants"));
    }
    let finishers: Vec<(Uuid, f64)> = field.iter().map(|h| (h.id, performance(h))).collect();

    let mut payouts = Vec::with_capacity(finishers.len());
    for (index, (horse_id, score)) in finishers.iter().enumerate() {
        let share = PRIZE_SHARES.get(index).copied().unwrap_or(0.0);
        let earnings = (f64::from(race.base_prize) * share).round() as i64;
        let horse = store
            .horse_mut(*horse_id)
            .ok_or_else(|| Rejection::not_found("horse"))?;
        horse.races_run += 1;
        if index == 0 {
            horse.races_won += 1;
        }
        horse.total_earnings += earnings;
        let race_time = f64::from(race.distance) / (10.0 + score / 10.0);
        payouts.push((*horse_id, index as u32 + 1, earnings, race_time, *score));
    }

    let race = {
        let stored = store
            .races
            .iter_mut()
            .find(|r| r.id == race_id)
            .ok_or_else(|| Rejection::not_found("race"))?;
        stored.is_completed = true;
        stored.clone()
    };

    let now = Utc::now();
    let mut results = Vec::with_capacity(payouts.len());
    for (horse_id, position, earnings, race_time, performance_score) in payouts {
        let horse = store.render_horse(horse_or_404(&store, horse_id)?)?;
        results.push(RaceResult {
            id: Uuid::new_v4(),
            race: race.clone(),
            horse,
            position,
            earnings,
            race_time,
            performance_score,
            created_at: now,
        });
    }
    store.results.extend(results.iter().cloned());
    tracing::info!(race = %race.name, finishers = results.len(), "race simulated");
    Ok(Json(results))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainInput {
    pub stat_type: String,
    pub points: i32,
}

pub async fn train_horse(
    State(db): State<Db>,
    Path(horse_id): Path<Uuid>,
    Json(input): Json<TrainInput>,
) -> ApiResult<Json<Value>> {
    if input.points <= 0 {
        return Err(Rejection::bad_request("points must be positive"));
    }
    if !STAT_NAMES.contains(&input.stat_type.as_str()) {
        return Err(Rejection::bad_request(format!(
            "unknown stat type {}",
            input.stat_type
        )));
    }
    let mut store = db.write().await;
    let horse = store
        .horse_mut(horse_id)
        .ok_or_else(|| Rejection::not_found("horse"))?;
    let available = horse.training_points;
    if available < input.points {
        return Ok(Json(json!({
            "success": false,
            "message": "Not enough training points",
            "requiredPoints": input.points,
            "availablePoints": available,
        })));
    }
    let value = stat_mut(horse, &input.stat_type)
        .ok_or_else(|| Rejection::bad_request(format!("unknown stat type {}", input.stat_type)))?;
    *value = (*value + input.points).min(STAT_CAP);
    horse.training_points -= input.points;
    Ok(Json(json!({
        "success": true,
        "message": format!("Trained {} by {} points", input.stat_type, input.points),
    })))
}

pub async fn rest_horse(State(db): State<Db>, Path(horse_id): Path<Uuid>) -> ApiResult<Json<Value>> {
    let mut store = db.write().await;
    let horse = store
        .horse_mut(horse_id)
        .ok_or_else(|| Rejection::not_found("horse"))?;
    horse.training_points += REST_POINTS;
    Ok(Json(json!({
        "success": true,
        "message": "Horse rested",
        "trainingPointsGained": REST_POINTS,
    })))
}

/// Suggest the weakest stat; ties go to the earlier one in `STAT_NAMES`.
pub async fn training_recommendations(
    State(db): State<Db>,
    Path(horse_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let horse = horse_or_404(&store, horse_id)?;
    let mut weakest = (STAT_NAMES[0], horse.speed);
    for name in STAT_NAMES {
        if let Some(value) = stat(horse, name) {
            if value < weakest.1 {
                weakest = (name, value);
            }
        }
    }
    let (name, current) = weakest;
    Ok(Json(json!({
        "recommendedStat": name,
        "currentValue": current,
        "pointsNeeded": (STAT_CAP - current).max(1),
        "trainingPointsAvailable": horse.training_points,
        "canTrain": horse.training_points > 0,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreedInput {
    pub sire_id: Uuid,
    pub dam_id: Uuid,
    pub foal_name: String,
    pub owner_id: Uuid,
}

/// The foal inherits the mean of each parent stat.
pub async fn breed_horses(
    State(db): State<Db>,
    Json(input): Json<BreedInput>,
) -> ApiResult<Json<Horse>> {
    if input.sire_id == input.dam_id {
        return Err(Rejection::bad_request("a horse cannot be bred with itself"));
    }
    let mut store = db.write().await;
    let sire = store
        .horse(input.sire_id)
        .cloned()
        .ok_or_else(|| Rejection::not_found("sire"))?;
    let dam = store
        .horse(input.dam_id)
        .cloned()
        .ok_or_else(|| Rejection::not_found("dam"))?;
    if store.user(input.owner_id).is_none() {
        return Err(Rejection::not_found("owner"));
    }

    let mut foal = HorseRecord::new(input.foal_name, input.owner_id);
    foal.speed = (sire.speed + dam.speed) / 2;
    foal.stamina = (sire.stamina + dam.stamina) / 2;
    foal.power = (sire.power + dam.power) / 2;
    foal.guts = (sire.guts + dam.guts) / 2;
    foal.intelligence = (sire.intelligence + dam.intelligence) / 2;
    foal.sire_id = Some(sire.id);
    foal.dam_id = Some(dam.id);

    let horse = store.render_horse(&foal)?;
    store.horses.push(foal);
    Ok(Json(horse))
}

pub async fn race_statistics(
    State(db): State<Db>,
    Path(race_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    if store.race(race_id).is_none() {
        return Err(Rejection::not_found("race"));
    }
    let results: Vec<&RaceResult> = store
        .results
        .iter()
        .filter(|r| r.race.id == race_id)
        .collect();
    if results.is_empty() {
        return Ok(Json(json!({ "message": "No results found for this race" })));
    }
    let times: Vec<f64> = results.iter().map(|r| r.race_time).collect();
    let average = times.iter().sum::<f64>() / times.len() as f64;
    let fastest = times.iter().copied().fold(f64::INFINITY, f64::min);
    let prize_pool: i64 = results.iter().map(|r| r.earnings).sum();
    Ok(Json(json!({
        "totalParticipants": results.len(),
        "averageTime": average,
        "fastestTime": fastest,
        "totalPrizePool": prize_pool,
    })))
}

pub async fn horse_stats(State(db): State<Db>, Path(horse_id): Path<Uuid>) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let horse = horse_or_404(&store, horse_id)?;
    Ok(Json(json!({
        "id": horse.id,
        "name": horse.name,
        "level": horse.level,
        "experience": horse.experience,
        "trainingPoints": horse.training_points,
        "speed": horse.speed,
        "stamina": horse.stamina,
        "power": horse.power,
        "guts": horse.guts,
        "intelligence": horse.intelligence,
        "totalStats": horse.total_stats(),
        "racePerformance": performance(horse),
        "racesWon": horse.races_won,
        "racesRun": horse.races_run,
        "totalEarnings": horse.total_earnings,
        "winRate": win_rate(horse),
    })))
}
