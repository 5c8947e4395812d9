//! Plain-text rendering of the dashboard and of game action outcomes.
//!
//! Every function returns a `String` so output can be asserted in tests and
//! written wherever the caller likes.

use paddock_core::{
    AppState, Horse, HorseStats, Race, RaceResult, RaceStatistics, RestOutcome, StatType, Tab,
    TrainingOutcome, TrainingRecommendations, User,
};
use strum::IntoEnumIterator;

const TITLE: &str = "Paddock";

/// The whole root view for the state's current tab.
pub fn render(state: &AppState) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    if state.is_loading() {
        out.push_str("Loading...\n");
        return out;
    }
    if let Some(error) = state.error() {
        out.push_str(&format!("Error: {error}\n"));
    }
    out.push_str(&format!(
        "Users ({})  Horses ({})  Races ({})\n",
        state.users().len(),
        state.horses().len(),
        state.races().len()
    ));
    out.push_str(&tab_bar(state.tab()));
    out.push('\n');

    match state.tab() {
        Tab::Horses => {
            out.push_str(&users(state.users()));
            out.push_str(&horse_cards(state.horses(), state.selected_horse_id()));
        }
        Tab::Races => {
            out.push_str(&race_list(state.races()));
            let standings = state.standings();
            if !standings.is_empty() {
                out.push('\n');
                out.push_str(&standings_table(&standings));
            }
        }
        Tab::Training => match state.selected_horse() {
            Some(horse) => out.push_str(&training_card(horse)),
            None => out.push_str("Select a horse to train.\n"),
        },
        Tab::Breeding => out.push_str(&pedigrees(state.horses())),
    }
    out
}

/// `horses | [races] | training | breeding`
pub fn tab_bar(current: Tab) -> String {
    let labels: Vec<String> = Tab::iter()
        .map(|tab| {
            if tab == current {
                format!("[{tab}]")
            } else {
                tab.to_string()
            }
        })
        .collect();
    format!("{}\n", labels.join(" | "))
}

pub fn users(users: &[User]) -> String {
    let mut out = String::new();
    for user in users {
        out.push_str(&format!(
            "  {}  created {}\n",
            user.username,
            user.created_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    out
}

pub fn horse_cards(horses: &[Horse], selected: Option<uuid::Uuid>) -> String {
    if horses.is_empty() {
        return "No horses yet.\n".to_string();
    }
    let mut out = String::new();
    for horse in horses {
        let marker = if selected == Some(horse.id) { '>' } else { ' ' };
        out.push_str(&format!(
            "{marker} {} (Lv {}) owner {}  {}  TP {}  W/R {}/{}  earnings {}\n",
            horse.name,
            horse.level,
            horse.owner.username,
            stat_line(horse),
            horse.training_points,
            horse.races_won,
            horse.races_run,
            horse.total_earnings
        ));
    }
    out
}

fn stat_line(horse: &Horse) -> String {
    StatType::iter()
        .map(|stat| format!("{} {}", abbreviation(stat), horse.stat(stat)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn abbreviation(stat: StatType) -> &'static str {
    match stat {
        StatType::Speed => "SPD",
        StatType::Stamina => "STA",
        StatType::Power => "POW",
        StatType::Guts => "GUT",
        StatType::Intelligence => "INT",
    }
}

pub fn race_list(races: &[Race]) -> String {
    if races.is_empty() {
        return "No races scheduled.\n".to_string();
    }
    let mut out = String::new();
    for race in races {
        let status = if race.is_completed { "completed" } else { "scheduled" };
        out.push_str(&format!(
            "  {}  {}  {}m {} {}  prize {}  Lv {}-{}  max {}  [{status}]  {}\n",
            race.name,
            race.scheduled_at.format("%Y-%m-%d %H:%M UTC"),
            race.distance,
            race.track_condition,
            race.race_type,
            race.base_prize,
            race.min_level,
            race.max_level,
            race.max_participants,
            race.id
        ));
    }
    out
}

/// Finishing order, winner first.
pub fn standings_table(results: &[&RaceResult]) -> String {
    let mut out = String::from("Results\n");
    for result in results {
        out.push_str(&format!(
            "  {:>2}. {:<20} {:>7.2}s  score {:>6.2}  +{}\n",
            result.position,
            result.horse.name,
            result.race_time,
            result.performance_score,
            result.earnings
        ));
    }
    out
}

/// Stat bars for one horse; each `#` is ten points.
pub fn training_card(horse: &Horse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} (Lv {}, {} exp)  training points: {}\n",
        horse.name, horse.level, horse.experience, horse.training_points
    ));
    for stat in StatType::iter() {
        let value = horse.stat(stat);
        let bar = "#".repeat(usize::try_from(value / 10).unwrap_or(0));
        out.push_str(&format!("  {:<12} {:>3} {bar}\n", stat.to_string(), value));
    }
    out.push_str(&format!("  total        {:>3}\n", horse.total_stats()));
    out
}

pub fn pedigrees(horses: &[Horse]) -> String {
    if horses.len() < 2 {
        return "Breeding needs at least two horses.\n".to_string();
    }
    let mut out = String::new();
    for horse in horses {
        let parent = |p: &Option<Box<Horse>>| {
            p.as_ref()
                .map_or_else(|| "-".to_string(), |h| h.name.clone())
        };
        out.push_str(&format!(
            "  {}  sire {}  dam {}  generations {}  {}\n",
            horse.name,
            parent(&horse.sire),
            parent(&horse.dam),
            horse.lineage_depth(),
            horse.id
        ));
    }
    out
}

pub fn training_outcome(outcome: &TrainingOutcome) -> String {
    match (outcome.required_points, outcome.available_points) {
        (Some(required), Some(available)) if !outcome.success => format!(
            "{} (needs {required}, has {available})\n",
            outcome.message
        ),
        _ => format!("{}\n", outcome.message),
    }
}

pub fn rest_outcome(outcome: &RestOutcome) -> String {
    format!(
        "{} (+{} training points)\n",
        outcome.message, outcome.training_points_gained
    )
}

pub fn recommendations(recs: &TrainingRecommendations) -> String {
    let verdict = if recs.can_train { "can train" } else { "no points" };
    format!(
        "train {} (now {}, {} to max); {} available, {verdict}\n",
        recs.recommended_stat, recs.current_value, recs.points_needed, recs.training_points_available
    )
}

pub fn race_statistics(stats: &RaceStatistics) -> String {
    match stats {
        RaceStatistics::Summary(summary) => format!(
            "participants {}  average {:.2}s  fastest {:.2}s  prize pool {}\n",
            summary.total_participants,
            summary.average_time,
            summary.fastest_time,
            summary.total_prize_pool
        ),
        RaceStatistics::NoResults { message } => format!("{message}\n"),
    }
}

pub fn horse_stats(stats: &HorseStats) -> String {
    format!(
        "{} Lv {}  total {}  performance {:.1}  won {}/{} ({:.0}%)  earnings {}\n",
        stats.name,
        stats.level,
        stats.total_stats,
        stats.race_performance,
        stats.races_won,
        stats.races_run,
        stats.win_rate * 100.0,
        stats.total_earnings
    )
}
