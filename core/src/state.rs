//! Application state and its reducer.
//!
//! # Design
//! Everything the root view shows lives in one `AppState` value, changed only
//! through `AppState::apply`. The load policies are transitions here rather
//! than side effects in the dashboard:
//!
//! - a load replaces all three collections at once or none of them;
//! - a failed load keeps the previous collections and records the message;
//! - only the most recently issued load may change state. Each load gets a
//!   `LoadTicket`; a result carrying an older ticket is dropped.

use uuid::Uuid;

use crate::types::{by_position, Horse, Race, RaceResult, User};

/// The four views of the game screen. Any tab can follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Tab {
    #[default]
    Horses,
    Races,
    Training,
    Breeding,
}

impl Tab {
    /// Tabs on which clicking a horse card selects it.
    pub fn allows_horse_selection(self) -> bool {
        matches!(self, Tab::Horses | Tab::Training)
    }
}

/// Identifies one load round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// The three collections fetched by one successful load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub horses: Vec<Horse>,
    pub races: Vec<Race>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A new load round was issued. Use [`AppState::begin_load`] to get its
    /// ticket.
    LoadStarted,
    LoadSucceeded(LoadTicket, Snapshot),
    LoadFailed(LoadTicket, String),
    RaceSimulated(Vec<RaceResult>),
    /// A mutation failed; nothing is reloaded.
    ActionFailed(String),
    SelectTab(Tab),
    SelectHorse(Uuid),
    CancelSelection,
}

#[derive(Debug, Clone)]
pub struct AppState {
    users: Vec<User>,
    horses: Vec<Horse>,
    races: Vec<Race>,
    race_results: Option<Vec<RaceResult>>,
    error: Option<String>,
    loading: bool,
    tab: Tab,
    selected_horse: Option<Uuid>,
    issued: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Fresh state: nothing fetched yet, so `loading` starts out true.
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            horses: Vec::new(),
            races: Vec::new(),
            race_results: None,
            error: None,
            loading: true,
            tab: Tab::default(),
            selected_horse: None,
            issued: 0,
        }
    }

    /// Apply one transition. Returns `false` when the action was ignored
    /// (a stale load result, or a horse selection on a tab without cards).
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::LoadStarted => {
                self.issued += 1;
                self.loading = true;
                self.error = None;
            }
            Action::LoadSucceeded(ticket, snapshot) => {
                if !self.is_current(ticket) {
                    return false;
                }
                self.users = snapshot.users;
                self.horses = snapshot.horses;
                self.races = snapshot.races;
                self.loading = false;
            }
            Action::LoadFailed(ticket, message) => {
                if !self.is_current(ticket) {
                    return false;
                }
                self.error = Some(message);
                self.loading = false;
            }
            Action::RaceSimulated(results) => self.race_results = Some(results),
            Action::ActionFailed(message) => self.error = Some(message),
            Action::SelectTab(tab) => self.tab = tab,
            Action::SelectHorse(id) => {
                if !self.tab.allows_horse_selection() {
                    return false;
                }
                self.selected_horse = Some(id);
            }
            Action::CancelSelection => self.selected_horse = None,
        }
        true
    }

    /// Issue a new load round and return its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.apply(Action::LoadStarted);
        LoadTicket(self.issued)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.issued
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn horses(&self) -> &[Horse] {
        &self.horses
    }

    pub fn races(&self) -> &[Race] {
        &self.races
    }

    pub fn race_results(&self) -> Option<&[RaceResult]> {
        self.race_results.as_deref()
    }

    /// Last simulated race's results, winner first.
    pub fn standings(&self) -> Vec<&RaceResult> {
        self.race_results
            .as_deref()
            .map(by_position)
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn selected_horse_id(&self) -> Option<Uuid> {
        self.selected_horse
    }

    /// The selected horse as of the last successful load.
    pub fn selected_horse(&self) -> Option<&Horse> {
        let id = self.selected_horse?;
        self.horses.iter().find(|h| h.id == id)
    }
}
