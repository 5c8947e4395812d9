//! Console host for the paddock client core.
//!
//! Each subcommand builds a `Dashboard` over a reqwest transport, performs one
//! action and renders the outcome as text. Mutations reload the collections
//! as usual; a reload failure after a successful mutation is reported as a
//! warning, not as a failed command.

use std::io::Write;

use color_eyre::eyre::{eyre, Result, WrapErr};
use paddock_core::{
    Action, Api, BreedHorsesRequest, CreateForm, Dashboard, FormStatus, HorseForm,
    PaddockClient, RaceForm, UserForm,
};
use tracing::{info, warn};

pub mod cli;
pub mod transport;
pub mod view;

pub use cli::{Cli, Command};
pub use transport::ReqwestTransport;

pub type ConsoleDashboard = Dashboard<ReqwestTransport>;

pub fn dashboard(api_url: &str) -> ConsoleDashboard {
    let client = PaddockClient::new(api_url);
    Dashboard::new(Api::new(client, ReqwestTransport::new()))
}

fn form_error(status: &FormStatus) -> color_eyre::Report {
    match status.error() {
        Some(message) => eyre!("{message}"),
        None => eyre!("required fields are missing"),
    }
}

fn warn_on_refresh_error(dash: &ConsoleDashboard, out: &mut impl Write) -> Result<()> {
    if let Some(error) = dash.state().error() {
        warn!(%error, "reload after action failed");
        writeln!(out, "warning: reload failed: {error}")?;
    }
    Ok(())
}

/// Run one subcommand, writing its output to `out`.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    info!(api_url = %cli.api_url, "starting");
    let mut dash = dashboard(&cli.api_url);

    match cli.command {
        Command::Show { tab, horse } => {
            let loaded = dash.load().await;
            dash.dispatch(Action::SelectTab(tab));
            if let Some(id) = horse {
                if !dash.dispatch(Action::SelectHorse(id)) {
                    writeln!(out, "note: horses cannot be selected on the {tab} tab")?;
                }
            }
            write!(out, "{}", view::render(dash.state()))?;
            loaded.wrap_err("failed to load game data")?;
        }
        Command::CreateUser { username } => {
            let mut form = UserForm::new(username);
            let user = dash
                .submit_user(&mut form)
                .await
                .ok_or_else(|| form_error(form.status()))?;
            writeln!(out, "created user {} {}", user.username, user.id)?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::CreateHorse {
            name,
            owner,
            sire,
            dam,
        } => {
            dash.load().await.wrap_err("failed to load users")?;
            let mut form = HorseForm::new(name);
            if !form.select_owner(dash.state().users(), owner) {
                return Err(eyre!("no user with id {owner}"));
            }
            form.sire_id = sire;
            form.dam_id = dam;
            let horse = dash
                .submit_horse(&mut form)
                .await
                .ok_or_else(|| form_error(form.status()))?;
            writeln!(out, "created horse {} {}", horse.name, horse.id)?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::CreateRace { name, at } => {
            let mut form = match cli.utc_offset {
                Some(offset) => RaceForm::with_offset(name, at, offset),
                None => RaceForm::new(name, at),
            };
            let race = dash
                .submit_race(&mut form)
                .await
                .ok_or_else(|| form_error(form.status()))?;
            writeln!(
                out,
                "created race {} at {} {}",
                race.name,
                race.scheduled_at.format("%Y-%m-%d %H:%M UTC"),
                race.id
            )?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::DeleteUser { id } => {
            dash.delete_user(id).await?;
            writeln!(out, "deleted user {id}")?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::DeleteHorse { id } => {
            dash.delete_horse(id).await?;
            writeln!(out, "deleted horse {id}")?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::DeleteRace { id } => {
            dash.delete_race(id).await?;
            writeln!(out, "deleted race {id}")?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::Simulate { race } => {
            dash.simulate_race(race).await?;
            write!(out, "{}", view::standings_table(&dash.state().standings()))?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::Train {
            horse,
            stat,
            points,
        } => {
            let outcome = dash.train_horse(horse, stat, points).await?;
            write!(out, "{}", view::training_outcome(&outcome))?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::Rest { horse } => {
            let outcome = dash.rest_horse(horse).await?;
            write!(out, "{}", view::rest_outcome(&outcome))?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::Breed {
            foal_name,
            sire,
            dam,
            owner,
        } => {
            let foal = dash
                .breed_horses(BreedHorsesRequest {
                    sire_id: sire,
                    dam_id: dam,
                    foal_name,
                    owner_id: owner,
                })
                .await?;
            writeln!(out, "bred {} {}", foal.name, foal.id)?;
            warn_on_refresh_error(&dash, out)?;
        }
        Command::Recommend { horse } => {
            let recs = dash.api().game().training_recommendations(horse).await?;
            write!(out, "{}", view::recommendations(&recs))?;
        }
        Command::RaceStats { race } => {
            let stats = dash.api().game().race_statistics(race).await?;
            write!(out, "{}", view::race_statistics(&stats))?;
        }
        Command::HorseStats { horse } => {
            let stats = dash.api().game().horse_stats(horse).await?;
            write!(out, "{}", view::horse_stats(&stats))?;
        }
        Command::Upcoming => {
            let races = dash.api().races().upcoming().await?;
            write!(out, "{}", view::race_list(&races))?;
        }
        Command::OwnedBy { owner } => {
            let horses = dash.api().horses().by_owner(owner).await?;
            write!(out, "{}", view::horse_cards(&horses, None))?;
        }
    }
    Ok(())
}
