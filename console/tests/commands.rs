//! Console subcommands end-to-end against a seeded mock server.

use clap::Parser;
use paddock_console::{dashboard, run, Cli};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with(listener, mock_server::Store::demo()));
    format!("http://{addr}/api/v1")
}

async fn exec(api_url: &str, args: &[&str]) -> (color_eyre::Result<()>, String) {
    let mut argv = vec!["paddock", "--api-url", api_url];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let result = run(cli, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn show_renders_seeded_roster() {
    let url = start_server().await;
    let (result, out) = exec(&url, &["show"]).await;
    result.unwrap();
    assert!(out.starts_with("Paddock\n"));
    assert!(out.contains("Users (1)  Horses (3)  Races (1)"));
    assert!(out.contains("[horses] | races | training | breeding"));
    assert!(out.contains("Silence Suzuka (Lv 1) owner trainer"));
}

#[tokio::test(flavor = "multi_thread")]
async fn show_notes_selection_on_wrong_tab() {
    let url = start_server().await;
    let id = uuid::Uuid::new_v4().to_string();
    let (result, out) = exec(&url, &["show", "--tab", "races", "--horse", &id]).await;
    result.unwrap();
    assert!(out.starts_with("note: horses cannot be selected on the races tab\n"));
    assert!(out.contains("Maiden Stakes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_user_fails_with_backend_message() {
    let url = start_server().await;
    let (result, out) = exec(&url, &["create-user", "rookie"]).await;
    result.unwrap();
    assert!(out.starts_with("created user rookie "));

    let (result, _) = exec(&url, &["create-user", "rookie"]).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "HTTP 400: username already taken"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn create_horse_rejects_unknown_owner_locally() {
    let url = start_server().await;
    let stranger = uuid::Uuid::new_v4();
    let (result, out) = exec(&url, &["create-horse", "Comet", "--owner", &stranger.to_string()]).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        format!("no user with id {stranger}")
    );
    assert!(out.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_race_uses_given_offset() {
    let url = start_server().await;
    let (result, out) = exec(
        &url,
        &[
            "--utc-offset",
            "+09:00",
            "create-race",
            "Night Cup",
            "--at",
            "2099-04-06T15:40",
        ],
    )
    .await;
    result.unwrap();
    assert!(out.starts_with("created race Night Cup at 2099-04-06 06:40 UTC"));

    let (result, out) = exec(&url, &["upcoming"]).await;
    result.unwrap();
    assert!(out.contains("Night Cup"));
    assert!(out.contains("Maiden Stakes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn race_day() {
    let url = start_server().await;
    let mut dash = dashboard(&url);
    dash.load().await.unwrap();
    let race = dash.state().races()[0].id.to_string();
    let star = dash
        .state()
        .horses()
        .iter()
        .find(|h| h.name == "Silence Suzuka")
        .unwrap()
        .id
        .to_string();
    let owner = dash.state().users()[0].id.to_string();
    let other = dash
        .state()
        .horses()
        .iter()
        .find(|h| h.name == "Special Week")
        .unwrap()
        .id
        .to_string();

    let (result, out) = exec(&url, &["race-stats", &race]).await;
    result.unwrap();
    assert_eq!(out, "No results found for this race\n");

    let (result, out) = exec(&url, &["simulate", &race]).await;
    result.unwrap();
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("Results"));
    let winner = lines.next().unwrap();
    assert!(winner.trim_start().starts_with("1. Silence Suzuka"));
    assert!(winner.ends_with("+1000"));

    let (result, _) = exec(&url, &["simulate", &race]).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "HTTP 400: race already completed"
    );

    let (result, out) = exec(&url, &["race-stats", &race]).await;
    result.unwrap();
    assert!(out.starts_with("participants 3"));
    assert!(out.contains("prize pool 1500"));

    let (result, out) = exec(&url, &["train", &star, "--stat", "power", "--points", "4"]).await;
    result.unwrap();
    assert_eq!(out, "Trained power by 4 points\n");

    let (result, out) = exec(&url, &["train", &star, "--stat", "power", "--points", "50"]).await;
    result.unwrap();
    assert_eq!(out, "Not enough training points (needs 50, has 6)\n");

    let (result, out) = exec(&url, &["rest", &star]).await;
    result.unwrap();
    assert_eq!(out, "Horse rested (+3 training points)\n");

    let (result, out) = exec(&url, &["recommend", &star]).await;
    result.unwrap();
    assert!(out.starts_with("train guts (now 50, 50 to max); 9 available"));

    let (result, out) = exec(&url, &["horse-stats", &star]).await;
    result.unwrap();
    assert!(out.contains("won 1/1 (100%)"));

    let (result, out) = exec(
        &url,
        &[
            "breed", "Foal", "--sire", &star, "--dam", &other, "--owner", &owner,
        ],
    )
    .await;
    result.unwrap();
    assert!(out.starts_with("bred Foal "));

    let (result, out) = exec(&url, &["owned-by", &owner]).await;
    result.unwrap();
    assert_eq!(out.lines().count(), 4);

    let (result, out) = exec(&url, &["show", "--tab", "breeding"]).await;
    result.unwrap();
    assert!(out.contains("Foal  sire Silence Suzuka  dam Special Week  generations 2"));

    let (result, out) = exec(&url, &["delete-race", &race]).await;
    result.unwrap();
    assert_eq!(out, format!("deleted race {race}\n"));

    let (result, _) = exec(&url, &["delete-race", &race]).await;
    assert_eq!(result.unwrap_err().to_string(), "HTTP 404: race not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_still_renders_error_banner() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let url = format!("http://{addr}/api/v1");
    let (result, out) = exec(&url, &["show"]).await;
    assert!(result.is_err());
    assert!(out.contains("Error: transport failed"));
    assert!(out.contains("Users (0)  Horses (0)  Races (0)"));
}
