use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use survey_client::api::{Draft, HttpFormApi};
use survey_client::config::Config;
use survey_client::i18n::{LanguageStrings, TranslationStore};
use survey_client::shell::{SurveyEvent, SurveyRenderer, SurveyShell, SurveyView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Renders surveys as plain text on stdout.
struct ConsoleRenderer;

impl SurveyRenderer for ConsoleRenderer {
    fn show_loading(&mut self, message: &str) {
        println!("{}", message);
    }

    fn render(&mut self, view: &SurveyView) {
        println!();
        println!(
            "== {} [{}] ==",
            view.title,
            view.language.config().native_name
        );
        if let Some(logo) = &view.logo_url {
            println!("logo: {}", logo);
        }

        let pages = view.document["pages"].as_array().cloned().unwrap_or_default();
        for page in pages {
            let elements = page["elements"].as_array().cloned().unwrap_or_default();
            for element in elements {
                let name = element["name"].as_str().unwrap_or("?");
                let label = element["title"]
                    .as_str()
                    .or_else(|| element["html"].as_str())
                    .unwrap_or(name);
                println!("  {} ({}): {}", name, element["type"].as_str().unwrap_or("?"), label);
            }
        }
        println!(
            "commands: set <field>=<value> | save | done | lang ({}) | go /<lang>/<form> | quit",
            view.switch_language
        );
    }

    fn show_thank_you(&mut self, strings: &LanguageStrings) {
        println!();
        println!("{}", strings.thank_you_title);
        println!("{}", strings.thank_you_message);
    }

    fn redirect(&mut self, url: &str) {
        println!("Redirecting to {}", url);
    }
}

/// Parse a typed answer as JSON, falling back to a plain string.
fn parse_answer(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Read commands from stdin and turn them into shell input.
async fn read_commands(
    translations: TranslationStore,
    routes: mpsc::Sender<String>,
    events: mpsc::Sender<SurveyEvent>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut draft = Draft::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => continue,
            "set" => match rest.split_once('=') {
                Some((field, value)) => {
                    draft.insert(field.trim().to_string(), parse_answer(value.trim()));
                    events.send(SurveyEvent::ValueChanged(draft.clone())).await?;
                }
                None => warn!("Usage: set <field>=<value>"),
            },
            "save" => events.send(SurveyEvent::PartialSubmit(draft.clone())).await?,
            "done" => events.send(SurveyEvent::Complete(draft.clone())).await?,
            "lang" => {
                translations.toggle();
            }
            "go" => {
                draft.clear();
                routes.send(rest.trim().to_string()).await?;
            }
            "quit" => break,
            other => warn!("Unknown command: {}", other),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("survey_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!("Using form backend at {}", config.api_base_url);

    let initial_path = std::env::args().nth(1).unwrap_or_default();
    let browser_language = std::env::var("LANG").ok();

    let translations = TranslationStore::default();
    let transport = Arc::new(HttpFormApi::new(&config));
    let shell = SurveyShell::new(&config, transport, translations.clone(), ConsoleRenderer)
        .with_browser_language(browser_language);

    let (route_tx, route_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::channel(32);
    route_tx.send(initial_path).await?;

    let shell_task = tokio::spawn(shell.run(route_rx, event_rx));

    let result = read_commands(translations, route_tx, event_tx).await;

    // Closing the route stream tears the shell down
    shell_task.await?;
    result
}
