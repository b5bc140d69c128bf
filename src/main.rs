use chess_master::ai::{RandomAi, UciEngine};
use chess_master::cli;
use chess_master::config::{AppConfig, PlayMode};
use chess_master::engine::Rules;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they stay out of the board on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_master=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    let rules = Rules::new(config.castling);

    tracing::info!(
        mode = ?config.mode,
        difficulty = %config.difficulty,
        castling = ?config.castling,
        "chess-master v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    match (config.mode, config.engine_path.as_deref()) {
        (PlayMode::Local, _) => {
            cli::run::<_, _, RandomAi>(input, output, rules, None).await?;
        }
        (PlayMode::Computer, Some(path)) => {
            let mut engine =
                UciEngine::spawn(path, &[], config.difficulty, config.engine_timeout()).await?;
            let result = cli::run(input, output, rules, Some(&mut engine)).await;
            if let Err(e) = engine.quit().await {
                tracing::warn!(error = %e, "engine shutdown failed");
            }
            result?;
        }
        (PlayMode::Computer, None) => {
            let mut ai = RandomAi::new(config.seed);
            cli::run(input, output, rules, Some(&mut ai)).await?;
        }
    }

    Ok(())
}
