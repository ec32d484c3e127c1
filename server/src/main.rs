//! liftops-server: serves the REST API, runs the schema migration or prints the DDL.
//!
//! Settings come from the environment (see `liftops::Settings`); `.env` is read if present.

use clap::{Parser, Subcommand};
use liftops::{apply_migrations, app, connect, ensure_database_exists, schema_sql, AppState, PgStore, Settings, TABLES};
use std::process::ExitCode;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "liftops-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API until SIGINT or SIGTERM (default).
    Serve {
        /// Apply the schema migration before serving.
        #[arg(long)]
        migrate: bool,
    },
    /// Apply the schema migration and exit.
    Migrate,
    /// Print the DDL for every table and exit.
    Schema,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env_file = liftops::settings::load_env_file();
    liftops::telemetry::init_tracing();
    match env_file {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "could not read .env"),
    }
    let settings = Settings::from_env();

    let result = match settings {
        Ok(settings) => run(cli.command.unwrap_or(Command::Serve { migrate: false }), settings).await,
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "liftops-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: Settings) -> Result<(), BoxError> {
    match command {
        Command::Schema => {
            for statement in schema_sql(TABLES) {
                println!("{};\n", statement);
            }
            Ok(())
        }
        Command::Migrate => {
            let store = open_store(&settings).await?;
            apply_migrations(&store, TABLES, &settings.environment).await?;
            Ok(())
        }
        Command::Serve { migrate } => {
            let store = open_store(&settings).await?;
            if migrate {
                apply_migrations(&store, TABLES, &settings.environment).await?;
            }
            serve(store, &settings).await
        }
    }
}

async fn open_store(settings: &Settings) -> Result<PgStore, BoxError> {
    ensure_database_exists(&settings.database_url).await?;
    let store = connect(settings).await?;
    tracing::info!(max_connections = settings.max_connections, "connected to database");
    Ok(store)
}

/// Run the server on a background task; return when a termination signal arrives.
async fn serve(store: PgStore, settings: &Settings) -> Result<(), BoxError> {
    let router = app(AppState::new(store), settings.body_limit_bytes);
    let listener = TcpListener::bind(settings.listen_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    let server = tokio::spawn(async move { axum::serve(listener, router).await });
    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("shutting down");
            Ok(())
        }
        joined = server => match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(e.into()),
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
