// Authors: Robert Lopez

use clap::{Parser, Subcommand};
use presigned_post::{
    config::{ClientConfig, IssuerConfig, ServerConfig},
    core::{
        flow::{PathFileSource, StdoutSink, UploadFlow},
        issuer::PresignedPostIssuer,
        server,
    },
    error::Error,
    Uploader,
};
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing::error;

#[derive(Parser)]
#[command(version, about = "Upload files through S3 pre-signed POST forms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the signed post endpoint
    Serve,
    /// Upload one file
    Upload {
        file: PathBuf,
        /// Signed post endpoint, overrides SIGNED_POST_URL
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },
}

async fn serve() -> Result<(), Error> {
    let issuer = PresignedPostIssuer::from_config(IssuerConfig::from_env()?).await?;
    let listener = TcpListener::bind(ServerConfig::from_env()?.addr()).await?;

    server::serve(listener, Arc::new(issuer)).await
}

async fn upload(
    file: PathBuf,
    endpoint: Option<String>,
    content_type: Option<String>,
) -> Result<bool, Error> {
    let mut config = ClientConfig::from_env();
    if let Some(endpoint) = endpoint {
        config.signed_post_url = endpoint;
    }

    let flow = UploadFlow::new(
        Arc::new(Uploader::from_config(&config)),
        Box::new(PathFileSource {
            path: file,
            content_type,
        }),
        Box::new(StdoutSink),
    );

    Ok(flow.trigger().await?.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match Cli::parse().command {
        Command::Serve => serve().await.map(|_| true),
        Command::Upload {
            file,
            endpoint,
            content_type,
        } => upload(file, endpoint, content_type).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}
