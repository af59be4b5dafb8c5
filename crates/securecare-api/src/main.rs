//! SecureCare API - patient records with envelope-encrypted documents

use clap::Parser;
use securecare_api::{run_server, ApiConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "securecare-api")]
#[command(about = "Patient records API with envelope-encrypted document storage")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SECURECARE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "SECURECARE_PORT")]
    port: u16,

    /// SQLite database path
    #[arg(long, default_value = "securecare.db", env = "SECURECARE_DATABASE")]
    database: String,

    /// Use in-memory stores (for testing, data will not persist)
    #[arg(long, env = "SECURECARE_MEMORY_STORE")]
    memory_store: bool,

    /// Bucket holding the encrypted objects
    #[arg(long, default_value = "", env = "B2_BUCKET")]
    bucket: String,

    /// S3-compatible endpoint (e.g. https://s3.us-west-004.backblazeb2.com)
    #[arg(long, env = "B2_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 region name
    #[arg(long, default_value = "us-east-1", env = "B2_REGION")]
    s3_region: String,

    /// S3 access key id
    #[arg(long, default_value = "", env = "B2_KEY_ID")]
    s3_access_key_id: String,

    /// S3 secret access key
    #[arg(long, default_value = "", env = "B2_APPLICATION_KEY")]
    s3_secret_access_key: String,

    /// Base64 master secret wrapping every file key (required)
    #[arg(long, default_value = "", env = "MASTER_KEY")]
    master_key: String,

    /// JWT signing secret
    #[arg(long, default_value = "dev_secret_change_me", env = "JWT_SECRET_KEY")]
    jwt_secret: String,

    /// Enable debug logging
    #[arg(short, long, env = "SECURECARE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("securecare_api={},tower_http=debug", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SecureCare API on {}:{}", args.host, args.port);

    if args.memory_store {
        tracing::warn!("⚠️  Using in-memory storage - data will NOT persist!");
    }

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        database_path: args.database,
        use_memory_store: args.memory_store,
        bucket: args.bucket,
        s3_endpoint: args.s3_endpoint,
        s3_region: args.s3_region,
        s3_access_key_id: args.s3_access_key_id,
        s3_secret_access_key: args.s3_secret_access_key,
        master_key: args.master_key,
        jwt_secret: args.jwt_secret,
        ..Default::default()
    };

    run_server(config).await
}
