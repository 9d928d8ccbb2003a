use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Port the HTTP API listens on.
    #[clap(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// OAuth client id. Falls back to the client secret file when unset.
    #[clap(long, env = "GOOGLE_CLIENT_ID")]
    pub client_id: Option<String>,

    #[clap(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the OAuth client.
    #[clap(long, env = "GOOGLE_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Google `client_secret.json` downloaded from the cloud console.
    #[clap(long, default_value = "client_secret.json")]
    pub client_secret_file: PathBuf,

    /// Maximum number of messages fetched per listing.
    #[clap(long, default_value_t = 500)]
    pub list_cap: usize,

    /// Maximum number of concurrent calls to the Gmail API per request.
    #[clap(long, default_value_t = 10)]
    pub concurrency: usize,

    /// Move messages to trash instead of deleting them permanently.
    #[clap(long)]
    pub trash: bool,

    /// Origin allowed to call the API from a browser. Repeatable.
    #[clap(
        long = "allowed-origin",
        default_values = ["http://localhost:5173", "http://localhost:3000"]
    )]
    pub allowed_origins: Vec<String>,
}
