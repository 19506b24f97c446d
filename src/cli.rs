use clap::{Parser, Subcommand};

/// Diagnostic probes against a Mobius oneM2M CSE.
#[derive(Debug, Parser)]
#[command(name = "mobius-probe", version, about)]
pub struct Cli {
    /// Base URL of the CSE (scheme, host, port)
    #[arg(long, global = true, default_value = "http://localhost:7599")]
    pub cse_url: String,

    /// Resource name of the CSE base
    #[arg(long, global = true, default_value = "Mobius")]
    pub cse_base: String,

    /// Requester identity sent as X-M2M-Origin
    #[arg(long, global = true, default_value = "SM")]
    pub origin: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 5)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a CIN through the backend API and print the exchange
    BackendCin {
        /// Base URL of the backend
        #[arg(long, default_value = "http://127.0.0.1:8008")]
        backend_url: String,

        /// Node id path segment of /nodes/create-cin/{id}
        #[arg(long, default_value = "1")]
        node_id: String,

        /// Bearer token for the backend
        #[arg(long, default_value = "4d0a2259bcdde9d8f6953812e5f1eb26")]
        token: String,

        /// Value sent as the tds payload
        #[arg(long, default_value = "example")]
        content: String,
    },

    /// Probe the response shapes of AE, container and CIN reads
    Response {
        /// Vertical short name, e.g. AE-WM
        vertical: String,

        /// Node (AE) resource name
        node: String,

        /// Container resource name
        #[arg(default_value = "Data")]
        container: String,
    },

    /// Create a CIN at an unstructured path to trigger subscriptions
    Trigger {
        /// Unstructured target path, e.g. ~/lmsb7lz7d1/3-20251031100851365535
        target: String,

        /// X-M2M-Origin for the triggering create
        #[arg(long = "trigger-origin", default_value = "SOrigin")]
        origin: String,
    },

    /// Full subscription/notification round trip with a local listener
    Subscription {
        /// Vertical short name, e.g. AE-WM
        vertical: String,

        /// Node (AE) resource name
        node: String,

        /// Container resource name
        #[arg(default_value = "Data")]
        container: String,

        /// Local port the callback listener binds (0 = ephemeral)
        #[arg(long, default_value_t = 8888)]
        listen_port: u16,

        /// Seconds to wait for the notification callback
        #[arg(long, default_value_t = 3)]
        wait_secs: u64,
    },
}

/// Parse the command line. Usage errors print the message and exit 1
/// before any network activity; --help and --version still exit 0.
pub fn parse() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}
