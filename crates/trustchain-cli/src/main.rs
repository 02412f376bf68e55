use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "trustchain", version, about = "Trust chain token CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key management (generate)
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Token management (org/client/inspect/verify)
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new Ed25519 keypair
    Generate {
        /// Directory to write private.key and public.key into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a chain issuer token signed by the org issuer key
    Org {
        /// Org issuer private key (file path or hex)
        #[arg(long, env = "TRUSTCHAIN_PRIVATE_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Subject of the token, e.g. "handler=login"
        #[arg(long)]
        subject: String,

        /// Public key of the chain issuer (file path or hex)
        #[arg(long)]
        public_key: String,

        /// Token lifetime (e.g. 30m, 24h, 7d)
        #[arg(long, default_value = "1h")]
        expires: String,

        /// Configuration file whose max_token_lifetime caps --expires
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the token to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Issue a client token through a chain issuer
    Client {
        /// Chain issuer private key (file path or hex)
        #[arg(long, env = "TRUSTCHAIN_PRIVATE_KEY", hide_env_values = true)]
        key: Option<String>,

        /// The chain issuer's own token
        #[arg(long)]
        issuer_token: PathBuf,

        /// Subject of the token, e.g. "user=alice"
        #[arg(long)]
        subject: String,

        /// Public key of the client (file path or hex)
        #[arg(long)]
        public_key: String,

        /// Token lifetime (e.g. 30m, 24h, 7d)
        #[arg(long, default_value = "1h")]
        expires: String,

        /// Configuration file whose max_token_lifetime caps --expires
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the token to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a token's claims without verifying it
    Inspect { token: PathBuf },

    /// Verify a token against trusted org issuers
    Verify {
        token: PathBuf,

        /// Token of the chain issuer that created TOKEN
        #[arg(long)]
        creator: Option<PathBuf>,

        /// Configuration file listing trusted org issuers
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Trusted org issuer public key (file path or hex). May be repeated.
        #[arg(long = "anchor")]
        anchors: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Org {
                key,
                subject,
                public_key,
                expires,
                config,
                output,
            } => commands::token::org(key, subject, public_key, expires, config, output)?,
            TokenCommand::Client {
                key,
                issuer_token,
                subject,
                public_key,
                expires,
                config,
                output,
            } => commands::token::client(
                key,
                issuer_token,
                subject,
                public_key,
                expires,
                config,
                output,
            )?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
            TokenCommand::Verify {
                token,
                creator,
                config,
                anchors,
            } => commands::token::verify(token, creator, config, anchors)?,
        },
    }

    Ok(())
}
