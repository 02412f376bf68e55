//! Token management commands.
//!
//! `trustchain token org` - Issue a chain issuer token signed by the org issuer.
//! `trustchain token client` - Issue a client token through a chain issuer.
//! `trustchain token inspect` - Show a token's claims without verification.
//! `trustchain token verify` - Verify a token against trusted org issuers.

use anyhow::{Context, bail};
use std::fs;
use std::path::{Path, PathBuf};
use trustchain_core::{TrustChainConfig, parse_duration};
use trustchain_tokens::keys::{encode_public_key, load_public_key_file, load_public_key_hex};
use trustchain_tokens::{
    ChainVerifier, Claims, ClientIdClaims, KeyPair, PublicKey, StandardClaims, VerifiedChain,
};

/// Resolve a private key from either a file path or a hex-encoded string.
///
/// The key string can be:
/// - A path to a file containing a hex-encoded private key
/// - A hex-encoded private key directly (e.g., from TRUSTCHAIN_PRIVATE_KEY env var)
fn resolve_private_key(key: Option<String>) -> anyhow::Result<KeyPair> {
    let key_str = key.context(
        "Private key not provided. Either pass --key <path> or set TRUSTCHAIN_PRIVATE_KEY env var",
    )?;

    let path = Path::new(&key_str);
    if path.exists() {
        return KeyPair::load_from_file(path)
            .with_context(|| format!("Failed to load private key from file: {}", path.display()));
    }

    KeyPair::from_private_key_hex(key_str.trim())
        .context("Failed to parse private key. Expected hex-encoded Ed25519 private key")
}

/// Resolve a public key from either a file path or a hex-encoded string.
fn resolve_public_key(key: &str) -> anyhow::Result<PublicKey> {
    let path = Path::new(key);
    if path.exists() {
        return load_public_key_file(path)
            .with_context(|| format!("Failed to load public key from file: {}", path.display()));
    }

    load_public_key_hex(key)
        .context("Failed to parse public key. Expected hex-encoded Ed25519 public key")
}

fn read_claims<C: Claims>(path: &Path) -> anyhow::Result<C> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token: {}", path.display()))?;
    C::from_json(&json).with_context(|| format!("Failed to parse token: {}", path.display()))
}

fn write_claims<C: Claims>(claims: &C, output: Option<PathBuf>) -> anyhow::Result<()> {
    let json = claims.to_json()?;

    if let Some(output_path) = output {
        fs::write(&output_path, &json)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  ID:      {}", claims.standard().id);
        println!("  Issuer:  {}", claims.standard().issuer);
        println!("  Expires: {}", claims.standard().expire_time());
    } else {
        println!("{json}");
    }

    Ok(())
}

/// Parse the requested lifetime, capped by `max_token_lifetime` when a config is given.
fn issue_validity(expires: &str, config: Option<&Path>) -> anyhow::Result<chrono::Duration> {
    let validity = parse_duration(expires)?;
    if validity <= chrono::Duration::zero() {
        bail!("Token lifetime must be positive, got {expires:?}");
    }

    let Some(config_path) = config else {
        return Ok(validity);
    };
    let config = TrustChainConfig::from_file(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    match config.issuer.max_token_lifetime()? {
        Some(max) if validity > max => bail!(
            "Token lifetime {expires} exceeds max_token_lifetime {}",
            config.issuer.max_token_lifetime.as_deref().unwrap_or_default()
        ),
        _ => Ok(validity),
    }
}

/// Create a chain issuer token for `public_key`, signed by the org issuer key.
pub fn issue_org_token(
    org: &KeyPair,
    subject: &str,
    public_key: &PublicKey,
    validity: chrono::Duration,
) -> anyhow::Result<ClientIdClaims> {
    let mut token = ClientIdClaims::new(subject, validity, public_key);
    token.standard.set_org_issuer(&org.public_key());

    let data = token.standard.org_issuer_chain_data()?;
    token
        .standard
        .set_chain_issuer_trust_signature(&org.sign(&data).to_bytes());

    Ok(token)
}

/// Create a client token for `public_key`, issued by the chain issuer `handler`.
pub fn issue_client_token(
    handler_key: &KeyPair,
    handler: &ClientIdClaims,
    subject: &str,
    public_key: &PublicKey,
    validity: chrono::Duration,
) -> anyhow::Result<ClientIdClaims> {
    if !handler.standard.is_chained_issuer(false) {
        bail!("Token {} is not a chained issuer", handler.standard.id);
    }
    if handler.standard.public_key != handler_key.public_key_hex() {
        bail!("Private key does not belong to the issuer token subject");
    }

    let mut token = ClientIdClaims::new(subject, validity, public_key);
    token.standard.set_chain_issuer(handler)?;

    let data = token
        .standard
        .chain_issuer_data(&handler.standard.trust_chain_signature)?;
    token
        .standard
        .set_chain_user_trust_signature(handler, &handler_key.sign(&data).to_bytes());

    Ok(token)
}

/// Issue a chain issuer token signed by the org issuer.
pub fn org(
    private_key: Option<String>,
    subject: String,
    public_key: String,
    expires: String,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let org = resolve_private_key(private_key)?;
    let public_key = resolve_public_key(&public_key)?;
    let validity = issue_validity(&expires, config.as_deref())?;

    let token = issue_org_token(&org, &subject, &public_key, validity)?;
    tracing::info!(id = %token.standard.id, subject = %subject, "issued chain issuer token");

    write_claims(&token, output)
}

/// Issue a client token through a chain issuer.
pub fn client(
    private_key: Option<String>,
    issuer_token: PathBuf,
    subject: String,
    public_key: String,
    expires: String,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let handler_key = resolve_private_key(private_key)?;
    let handler: ClientIdClaims = read_claims(&issuer_token)?;
    let public_key = resolve_public_key(&public_key)?;
    let validity = issue_validity(&expires, config.as_deref())?;

    let token = issue_client_token(&handler_key, &handler, &subject, &public_key, validity)?;
    tracing::info!(
        id = %token.standard.id,
        issuer = %handler.standard.id,
        subject = %subject,
        "issued client token"
    );

    write_claims(&token, output)
}

/// Inspect a token without verification.
pub fn inspect(token: PathBuf) -> anyhow::Result<()> {
    let claims: StandardClaims = read_claims(&token)?;

    println!("Token Information:");
    println!("  ID:        {}", claims.id);
    println!("  Subject:   {}", claims.subject);
    println!("  Purpose:   {:?}", claims.purpose);
    println!("  Issuer:    {}", claims.issuer);
    println!("  Expires:   {}", claims.expire_time());
    println!("  Expired:   {}", claims.is_expired());
    println!("  Chained issuer: {}", claims.is_chained_issuer(false));

    Ok(())
}

/// Outcome of a successful `verify`.
#[derive(Debug, PartialEq, Eq)]
pub enum Verified {
    /// A token signed directly by the org issuer.
    Org(PublicKey),
    /// A client token and its chain issuer.
    Client(VerifiedChain),
}

/// Verify a token, and its creator when it was issued by a chain issuer.
pub fn verify_token(
    token: &Path,
    creator: Option<&Path>,
    config: Option<&Path>,
    anchors: &[String],
) -> anyhow::Result<Verified> {
    let mut verifier_anchors = anchors
        .iter()
        .map(|anchor| resolve_public_key(anchor))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut require_issuer_expiry = false;

    if let Some(config_path) = config {
        let config = TrustChainConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
        let configured = ChainVerifier::from_config(&config.issuer)?;
        verifier_anchors.extend_from_slice(configured.anchors());
        require_issuer_expiry = config.issuer.require_issuer_expiry;
    }

    if verifier_anchors.is_empty() {
        bail!("No trusted org issuers. Pass --anchor <key> or --config <file>");
    }

    let verifier =
        ChainVerifier::new(verifier_anchors).with_required_issuer_expiry(require_issuer_expiry);
    let claims: StandardClaims = read_claims(token)?;

    match creator {
        Some(creator_path) => {
            let creator: StandardClaims = read_claims(creator_path)?;
            Ok(Verified::Client(verifier.verify_client(&claims, &creator)?))
        }
        None => Ok(Verified::Org(verifier.verify_issuer(&claims)?)),
    }
}

/// Verify a token against the trusted org issuers.
pub fn verify(
    token: PathBuf,
    creator: Option<PathBuf>,
    config: Option<PathBuf>,
    anchors: Vec<String>,
) -> anyhow::Result<()> {
    match verify_token(&token, creator.as_deref(), config.as_deref(), &anchors)? {
        Verified::Org(org) => {
            println!("✔ Token is valid");
            println!("  Org issuer: {}", encode_public_key(&org));
        }
        Verified::Client(chain) => {
            println!("✔ Token is valid");
            println!("  Org issuer:   {}", encode_public_key(&chain.org_issuer));
            println!("  Chain issuer: {}", encode_public_key(&chain.chain_issuer));
        }
    }

    Ok(())
}
