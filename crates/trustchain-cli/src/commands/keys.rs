//! Key management commands.
//!
//! `trustchain keys generate` - Generate a new Ed25519 keypair.

use std::fs;
use std::path::PathBuf;
use trustchain_tokens::KeyPair;

/// Generate a new Ed25519 keypair.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate();

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)?;

        let private_path = output_dir.join("private.key");
        let public_path = output_dir.join("public.key");
        keypair.save_to_files(&private_path, &public_path)?;

        tracing::info!(public_key = %keypair.public_key_hex(), "generated keypair");

        println!("✔ Generated Ed25519 keypair:");
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Set as environment variable for issuing tokens:");
        println!(
            "  export TRUSTCHAIN_PRIVATE_KEY=$(cat {})",
            private_path.display()
        );
    } else {
        println!("Private key (keep secure!):");
        println!("{}", keypair.private_key_hex());
        println!();
        println!("Public key:");
        println!("{}", keypair.public_key_hex());
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}
