use anyhow::Result;
use clap::Parser;
use log::debug;
use ssh2fa::{CredentialStore, Error, SessionDriver, TargetAddress, TotpGenerator};

/// SSH login automation for password + TOTP two-factor prompts.
///
/// Spawns `ssh` on a pseudo-terminal, answers the `Password:` and
/// `Verification code:` prompts automatically, then hands the session over
/// as a normal interactive terminal. Codes come from `totp-cli`; the vault
/// password is taken from `TOTP_PASS` or prompted once per run.
#[derive(Parser, Debug)]
#[command(name = "ssh2fa", version)]
struct Args {
    /// Server to connect to, as `host` or `user@host`
    server: String,

    /// totp-cli namespace holding the server's TOTP secret
    namespace: String,

    /// Username, ignored when the server argument already contains one
    username: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    // clap exits with 2 on bad arguments; the contract here is usage + 1.
    // Help and version go through the same Err path but are not errors.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        let code = match err.downcast_ref::<Error>() {
            Some(Error::ChildExit { code }) => *code as i32,
            _ => 1,
        };
        std::process::exit(code.max(1));
    }
}

async fn run(args: Args) -> Result<()> {
    let target = TargetAddress::compose(&args.server, args.username.as_deref());
    debug!("target address: {target}");

    let mut store = CredentialStore::from_env("Password");
    let password = store.get_or_prompt()?;

    // The generator identity is the full composed target, user part included.
    let code =
        TotpGenerator::default().generate(&mut store, &args.namespace, &target.to_string())?;

    SessionDriver::new(&format!("ssh {target}"))
        .run(&password, &code)
        .await?;

    Ok(())
}
