use anyhow::{Context, bail};

use itematic_client::{ClientConfig, ClientContext, SessionError, translate};

const ENV_PASSWORD: &str = "ITEMATIC_PASSWORD";

const USAGE: &str = "usage: itematic <login <username> | logout | whoami | health>";

enum Command {
    Login { username: String },
    Logout,
    WhoAmI,
    Health,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let command = match args.next().as_deref() {
        Some("login") => {
            let username = args.next().context(USAGE)?;
            Command::Login { username }
        }
        Some("logout") => Command::Logout,
        Some("whoami") => Command::WhoAmI,
        Some("health") => Command::Health,
        _ => bail!(USAGE),
    };
    if args.next().is_some() {
        bail!(USAGE);
    }
    Ok(command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    itematic_observability::init();

    let command = parse_args(std::env::args().skip(1))?;
    let config = ClientConfig::from_env()?;
    let ctx = ClientContext::from_config(config).context("failed to set up the client")?;

    match command {
        Command::Login { username } => {
            let password = std::env::var(ENV_PASSWORD)
                .with_context(|| format!("{ENV_PASSWORD} must hold the password"))?;
            match ctx.session.login(&username, &password).await {
                Ok(user) => println!(
                    "signed in as {} ({})",
                    user.username,
                    user.role.as_ref().map(|r| r.as_str()).unwrap_or("no role")
                ),
                Err(err @ SessionError::Api(_)) => bail!(err.display()),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Logout => {
            ctx.session.logout().await;
            println!("signed out");
        }
        Command::WhoAmI => match ctx.session.user() {
            Some(user) => {
                println!("{}", serde_json::to_string_pretty(&user)?);
                let caps = ctx.capabilities();
                println!("{}", serde_json::to_string_pretty(&caps)?);
            }
            None => println!("not signed in"),
        },
        Command::Health => match ctx.health.check().await {
            Ok(status) => println!("backend status: {}", status.status),
            Err(err) => bail!(translate(&err)),
        },
    }

    Ok(())
}
