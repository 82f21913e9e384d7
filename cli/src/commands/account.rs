//! Account commands

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::OutputFormat;

pub async fn signup(
    client: &ApiClient,
    name: &str,
    email: &str,
    password: &str,
    format: OutputFormat,
) -> Result<(), String> {
    let user = client.signup(name, email, password).await?;
    match format {
        OutputFormat::Table => println!("Created user: {} <{}>", user.name, user.email),
        _ => format.print(&user),
    }
    Ok(())
}

pub async fn login(
    client: &ApiClient,
    config: &mut Config,
    profile: Option<&str>,
    email: &str,
    password: &str,
) -> Result<(), String> {
    let session = client.login(email, password).await?;
    println!("Logged in as {} <{}>", session.user.name, session.user.email);
    config.session = Some(session);
    config.save(profile)
}

pub fn logout(config: &mut Config, profile: Option<&str>) -> Result<(), String> {
    if config.session.take().is_none() {
        println!("Not logged in");
        return Ok(());
    }
    config.save(profile)?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(config: &Config, format: OutputFormat) -> Result<(), String> {
    let session = config.session.as_ref().ok_or("Not logged in")?;
    match format {
        OutputFormat::Table => println!(
            "{} <{}> ({})",
            session.user.name, session.user.email, session.user.id
        ),
        _ => format.print(&session.user),
    }
    Ok(())
}
