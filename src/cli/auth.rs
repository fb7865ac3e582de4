use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::auth::{AuthService, ProfileUpdate};
use crate::core::AppConfig;
use crate::storage::KvStore;

use super::startup_error;

fn prompt_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_owned())
}

pub async fn login(
    config: &AppConfig,
    kv: Arc<dyn KvStore>,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let auth = AuthService::from_config(config, kv).map_err(startup_error)?;
    let password = prompt_password(password)?;
    let user = auth.login(email, &password).await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn register(
    config: &AppConfig,
    kv: Arc<dyn KvStore>,
    name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let auth = AuthService::from_config(config, kv).map_err(startup_error)?;
    let password = prompt_password(password)?;
    let user = auth.register(name, email, &password).await?;
    println!("Registered and signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub fn logout(config: &AppConfig, kv: Arc<dyn KvStore>) -> Result<()> {
    AuthService::from_config(config, kv).map_err(startup_error)?.logout()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(config: &AppConfig, kv: Arc<dyn KvStore>) -> Result<()> {
    let auth = AuthService::from_config(config, kv).map_err(startup_error)?;
    match auth.current_user()? {
        Some(user) if auth.is_authenticated()? => {
            println!("{} <{}> (id {})", user.name, user.email, user.id);
            if let Some(avatar) = user.avatar {
                println!("avatar: {}", avatar);
            }
        }
        _ => println!("Not signed in"),
    }
    Ok(())
}

pub async fn profile(
    config: &AppConfig,
    kv: Arc<dyn KvStore>,
    name: Option<String>,
    email: Option<String>,
    avatar: Option<String>,
) -> Result<()> {
    if name.is_none() && email.is_none() && avatar.is_none() {
        bail!("Nothing to update, pass \"--name\", \"--email\", and/or \"--avatar\"");
    }
    let auth = AuthService::from_config(config, kv).map_err(startup_error)?;
    let user = auth
        .update_profile(&ProfileUpdate {
            name,
            email,
            avatar,
        })
        .await?;
    println!("Updated profile: {} <{}>", user.name, user.email);
    Ok(())
}
