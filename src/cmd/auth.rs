//! Sign-in, sign-out and password commands.

use anyhow::{Result, bail};
use dialoguer::{Input, Password, theme::ColorfulTheme};

use kasi_manager::api::AuthClient;
use kasi_manager::form::FormViewModel;
use kasi_manager::form::password::PasswordChangeDraft;

use super::{Context, submit_form};

fn prompt_secret(prompt: &str) -> Result<String> {
    if !console::user_attended() {
        bail!("{} is required. Pass it as a flag or run interactively.", prompt);
    }
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()?)
}

pub async fn cmd_login(ctx: &Context, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None if console::user_attended() => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .interact_text()?,
        None => bail!("--email is required when not running interactively"),
    };
    let password = match password {
        Some(password) => password,
        None => prompt_secret("Password")?,
    };

    let auth = AuthClient::new(ctx.api.clone());
    let user = auth
        .login(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!();
    println!(
        "{} Signed in as {} ({})",
        console::style("✓").green(),
        console::style(&user.email).bold(),
        user.role
    );
    println!();
    Ok(())
}

pub fn cmd_logout(ctx: &Context) {
    AuthClient::new(ctx.api.clone()).logout();
    println!("Signed out.");
}

pub fn cmd_whoami(ctx: &Context) -> Result<()> {
    let Some(user) = ctx.api.session().current_user() else {
        bail!("Not signed in. Run 'kasi login' first.");
    };
    println!();
    println!("  {:<10} {}", "Email", user.email);
    println!("  {:<10} {}", "Name", super::or_dash(Some(&user.full_name)));
    println!("  {:<10} {}", "Role", user.role);
    println!("  {:<10} {}", "API", ctx.api.base_url());
    println!();
    Ok(())
}

pub async fn cmd_password(ctx: &Context) -> Result<()> {
    ctx.require_session()?;

    let mut form = FormViewModel::create(PasswordChangeDraft::default());
    form.set_field("currentPassword", prompt_secret("Current password")?)?;
    form.set_field("newPassword", prompt_secret("New password")?)?;
    form.set_field("confirmPassword", prompt_secret("Confirm new password")?)?;

    let auth = AuthClient::new(ctx.api.clone());
    submit_form(&mut form, |_, payload| async move {
        auth.change_password(&payload.current_password, &payload.new_password)
            .await
    })
    .await?;

    println!("{} Password changed.", console::style("✓").green());
    Ok(())
}
