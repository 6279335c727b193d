//! Back-office account commands: `kasi users ...`.

use anyhow::{Result, bail};

use kasi_manager::api::{ResourceClient, Users};
use kasi_manager::form::FormViewModel;
use kasi_manager::form::user::UserDraft;
use kasi_manager::list::ListViewModel;
use kasi_manager::list::criteria::Unsorted;
use kasi_manager::models::user::UserFilter;
use kasi_manager::models::{Record, User};

use super::super::UserCommands;
use super::{Context, apply_fields, fetch_list, or_dash, print_list_footer, short_date, submit_form, truncate};

type UserList = ListViewModel<User, UserFilter, Unsorted>;

pub async fn cmd_users(ctx: &Context, command: UserCommands) -> Result<()> {
    ctx.require_session()?;
    let client = ResourceClient::<Users>::new(ctx.api.clone());

    match command {
        UserCommands::List {
            list: args,
            role,
            active,
        } => {
            let mut list = UserList::new(ctx.config.page_size());
            list.set_filter(UserFilter {
                search: args.search.unwrap_or_default(),
                role,
                active,
            });
            fetch_list(&mut list, &client, args.page).await?;

            println!();
            println!(
                "{:<26} {:<24} {:<30} {:<12} {:<10} Status",
                "ID", "Name", "Email", "Role", "Created"
            );
            println!(
                "{:<26} {:<24} {:<30} {:<12} {:<10} ------",
                "-".repeat(26),
                "-".repeat(24),
                "-".repeat(30),
                "-".repeat(12),
                "-".repeat(10)
            );
            let mut shown = 0;
            for user in list.visible_items() {
                shown += 1;
                println!(
                    "{:<26} {:<24} {:<30} {:<12} {:<10} {}",
                    or_dash(user.id.as_deref()),
                    truncate(&user.full_name, 24),
                    truncate(&user.email, 30),
                    user.role,
                    short_date(user.created_at.as_deref()),
                    active_label(user.is_active)
                );
            }
            print_list_footer(&list, shown);
        }
        UserCommands::Create { fields } => {
            let mut form = FormViewModel::create(UserDraft::default());
            apply_fields(&mut form, &fields)?;
            let user = submit_form(&mut form, |_, payload| async move {
                client.create(&payload).await
            })
            .await?;
            println!(
                "{} Created {} account for {}",
                console::style("✓").green(),
                user.role,
                console::style(&user.email).bold()
            );
        }
        UserCommands::Activate { id } => toggle(ctx, &client, &id, true).await?,
        UserCommands::Deactivate { id } => toggle(ctx, &client, &id, false).await?,
    }

    Ok(())
}

fn active_label(active: bool) -> console::StyledObject<&'static str> {
    if active {
        console::style("active").green()
    } else {
        console::style("inactive").red()
    }
}

/// Only a super admin may switch plain admin accounts on or off.
async fn toggle(ctx: &Context, client: &ResourceClient<Users>, id: &str, active: bool) -> Result<()> {
    let Some(me) = ctx.api.session().current_user() else {
        bail!("Not signed in. Run 'kasi login' first.");
    };
    let target = client.get(id).await?;
    if me.has_id(id) {
        bail!("You cannot change the status of your own account");
    }
    if !me.can_toggle(&target) {
        bail!("Only a super admin can activate or deactivate admin accounts");
    }
    if target.is_active == active {
        println!("{} is already {}.", target.email, active_label(active));
        return Ok(());
    }

    client.set_active(id, active).await?;

    println!(
        "{} {} is now {}",
        console::style("✓").green(),
        console::style(&target.email).bold(),
        active_label(active)
    );
    Ok(())
}
