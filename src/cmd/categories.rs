//! Category commands: `kasi categories ...`.

use anyhow::Result;

use kasi_manager::api::{Categories, ResourceClient};
use kasi_manager::form::FormViewModel;
use kasi_manager::form::category::CategoryDraft;
use kasi_manager::list::ListViewModel;
use kasi_manager::list::criteria::{MatchAll, Unsorted};
use kasi_manager::models::Category;
use kasi_manager::models::category::CategoryFilter;
use kasi_manager::mutation::MutationCoordinator;

use super::super::CategoryCommands;
use super::{Context, apply_fields, fetch_list, or_dash, print_list_footer, report_bulk, submit_form, truncate};

pub async fn cmd_categories(ctx: &Context, command: CategoryCommands) -> Result<()> {
    ctx.require_session()?;
    let client = ResourceClient::<Categories>::new(ctx.api.clone());

    match command {
        CategoryCommands::List { list: args } => {
            let mut list: ListViewModel<Category, CategoryFilter, Unsorted> =
                ListViewModel::new(ctx.config.category_page_size());
            list.set_filter(CategoryFilter {
                search: args.search.unwrap_or_default(),
            });
            fetch_list(&mut list, &client, args.page).await?;

            println!();
            println!(
                "{:<26} {:<24} {:<20} {:>8} {:>5}  Status",
                "ID", "Name", "Slug", "Products", "Order"
            );
            println!(
                "{:<26} {:<24} {:<20} {:>8} {:>5}  ------",
                "-".repeat(26),
                "-".repeat(24),
                "-".repeat(20),
                "--------",
                "-----"
            );
            let mut shown = 0;
            for category in list.visible_items() {
                shown += 1;
                let status = if category.is_active {
                    console::style("active").green()
                } else {
                    console::style("inactive").dim()
                };
                println!(
                    "{:<26} {:<24} {:<20} {:>8} {:>5}  {}{}",
                    or_dash(category.id.as_deref()),
                    truncate(&category.name, 24),
                    truncate(&category.slug, 20),
                    category.product_count,
                    category.order.map(|o| o.to_string()).unwrap_or_default(),
                    status,
                    if category.is_featured { " ★" } else { "" }
                );
            }
            print_list_footer(&list, shown);
        }
        CategoryCommands::Show { id } => {
            let category = client.get(&id).await?;
            print_category(ctx, &category);
        }
        CategoryCommands::Create { fields } => {
            let mut form = FormViewModel::create(CategoryDraft::default());
            apply_fields(&mut form, &fields)?;
            let category = submit_form(&mut form, |_, payload| async move {
                client.create(&payload).await
            })
            .await?;
            println!(
                "{} Created category {} ({})",
                console::style("✓").green(),
                console::style(&category.name).bold(),
                or_dash(category.id.as_deref())
            );
        }
        CategoryCommands::Edit { id, fields } => {
            let category = client.get(&id).await?;
            let mut form = FormViewModel::edit(id, CategoryDraft::from_record(&category));
            apply_fields(&mut form, &fields)?;
            let updated = submit_form(&mut form, |mode, payload| async move {
                let id = mode.id().unwrap_or_default().to_string();
                client.update(&id, &payload).await
            })
            .await?;
            println!(
                "{} Updated category {}",
                console::style("✓").green(),
                console::style(&updated.name).bold()
            );
        }
        CategoryCommands::Delete { ids } => {
            let prompt = format!(
                "Delete {} categor{}? Products keep their other categories.",
                ids.len(),
                if ids.len() == 1 { "y" } else { "ies" }
            );
            if !ctx.confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            let mut list: ListViewModel<Category, MatchAll, Unsorted> =
                ListViewModel::new(ctx.config.category_page_size());
            let outcome = MutationCoordinator::new(&mut list)
                .bulk_remove(&client, &ids)
                .await;
            report_bulk(&outcome, "category(ies)")?;
        }
    }

    Ok(())
}

fn print_category(ctx: &Context, category: &Category) {
    println!();
    println!("{}", console::style(&category.name).bold().cyan());
    println!();
    println!("  {:<12} {}", "ID", or_dash(category.id.as_deref()));
    println!("  {:<12} {}", "Slug", category.slug);
    println!("  {:<12} {}", "Description", or_dash(category.description.as_deref()));
    println!("  {:<12} {}", "Active", category.is_active);
    println!("  {:<12} {}", "Featured", category.is_featured);
    println!("  {:<12} {}", "Parent", or_dash(category.parent_id.as_deref()));
    println!("  {:<12} {}", "Products", category.product_count);
    println!("  {:<12} {}", "Views", category.view_count);
    println!(
        "  {:<12} {}",
        "Image",
        ctx.image_url(category.image.as_deref().unwrap_or_default())
    );

    if let Some(attributes) = &category.attributes {
        println!();
        println!("  {}", console::style("Attributes").dim());
        for (key, attribute) in attributes {
            println!(
                "  {:<12} {} [{}]{}",
                key,
                attribute.name,
                attribute.values.join(", "),
                if attribute.filterable { " (filterable)" } else { "" }
            );
        }
    }
    if let Some(seo) = &category.seo {
        println!();
        println!("  {}", console::style("SEO").dim());
        println!("  {:<12} {}", "Title", or_dash(seo.meta_title.as_deref()));
        println!("  {:<12} {}", "Description", or_dash(seo.meta_description.as_deref()));
        if let Some(keywords) = &seo.keywords {
            println!("  {:<12} {}", "Keywords", keywords.join(", "));
        }
    }
    println!();
}
