//! Catalog commands: `kasi products ...`.

use anyhow::Result;

use kasi_manager::api::{Products, ResourceClient};
use kasi_manager::form::product::{ProductDraft, StockPatch};
use kasi_manager::form::FormViewModel;
use kasi_manager::list::ListViewModel;
use kasi_manager::list::criteria::{MatchAll, Unsorted};
use kasi_manager::models::Product;
use kasi_manager::models::product::{ProductFilter, ProductSort};
use kasi_manager::mutation::MutationCoordinator;
use kasi_manager::util::format_price;

use super::super::ProductCommands;
use super::{Context, apply_fields, fetch_list, or_dash, print_list_footer, report_bulk, submit_form, truncate};

pub async fn cmd_products(ctx: &Context, command: ProductCommands) -> Result<()> {
    ctx.require_session()?;
    let client = ResourceClient::<Products>::new(ctx.api.clone());

    match command {
        ProductCommands::List {
            list: args,
            category,
            sort,
        } => {
            let mut list: ListViewModel<Product, ProductFilter, ProductSort> =
                ListViewModel::new(ctx.config.page_size());
            list.set_filter(ProductFilter {
                search: args.search.unwrap_or_default(),
                category,
            });
            list.set_sort(sort);
            fetch_list(&mut list, &client, args.page).await?;

            println!();
            println!(
                "{:<26} {:<30} {:>14} {:>6}  {:<18} Status",
                "ID", "Name", "Price", "Stock", "Category"
            );
            println!(
                "{:<26} {:<30} {:>14} {:>6}  {:<18} ------",
                "-".repeat(26),
                "-".repeat(30),
                "-".repeat(14),
                "-----",
                "-".repeat(18)
            );
            let mut shown = 0;
            for product in list.visible_items() {
                shown += 1;
                let stock = if product.stock == 0 {
                    console::style(product.stock.to_string()).red()
                } else {
                    console::style(product.stock.to_string())
                };
                println!(
                    "{:<26} {:<30} {:>14} {:>6}  {:<18} {}",
                    or_dash(product.id.as_deref()),
                    truncate(&product.name, 30),
                    format_price(product.price),
                    stock,
                    truncate(product.main_category().unwrap_or("-"), 18),
                    product.status.map(|s| s.as_str()).unwrap_or("-")
                );
            }
            print_list_footer(&list, shown);
        }
        ProductCommands::Show { id } => {
            let product = client.get(&id).await?;
            print_product(ctx, &product);
        }
        ProductCommands::Create { fields } => {
            let mut form = FormViewModel::create(ProductDraft::default());
            apply_fields(&mut form, &fields)?;
            let product = submit_form(&mut form, |_, payload| async move {
                client.create(&payload).await
            })
            .await?;
            println!(
                "{} Created product {} ({})",
                console::style("✓").green(),
                console::style(&product.name).bold(),
                or_dash(product.id.as_deref())
            );
        }
        ProductCommands::Edit { id, fields } => {
            let product = client.get(&id).await?;
            let mut form = FormViewModel::edit(id, ProductDraft::from_record(&product));
            apply_fields(&mut form, &fields)?;
            let updated = submit_form(&mut form, |mode, payload| async move {
                let id = mode.id().unwrap_or_default().to_string();
                client.update(&id, &payload).await
            })
            .await?;
            println!(
                "{} Updated product {}",
                console::style("✓").green(),
                console::style(&updated.name).bold()
            );
        }
        ProductCommands::Stock { id, stock } => {
            let patch = StockPatch::new(stock)?;
            let updated = client.update(&id, &patch).await?;
            println!(
                "{} {} now has {} in stock",
                console::style("✓").green(),
                updated.name,
                updated.stock
            );
        }
        ProductCommands::Delete { ids } => {
            let prompt = format!("Delete {} product(s)? This cannot be undone.", ids.len());
            if !ctx.confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            let mut list: ListViewModel<Product, MatchAll, Unsorted> =
                ListViewModel::new(ctx.config.page_size());
            let outcome = MutationCoordinator::new(&mut list)
                .bulk_remove(&client, &ids)
                .await;
            report_bulk(&outcome, "product(s)")?;
        }
    }

    Ok(())
}

fn print_product(ctx: &Context, product: &Product) {
    println!();
    println!("{}", console::style(&product.name).bold().cyan());
    println!();
    println!("  {:<14} {}", "ID", or_dash(product.id.as_deref()));
    println!("  {:<14} {}", "Price", format_price(product.price));
    if let Some(discount) = product.discount_price {
        println!("  {:<14} {}", "Discount", format_price(discount));
    }
    println!("  {:<14} {}", "Stock", product.stock);
    println!(
        "  {:<14} {}",
        "Status",
        product.status.map(|s| s.as_str()).unwrap_or("-")
    );
    let categories: Vec<String> = product
        .categories
        .iter()
        .map(|c| c.name().or(c.id()).unwrap_or("-").to_string())
        .collect();
    println!("  {:<14} {}", "Categories", categories.join(", "));

    let flags: Vec<&str> = [
        (product.is_new, "new"),
        (product.is_featured, "featured"),
        (product.is_trending, "trending"),
    ]
    .into_iter()
    .filter_map(|(flag, name)| (flag == Some(true)).then_some(name))
    .collect();
    if !flags.is_empty() {
        println!("  {:<14} {}", "Flags", flags.join(", "));
    }

    if let Some(details) = &product.details {
        println!("  {:<14} {}", "Brand", or_dash(details.brand.as_deref()));
        println!("  {:<14} {}", "Size", or_dash(details.size.as_deref()));
    }
    if let Some(rating) = product.rating {
        println!(
            "  {:<14} {:.1} ({} reviews)",
            "Rating",
            rating,
            product.review_count.unwrap_or(0)
        );
    }

    println!();
    println!("  {}", console::style("Description").dim());
    println!("  {}", product.description);
    println!();
    println!("  {}", console::style("Images").dim());
    if product.images.is_empty() {
        println!("  {}", ctx.image_url(""));
    }
    for image in &product.images {
        println!("  {}", ctx.image_url(image));
    }
    println!();
}

