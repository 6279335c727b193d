//! Order tracking commands: `kasi orders ...`.

use anyhow::Result;

use kasi_manager::api::{Orders, ResourceClient};
use kasi_manager::list::ListViewModel;
use kasi_manager::list::criteria::Unsorted;
use kasi_manager::models::order::OrderFilter;
use kasi_manager::models::{Order, OrderStatus};
use kasi_manager::util::format_price;

use super::super::OrderCommands;
use super::{Context, fetch_list, or_dash, print_list_footer, short_date, truncate};

fn styled_status(status: OrderStatus) -> console::StyledObject<&'static str> {
    let text = console::style(status.as_str());
    match status {
        OrderStatus::Pending => text.yellow(),
        OrderStatus::Confirmed | OrderStatus::Processing => text.cyan(),
        OrderStatus::Shipped => text.blue(),
        OrderStatus::Delivered => text.green(),
        OrderStatus::Cancelled => text.red(),
    }
}

pub async fn cmd_orders(ctx: &Context, command: OrderCommands) -> Result<()> {
    ctx.require_session()?;
    let client = ResourceClient::<Orders>::new(ctx.api.clone());

    match command {
        OrderCommands::List { list: args, status } => {
            let mut list: ListViewModel<Order, OrderFilter, Unsorted> =
                ListViewModel::new(ctx.config.page_size());
            list.set_filter(OrderFilter {
                search: args.search.unwrap_or_default(),
                status,
            });
            fetch_list(&mut list, &client, args.page).await?;

            println!();
            println!(
                "{:<16} {:<28} {:<14} {:>5} {:>14}  {:<10} {:<11} Paid",
                "Order", "Customer", "Phone", "Items", "Total", "Date", "Status"
            );
            println!(
                "{:<16} {:<28} {:<14} {:>5} {:>14}  {:<10} {:<11} ----",
                "-".repeat(16),
                "-".repeat(28),
                "-".repeat(14),
                "-----",
                "-".repeat(14),
                "-".repeat(10),
                "-".repeat(11)
            );
            let mut shown = 0;
            for order in list.visible_items() {
                shown += 1;
                println!(
                    "{:<16} {:<28} {:<14} {:>5} {:>14}  {:<10} {:<11} {}",
                    order.order_number,
                    truncate(&order.email, 28),
                    truncate(&order.phone, 14),
                    order.item_count(),
                    format_price(order.total),
                    short_date(order.created_at.as_deref()),
                    styled_status(order.status),
                    if order.is_paid { "yes" } else { "no" }
                );
            }
            print_list_footer(&list, shown);
        }
        OrderCommands::Show { id } => {
            let order = client.get(&id).await?;
            print_order(&order);
        }
        OrderCommands::Status { id, status, note } => {
            let order = client.update_status(&id, status, note.as_deref()).await?;
            println!(
                "{} Order {} is now {}",
                console::style("✓").green(),
                console::style(&order.order_number).bold(),
                styled_status(order.status)
            );
        }
    }

    Ok(())
}

fn print_order(order: &Order) {
    println!();
    println!(
        "{} {}",
        console::style(format!("Order {}", order.order_number)).bold().cyan(),
        styled_status(order.status)
    );
    println!();
    println!("  {:<10} {}", "ID", or_dash(order.id.as_deref()));
    println!("  {:<10} {}", "Email", or_dash(Some(&order.email)));
    println!("  {:<10} {}", "Phone", or_dash(Some(&order.phone)));
    println!("  {:<10} {}", "Address", or_dash(Some(&order.shipping_address)));
    println!("  {:<10} {}", "Payment", or_dash(Some(&order.payment_method)));
    println!("  {:<10} {}", "Paid", if order.is_paid { "yes" } else { "no" });
    println!("  {:<10} {}", "Placed", short_date(order.created_at.as_deref()));
    if !order.notes.is_empty() {
        println!("  {:<10} {}", "Notes", order.notes);
    }

    println!();
    println!("  {}", console::style("Items").dim());
    for item in &order.items {
        let variant = item
            .variant
            .as_deref()
            .map(|v| format!(" ({})", v))
            .unwrap_or_default();
        println!(
            "  {:>3} × {:<36} {:>14}",
            item.quantity,
            truncate(&format!("{}{}", item.name, variant), 36),
            format_price(item.price * f64::from(item.quantity))
        );
    }
    println!();
    println!("  {:<42} {:>14}", "Subtotal", format_price(order.subtotal));
    println!("  {:<42} {:>14}", "Shipping", format_price(order.shipping_fee));
    if order.discount > 0.0 {
        println!("  {:<42} {:>14}", "Discount", format_price(-order.discount));
    }
    println!(
        "  {:<42} {:>14}",
        console::style("Total").bold(),
        console::style(format_price(order.total)).bold()
    );

    if !order.status_history.is_empty() {
        println!();
        println!("  {}", console::style("History").dim());
        for entry in &order.status_history {
            println!(
                "  {:<10} {:<11} {}",
                short_date(Some(&entry.timestamp)),
                entry.status,
                entry.note.as_deref().unwrap_or_default()
            );
        }
    }
    println!();
}
