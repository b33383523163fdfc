//! `melar` command line front end.
//!
//! Every subcommand is one call into `melar_app::commands`; this file only
//! parses arguments and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use melar_app::commands::{account, cart, catalog, dashboard, orders, reviews, shops};
use melar_app::state::ViewGuard;
use melar_app::{init_tracing, App, AppConfig};
use melar_core::forms::{LoginForm, ReviewForm};
use melar_core::RentalPeriod;

mod cli;

use cli::{CartCommands, Commands, OrderCommands, ProductCommands, ReviewCommands, ShopCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_tracing();

    let config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let app = App::start(config).await.context("Failed to start")?;

    let result = run(&app, args.command, args.json).await;
    app.shutdown().await;
    result
}

/// Prints `value` as JSON, or through `human` for terminal output.
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

/// A listing view that Ctrl-C closes, so a slow response is dropped rather
/// than printed after the user gave up on it.
fn listing(name: &'static str) -> ViewGuard {
    let view = ViewGuard::new(name);
    let closer = view.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            closer.deactivate();
        }
    });
    view
}

async fn run(app: &App, command: Commands, json: bool) -> Result<()> {
    let symbol = app.config.checkout.currency_symbol.clone();

    match command {
        Commands::Login { login, password } => {
            let (user, _) = account::login(app, &LoginForm::new(login, password), None).await?;
            println!("Logged in as {}", user.display_name());
        }
        Commands::Logout => {
            account::logout(app).await?;
            println!("Logged out");
        }
        Commands::Whoami => match app.session.current_user().await {
            Some(user) => emit(json, &user, |u| {
                println!("{} <{}>", u.display_name(), u.email);
                if let Some(shop) = &u.shop_id {
                    println!("shop: {}", shop);
                }
            })?,
            None => println!("Not logged in"),
        },

        Commands::Products { action } => match action {
            ProductCommands::List(args) => {
                let filter = args.filter();
                let view = listing("products");
                let Some(products) = view.load(catalog::list_products(app, &filter)).await? else {
                    eprintln!("Interrupted");
                    return Ok(());
                };
                emit(json, &products, |ps| {
                    for p in ps {
                        println!(
                            "{:>6}  {:<40} {:>10}/day  {:.1}★  {}",
                            p.id,
                            p.name,
                            p.price.format_with(&symbol),
                            p.rating,
                            p.shop_display_name().unwrap_or("-")
                        );
                    }
                })?;
            }
            ProductCommands::Show { product_id } => {
                let product = catalog::get_product(app, &product_id).await?;
                emit(json, &product, |p| {
                    println!("{} (#{})", p.name, p.id);
                    println!("{}/day", p.price.format_with(&symbol));
                    if let Some(shop) = p.shop_display_name() {
                        println!("shop: {}", shop);
                    }
                    if !p.available {
                        println!("currently not available");
                    }
                    if !p.description.is_empty() {
                        println!("\n{}", p.description);
                    }
                })?;
            }
        },

        Commands::Shops { action } => match action {
            ShopCommands::List { query } => {
                let list = shops::list_shops(app, query.as_deref()).await?;
                emit(json, &list, |ss| {
                    for s in ss {
                        println!("{:>6}  {:<30} {}", s.id, s.name, s.location);
                    }
                })?;
            }
            ShopCommands::Show { shop_id } => {
                let shop = shops::get_shop(app, &shop_id).await?;
                let products = shops::shop_products(app, &shop_id).await?;
                emit(json, &(&shop, &products), |(s, ps)| {
                    println!("{} (#{}) {}", s.name, s.id, s.location);
                    if let Some(phone) = &s.phone_number {
                        println!("phone: {}", phone);
                    }
                    for p in ps.iter() {
                        println!("  {:>6}  {:<40} {:>10}/day", p.id, p.name, p.price.format_with(&symbol));
                    }
                })?;
            }
        },

        Commands::Cart { action } => {
            let view = match action {
                CartCommands::Show => cart::show(app).await?,
                CartCommands::Add { product_id, start, end, quantity } => {
                    cart::add_product(app, &product_id, RentalPeriod::new(start, end), quantity)
                        .await?
                }
                CartCommands::Qty { line_id, quantity } => {
                    app.cart.update_quantity(&line_id, quantity).await?
                }
                CartCommands::Remove { line_id } => app.cart.remove(&line_id).await?,
                CartCommands::Clear => app.cart.clear().await?,
            };
            emit(json, &view, |v| {
                for line in &v.items {
                    println!(
                        "{:<10} {:<30} x{:<3} {} → {} ({}d)  {}",
                        line.line_id,
                        line.product_name,
                        line.quantity,
                        line.rental_start,
                        line.rental_end,
                        line.day_count(),
                        line.line_total().format_with(&symbol)
                    );
                }
                let t = &v.totals.money;
                println!("subtotal     {}", t.subtotal.format_with(&symbol));
                println!("service fee  {}", t.service_fee.format_with(&symbol));
                println!("tax          {}", t.tax.format_with(&symbol));
                println!("total        {}", t.grand_total.format_with(&symbol));
            })?;
        }

        Commands::Checkout(args) => {
            let outcome = app.checkout.submit(app, &args.into()).await?;
            emit(json, &outcome, |o| {
                for order in &o.submitted {
                    println!(
                        "order #{} for {} ({})",
                        order.order_id,
                        order.seller_name.as_deref().unwrap_or(&order.seller_id),
                        order.total.format_with(&symbol)
                    );
                }
                for group in &o.failed {
                    println!(
                        "not placed: {}: {}",
                        group.seller_name.as_deref().unwrap_or(&group.seller_id),
                        group.error.message
                    );
                }
                if let Some(url) = &o.whatsapp_url {
                    println!("\nConfirm on WhatsApp: {}", url);
                }
            })?;
        }

        Commands::Orders { action } => match action {
            OrderCommands::List => {
                let view = listing("orders");
                let Some(views) = view.load(orders::my_orders(app)).await? else {
                    eprintln!("Interrupted");
                    return Ok(());
                };
                emit(json, &views, |vs| {
                    for v in vs {
                        println!(
                            "#{:<6} {:<18} {}",
                            v.order.id,
                            v.order.status.label(),
                            v.invoice.grand_total.format_with(&symbol)
                        );
                    }
                })?;
            }
            OrderCommands::History => {
                let rentals = orders::rental_history(app).await?;
                emit(json, &rentals, |rs| {
                    for r in rs {
                        println!(
                            "#{:<6} {:<18} {:<24} {}",
                            r.order_id,
                            r.status.label(),
                            r.seller_name.as_deref().unwrap_or(&r.seller_id),
                            r.total.format_with(&symbol)
                        );
                    }
                })?;
            }
            OrderCommands::Show { order_id } => {
                let view = orders::get_order(app, &order_id).await?;
                print_order(json, &view, &symbol)?;
            }
            OrderCommands::Cancel { order_id } => {
                let view = app.orders.cancel(app, &order_id).await?;
                print_order(json, &view, &symbol)?;
            }
            OrderCommands::Status { order_id, status } => {
                let view = app.orders.update_status(app, &order_id, status).await?;
                print_order(json, &view, &symbol)?;
            }
        },

        Commands::Dashboard { shop_id, status } => {
            let view = listing("dashboard");
            let Some(summary) = view.load(dashboard::load_dashboard(app, &shop_id)).await? else {
                eprintln!("Interrupted");
                return Ok(());
            };
            let listed = dashboard::filter_by_status(&summary.orders, status);
            emit(json, &summary, |s| {
                println!("products  {}", s.products.len());
                println!("orders    {}", s.orders.len());
                println!("revenue   {}", s.revenue.format_with(&symbol));
                for (status, count) in &s.status_counts {
                    println!("  {:<18} {}", status.label(), count);
                }
                println!();
                for o in &listed {
                    println!(
                        "#{:<6} {:<18} {:<24} {}",
                        o.id,
                        o.status.label(),
                        o.customer_name(),
                        o.total_price.format_with(&symbol)
                    );
                }
            })?;
        }

        Commands::Reviews { action } => match action {
            ReviewCommands::List { product_id } => {
                let list = reviews::list_reviews(app, product_id.as_deref()).await?;
                emit(json, &list, |rs| {
                    if let Some(avg) = reviews::average_rating(rs) {
                        println!("average {:.1} from {} reviews", avg, rs.len());
                    }
                    for r in rs {
                        let who = r.user.as_ref().map_or("-", |u| u.username.as_str());
                        println!("{}★ {:<16} {}", r.rating, who, r.comment);
                    }
                })?;
            }
            ReviewCommands::Add { product_id, rating, comment } => {
                let form = ReviewForm {
                    product: product_id,
                    rating,
                    comment,
                };
                let review = reviews::add_review(app, &form).await?;
                println!("Review #{} posted", review.id);
            }
        },
    }
    Ok(())
}

fn print_order(json: bool, view: &orders::OrderView, symbol: &str) -> Result<()> {
    emit(json, view, |v| {
        let o = &v.order;
        println!("order #{}  {}", o.id, o.status.label());
        for item in &o.items {
            println!(
                "  {:<30} x{:<3} {} → {}",
                item.product_name.as_deref().unwrap_or(&item.product),
                item.quantity,
                item.start_date,
                item.end_date
            );
        }
        println!("subtotal     {}", v.invoice.subtotal.format_with(symbol));
        println!("service fee  {}", v.invoice.service_fee.format_with(symbol));
        println!("tax          {}", v.invoice.tax.format_with(symbol));
        println!("total        {}", v.invoice.grand_total.format_with(symbol));

        let mut actions = Vec::new();
        if v.buyer_actions.can_cancel {
            actions.push("cancel".to_string());
        }
        if v.buyer_actions.can_review {
            actions.push("review".to_string());
        }
        actions.extend(v.seller_targets.iter().map(|s| format!("→{}", s)));
        if !actions.is_empty() {
            println!("actions: {}", actions.join(", "));
        }
    })
}
