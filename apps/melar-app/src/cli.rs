use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use melar_core::forms::BillingDetails;
use melar_core::{Money, OrderStatus, ProductFilter, ProductSort};

#[derive(Parser, Debug)]
#[command(name = "melar", version, about = "Melar rental marketplace")]
pub struct Cli {
    /// Configuration file (defaults to melar.toml in the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in with a username or email
    Login {
        login: String,
        #[arg(short, long)]
        password: String,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductCommands,
    },

    /// Browse shops
    Shops {
        #[command(subcommand)]
        action: ShopCommands,
    },

    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartCommands,
    },

    /// Place one order per shop for everything in the cart
    Checkout(CheckoutArgs),

    /// Your orders, and status changes on your shop's orders
    Orders {
        #[command(subcommand)]
        action: OrderCommands,
    },

    /// Seller figures for a shop
    Dashboard {
        shop_id: String,

        /// Only list orders with this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },

    /// Product reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProductCommands {
    List(ProductListArgs),
    Show { product_id: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProductListArgs {
    /// Text to look for in name or description
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_parser = parse_money)]
    pub min_price: Option<Money>,

    #[arg(long, value_parser = parse_money)]
    pub max_price: Option<Money>,

    /// Only products available for rent
    #[arg(long)]
    pub available: bool,

    #[arg(long)]
    pub min_rating: Option<f64>,

    /// price-asc, price-desc, name-asc, name-desc, rating
    #[arg(long)]
    pub sort: Option<ProductSort>,
}

impl ProductListArgs {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.search.clone(),
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            available: self.available.then_some(true),
            min_rating: self.min_rating,
            sort: self.sort,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShopCommands {
    List {
        /// Search name, location, and description
        query: Option<String>,
    },
    Show {
        shop_id: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CartCommands {
    Show,
    Add {
        product_id: String,
        /// First rental day (YYYY-MM-DD)
        start: NaiveDate,
        /// Last rental day, inclusive
        end: NaiveDate,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set a line's quantity; 0 removes it
    Qty { line_id: String, quantity: i64 },
    Remove { line_id: String },
    Clear,
}

#[derive(Args, Debug, Clone)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    /// Indonesian mobile number, 08… or 628…
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub zip: String,
}

impl From<CheckoutArgs> for BillingDetails {
    fn from(args: CheckoutArgs) -> Self {
        BillingDetails {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            state: args.state,
            zip: args.zip,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum OrderCommands {
    List,
    /// Rentals recorded on this device at checkout
    History,
    Show {
        order_id: String,
    },
    Cancel {
        order_id: String,
    },
    /// Move one of your shop's orders to a new status
    Status {
        order_id: String,
        status: OrderStatus,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReviewCommands {
    List {
        #[arg(short, long)]
        product_id: Option<String>,
    },
    Add {
        product_id: String,
        /// 1 to 5
        rating: i64,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}
