//! Bookstore CLI
//!
//! Command-line interface for Bookstore operations:
//! - Browse the catalog
//! - Log in, fill the cart and check out
//! - Review order history
//! - Create or promote administrators directly in the database

use anyhow::{anyhow, bail, Context};
use bookstore::auth;
use bookstore::config::Config;
use bookstore::store::Store;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Catalog page size, matching the storefront
const PAGE_SIZE: u32 = 10;

#[derive(Parser)]
#[command(name = "bookstore-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the online bookstore")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL
    #[arg(long, default_value = "http://localhost:8000/api", global = true)]
    pub api_url: String,

    /// Access token from `login`
    #[arg(long, env = "BOOKSTORE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List books in the catalog
    Books {
        /// Title search
        #[arg(short, long)]
        q: Option<String>,
        #[arg(long)]
        genre_id: Option<i64>,
        #[arg(long)]
        author_id: Option<i64>,
        #[arg(long)]
        publisher_id: Option<i64>,
        #[arg(long)]
        min_price: Option<String>,
        #[arg(long)]
        max_price: Option<String>,
        #[arg(long)]
        min_year: Option<i32>,
        #[arg(long)]
        max_year: Option<i32>,
        /// price_asc, price_desc, year_asc, year_desc, title_asc, title_desc, newest
        #[arg(long)]
        order_by: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show a single book
    Book {
        id: i64,
    },

    /// Log in and print an access token
    Login {
        email: String,
        password: String,
    },

    /// Create an account
    Register {
        email: String,
        password: String,
        full_name: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Show the cart
    Cart,

    /// Add a book to the cart
    AddToCart {
        book_id: i64,
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },

    /// Turn the cart into an order
    Checkout,

    /// List own orders
    Orders,

    /// Show server status
    Status,

    /// Create an administrator account in the local database
    CreateAdmin {
        email: String,
        password: String,
        full_name: String,
        /// Database path (default: from config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Grant admin rights to an existing account in the local database
    Promote {
        email: String,
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Catalog filters as passed on the command line
#[derive(Debug, Default)]
struct BookFilters {
    q: Option<String>,
    genre_id: Option<i64>,
    author_id: Option<i64>,
    publisher_id: Option<i64>,
    min_price: Option<String>,
    max_price: Option<String>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    order_by: Option<String>,
}

impl BookFilters {
    /// Query string for `GET /books`, including skip/limit for `page`
    fn to_query(&self, page: u32) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        if let Some(id) = self.genre_id {
            params.push(("genre_id", id.to_string()));
        }
        if let Some(id) = self.author_id {
            params.push(("author_id", id.to_string()));
        }
        if let Some(id) = self.publisher_id {
            params.push(("publisher_id", id.to_string()));
        }
        if let Some(price) = &self.min_price {
            params.push(("min_price", price.clone()));
        }
        if let Some(price) = &self.max_price {
            params.push(("max_price", price.clone()));
        }
        if let Some(year) = self.min_year {
            params.push(("min_year", year.to_string()));
        }
        if let Some(year) = self.max_year {
            params.push(("max_year", year.to_string()));
        }
        if let Some(order) = &self.order_by {
            params.push(("order_by", order.clone()));
        }

        let skip = page.saturating_sub(1) * PAGE_SIZE;
        params.push(("skip", skip.to_string()));
        params.push(("limit", PAGE_SIZE.to_string()));

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Thin JSON client for the REST API
struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(base: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn require_token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("This command needs a token: run `login` and pass --token or set BOOKSTORE_TOKEN"))
    }

    async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let mut request = self.http.get(self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Self::read(request.send().await.with_context(|| self.unreachable())?).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let mut request = self.http.post(self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        Self::read(request.send().await.with_context(|| self.unreachable())?).await
    }

    fn unreachable(&self) -> String {
        format!("Cannot connect to the bookstore API at {}", self.base)
    }

    async fn read(response: reqwest::Response) -> anyhow::Result<Value> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            bail!("{} ({})", error_message(&text), status);
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).context("Invalid JSON in response")
    }
}

/// Server error message from an error body, or the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url, cli.token.clone());
    let as_json = cli.format == "json";

    match cli.command {
        Commands::Books {
            q,
            genre_id,
            author_id,
            publisher_id,
            min_price,
            max_price,
            min_year,
            max_year,
            order_by,
            page,
        } => {
            let filters = BookFilters {
                q,
                genre_id,
                author_id,
                publisher_id,
                min_price,
                max_price,
                min_year,
                max_year,
                order_by,
            };
            let books = client
                .get(&format!("/books?{}", filters.to_query(page)))
                .await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else {
                print_books(&books, page);
            }
        }

        Commands::Book { id } => {
            let book = client.get(&format!("/books/{}", id)).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&book)?);
            } else {
                print_book(&book);
            }
        }

        Commands::Login { email, password } => {
            let body = client
                .post("/auth/login", Some(json!({ "email": email, "password": password })))
                .await?;
            let token = body["access_token"]
                .as_str()
                .ok_or_else(|| anyhow!("Response has no access_token"))?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", token);
                eprintln!();
                eprintln!("Use it with: export BOOKSTORE_TOKEN={}", token);
            }
        }

        Commands::Register {
            email,
            password,
            full_name,
            phone,
        } => {
            let user = client
                .post(
                    "/auth/register",
                    Some(json!({
                        "email": email,
                        "password": password,
                        "full_name": full_name,
                        "phone": phone,
                    })),
                )
                .await?;
            println!(
                "Registered {} (id {})",
                user["email"].as_str().unwrap_or("-"),
                user["user_id"].as_i64().unwrap_or(0)
            );
        }

        Commands::Cart => {
            client.require_token()?;
            let cart = client.get("/cart").await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&cart)?);
            } else {
                print_cart(&cart);
            }
        }

        Commands::AddToCart { book_id, quantity } => {
            client.require_token()?;
            let cart = client
                .post(
                    "/cart/items",
                    Some(json!({ "book_id": book_id, "quantity": quantity })),
                )
                .await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&cart)?);
            } else {
                println!("Added to cart.");
                print_cart(&cart);
            }
        }

        Commands::Checkout => {
            client.require_token()?;
            let order = client.post("/orders", None).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&order)?);
            } else {
                println!(
                    "Order #{} placed, total {}",
                    order["order_id"].as_i64().unwrap_or(0),
                    format_price(&order["total_amount"])
                );
            }
        }

        Commands::Orders => {
            client.require_token()?;
            let orders = client.get("/orders").await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
            } else {
                print_orders(&orders);
            }
        }

        Commands::Status => {
            let health_url = cli
                .api_url
                .trim_end_matches('/')
                .trim_end_matches("/api")
                .to_string();
            let health = ApiClient::new(&health_url, None).get("/health").await?;

            println!("Bookstore v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
            println!("Database:   {}", health["database"].as_str().unwrap_or("unknown"));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime:     {}", format_duration(uptime));
            }
        }

        Commands::CreateAdmin {
            email,
            password,
            full_name,
            db,
        } => {
            auth::check_password_strength(&password)?;
            let store = open_local_store(db)?;
            let user = auth::register(&store, &email, &full_name, None, &password, true)?;
            println!("Created admin {} (id {})", user.email, user.user_id);
        }

        Commands::Promote { email, db } => {
            let store = open_local_store(db)?;
            let user = store
                .get_user_by_email(&email)?
                .ok_or_else(|| anyhow!("No user with email {}", email))?;
            store.set_admin(user.user_id, true)?;
            println!("{} is now an admin", user.email);
        }

        Commands::Config { output } => {
            let config = bookstore::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn open_local_store(db: Option<PathBuf>) -> anyhow::Result<Store> {
    let path = match db {
        Some(path) => path,
        None => PathBuf::from(Config::load_default().database.path),
    };
    Store::open(&path).with_context(|| format!("Cannot open database {:?}", path))
}

fn format_price(value: &Value) -> String {
    value
        .as_f64()
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn authors_of(book: &Value) -> String {
    let names: Vec<&str> = book["author_names"]
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if names.is_empty() {
        "Not specified".to_string()
    } else {
        names.join(", ")
    }
}

fn print_books(books: &Value, page: u32) {
    let books = match books.as_array() {
        Some(b) if !b.is_empty() => b,
        _ => {
            println!("No books found");
            return;
        }
    };

    println!("{:<6} {:<40} {:<25} {:>10}", "ID", "Title", "Authors", "Price");
    println!("{}", "-".repeat(84));

    for book in books {
        println!(
            "{:<6} {:<40} {:<25} {:>10}",
            book["book_id"].as_i64().unwrap_or(0),
            truncate(book["title"].as_str().unwrap_or("-"), 40),
            truncate(&authors_of(book), 25),
            format_price(&book["price"])
        );
    }

    println!();
    if books.len() as u32 == PAGE_SIZE {
        println!("Page {} (more with --page {})", page, page + 1);
    } else {
        println!("Page {}", page);
    }
}

fn print_book(book: &Value) {
    println!("{}", book["title"].as_str().unwrap_or("-"));
    println!();
    println!("Authors:   {}", authors_of(book));
    println!("Genre:     {}", book["genre_name"].as_str().unwrap_or("-"));
    println!("Publisher: {}", book["publisher_name"].as_str().unwrap_or("-"));
    if let Some(year) = book["publication_year"].as_i64() {
        println!("Year:      {}", year);
    }
    if let Some(pages) = book["pages"].as_i64() {
        println!("Pages:     {}", pages);
    }
    if let Some(isbn) = book["isbn"].as_str() {
        println!("ISBN:      {}", isbn);
    }
    println!("Price:     {}", format_price(&book["price"]));
    if let Some(description) = book["description"].as_str() {
        println!();
        println!("{}", description);
    }
}

fn print_cart(cart: &Value) {
    let items = match cart["items"].as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            println!("Cart is empty");
            return;
        }
    };

    println!("{:<6} {:<40} {:>5} {:>10}", "Item", "Title", "Qty", "Price");
    println!("{}", "-".repeat(64));

    let mut total = 0.0;
    for item in items {
        let quantity = item["quantity"].as_i64().unwrap_or(0);
        let price = item["book"]["price"].as_f64().unwrap_or(0.0);
        total += price * quantity as f64;
        println!(
            "{:<6} {:<40} {:>5} {:>10.2}",
            item["cart_item_id"].as_i64().unwrap_or(0),
            truncate(item["book"]["title"].as_str().unwrap_or("-"), 40),
            quantity,
            price
        );
    }
    println!("{}", "-".repeat(64));
    println!("{:<53} {:>10.2}", "Total", total);
}

fn print_orders(orders: &Value) {
    let orders = match orders.as_array() {
        Some(o) if !o.is_empty() => o,
        _ => {
            println!("No orders yet");
            return;
        }
    };

    println!("{:<8} {:<20} {:<10} {:>6} {:>10}", "Order", "Date", "Status", "Items", "Total");
    println!("{}", "-".repeat(58));

    for order in orders {
        let date = order["created_at"]
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let items = order["items"].as_array().map(|i| i.len()).unwrap_or(0);

        println!(
            "{:<8} {:<20} {:<10} {:>6} {:>10}",
            order["order_id"].as_i64().unwrap_or(0),
            date,
            order["status"].as_str().unwrap_or("-"),
            items,
            format_price(&order["total_amount"])
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_books_query_paging() {
        let filters = BookFilters::default();
        assert_eq!(filters.to_query(1), "skip=0&limit=10");
        assert_eq!(filters.to_query(3), "skip=20&limit=10");
        assert_eq!(filters.to_query(0), "skip=0&limit=10");
    }

    #[test]
    fn test_books_query_encodes_filters() {
        let filters = BookFilters {
            q: Some("  war & peace ".to_string()),
            genre_id: Some(2),
            max_price: Some("500".to_string()),
            order_by: Some("price_asc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(1),
            "q=war%20%26%20peace&genre_id=2&max_price=500&order_by=price_asc&skip=0&limit=10"
        );
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":"NOT_FOUND","message":"Book not found"},"request_id":"x"}"#;
        assert_eq!(error_message(body), "Book not found");
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_authors_and_truncate() {
        assert_eq!(authors_of(&json!({ "author_names": [] })), "Not specified");
        assert_eq!(
            authors_of(&json!({ "author_names": ["A", "B"] })),
            "A, B"
        );
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(3661), "1h 1m");
        assert_eq!(format_duration(90000), "1d 1h");
    }
}
