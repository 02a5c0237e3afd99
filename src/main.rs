use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tourcart::application::Storefront;
use tourcart::application::checkout::CheckoutSource;
use tourcart::application::payment::PaymentResult;
use tourcart::config::ClientConfig;
use tourcart::domain::booking::{Booking, BookingFilter, BookingStatus};
use tourcart::domain::cart::{Cart, CartItemPatch};
use tourcart::domain::ids::{BookingId, CartItemId, TourId};
use tourcart::domain::money::Price;
use tourcart::domain::ports::SharedPaymentGateway;
use tourcart::domain::tour::{Difficulty, SortOrder, TourQuery};
use tourcart::infrastructure::gateway::{GatewayScript, ScriptedGateway};
use tourcart::infrastructure::http::RestClient;
use tourcart::infrastructure::in_memory::InMemoryStorefront;
use tourcart::interfaces::console::ConsoleGateway;
use tourcart::interfaces::csv::booking_writer::BookingWriter;
use tourcart::interfaces::csv::traveler_reader::TravelerReader;
use tourcart::telemetry::{self, LogFormat};
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    client: ClientConfig,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List tours matching the filters
    Tours(ToursArgs),
    /// Show one tour
    Tour { id: String },
    /// Inspect or change the cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Pay for the cart, or for a single tour directly
    Checkout(CheckoutArgs),
    /// List your bookings
    Bookings {
        #[arg(long)]
        status: Option<BookingStatus>,
        #[arg(long, default_value = "")]
        search: String,
        /// Write the list as CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
    /// Show one booking
    Booking { id: String },
    /// Cancel a booking
    Cancel {
        id: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Pay for a booking that is still pending
    Pay {
        id: String,
        #[arg(long, value_enum)]
        gateway: Option<GatewayMode>,
    },
    /// Booking figures and the most recent bookings
    Dashboard {
        /// Reference date; defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(clap::Args)]
struct ToursArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "")]
    destination: String,
    #[arg(long, default_value = "")]
    tour_type: String,
    #[arg(long)]
    min_price: Option<Decimal>,
    #[arg(long)]
    max_price: Option<Decimal>,
    #[arg(long)]
    min_duration: Option<u32>,
    #[arg(long)]
    max_duration: Option<u32>,
    #[arg(long)]
    difficulty: Option<Difficulty>,
    #[arg(long, default_value = "featured")]
    sort: SortOrder,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl ToursArgs {
    fn query(self) -> TourQuery {
        TourQuery::new()
            .with_search(self.search)
            .with_destination(self.destination)
            .with_tour_type(self.tour_type)
            .with_price_range(self.min_price.map(Price::new), self.max_price.map(Price::new))
            .with_duration_range(self.min_duration, self.max_duration)
            .with_difficulty(self.difficulty)
            .with_sort(self.sort)
            .with_page(self.page)
    }
}

#[derive(Subcommand)]
enum CartCommand {
    Show,
    Add {
        #[arg(long)]
        tour: String,
        #[arg(long, default_value_t = 1)]
        travelers: u32,
        #[arg(long)]
        date: NaiveDate,
    },
    Update {
        item: String,
        #[arg(long)]
        travelers: Option<u32>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Remove {
        item: String,
    },
    Clear,
}

#[derive(clap::Args)]
struct CheckoutArgs {
    /// Buy this tour directly instead of the cart
    #[arg(long, requires = "date")]
    tour: Option<String>,
    /// Departure date for a direct purchase
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Traveler manifest (CSV), one row per traveler
    #[arg(long)]
    travelers: PathBuf,
    #[arg(long, default_value = "")]
    special_requests: String,
    /// Sandbox only: how the payment widget behaves
    #[arg(long, value_enum)]
    gateway: Option<GatewayMode>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GatewayMode {
    Approve,
    Dismiss,
    Decline,
}

impl From<GatewayMode> for GatewayScript {
    fn from(mode: GatewayMode) -> Self {
        match mode {
            GatewayMode::Approve => GatewayScript::Approve,
            GatewayMode::Dismiss => GatewayScript::Dismiss,
            GatewayMode::Decline => GatewayScript::Decline,
        }
    }
}

fn storefront(client: &ClientConfig, gateway: Option<GatewayMode>) -> Result<Storefront> {
    let session = client.session();
    let merchant = client.merchant.clone();
    if let Some(rest) = client.rest() {
        let api = Arc::new(RestClient::new(rest).into_diagnostic()?);
        if gateway.is_some() {
            warn!("--gateway only applies to the sandbox; prompting on the console instead");
        }
        let console: SharedPaymentGateway = Arc::new(ConsoleGateway::new(
            BufReader::new(io::stdin()),
            io::stdout(),
        ));
        Ok(Storefront::new(
            api.clone(),
            api.clone(),
            api,
            console,
            session,
            merchant,
        ))
    } else {
        let sandbox = Arc::new(InMemoryStorefront::with_demo_data());
        let script = gateway.unwrap_or(GatewayMode::Approve).into();
        let scripted: SharedPaymentGateway = Arc::new(ScriptedGateway::new(script));
        Ok(Storefront::new(
            sandbox.clone(),
            sandbox.clone(),
            sandbox,
            scripted,
            session,
            merchant,
        ))
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for item in &cart.items {
        println!(
            "{}\t{}\t{} x{}\t{}",
            item.id, item.tour.title, item.start_date, item.travelers, item.price
        );
    }
    println!("Total: {}", cart.total);
}

fn print_booking(booking: &Booking) {
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}/{}",
        booking.id,
        booking.reference.as_deref().unwrap_or("-"),
        booking.tour.title,
        booking.start_date,
        booking.total_price,
        booking.booking_status,
        booking.payment_status
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    _ = dotenvy::dotenv();
    let cli = Cli::parse();
    telemetry::init(cli.log_format).into_diagnostic()?;

    let gateway = match &cli.command {
        Command::Checkout(args) => args.gateway,
        Command::Pay { gateway, .. } => *gateway,
        _ => None,
    };
    let store = storefront(&cli.client, gateway)?;

    match cli.command {
        Command::Tours(args) => {
            let page = store.catalog().browse(&args.query()).await.into_diagnostic()?;
            for tour in &page.tours {
                println!(
                    "{}\t{}\t{}\t{}D/{}N",
                    tour.id, tour.title, tour.price, tour.duration.days, tour.duration.nights
                );
            }
            println!(
                "Page {} of {} ({} tours)",
                page.pagination.current_page,
                page.pagination.total_pages,
                page.pagination.total_tours
            );
        }
        Command::Tour { id } => {
            let tour = store.catalog().tour(&TourId::new(id)).await.into_diagnostic()?;
            println!("{} ({})", tour.title, tour.id);
            println!("Price: {} per traveler", tour.price);
            println!("Duration: {}D/{}N", tour.duration.days, tour.duration.nights);
            println!("Group size: {}-{}", tour.group_size.min, tour.group_size.max);
            if !tour.destinations.is_empty() {
                println!("Destinations: {}", tour.destinations.join(", "));
            }
            for date in &tour.start_dates {
                println!("Departs: {date}");
            }
        }
        Command::Cart(command) => {
            let cart = store.cart();
            let updated = match command {
                CartCommand::Show => cart.fetch().await,
                CartCommand::Add {
                    tour,
                    travelers,
                    date,
                } => {
                    let tour = store
                        .catalog()
                        .tour(&TourId::new(tour))
                        .await
                        .into_diagnostic()?;
                    cart.add_tour(&tour, travelers, date).await
                }
                CartCommand::Update {
                    item,
                    travelers,
                    date,
                } => {
                    let patch = CartItemPatch {
                        travelers,
                        start_date: date,
                    };
                    cart.update_item(&CartItemId::new(item), patch).await
                }
                CartCommand::Remove { item } => cart.remove_item(&CartItemId::new(item)).await,
                CartCommand::Clear => cart.clear().await,
            };
            print_cart(&updated.into_diagnostic()?);
        }
        Command::Checkout(args) => {
            let drafts = TravelerReader::new(File::open(&args.travelers).into_diagnostic()?)
                .read_all()
                .into_diagnostic()?;
            let mut checkout = match (args.tour, args.date) {
                (Some(tour), Some(start_date)) => {
                    let tour = store
                        .catalog()
                        .tour(&TourId::new(tour))
                        .await
                        .into_diagnostic()?;
                    store.checkout(CheckoutSource::Direct {
                        tour,
                        travelers: drafts.len() as u32,
                        start_date,
                    })
                }
                _ => store.checkout_cart().await,
            }
            .into_diagnostic()?;

            checkout.fill_travelers(drafts);
            checkout.set_special_requests(args.special_requests);
            println!("Amount payable: {}", checkout.payable());
            let confirmation = checkout.pay().await.into_diagnostic()?;
            println!("Booking confirmed: {}", confirmation.booking_id);
            println!("Redirect: {}", confirmation.redirect_path());
        }
        Command::Bookings {
            status,
            search,
            csv,
        } => {
            let filter = BookingFilter { status, search };
            let bookings = store.bookings().my_bookings(&filter).await.into_diagnostic()?;
            if csv {
                let stdout = io::stdout();
                let mut writer = BookingWriter::new(stdout.lock());
                writer.write_bookings(&bookings).into_diagnostic()?;
            } else if bookings.is_empty() {
                println!("No bookings found");
            } else {
                bookings.iter().for_each(print_booking);
            }
        }
        Command::Booking { id } => {
            let booking = store
                .bookings()
                .booking(&BookingId::new(id))
                .await
                .into_diagnostic()?;
            print_booking(&booking);
            for traveler in &booking.travelers {
                println!("  {} ({}, {})", traveler.name, traveler.age, traveler.document_type);
            }
            if let Some(ticket) = booking.e_ticket.as_ref().filter(|t| t.issued) {
                println!(
                    "E-ticket: {}",
                    ticket.ticket_number.as_deref().unwrap_or("issued")
                );
            }
        }
        Command::Cancel { id, reason } => {
            let booking = store
                .bookings()
                .cancel(&BookingId::new(id), &reason)
                .await
                .into_diagnostic()?;
            print_booking(&booking);
        }
        Command::Pay { id, .. } => {
            let desk = store.bookings();
            let booking = desk.booking(&BookingId::new(id)).await.into_diagnostic()?;
            match desk.complete_payment(&booking).await.into_diagnostic()? {
                PaymentResult::Verified { booking_id } => {
                    println!("Payment verified: {booking_id}");
                }
                PaymentResult::Cancelled { booking_id } => {
                    println!("Payment cancelled; booking {booking_id} is still pending");
                }
            }
        }
        Command::Dashboard { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let dashboard = store.bookings().dashboard(today).await.into_diagnostic()?;
            let stats = &dashboard.stats;
            println!("Total bookings: {}", stats.total_bookings);
            println!("Upcoming trips: {}", stats.upcoming_trips);
            println!("Completed trips: {}", stats.completed_trips);
            println!("Total spent: {}", stats.total_spent);
            dashboard.recent.iter().for_each(print_booking);
        }
    }

    io::stdout().flush().into_diagnostic()?;
    Ok(())
}
