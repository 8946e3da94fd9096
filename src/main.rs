use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use tripla::core::calendar::{DatePicker, WEEKDAYS, parse_calendar_date};
use tripla::core::globe::{GlobeSummary, TOTAL_COUNTRIES_WORLD};
use tripla::core::store::{
    FileStorage, ItineraryRepository, MemoryRepository, NewItineraryItem, NewMemory,
    NewPackingItem, NewStay, NewTrip, PackingCategory, PackingProgress, PackingRepository,
    StayRepository, StoreOptions, Trip, TripFilter, TripRepository, TripStore, TripUpdate,
    group_by_category, group_by_day,
};

#[derive(Parser)]
#[command(name = "tripla")]
#[command(about = "Plan trips, itineraries, stays and packing lists")]
struct Cli {
    /// Directory holding the persisted trip data
    #[arg(long, value_name = "DIR", env = "TRIPLA_DATA_DIR", default_value = ".tripla")]
    data_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Upcoming,
    Planning,
    Completed,
    All,
}

impl From<FilterArg> for TripFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::Upcoming => TripFilter::Upcoming,
            FilterArg::Planning => TripFilter::Planning,
            FilterArg::Completed => TripFilter::Completed,
            FilterArg::All => TripFilter::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Essentials,
    Clothing,
    Toiletries,
    Electronics,
    Documents,
    Other,
}

impl From<CategoryArg> for PackingCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Essentials => PackingCategory::Essentials,
            CategoryArg::Clothing => PackingCategory::Clothing,
            CategoryArg::Toiletries => PackingCategory::Toiletries,
            CategoryArg::Electronics => PackingCategory::Electronics,
            CategoryArg::Documents => PackingCategory::Documents,
            CategoryArg::Other => PackingCategory::Other,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List trips
    List {
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
    },
    /// Create a trip
    Create {
        #[arg(long)]
        title: String,
        /// "City, Country"
        #[arg(long)]
        destination: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        #[arg(long, value_parser = parse_amount)]
        budget: Option<f64>,
        /// Cover image URL
        #[arg(long)]
        cover: Option<String>,
    },
    /// Show a trip with its itinerary, stays, memories and packing list
    Show { id: String },
    /// Update trip fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_amount)]
        budget: Option<f64>,
        #[arg(long, value_parser = parse_amount)]
        spent: Option<f64>,
        #[arg(long)]
        offline: Option<bool>,
    },
    /// Delete a trip and everything attached to it
    Delete { id: String },
    /// Add an itinerary item to a trip
    AddItem {
        trip_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove an itinerary item
    DeleteItem { id: String },
    /// Add a stay to a trip
    AddStay {
        trip_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
    },
    /// Remove a stay
    DeleteStay { id: String },
    /// Attach a photo or video to a trip
    AddMemory {
        trip_id: String,
        uri: String,
        #[arg(long)]
        video: bool,
    },
    /// Remove a memory
    DeleteMemory { id: String },
    /// Add an item to a trip's packing list
    Pack {
        trip_id: String,
        name: String,
        #[arg(long, value_enum, default_value = "other")]
        category: CategoryArg,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Toggle the packed state of a packing item
    TogglePacked { trip_id: String, item_id: String },
    /// Countries visited through completed trips
    Globe,
    /// Print a month grid
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u8>,
        /// Earliest selectable date (YYYY-MM-DD)
        #[arg(long)]
        min: Option<String>,
    },
}

fn parse_amount(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(format!("{:?} is not a finite amount", value)),
    }
}

fn check_date(value: &Option<String>) -> anyhow::Result<()> {
    if let Some(value) = value {
        if parse_calendar_date(value).is_none() {
            anyhow::bail!("Invalid date {:?}, expected YYYY-MM-DD", value);
        }
    }
    Ok(())
}

fn print_trip_line(trip: &Trip) {
    println!(
        "  {}  {} ({}{}) [{}]",
        trip.id,
        trip.name,
        trip.destination,
        if trip.country.is_empty() {
            String::new()
        } else {
            format!(", {}", trip.country)
        },
        trip.status.label()
    );
}

async fn show_trip(store: &TripStore, id: &str) -> anyhow::Result<()> {
    let Some(trip) = store.get_trip(id).await else {
        anyhow::bail!("No trip with id {}", id);
    };
    let budget = trip.budget();
    println!("{} - {}, {}", trip.name, trip.destination, trip.country);
    println!("Status: {}", trip.status.label());
    println!("Dates: {} to {} ({} nights)", trip.start_date, trip.end_date, trip.nights());
    println!(
        "Budget: {:.2} / {:.2} {} ({}% spent)",
        budget.spent, budget.total, trip.currency, budget.percent_spent
    );

    let itinerary = store.get_itinerary(id).await;
    if !itinerary.is_empty() {
        println!("\nItinerary:");
        for day in group_by_day(&itinerary) {
            println!("  {}", day.date);
            for item in day.items {
                println!(
                    "    {} {} [{}]",
                    item.time.as_deref().unwrap_or("--:--"),
                    item.title,
                    item.id
                );
            }
        }
    }

    let stays = store.get_stays(id).await;
    if !stays.is_empty() {
        println!("\nStays:");
        for stay in stays {
            println!(
                "  {} ({} to {}, {} nights) [{}]",
                stay.name,
                stay.check_in,
                stay.check_out,
                stay.nights(),
                stay.id
            );
        }
    }

    let memories = store.get_memories(id).await;
    if !memories.is_empty() {
        println!("\nMemories: {}", memories.len());
    }

    if !trip.packing_list.is_empty() {
        let progress = PackingProgress::of(&trip.packing_list);
        println!("\nPacking ({}/{} packed):", progress.packed, progress.total);
        for (category, items) in group_by_category(&trip.packing_list) {
            println!("  {}", category.label());
            for item in items {
                let mark = if item.is_packed { "x" } else { " " };
                println!("    [{}] {} x{} [{}]", mark, item.name, item.quantity, item.id);
            }
        }
    }
    Ok(())
}

fn print_calendar(picker: &DatePicker) {
    println!("{}", picker.view.title());
    println!("{}", WEEKDAYS.join(" "));
    for row in picker.view.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(day) if picker.is_disabled(*day) => " .".to_string(),
                Some(day) => format!("{:>2}", day),
                None => "  ".to_string(),
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

async fn run(store: &TripStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { filter } => {
            let trips = store.get_trips_filtered(filter.into()).await;
            println!("{} trips", trips.len());
            for trip in &trips {
                print_trip_line(trip);
            }
        }
        Command::Create {
            title,
            destination,
            start,
            end,
            budget,
            cover,
        } => {
            check_date(&start)?;
            check_date(&end)?;
            let (city, country) = NewTrip::split_destination(&destination);
            if title.trim().is_empty() || city.is_empty() {
                anyhow::bail!("A trip needs a title and a destination city");
            }
            let id = store
                .create_trip(NewTrip {
                    title: title.trim().to_string(),
                    destination_city: city,
                    destination_country: country,
                    start_date: start,
                    end_date: end,
                    cover_image: cover,
                    total_budget: budget,
                })
                .await;
            println!("{}", id);
        }
        Command::Show { id } => show_trip(store, &id).await?,
        Command::Update {
            id,
            name,
            budget,
            spent,
            offline,
        } => {
            let update = TripUpdate {
                name,
                total_budget: budget,
                spent_budget: spent,
                is_offline_available: offline,
                ..Default::default()
            };
            if store.update_trip(&id, update).await.is_none() {
                anyhow::bail!("No trip with id {}", id);
            }
        }
        Command::Delete { id } => {
            if !store.delete_trip(&id).await {
                anyhow::bail!("No trip with id {}", id);
            }
        }
        Command::AddItem {
            trip_id,
            title,
            date,
            time,
            notes,
        } => {
            check_date(&Some(date.clone()))?;
            let item = store
                .add_itinerary_item(&trip_id, NewItineraryItem { title, date, time, notes })
                .await;
            println!("{}", item.id);
        }
        Command::DeleteItem { id } => {
            if !store.delete_itinerary_item(&id).await {
                anyhow::bail!("No itinerary item with id {}", id);
            }
        }
        Command::AddStay {
            trip_id,
            name,
            address,
            check_in,
            check_out,
        } => {
            check_date(&Some(check_in.clone()))?;
            check_date(&Some(check_out.clone()))?;
            let stay = store
                .add_stay(&trip_id, NewStay { name, address, check_in, check_out })
                .await;
            println!("{}", stay.id);
        }
        Command::DeleteStay { id } => {
            if !store.delete_stay(&id).await {
                anyhow::bail!("No stay with id {}", id);
            }
        }
        Command::AddMemory { trip_id, uri, video } => {
            let memory = if video {
                NewMemory::video(uri)
            } else {
                NewMemory::photo(uri)
            };
            println!("{}", store.add_memory(&trip_id, memory).await.id);
        }
        Command::DeleteMemory { id } => {
            if !store.delete_memory(&id).await {
                anyhow::bail!("No memory with id {}", id);
            }
        }
        Command::Pack {
            trip_id,
            name,
            category,
            quantity,
        } => {
            let item = NewPackingItem {
                name,
                category: category.into(),
                quantity,
            };
            match store.add_packing_item(&trip_id, item).await {
                Some(id) => println!("{}", id),
                None => anyhow::bail!("No trip with id {}", trip_id),
            }
        }
        Command::TogglePacked { trip_id, item_id } => {
            match store.toggle_packed(&trip_id, &item_id).await {
                Some(packed) => println!("{}", if packed { "packed" } else { "unpacked" }),
                None => anyhow::bail!("No packing item {} on trip {}", item_id, trip_id),
            }
        }
        Command::Globe => {
            let snapshot = store.snapshot().await;
            let summary = GlobeSummary::from_trips(&snapshot.trips);
            println!(
                "{} countries, {}% of {} ({} nights)",
                summary.country_count(),
                summary.world_percent,
                TOTAL_COUNTRIES_WORLD,
                summary.total_nights
            );
            for group in &summary.countries {
                println!(
                    "  {} {}: {} trips, {} nights",
                    group.country,
                    group.country_code,
                    group.trip_count(),
                    group.total_nights
                );
            }
        }
        Command::Calendar { year, month, min } => {
            check_date(&min)?;
            let today = OffsetDateTime::now_utc().date();
            let min = min.as_deref().and_then(parse_calendar_date);
            let mut picker = DatePicker::new(None, min, today);
            if let Some(year) = year {
                picker.view.year = year;
            }
            if let Some(month) = month {
                picker.view.month = time::Month::try_from(month)
                    .map_err(|e| anyhow::anyhow!("Invalid month {}: {}", month, e))?;
            }
            print_calendar(&picker);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = TripStore::open(FileStorage::new(args.data_dir.clone()), StoreOptions::default()).await;
    let result = run(&store, args.command).await;

    // Writes are fire-and-forget; let queued ones land before exiting.
    store.flush().await;
    result
}
