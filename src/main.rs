use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

use chargepoint_console::api::model::RequestResponse;
use chargepoint_console::api::HttpClient;
use chargepoint_console::collection::{self, Filter, InfiniteScroll, SearchParameters, Sort};
use chargepoint_console::config::{self, Config};
use chargepoint_console::identity::IdentityCache;
use chargepoint_console::model::UserRole;
use chargepoint_console::resources::{self, Resource};

#[derive(Debug, Parser)]
#[command(author, version, about = "Command-line console for the charge-point backend")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "console.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one page of a paginated search
    Search {
        resource: Resource,
        /// Page length (defaults to console.page_size)
        #[arg(long)]
        size: Option<u32>,
        /// 0-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Filter such as `email:foo`, `version>1.2` (repeatable)
        #[arg(long = "filter")]
        filters: Vec<Filter>,
        /// Sort key such as `lastUpdate:desc`
        #[arg(long)]
        sort: Option<Sort>,
    },
    /// List every entity of an unpaginated collection
    All { resource: Resource },
    /// Fetch one entity by id
    Get { resource: Resource, id: i64 },
    /// Accumulate consecutive pages as the console's infinite lists do
    Scroll {
        resource: Resource,
        /// Maximum number of pages to load
        #[arg(long, default_value_t = 3)]
        pages: u32,
        #[arg(long = "filter")]
        filters: Vec<Filter>,
        #[arg(long)]
        sort: Option<Sort>,
    },
    /// Show the signed-in user
    Me,
    /// Change a user's role
    SetRole { user_id: i64, role: UserRole },
    /// Print an example configuration file
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if let Command::ExampleConfig = args.command {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))?;
    let client = HttpClient::from_config(&cfg)?;
    info!(backend = %client.base_url(), "console ready");
    run(args.command, &cfg, &client).await
}

async fn run(command: Command, cfg: &Config, client: &HttpClient) -> Result<()> {
    match command {
        Command::Search {
            resource,
            size,
            page,
            filters,
            sort,
        } => {
            let Some(path) = resource.search_path() else {
                bail!("{} has no search endpoint", resource);
            };
            let mut params = SearchParameters::new(size.unwrap_or(cfg.console.page_size), page)
                .with_filters(filters);
            if let Some(sort) = sort {
                params = params.with_sort(sort);
            }
            let result = collection::search::<Value, _>(client, &path, Some(&params)).await?;
            print_json(&result)
        }
        Command::All { resource } => {
            let Some(path) = resource.all_path() else {
                bail!("{} has no unpaginated listing", resource);
            };
            let items = collection::get_all::<Value, _>(client, &path).await?;
            print_json(&items)
        }
        Command::Get { resource, id } => {
            if !resource.supports_get_by_id() {
                bail!("{} cannot be fetched by id", resource);
            }
            let item: Value = collection::get_by_id(client, resource.base_path(), id).await?;
            print_json(&item)
        }
        Command::Scroll {
            resource,
            pages,
            filters,
            sort,
        } => {
            let Some(path) = resource.search_path() else {
                bail!("{} has no search endpoint", resource);
            };
            let mut scroll: InfiniteScroll<Value> =
                InfiniteScroll::new(path, cfg.console.page_size).with_filters(filters);
            if let Some(sort) = sort {
                scroll = scroll.with_sort(sort);
            }
            for _ in 0..pages.max(1) {
                if scroll.is_loaded() && !scroll.has_more() {
                    break;
                }
                scroll.load_more(client).await?;
            }
            info!(
                loaded = scroll.items().len(),
                total = ?scroll.total(),
                has_more = scroll.has_more(),
                "scroll finished"
            );
            print_json(&scroll.into_items())
        }
        Command::Me => {
            let identity = IdentityCache::new(cfg.session.identity_path.clone());
            let me = identity.get_or_fetch(client).await?;
            print_json(me.as_ref())
        }
        Command::SetRole { user_id, role } => {
            match resources::update_role(client, user_id, role).await? {
                RequestResponse::Success(user) => print_json(&user),
                RequestResponse::Failure(error) => {
                    warn!(user_id, %role, message = %error.message, "role change rejected");
                    bail!(error.message)
                }
            }
        }
        Command::ExampleConfig => {
            print!("{}", config::example());
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
