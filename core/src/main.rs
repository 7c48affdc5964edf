//! Command-line front end for the beer catalog.

use anyhow::{bail, Context};
use cellar_core::{
    Beer, BeerDraft, ClientConfig, HttpBeerApi, StalePolicy, SubmitError, Synchronizer,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cellar")]
#[command(about = "Browse and edit a personal beer catalog")]
struct Cli {
    /// Base URL of the beer service, including the `/api` prefix.
    /// Overrides `CELLAR_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Drop list responses older than one already shown. Overrides
    /// `CELLAR_STALE_POLICY`.
    #[arg(long)]
    discard_stale: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List beers, optionally scoped to one owner.
    List {
        #[arg(short, long)]
        user: Option<String>,
        #[arg(short, long, value_enum)]
        sort: Option<SortKey>,
        #[arg(long)]
        desc: bool,
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show one beer by id.
    Show { id: i32 },
    /// Add a beer for a user.
    Add {
        #[arg(short, long)]
        user: Option<String>,
        #[command(flatten)]
        fields: FormFields,
    },
    /// Edit the given fields of an existing beer.
    Update {
        id: i32,
        #[command(flatten)]
        fields: FormFields,
    },
    /// Delete a beer by id.
    Delete { id: i32 },
}

#[derive(Args, Debug)]
struct FormFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    brewery: Option<String>,
    #[arg(long)]
    style: Option<String>,
    #[arg(long)]
    abv: Option<String>,
    #[arg(long)]
    volume: Option<String>,
}

impl FormFields {
    /// Overlay the given flags onto `draft`.
    fn fill(self, mut draft: BeerDraft) -> BeerDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(brewery) = self.brewery {
            draft.brewery = brewery;
        }
        if let Some(style) = self.style {
            draft.style = style;
        }
        if let Some(abv) = self.abv {
            draft.abv = abv;
        }
        if let Some(volume) = self.volume {
            draft.volume = volume;
        }
        draft
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortKey {
    Name,
    Abv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    if cli.discard_stale {
        config = config.with_stale_policy(StalePolicy::DiscardStale);
    }
    info!(base_url = %config.base_url, policy = ?config.stale_policy, "using beer service");

    let api = HttpBeerApi::from_config(&config).context("failed to build HTTP client")?;
    let sync = Synchronizer::with_policy(api, config.stale_policy);

    match cli.command {
        Command::List {
            user,
            sort,
            desc,
            filter,
        } => {
            match user.as_deref() {
                Some(user) => sync.refresh_for_user(Some(user)).await?,
                None => sync.refresh().await?,
            }
            match sort {
                Some(SortKey::Name) => sync.sort_by_name(!desc),
                Some(SortKey::Abv) => sync.sort_by_abv(!desc),
                None => {}
            }
            if let Some(fragment) = filter.filter(|f| !f.is_empty()) {
                sync.filter_by_name(&fragment).await?;
            }
            let state = sync.snapshot();
            for beer in &state.beers {
                print_row(beer);
            }
            info!(count = state.beers.len(), "listed beers");
        }
        Command::Show { id } => {
            sync.refresh().await?;
            let beer = sync.find(id);
            if !beer.is_saved() {
                bail!("no beer with id {id}");
            }
            println!("{beer}");
        }
        Command::Add { user, fields } => {
            let draft = fields.fill(BeerDraft::default());
            match sync.add_draft(&draft, user.as_deref()).await {
                Ok(saved) => println!("added {}", saved.id),
                Err(SubmitError::Invalid(errors)) => {
                    for (field, message) in &errors.0 {
                        eprintln!("{}: {message}", field.label());
                    }
                    bail!("beer not added");
                }
                Err(SubmitError::Api(err)) => return Err(err.into()),
            }
        }
        Command::Update { id, fields } => {
            sync.refresh().await?;
            let original = sync.find(id);
            if !original.is_saved() {
                bail!("no beer with id {id}");
            }
            let edited = fields.fill(BeerDraft::from_beer(&original)).apply_to(&original);
            let saved = sync.update(id, &edited).await?;
            println!("{saved}");
        }
        Command::Delete { id } => {
            sync.refresh().await?;
            let beer = sync.find(id);
            if !beer.is_saved() {
                bail!("no beer with id {id}");
            }
            sync.remove(&beer).await?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

fn print_row(beer: &Beer) {
    println!(
        "{:>5}  {:<24} {:<20} {:>5.1}%  {:>6}cl  x{}  {}",
        beer.id, beer.name, beer.brewery, beer.abv, beer.volume, beer.how_many, beer.user
    );
}
