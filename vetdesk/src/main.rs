//! Front-desk client for the veterinary clinic backend.
//!
//! Keeps a session under the state dir (`.vetdesk/` by default) so that
//! protected commands (`whoami`, `search`, `add-pet`) work across invocations.

use std::fmt::Display;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use vetdesk::auth::{self, ActivationView, LoginError};
use vetdesk::core::errors::{BREEDS_FETCH_FAILED, SPECIES_FETCH_FAILED};
use vetdesk::core::forms::{DEFAULT_ACCOUNT_ROLE, RegisterForm};
use vetdesk::core::routes::Route;
use vetdesk::core::session::Session;
use vetdesk::core::types::{Credentials, LoginRole, PetSummary};
use vetdesk::core::wizard::OwnerExistence;
use vetdesk::exit_codes;
use vetdesk::io::backend::Backend;
use vetdesk::io::config::{
    ClientConfig, DEFAULT_STATE_DIR, StatePaths, load_config, write_config,
};
use vetdesk::io::http::HttpBackend;
use vetdesk::io::session_storage::FileSessionStorage;
use vetdesk::logging;
use vetdesk::search::SearchView;
use vetdesk::session::SessionStore;
use vetdesk::wizard_flow::{PetRegistration, WizardFlowError};

#[derive(Parser)]
#[command(
    name = "vetdesk",
    version,
    about = "Front-desk client for the veterinary clinic backend"
)]
struct Cli {
    /// Directory holding `config.toml` and the persisted session.
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    /// Backend base URL; overrides `base_url` from the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Debug tracing for vetdesk on stderr (ignored when `RUST_LOG` is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Vet,
}

impl From<RoleArg> for LoginRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => LoginRole::User,
            RoleArg::Vet => LoginRole::Vet,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Manage the config file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Log in and persist the session.
    Login {
        #[arg(long, value_enum, default_value = "user")]
        role: RoleArg,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Drop the persisted session.
    Logout,
    /// Print the logged-in identity.
    Whoami,
    /// Register an account and log it in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = DEFAULT_ACCOUNT_ROLE)]
        role: String,
    },
    /// Verify an activation token and set the account password.
    Activate {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// List species.
    Species,
    /// List breeds of a species.
    Breeds {
        #[arg(long)]
        species: i64,
    },
    /// Search pets by name, species and breed.
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        species: Option<i64>,
        /// Requires `--species`.
        #[arg(long, requires = "species")]
        breed: Option<i64>,
    },
    /// Register a pet, creating its owner when the email is unknown.
    AddPet(AddPetArgs),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct AddPetArgs {
    #[arg(long)]
    name: String,
    /// Birth date as YYYY-MM-DD.
    #[arg(long)]
    birth_date: NaiveDate,
    #[arg(long)]
    species: i64,
    #[arg(long)]
    breed: i64,
    /// Weight in kg.
    #[arg(long)]
    weight: Option<f64>,
    #[arg(long, default_value = "")]
    allergies: String,
    #[arg(long, default_value = "")]
    diet: String,
    #[arg(long)]
    owner_email: String,
    /// Required when the owner does not exist yet.
    #[arg(long)]
    owner_name: Option<String>,
    #[arg(long)]
    owner_dni: Option<String>,
    #[arg(long)]
    owner_phone: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let paths = StatePaths::new(&cli.state_dir);
    if let Command::Config {
        command: ConfigCommand::Init { force },
    } = cli.command
    {
        return cmd_config_init(&paths, force);
    }

    let mut config = load_config(&paths.config_path)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let backend = HttpBackend::new(&config)?;
    let mut store = SessionStore::restore(FileSessionStorage::new(&paths.session_dir));
    debug!(authenticated = store.is_authenticated(), "session restored");

    match cli.command {
        Command::Config { .. } => Ok(exit_codes::OK),
        Command::Login {
            role,
            username,
            password,
        } => cmd_login(&backend, &mut store, role.into(), username, password).await,
        Command::Logout => {
            store.logout();
            println!("Sesión cerrada");
            Ok(exit_codes::OK)
        }
        Command::Whoami => {
            let Some(session) = gated(&store, Route::Home) else {
                return Ok(exit_codes::LOGIN_REQUIRED);
            };
            println!(
                "{} ({})",
                session.username(),
                session.role().unwrap_or("sin rol")
            );
            Ok(exit_codes::OK)
        }
        Command::Register {
            username,
            email,
            password,
            phone,
            address,
            role,
        } => {
            let form = RegisterForm {
                username,
                email,
                password,
                phone,
                address,
                role,
            };
            match auth::register(&backend, &mut store, &form).await {
                Ok(route) => {
                    println!("Cuenta registrada; sesión iniciada ({})", route);
                    Ok(exit_codes::OK)
                }
                Err(errors) => Ok(report(errors, exit_codes::REJECTED)),
            }
        }
        Command::Activate {
            token,
            password,
            confirm,
        } => cmd_activate(&backend, token.as_deref(), &password, &confirm).await,
        Command::Species => {
            for species in backend.list_species().await.context(SPECIES_FETCH_FAILED)? {
                println!("{}\t{}", species.id, species.name);
            }
            Ok(exit_codes::OK)
        }
        Command::Breeds { species } => {
            let breeds = backend
                .list_breeds(species)
                .await
                .with_context(|| format!("{} (species {})", BREEDS_FETCH_FAILED, species))?;
            for breed in breeds {
                println!("{}\t{}", breed.id, breed.name);
            }
            Ok(exit_codes::OK)
        }
        Command::Search {
            name,
            species,
            breed,
        } => {
            let Some(session) = gated(&store, Route::SearchPets) else {
                return Ok(exit_codes::LOGIN_REQUIRED);
            };
            cmd_search(&backend, session, name, species, breed).await
        }
        Command::AddPet(args) => {
            let Some(session) = gated(&store, Route::AddPet) else {
                return Ok(exit_codes::LOGIN_REQUIRED);
            };
            cmd_add_pet(&backend, session, args).await
        }
    }
}

fn cmd_config_init(paths: &StatePaths, force: bool) -> Result<i32> {
    if !force && paths.config_path.exists() {
        println!("{} ya existe", paths.config_path.display());
        return Ok(exit_codes::OK);
    }
    write_config(&paths.config_path, &ClientConfig::default())?;
    println!("{}", paths.config_path.display());
    Ok(exit_codes::OK)
}

/// Session for a protected route, or `None` after printing the redirect.
fn gated<'s>(
    store: &'s SessionStore<FileSessionStorage>,
    route: Route,
) -> Option<&'s Session> {
    match store.gate(route) {
        Route::Login => {
            eprintln!("Inicia sesión primero: vetdesk login");
            None
        }
        _ => store.current(),
    }
}

fn report(err: impl Display, code: i32) -> i32 {
    eprintln!("{}", err);
    code
}

async fn cmd_login(
    backend: &HttpBackend,
    store: &mut SessionStore<FileSessionStorage>,
    role: LoginRole,
    username: String,
    password: String,
) -> Result<i32> {
    let credentials = Credentials { username, password };
    match auth::login(backend, store, role, &credentials).await {
        Ok(route) => {
            let name = store.current().map(Session::username).unwrap_or_default();
            println!("Bienvenido, {} ({})", name, route);
            Ok(exit_codes::OK)
        }
        Err(err @ LoginError::Rejected(_)) => Ok(report(err, exit_codes::FAILED)),
        Err(err @ LoginError::Persist(_)) => Err(anyhow::anyhow!(err)),
    }
}

async fn cmd_activate(
    backend: &HttpBackend,
    token: Option<&str>,
    password: &str,
    confirm: &str,
) -> Result<i32> {
    let mut view = ActivationView::open(backend, token).await;
    if let Some(error) = view.error() {
        return Ok(report(error, exit_codes::FAILED));
    }
    match view.submit(backend, password, confirm).await {
        Ok(()) => {
            println!("Cuenta activada; ya puedes iniciar sesión");
            Ok(exit_codes::OK)
        }
        Err(message) => Ok(report(message, exit_codes::FAILED)),
    }
}

async fn cmd_search(
    backend: &HttpBackend,
    session: &Session,
    name: Option<String>,
    species: Option<i64>,
    breed: Option<i64>,
) -> Result<i32> {
    let mut view = SearchView::open(backend, Some(&session.token)).await;
    if let Some(error) = view.error() {
        eprintln!("{}", error);
    }
    if let Some(name) = name {
        view.set_name(name);
    }
    view.select_species(species).await;
    if let Err(err) = view.select_breed(breed) {
        return Ok(report(err, exit_codes::REJECTED));
    }
    match view.search().await {
        Ok(pets) => {
            for pet in pets {
                println!("{}", format_pet(pet));
            }
            Ok(exit_codes::OK)
        }
        Err(message) => Ok(report(message, exit_codes::FAILED)),
    }
}

async fn cmd_add_pet(backend: &HttpBackend, session: &Session, args: AddPetArgs) -> Result<i32> {
    let mut wizard = PetRegistration::open(backend, session).await;
    if let Some(error) = wizard.species_error() {
        eprintln!("{}", error);
    }
    match fill_and_submit(&mut wizard, args).await {
        Ok(pet) => {
            println!("Mascota registrada correctamente: {}", format_pet(&pet));
            Ok(exit_codes::OK)
        }
        Err(err @ WizardFlowError::Rejected(_)) => Ok(report(err, exit_codes::REJECTED)),
        Err(err) => Ok(report(err, exit_codes::FAILED)),
    }
}

async fn fill_and_submit<B: Backend + ?Sized>(
    wizard: &mut PetRegistration<'_, B>,
    args: AddPetArgs,
) -> Result<PetSummary, WizardFlowError> {
    wizard.set_pet_name(args.name)?;
    wizard.set_birth_date(Some(args.birth_date))?;
    wizard.select_species(Some(args.species)).await?;
    wizard.select_breed(Some(args.breed))?;
    wizard.set_weight(args.weight)?;
    wizard.set_allergies(args.allergies)?;
    wizard.set_diet_info(args.diet)?;
    wizard.advance()?;

    wizard.set_owner_email(args.owner_email)?;
    let not_found = matches!(wizard.check_owner().await?, OwnerExistence::NotFound);
    if not_found {
        eprintln!("Usuario no encontrado; se creará el propietario");
        wizard.set_owner_name(args.owner_name.unwrap_or_default())?;
        wizard.set_owner_dni(args.owner_dni.unwrap_or_default())?;
        wizard.set_owner_phone(args.owner_phone.unwrap_or_default())?;
    }
    wizard.submit().await
}

fn format_pet(pet: &PetSummary) -> String {
    let field = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}",
        field(pet.id.map(|id| id.to_string())),
        pet.name,
        field(pet.specie.clone()),
        field(pet.breed.clone()),
        field(pet.birth_date.as_ref().map(ToString::to_string)),
    )
}
