use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use intake_core::constants::{STORE_TIMEOUT_ENV, SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use intake_core::validation::parse_birth_date;
use intake_core::{
    config_from_env_values, ChronicIllness, Goal, IntakeConfig, IntakeForm, IntakeResult,
    IntakeWriter, PatientStatus, PostgrestStore,
};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Clinic pre-registration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a pre-registration form
    Submit {
        /// Full name
        #[arg(long)]
        name: String,
        /// Phone / WhatsApp number, used to find a returning patient
        #[arg(long)]
        phone: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long, value_parser = parse_birth_date)]
        birth_date: NaiveDate,
        /// City / neighbourhood
        #[arg(long)]
        city: Option<String>,
        /// Any chronic illness (no/yes)
        #[arg(long, default_value = "no")]
        chronic: ChronicIllness,
        /// Medications in use
        #[arg(long)]
        medications: Option<String>,
        /// Known allergies
        #[arg(long)]
        allergies: Option<String>,
        /// Main goal (weight-loss, aesthetics, prevention, other)
        #[arg(long)]
        goal: Goal,
    },
    /// Show the resolved record store configuration
    CheckConfig,
}

fn config_from_env() -> IntakeResult<IntakeConfig> {
    config_from_env_values(
        std::env::var(SUPABASE_URL_ENV).ok(),
        std::env::var(SUPABASE_ANON_KEY_ENV).ok(),
        std::env::var(STORE_TIMEOUT_ENV).ok(),
    )
}

fn submit(form: IntakeForm) -> IntakeResult<()> {
    let cfg = config_from_env()?;
    let store = PostgrestStore::connect(&cfg)?;

    let result = IntakeWriter::new(&store).submit(form);
    store.close();
    let confirmation = result?;

    match confirmation.patient_status {
        PatientStatus::Existing => println!("Existing patient: {}", confirmation.patient_id),
        PatientStatus::Created => println!("Patient created: {}", confirmation.patient_id),
    }
    println!(
        "Appointment created: {} (pending, {})",
        confirmation.appointment_id, confirmation.scheduled_for
    );
    println!("Anamnesis recorded.");
    println!("{}", confirmation.message);

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Submit {
            name,
            phone,
            birth_date,
            city,
            chronic,
            medications,
            allergies,
            goal,
        }) => {
            let form = IntakeForm {
                name,
                phone,
                birth_date,
                city,
                chronic_illness: chronic,
                medications,
                allergies,
                goal,
            };
            if let Err(e) = submit(form) {
                eprintln!("Error saving pre-registration: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => match config_from_env() {
            Ok(cfg) => {
                println!("Supabase URL: {}", cfg.supabase_url());
                println!("REST API: {}", cfg.rest_url()?);
                println!("Store timeout: {}s", cfg.store_timeout().as_secs());
            }
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("Use 'intake --help' for commands");
        }
    }

    Ok(())
}
