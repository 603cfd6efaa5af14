pub mod admin;
pub mod appointments;
pub mod config;
pub mod directory;
pub mod prescriptions;
pub mod reviews;
pub mod session;

use chrono::{NaiveDate, Weekday};
use clap::Subcommand;
use mediconnect_core::{
    AppointmentId, AppointmentStatus, CareStore, DoctorId, Gender, PrescriptionId, ReviewId,
    ReviewStatus, Role, StoreConfig,
};
use miette::Result;
use std::path::PathBuf;

use crate::output::Output;

/// Everything a command needs: the live store plus how to talk to the user
pub struct Context<'a> {
    pub store: &'a mut CareStore,
    pub config: &'a StoreConfig,
    pub output: Output,
    /// Running inside the shell, where stdin belongs to the line editor
    pub interactive: bool,
}

pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date, expected YYYY-MM-DD", s))
}

pub fn parse_weekday(s: &str) -> std::result::Result<Weekday, String> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| format!("'{}' is not a weekday, expected e.g. mon or monday", s))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in to an existing account
    Login {
        email: String,
        /// Account type to log in as
        #[arg(long, short = 'r', default_value = "patient")]
        role: Role,
        /// Password (prompted when omitted outside the shell)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and forget the saved session
    Logout,
    /// Show the logged-in account
    Whoami {
        /// Print the session as JSON, as it is persisted
        #[arg(long)]
        json: bool,
    },
    /// Create a patient or doctor account
    Register {
        #[command(subcommand)]
        cmd: RegisterCommands,
    },
    /// Update the logged-in profile
    Profile(ProfileArgs),
    /// Search the doctor directory
    Doctors {
        /// Match against name or specialization
        #[arg(long, short = 's')]
        search: Option<String>,
        #[arg(long)]
        specialization: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Only doctors currently accepting bookings
        #[arg(long)]
        available: bool,
        #[arg(long)]
        min_rating: Option<f32>,
    },
    /// Show one doctor with their published reviews
    Doctor { id: DoctorId },
    /// List your appointments, upcoming first
    Appointments,
    /// Book an appointment with a doctor
    Book {
        doctor: DoctorId,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// One of the doctor's time slots, e.g. "10:00 AM"
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        symptoms: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Change an appointment's status
    Status {
        id: AppointmentId,
        status: AppointmentStatus,
    },
    /// Mark an appointment completed
    Complete { id: AppointmentId },
    /// List your prescriptions
    Prescriptions {
        /// Only prescriptions for this appointment
        #[arg(long)]
        appointment: Option<AppointmentId>,
    },
    /// Issue a prescription for one of your appointments
    Prescribe {
        appointment: AppointmentId,
        #[arg(long)]
        medication: String,
        #[arg(long)]
        dosage: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        instructions: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Delete a prescription
    Unprescribe { id: PrescriptionId },
    /// Review a completed appointment
    Review {
        appointment: AppointmentId,
        /// 1 to 5 stars
        #[arg(long)]
        rating: u8,
        comment: String,
    },
    /// Administration
    Admin {
        #[command(subcommand)]
        cmd: AdminCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Interactive shell running every command against one store
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum RegisterCommands {
    /// Register as a patient
    Patient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        /// Date of birth, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        dob: Option<NaiveDate>,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, default_value = "")]
        history: String,
        #[arg(long, default_value = "")]
        allergies: String,
    },
    /// Register as a doctor (needs admin approval before patients can book)
    Doctor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "")]
        specialization: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Comma-separated weekdays, e.g. mon,wed,fri
        #[arg(long, value_delimiter = ',', value_parser = parse_weekday)]
        days: Vec<Weekday>,
        /// Comma-separated time slots, e.g. "09:00 AM,10:00 AM"
        #[arg(long, value_delimiter = ',')]
        slots: Vec<String>,
        #[arg(long, default_value_t = 0)]
        fee: u32,
        #[arg(long, default_value = "")]
        bio: String,
    },
}

/// Profile fields; which ones apply depends on the logged-in role
#[derive(clap::Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    // patient
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub dob: Option<NaiveDate>,
    #[arg(long)]
    pub gender: Option<Gender>,
    #[arg(long)]
    pub history: Option<String>,
    #[arg(long)]
    pub allergies: Option<String>,
    // doctor
    #[arg(long)]
    pub specialization: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, value_delimiter = ',', value_parser = parse_weekday)]
    pub days: Option<Vec<Weekday>>,
    #[arg(long, value_delimiter = ',')]
    pub slots: Option<Vec<String>>,
    #[arg(long)]
    pub fee: Option<u32>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub available: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Platform statistics
    Stats,
    /// Doctors awaiting approval
    Pending,
    /// Approve a doctor's registration
    Approve { id: DoctorId },
    /// Reject a doctor's registration
    Reject { id: DoctorId },
    /// Reviews awaiting moderation
    Reviews,
    /// Set a review's moderation status
    Moderate { id: ReviewId, status: ReviewStatus },
    /// Delete a review
    DeleteReview { id: ReviewId },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "mediconnect.toml")]
        path: PathBuf,
    },
}

/// Run one command against the store
pub async fn run(ctx: &mut Context<'_>, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            email,
            role,
            password,
        } => session::login(ctx, &email, role, password).await,
        Commands::Logout => session::logout(ctx).await,
        Commands::Whoami { json } => session::whoami(ctx, json),
        Commands::Register { cmd } => session::register(ctx, cmd).await,
        Commands::Profile(args) => session::update_profile(ctx, args).await,
        Commands::Doctors {
            search,
            specialization,
            location,
            available,
            min_rating,
        } => {
            let filter = mediconnect_core::DoctorFilter {
                search,
                specialization,
                location,
                available_only: available,
                min_rating,
            };
            directory::search(ctx, &filter);
            Ok(())
        }
        Commands::Doctor { id } => directory::show(ctx, &id),
        Commands::Appointments => {
            appointments::list(ctx);
            Ok(())
        }
        Commands::Book {
            doctor,
            date,
            time,
            symptoms,
            notes,
        } => appointments::book(
            ctx,
            mediconnect_core::BookingRequest {
                doctor_id: doctor,
                date,
                time,
                symptoms,
                notes,
            },
        ),
        Commands::Status { id, status } => appointments::set_status(ctx, &id, status),
        Commands::Complete { id } => appointments::complete(ctx, &id),
        Commands::Prescriptions { appointment } => {
            prescriptions::list(ctx, appointment.as_ref());
            Ok(())
        }
        Commands::Prescribe {
            appointment,
            medication,
            dosage,
            title,
            instructions,
            date,
        } => prescriptions::issue(
            ctx,
            mediconnect_core::NewPrescription {
                appointment_id: Some(appointment),
                title,
                medication,
                dosage,
                instructions,
                date,
            },
        ),
        Commands::Unprescribe { id } => prescriptions::delete(ctx, &id),
        Commands::Review {
            appointment,
            rating,
            comment,
        } => reviews::submit(ctx, &appointment, rating, &comment),
        Commands::Admin { cmd } => admin::run(ctx, cmd),
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => config::show(ctx),
            ConfigCommands::Save { path } => config::save(ctx, &path).await,
        },
        // main starts the shell; nested shells are refused
        Commands::Shell => {
            ctx.output.warning("Already in the shell");
            Ok(())
        }
    }
}
