use mediconnect_core::{
    Account, DoctorDetails, PatientDetails, ProfileUpdate, Registration, RegistrationDetails, Role,
    profile::{AdminUpdate, DoctorUpdate, PatientUpdate},
};
use miette::{IntoDiagnostic, Result, miette};

use super::{Context, ProfileArgs, RegisterCommands};

/// Use the password given on the command line or prompt for it
fn read_password(ctx: &Context<'_>, given: Option<String>, prompt: &str) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    if ctx.interactive {
        return Err(miette!(
            help = "The shell owns the terminal, so pass the password inline",
            "--password is required inside the shell"
        ));
    }
    rpassword::prompt_password(prompt).into_diagnostic()
}

pub async fn login(
    ctx: &mut Context<'_>,
    email: &str,
    role: Role,
    password: Option<String>,
) -> Result<()> {
    let password = read_password(ctx, password, "Password: ")?;
    let account = ctx.store.login(email, &password, role).await?;

    ctx.output.success(&format!(
        "Logged in as {} ({})",
        account.name(),
        account.role()
    ));
    ctx.output
        .status(&format!("Dashboard: {}", account.role().dashboard_path()));
    Ok(())
}

pub async fn logout(ctx: &mut Context<'_>) -> Result<()> {
    if ctx.store.current().is_none() {
        ctx.output.status("Not logged in");
        return Ok(());
    }
    ctx.store.logout().await?;
    ctx.output.success("Logged out");
    Ok(())
}

pub fn whoami(ctx: &Context<'_>, json: bool) -> Result<()> {
    let Some(account) = ctx.store.current() else {
        ctx.output.status("Not logged in");
        return Ok(());
    };

    if json {
        let text = serde_json::to_string_pretty(account).into_diagnostic()?;
        ctx.output.raw(&text);
        return Ok(());
    }

    show_account(ctx, account);
    Ok(())
}

pub fn show_account(ctx: &Context<'_>, account: &Account) {
    ctx.output.section(account.name());
    ctx.output.kv("Role", account.role().as_str());
    ctx.output.kv("ID", account.id());
    ctx.output.kv("Email", account.email());

    match account {
        Account::Patient(patient) => {
            if let Some(phone) = &patient.phone {
                ctx.output.kv("Phone", phone);
            }
            if let Some(dob) = patient.date_of_birth {
                ctx.output.kv("Born", &dob.to_string());
            }
            if !patient.medical_history.is_empty() {
                ctx.output.kv("History", &patient.medical_history);
            }
            if !patient.allergies.is_empty() {
                ctx.output.kv("Allergies", &patient.allergies);
            }
        }
        Account::Doctor(doctor) => {
            ctx.output.kv("Specialization", &doctor.specialization);
            ctx.output.kv("Location", &doctor.location);
            ctx.output
                .kv("Approval", &crate::output::format_approval(doctor.approval));
            ctx.output.kv(
                "Accepting bookings",
                if doctor.available { "yes" } else { "no" },
            );
            ctx.output
                .kv("Slots", &doctor.available_time_slots.join(", "));
        }
        Account::Admin(_) => {}
    }
}

pub async fn register(ctx: &mut Context<'_>, cmd: RegisterCommands) -> Result<()> {
    let form = match cmd {
        RegisterCommands::Patient {
            name,
            email,
            password,
            dob,
            gender,
            phone,
            history,
            allergies,
        } => {
            let (password, confirm_password) = read_new_password(ctx, password)?;
            Registration {
                name,
                email,
                password,
                confirm_password,
                details: RegistrationDetails::Patient(PatientDetails {
                    phone,
                    date_of_birth: dob,
                    gender,
                    medical_history: history,
                    allergies,
                }),
            }
        }
        RegisterCommands::Doctor {
            name,
            email,
            password,
            specialization,
            location,
            days,
            slots,
            fee,
            bio,
        } => {
            let (password, confirm_password) = read_new_password(ctx, password)?;
            Registration {
                name,
                email,
                password,
                confirm_password,
                details: RegistrationDetails::Doctor(DoctorDetails {
                    specialization,
                    location,
                    available_days: days,
                    available_time_slots: slots,
                    fee,
                    bio,
                }),
            }
        }
    };

    let account = ctx.store.register(form).await?;

    ctx.output.success(&format!(
        "Welcome, {}! Your {} account is ready",
        account.name(),
        account.role()
    ));
    if let Account::Doctor(_) = account {
        ctx.output
            .warning("Patients can book you once an admin approves your registration");
    }
    Ok(())
}

/// Inline passwords count as confirmed; prompted ones are asked twice
fn read_new_password(ctx: &Context<'_>, given: Option<String>) -> Result<(String, String)> {
    if let Some(password) = given {
        return Ok((password.clone(), password));
    }
    let password = read_password(ctx, None, "Password: ")?;
    let confirm = read_password(ctx, None, "Confirm password: ")?;
    Ok((password, confirm))
}

pub async fn update_profile(ctx: &mut Context<'_>, args: ProfileArgs) -> Result<()> {
    let Some(role) = ctx.store.current().map(Account::role) else {
        return Err(mediconnect_core::CoreError::not_authenticated("update a profile").into());
    };

    let update = profile_update(role, args);
    let account = ctx.store.update_profile(update).await?;
    ctx.output.success("Profile updated");
    show_account(ctx, &account);
    Ok(())
}

/// Build the role's update from the flags that apply to it
pub fn profile_update(role: Role, args: ProfileArgs) -> ProfileUpdate {
    match role {
        Role::Patient => ProfileUpdate::Patient(PatientUpdate {
            name: args.name,
            email: args.email,
            phone: args.phone,
            date_of_birth: args.dob,
            gender: args.gender,
            medical_history: args.history,
            allergies: args.allergies,
        }),
        Role::Doctor => ProfileUpdate::Doctor(DoctorUpdate {
            name: args.name,
            email: args.email,
            specialization: args.specialization,
            location: args.location,
            available_days: args.days,
            available_time_slots: args.slots,
            fee: args.fee,
            bio: args.bio,
            available: args.available,
        }),
        Role::Admin => ProfileUpdate::Admin(AdminUpdate {
            name: args.name,
            email: args.email,
        }),
    }
}
