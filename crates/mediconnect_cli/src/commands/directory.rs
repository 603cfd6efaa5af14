use mediconnect_core::{DoctorFilter, DoctorId, DoctorProfile};
use miette::Result;
use owo_colors::OwoColorize;

use super::Context;
use crate::output::stars;

fn doctor_row(doctor: &DoctorProfile) -> Vec<String> {
    vec![
        doctor.id.to_string(),
        doctor.name.clone(),
        doctor.specialization.clone(),
        doctor.location.clone(),
        format!("{:.1}", doctor.rating),
        format!("${}", doctor.fee),
        if doctor.available {
            "yes".to_string()
        } else {
            "no".to_string()
        },
    ]
}

pub fn search(ctx: &Context<'_>, filter: &DoctorFilter) {
    let doctors = ctx.store.search_doctors(filter);

    ctx.output.section("Doctors");
    if doctors.is_empty() {
        ctx.output.status("No doctors match those filters");
        let specializations = ctx.store.specializations();
        if !specializations.is_empty() {
            ctx.output
                .info("Specializations:", &specializations.join(", "));
        }
        let locations = ctx.store.locations();
        if !locations.is_empty() {
            ctx.output.info("Locations:", &locations.join(", "));
        }
        return;
    }

    ctx.output.table(
        &[
            "ID",
            "Name",
            "Specialization",
            "Location",
            "Rating",
            "Fee",
            "Available",
        ],
        doctors.iter().map(doctor_row).collect(),
    );
}

pub fn show(ctx: &Context<'_>, id: &DoctorId) -> Result<()> {
    let doctor = ctx.store.doctor(id)?;

    ctx.output.section(&doctor.name);
    ctx.output.kv("Specialization", &doctor.specialization);
    ctx.output.kv("Location", &doctor.location);
    ctx.output.kv(
        "Rating",
        &format!("{} {:.1}", stars(doctor.rating.round() as u8), doctor.rating),
    );
    ctx.output.kv("Fee", &format!("${}", doctor.fee));
    let days: Vec<String> = doctor
        .available_days
        .iter()
        .map(|day| day.to_string())
        .collect();
    ctx.output.kv("Days", &days.join(", "));
    ctx.output
        .kv("Slots", &doctor.available_time_slots.join(", "));
    if !doctor.bio.is_empty() {
        ctx.output.kv("About", &doctor.bio);
    }
    if !doctor.is_bookable() {
        ctx.output.warning("Not accepting bookings right now");
    }

    let reviews = ctx.store.doctor_reviews(id);
    ctx.output.section("Reviews");
    if reviews.is_empty() {
        ctx.output.status("No reviews yet");
    }
    for review in reviews {
        ctx.output.list_item(&format!(
            "{} {} {}",
            stars(review.rating),
            review.comment,
            format!("({}, {})", review.patient_name, review.date).dimmed()
        ));
    }
    Ok(())
}
