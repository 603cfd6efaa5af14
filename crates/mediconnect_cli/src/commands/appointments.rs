use mediconnect_core::{
    Appointment, AppointmentId, AppointmentStatus, BookingRequest, Role, partition_appointments,
};
use miette::Result;

use super::Context;
use crate::output::format_appointment_status;

fn appointment_rows(appointments: &[Appointment], viewer: Option<Role>) -> Vec<Vec<String>> {
    appointments
        .iter()
        .map(|appointment| {
            // show whoever is on the other side of the visit
            let counterpart = match viewer {
                Some(Role::Doctor) => appointment.patient_name.clone(),
                Some(Role::Patient) => appointment.doctor_name.clone(),
                _ => format!("{} / {}", appointment.doctor_name, appointment.patient_name),
            };
            vec![
                appointment.id.to_string(),
                appointment.date.to_string(),
                appointment.time.clone(),
                counterpart,
                format_appointment_status(appointment.status, appointment.completed),
            ]
        })
        .collect()
}

pub fn list(ctx: &Context<'_>) {
    let Some(role) = ctx.store.current().map(|account| account.role()) else {
        ctx.output.status("Log in to see your appointments");
        return;
    };

    let buckets = partition_appointments(&ctx.store.user_appointments());
    let header = ["ID", "Date", "Time", "With", "Status"];

    ctx.output.section("Upcoming");
    if buckets.upcoming.is_empty() {
        ctx.output.status("Nothing scheduled");
    } else {
        ctx.output
            .table(&header, appointment_rows(&buckets.upcoming, Some(role)));
    }

    ctx.output.section("Past");
    if buckets.past.is_empty() {
        ctx.output.status("No past appointments");
    } else {
        ctx.output
            .table(&header, appointment_rows(&buckets.past, Some(role)));
    }
}

pub fn book(ctx: &mut Context<'_>, request: BookingRequest) -> Result<()> {
    let appointment = ctx.store.book_appointment(request)?;
    ctx.output.success(&format!(
        "Booked {} on {} at {}",
        appointment.doctor_name, appointment.date, appointment.time
    ));
    ctx.output.info("Appointment:", appointment.id.as_str());
    ctx.output.status("The doctor will confirm the visit");
    Ok(())
}

pub fn set_status(
    ctx: &mut Context<'_>,
    id: &AppointmentId,
    status: AppointmentStatus,
) -> Result<()> {
    let appointment = ctx.store.update_appointment_status(id, status)?;
    ctx.output.success(&format!(
        "Appointment {} is {}",
        appointment.id,
        format_appointment_status(appointment.status, appointment.completed)
    ));
    Ok(())
}

pub fn complete(ctx: &mut Context<'_>, id: &AppointmentId) -> Result<()> {
    let appointment = ctx.store.complete_appointment(id)?;
    ctx.output
        .success(&format!("Appointment {} completed", appointment.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mediconnect_core::{DoctorId, PatientId};
    use pretty_assertions::assert_eq;

    fn sample() -> Appointment {
        Appointment {
            id: AppointmentId::from_static("app1"),
            doctor_id: DoctorId::from_static("d1"),
            patient_id: PatientId::from_static("p1"),
            doctor_name: "Dr. Sarah Johnson".to_string(),
            patient_name: "John Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 7, 15).unwrap(),
            time: "10:00 AM".to_string(),
            symptoms: String::new(),
            notes: String::new(),
            status: AppointmentStatus::Pending,
            completed: false,
        }
    }

    #[test]
    fn rows_name_the_other_party() {
        let rows = appointment_rows(&[sample()], Some(Role::Doctor));
        assert_eq!(rows[0][3], "John Doe");

        let rows = appointment_rows(&[sample()], Some(Role::Patient));
        assert_eq!(rows[0][3], "Dr. Sarah Johnson");

        let rows = appointment_rows(&[sample()], Some(Role::Admin));
        assert_eq!(rows[0][3], "Dr. Sarah Johnson / John Doe");
    }
}
