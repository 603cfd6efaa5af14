use mediconnect_core::{AppointmentId, NewPrescription, Prescription, PrescriptionId};
use miette::Result;

use super::Context;

fn rows(prescriptions: &[Prescription]) -> Vec<Vec<String>> {
    prescriptions
        .iter()
        .map(|rx| {
            vec![
                rx.id.to_string(),
                rx.date.to_string(),
                rx.medication.clone(),
                rx.dosage.clone(),
                rx.instructions.clone(),
                rx.appointment_id.to_string(),
            ]
        })
        .collect()
}

pub fn list(ctx: &Context<'_>, appointment: Option<&AppointmentId>) {
    if ctx.store.current().is_none() {
        ctx.output.status("Log in to see your prescriptions");
        return;
    }

    let prescriptions = match appointment {
        Some(id) => ctx.store.appointment_prescriptions(id),
        None => ctx.store.user_prescriptions(),
    };

    ctx.output.section("Prescriptions");
    if prescriptions.is_empty() {
        ctx.output.status("No prescriptions");
        return;
    }
    ctx.output.table(
        &[
            "ID",
            "Date",
            "Medication",
            "Dosage",
            "Instructions",
            "Appointment",
        ],
        rows(&prescriptions),
    );
}

pub fn issue(ctx: &mut Context<'_>, form: NewPrescription) -> Result<()> {
    let rx = ctx.store.issue_prescription(form)?;
    ctx.output.success(&format!(
        "Prescribed {} {} for appointment {}",
        rx.medication, rx.dosage, rx.appointment_id
    ));
    ctx.output.info("Prescription:", rx.id.as_str());
    Ok(())
}

pub fn delete(ctx: &mut Context<'_>, id: &PrescriptionId) -> Result<()> {
    let rx = ctx.store.delete_prescription(id)?;
    ctx.output
        .success(&format!("Deleted prescription {} ({})", rx.id, rx.medication));
    Ok(())
}
