use miette::Result;

use super::{AdminCommands, Context};
use crate::output::{format_approval, format_review_status, stars};

pub fn run(ctx: &mut Context<'_>, cmd: AdminCommands) -> Result<()> {
    match cmd {
        AdminCommands::Stats => {
            let stats = ctx.store.platform_stats()?;
            ctx.output.section("Platform");
            ctx.output.kv("Doctors", &stats.doctors.to_string());
            ctx.output.kv("Patients", &stats.patients.to_string());
            ctx.output
                .kv("Appointments", &stats.appointments.to_string());
            ctx.output
                .kv("Pending approvals", &stats.pending_approvals.to_string());
            ctx.output
                .kv("Pending reviews", &stats.pending_reviews.to_string());
        }
        AdminCommands::Pending => {
            let pending = ctx.store.pending_doctors()?;
            ctx.output.section("Awaiting approval");
            if pending.is_empty() {
                ctx.output.status("No registrations waiting");
                return Ok(());
            }
            ctx.output.table(
                &["ID", "Name", "Email", "Specialization", "Location"],
                pending
                    .into_iter()
                    .map(|doctor| {
                        vec![
                            doctor.id.to_string(),
                            doctor.name,
                            doctor.email,
                            doctor.specialization,
                            doctor.location,
                        ]
                    })
                    .collect(),
            );
        }
        AdminCommands::Approve { id } => {
            let doctor = ctx.store.approve_doctor(&id)?;
            ctx.output.success(&format!(
                "{} is {}",
                doctor.name,
                format_approval(doctor.approval)
            ));
        }
        AdminCommands::Reject { id } => {
            let doctor = ctx.store.reject_doctor(&id)?;
            ctx.output.success(&format!(
                "{} is {}",
                doctor.name,
                format_approval(doctor.approval)
            ));
        }
        AdminCommands::Reviews => {
            let queue = ctx.store.review_queue()?;
            ctx.output.section("Review queue");
            if queue.is_empty() {
                ctx.output.status("Nothing to moderate");
                return Ok(());
            }
            ctx.output.table(
                &["ID", "Doctor", "Patient", "Rating", "Comment", "Status"],
                queue
                    .into_iter()
                    .map(|review| {
                        vec![
                            review.id.to_string(),
                            review.doctor_name,
                            review.patient_name,
                            stars(review.rating),
                            review.comment,
                            format_review_status(review.status),
                        ]
                    })
                    .collect(),
            );
        }
        AdminCommands::Moderate { id, status } => {
            let review = ctx.store.moderate_review(&id, status)?;
            ctx.output.success(&format!(
                "Review {} is {}",
                review.id,
                format_review_status(review.status)
            ));
        }
        AdminCommands::DeleteReview { id } => {
            let review = ctx.store.delete_review(&id)?;
            ctx.output.success(&format!("Deleted review {}", review.id));
        }
    }
    Ok(())
}
