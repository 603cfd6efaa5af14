use mediconnect_core::AppointmentId;
use miette::Result;

use super::Context;
use crate::output::{format_review_status, stars};

pub fn submit(
    ctx: &mut Context<'_>,
    appointment: &AppointmentId,
    rating: u8,
    comment: &str,
) -> Result<()> {
    let review = ctx.store.submit_review(appointment, rating, comment)?;
    ctx.output.success(&format!(
        "Reviewed {} {}",
        review.doctor_name,
        stars(review.rating)
    ));
    ctx.output.kv("Status", &format_review_status(review.status));
    ctx.output
        .status("Reviews are published once a moderator approves them");
    Ok(())
}
