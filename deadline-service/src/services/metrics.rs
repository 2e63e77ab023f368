//! Deadline metrics recorded through the `metrics` facade.

pub fn record_deadlines_seeded(generated: usize, inserted: usize) {
    metrics::counter!("deadlines_generated_total").increment(generated as u64);
    metrics::counter!("deadlines_inserted_total").increment(inserted as u64);
}

pub fn record_deadline_filed(obligation_type: &str) {
    metrics::counter!("deadlines_filed_total", "obligation_type" => obligation_type.to_string())
        .increment(1);
}
