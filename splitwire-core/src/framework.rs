use sqlx::PgPool;

/// Executes query commands against the shared connection pool.
///
/// Every storage operation is modeled as a command struct with a
/// `kanau::processor::Processor` impl on this type.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
