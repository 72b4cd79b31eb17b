/// Database utilities
///
/// - `pool`: PostgreSQL connection pool management
/// - `migrations`: Embedded migration runner

pub mod migrations;
pub mod pool;
