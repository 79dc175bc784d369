//! Call connection implementations

mod acs;
pub mod mock;

pub use acs::{AcsConnection, CALL_TERMINATED_MESSAGE};
pub use mock::{MockConnection, RecordedCall};

use crate::config::ClientConfig;
use crate::connection::CallConnection;
use crate::error::Result;

/// Create a connection client for a live call from the client config
pub fn get_connection(
    config: &ClientConfig,
    call_connection_id: &str,
) -> Result<Box<dyn CallConnection>> {
    config.validate()?;
    let access_token = config.access_token()?;

    Ok(Box::new(AcsConnection::new(
        &config.endpoint,
        &config.api_version,
        access_token,
        call_connection_id,
    )?))
}
