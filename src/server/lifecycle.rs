use std::sync::Arc;

use crate::Result;
use crate::Server;

/// Application hooks driven by the host loop.
///
/// `initialise` runs once before the loop starts and builds namespaces and
/// nodes, `process` runs on every tick, `terminate` runs once before shutdown.
/// The host releases the server's callbacks after `terminate` returns.
pub trait ServerLifecycle: Send {
    fn initialise(
        &mut self,
        server: &Arc<Server>,
    ) -> Result<()>;

    fn process(
        &mut self,
        _server: &Arc<Server>,
    ) -> Result<()> {
        Ok(())
    }

    fn terminate(
        &mut self,
        _server: &Arc<Server>,
    ) -> Result<()> {
        Ok(())
    }
}
