use crate::commander::{Commander, CommanderError};
use crate::config::{CommanderConfig, ConfigError};
use crate::services::Services;
use tracing::{error, info};

/// The running order-commander: both actors plus the commander that drives them.
///
/// # Example
///
/// ```ignore
/// let sim = SimulatedServices::new();
/// let system = CommanderSystem::start(CommanderConfig::default(), sim.services())?;
///
/// let id = system.commander.place_order(params).await?;
/// // ... stages run in the background ...
///
/// system.shutdown().await?;
/// ```
pub struct CommanderSystem {
    pub commander: Commander,

    /// Task handles for the order and queue actors.
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CommanderSystem {
    /// Validates `config`, spawns the actors and builds the commander.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: CommanderConfig, services: Services) -> Result<Self, ConfigError> {
        config.validate()?;

        let (order_actor, orders) = crate::order_actor::new(config.channel_capacity);
        let (queue_actor, queue) =
            crate::queue_actor::new(services.queue.service.clone(), config.channel_capacity);

        let order_handle = tokio::spawn(order_actor.run());
        let queue_handle = tokio::spawn(queue_actor.run());

        info!(?config, "Commander system started");
        Ok(Self {
            commander: Commander::new(orders, queue, services, config),
            handles: vec![order_handle, queue_handle],
        })
    }

    /// Closes the commander and waits for both actors to stop.
    ///
    /// Stage tasks already running keep their clients until their current call finishes, so
    /// this returns once the last of them is done.
    pub async fn shutdown(self) -> Result<(), CommanderError> {
        info!("Shutting down system...");

        self.commander.close();
        drop(self.commander);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(CommanderError::ActorTask(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
