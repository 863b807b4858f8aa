use shadow_destinations::{logging, runner, DestinationConfiguration, DestinationKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = DestinationConfiguration::from_env(DestinationKind::FaultInjection)?;
    logging::init(configuration.log_format());

    if let Err(e) = runner::serve(configuration).await {
        tracing::error!("Fault destination error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
