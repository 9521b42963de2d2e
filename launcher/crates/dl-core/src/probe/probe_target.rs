use async_trait::async_trait;

/// Something that can be asked whether it accepts requests yet.
#[async_trait]
pub trait ProbeTarget: Send + Sync {
    /// One bounded attempt. `Err` carries a human-readable reason.
    async fn attempt(&self) -> Result<(), String>;

    /// Address shown in logs.
    fn describe(&self) -> String;
}
