/// Blocking user interaction: alerts and yes/no confirmations.
pub trait Prompt: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}
