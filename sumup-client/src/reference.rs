use chrono::Utc;
use uuid::Uuid;

/// Build a merchant reference unique per attempt: `<prefix>_<unix millis>_<8 hex>`.
pub fn generate(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        &random[..8]
    )
}
