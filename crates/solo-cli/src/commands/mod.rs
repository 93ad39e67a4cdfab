pub mod checkin;
pub mod habit;
pub mod ideas;
pub mod remind;
pub mod user;

use std::sync::Arc;

use solo_core::{Config, Mailer, ResendMailer, SimulatedMailer};

/// The configured mailer: Resend when RESEND_API_KEY is set, otherwise
/// the simulated one that logs what it would have sent.
pub fn mailer(config: &Config) -> Arc<dyn Mailer> {
    match ResendMailer::from_env(config) {
        Some(mailer) => Arc::new(mailer),
        None => Arc::new(SimulatedMailer),
    }
}

/// Resolve a habit definition from `--template` / `--custom` flags.
pub fn resolve_definition(
    template: Option<&str>,
    custom: Option<&str>,
) -> Result<solo_core::HabitDefinition, Box<dyn std::error::Error>> {
    use solo_core::{CoreError, ValidationError};

    match (template, custom) {
        (Some(id), _) if id != "custom" => solo_core::templates::template(id)
            .map(|t| t.definition())
            .ok_or_else(|| {
                CoreError::from(ValidationError::UnknownTemplate(id.to_string())).into()
            }),
        (_, Some(name)) if !name.trim().is_empty() => {
            Ok(solo_core::templates::custom_definition(name))
        }
        _ => Err(CoreError::from(ValidationError::MissingField(
            "A habit template (--template) or custom habit name (--custom)",
        ))
        .into()),
    }
}
